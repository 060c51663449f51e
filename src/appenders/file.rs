//! File appender implementation

use crate::core::{Appender, FilePermissions, LoggerError, OutputTarget, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

/// Appends payloads to files under an exclusive advisory lock
///
/// The directory is created on demand. Files created by this appender get
/// the requested mode and, on unix, owner and group.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAppender;

impl FileAppender {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path, permissions: &FilePermissions) -> Result<File> {
        Self::open_with(path, permissions, apply_permissions)
    }

    /// Open `path` for appending. A file created by this call gets
    /// `permissions` through `apply`; if that fails the file is removed
    /// again so the next attempt starts from scratch.
    fn open_with(
        path: &Path,
        permissions: &FilePermissions,
        apply: fn(&Path, &FilePermissions) -> Result<()>,
    ) -> Result<File> {
        let open_failed = |e: std::io::Error| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        };

        match OpenOptions::new().append(true).create_new(true).open(path) {
            Ok(file) => {
                if let Err(e) = apply(path, permissions) {
                    drop(file);
                    if let Err(remove) = fs::remove_file(path) {
                        log::warn!("Failed to remove {} after permission error: {}", path.display(), remove);
                    }
                    return Err(e);
                }
                Ok(file)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                OpenOptions::new().append(true).open(path).map_err(open_failed)
            }
            Err(e) => Err(open_failed(e)),
        }
    }

    fn write_locked(file: &File, path: &Path, payload: &[u8]) -> Result<()> {
        FileExt::lock_exclusive(file).map_err(|_| LoggerError::file_lock(path.display().to_string()))?;

        let mut writer = BufWriter::new(file);
        let written = writer.write_all(payload).and_then(|()| writer.flush());
        drop(writer);

        // Unlock before reporting so a failed write never leaves the lock held.
        let unlocked = FileExt::unlock(file);

        written.map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Failed to write log entries: {}", e),
            )
        })?;
        unlocked.map_err(|e| LoggerError::io_operation("unlocking log file", path.display().to_string(), e))
    }
}

impl Appender for FileAppender {
    fn append(
        &mut self,
        target: &OutputTarget,
        permissions: &FilePermissions,
        payload: &[u8],
    ) -> Result<()> {
        fs::create_dir_all(target.directory()).map_err(|e| {
            LoggerError::io_operation(
                "creating log directory",
                target.directory().display().to_string(),
                e,
            )
        })?;

        let path = target.path();
        let file = Self::open(&path, permissions)?;

        Self::write_locked(&file, &path, payload)
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(unix)]
fn apply_permissions(path: &Path, permissions: &FilePermissions) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(permissions.mode)).map_err(|e| {
        LoggerError::io_operation("setting log file mode", path.display().to_string(), e)
    })?;

    if permissions.owner.is_some() || permissions.group.is_some() {
        std::os::unix::fs::chown(path, permissions.owner, permissions.group).map_err(|e| {
            LoggerError::io_operation("changing log file owner", path.display().to_string(), e)
        })?;
    }

    Ok(())
}

#[cfg(not(unix))]
fn apply_permissions(_path: &Path, _permissions: &FilePermissions) -> Result<()> {
    Ok(())
}
