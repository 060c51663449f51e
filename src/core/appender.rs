//! Appender trait for log output destinations

use super::error::Result;
use std::path::{Path, PathBuf};

/// Resolved location of one flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Base directory joined with the sub-directory
    pub directory: PathBuf,
    pub file_name: String,
    /// Without a leading dot; empty means no extension
    pub extension: String,
}

impl OutputTarget {
    pub fn path(&self) -> PathBuf {
        if self.extension.is_empty() {
            self.directory.join(&self.file_name)
        } else {
            self.directory
                .join(format!("{}.{}", self.file_name, self.extension))
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Permissions applied to log files the appender creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePermissions {
    pub mode: u32,
    pub owner: Option<u32>,
    pub group: Option<u32>,
}

impl Default for FilePermissions {
    fn default() -> Self {
        Self {
            mode: 0o666,
            owner: None,
            group: None,
        }
    }
}

/// Writes a flushed payload to its target.
///
/// Implementations must append the whole payload under an exclusive lock so
/// concurrent writers never interleave partial lines.
pub trait Appender: Send + Sync {
    fn append(
        &mut self,
        target: &OutputTarget,
        permissions: &FilePermissions,
        payload: &[u8],
    ) -> Result<()>;

    fn name(&self) -> &str;
}
