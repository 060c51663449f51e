//! Retention-based log rotation
//!
//! Rotation here means purging: every flush scans the output directory and
//! deletes log files whose last-modified day falls before the retention
//! cutoff. Comparisons are made on local calendar days, never on time of
//! day.

use chrono::{DateTime, Days, Local, NaiveDate};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// How long log files are kept
///
/// # Examples
///
/// ```
/// use rust_file_logger::core::RetentionWindow;
///
/// // Keep a week of files
/// let window = RetentionWindow::days(7);
/// assert!(window.is_active());
///
/// // Never delete anything
/// let window = RetentionWindow::disabled();
/// assert!(!window.is_active());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    pub enabled: bool,
    pub retention_days: i64,
}

impl Default for RetentionWindow {
    fn default() -> Self {
        Self::days(7)
    }
}

impl RetentionWindow {
    #[must_use]
    pub fn days(retention_days: i64) -> Self {
        Self {
            enabled: true,
            retention_days,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            retention_days: 0,
        }
    }

    /// Whether a rotation pass would do anything at all
    pub fn is_active(&self) -> bool {
        self.enabled && self.retention_days > 0
    }

    /// First day that is kept; files from earlier days are purged.
    pub fn cutoff(&self, now: &DateTime<Local>) -> Option<NaiveDate> {
        if !self.is_active() {
            return None;
        }
        let days = u64::try_from(self.retention_days).ok()?;
        now.date_naive().checked_sub_days(Days::new(days))
    }
}

/// Outcome of one rotation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl RotationReport {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.failed.is_empty()
    }
}

pub struct RotationPolicy;

impl RotationPolicy {
    /// Purge files in `directory` with `extension` that are older than the
    /// window allows.
    ///
    /// Never fails: an unreadable directory means there is nothing to
    /// rotate, and a file that cannot be deleted is recorded in
    /// [`RotationReport::failed`] while the remaining files are still tried.
    pub fn apply(
        directory: &Path,
        extension: &str,
        window: RetentionWindow,
        now: DateTime<Local>,
    ) -> RotationReport {
        Self::apply_with(directory, extension, window, now, |path| fs::remove_file(path))
    }

    fn apply_with(
        directory: &Path,
        extension: &str,
        window: RetentionWindow,
        now: DateTime<Local>,
        remove: fn(&Path) -> io::Result<()>,
    ) -> RotationReport {
        let mut report = RotationReport::default();

        let Some(cutoff) = window.cutoff(&now) else {
            return report;
        };

        let Ok(entries) = fs::read_dir(directory) else {
            return report;
        };

        for entry in entries.flatten() {
            let path = entry.path();

            if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                continue;
            }
            if !has_extension(&path, extension) {
                continue;
            }

            let Some(modified) = modified_day(&entry) else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }

            match remove(&path) {
                Ok(()) => {
                    log::debug!("rotated out {} (last modified {})", path.display(), modified);
                    report.deleted.push(path);
                }
                Err(e) => {
                    log::warn!("Failed to remove expired log file {}: {}", path.display(), e);
                    report.failed.push(path);
                }
            }
        }

        report
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    match path.extension() {
        Some(ext) => !extension.is_empty() && ext == OsStr::new(extension),
        None => extension.is_empty(),
    }
}

fn modified_day(entry: &fs::DirEntry) -> Option<NaiveDate> {
    let modified = entry.metadata().ok()?.modified().ok()?;
    let modified: DateTime<Local> = modified.into();
    Some(modified.date_naive())
}
