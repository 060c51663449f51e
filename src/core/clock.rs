//! Source of "now" for timestamps, file names and rotation cutoffs

use super::error::{LoggerError, Result};
use chrono::{DateTime, Local};
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub enum Clock {
    #[default]
    System,
    /// Fixed time, advanced only through [`Clock::set_now`]
    Manual(DateTime<Local>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Local> {
        match self {
            Clock::System => Local::now(),
            Clock::Manual(now) => *now,
        }
    }

    pub fn set_now(&mut self, new_time: DateTime<Local>) {
        if let Clock::Manual(now) = self {
            *now = new_time;
        }
    }
}

/// Render `time` through a strftime pattern, failing on invalid specifiers
/// instead of panicking.
pub fn strftime(time: &DateTime<Local>, pattern: &str) -> Result<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", time.format(pattern))
        .map_err(|_| LoggerError::config("date pattern", format!("invalid pattern '{}'", pattern)))?;
    Ok(rendered)
}
