//! Logging macros for one-shot writes with `format!` arguments.
//!
//! Each macro goes through [`LoggerFactory::log`](crate::LoggerFactory::log)
//! as plain text and evaluates to its `Result`.
//!
//! # Examples
//!
//! ```no_run
//! use rust_file_logger::prelude::*;
//! use rust_file_logger::info;
//!
//! # fn main() -> rust_file_logger::Result<()> {
//! let factory = LoggerFactory::default();
//!
//! info!(factory, "Server started")?;
//!
//! let port = 8080;
//! info!(factory, "Server listening on port {}", port)?;
//! # Ok(())
//! # }
//! ```

/// Write a formatted message at the given severity.
///
/// # Examples
///
/// ```no_run
/// # use rust_file_logger::prelude::*;
/// # let factory = LoggerFactory::default();
/// use rust_file_logger::log;
/// log!(factory, Severity::Notice, "Simple message").ok();
/// log!(factory, Severity::Error, "Error code: {}", 500).ok();
/// ```
#[macro_export]
macro_rules! log {
    ($factory:expr, $severity:expr, $($arg:tt)+) => {
        $factory.log($severity, format!($($arg)+), (), false)
    };
}

#[macro_export]
macro_rules! debug {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! notice {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Notice, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```no_run
/// # use rust_file_logger::prelude::*;
/// # let factory = LoggerFactory::default();
/// use rust_file_logger::warning;
/// warning!(factory, "Retry attempt {} of {}", 3, 5).ok();
/// ```
#[macro_export]
macro_rules! warning {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Critical, $($arg)+)
    };
}

#[macro_export]
macro_rules! alert {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Alert, $($arg)+)
    };
}

#[macro_export]
macro_rules! emergency {
    ($factory:expr, $($arg:tt)+) => {
        $crate::log!($factory, $crate::Severity::Emergency, $($arg)+)
    };
}
