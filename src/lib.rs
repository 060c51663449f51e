//! # Rust File Logger
//!
//! Buffered file logging with one directory per severity, daily file names
//! and retention-based cleanup.
//!
//! ## Features
//!
//! - **Buffered**: entries are rendered on `add` and written in one locked append on `logging`
//! - **Two formats**: `%token%` text templates and JSON Lines
//! - **Call-site aware**: file, line, function and type of the logging call
//! - **Rotation**: files older than the retention window are purged on every write
//! - **Shared configuration**: `LOGGER_*` environment variables, updatable at runtime
//!
//! ## Example
//!
//! ```no_run
//! use rust_file_logger::prelude::*;
//!
//! # fn main() -> rust_file_logger::Result<()> {
//! let factory = LoggerFactory::from_env()?;
//!
//! let mut logger = factory.info();
//! logger.add("service started").add_value("port", 8080);
//! logger.logging()?;
//!
//! factory.error_log("payment failed", "order A-1001", true)?;
//! # Ok(())
//! # }
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::FileAppender;
    pub use crate::core::{
        Appender, Clock, FormatToken, JsonLogger, LogValue, Logger, LoggerConfig, LoggerError,
        LoggerFactory, Result, RetentionWindow, Severity, SharedConfig,
    };
}

pub use appenders::FileAppender;
pub use core::{
    format_bytes, Appender, CallSite, Clock, EntryFormatter, FormatToken, JsonLogger, LogEngine,
    LogValue, Logger, LoggerConfig, LoggerError, LoggerFactory, Result, RetentionWindow,
    RotationPolicy, Severity, SharedConfig, StructuredFormatter, TemplateFormatter,
};
