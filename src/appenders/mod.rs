//! Appender implementations

pub mod file;

pub use file::FileAppender;

pub use crate::core::Appender;
