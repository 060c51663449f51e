//! Core logger types and traits

pub mod appender;
pub mod buffer;
pub mod call_site;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod format_token;
pub mod formatter;
pub mod memory;
pub mod rotation;
pub mod severity;
pub mod value;

pub use appender::{Appender, FilePermissions, OutputTarget};
pub use buffer::EntryBuffer;
pub use call_site::{CallSite, CallSiteResolver, RawFrame};
pub use clock::Clock;
pub use config::{LoggerConfig, SharedConfig, ENV_PREFIX};
pub use engine::{JsonLogger, LogEngine, Logger, DIVIDER};
pub use error::{LoggerError, Result};
pub use factory::LoggerFactory;
pub use format_token::FormatToken;
pub use formatter::{EntryFormatter, RenderContext, StructuredFormatter, TemplateFormatter, TokenValue};
pub use memory::{format_bytes, MemoryDisplay, MemoryProbe, MemoryReading};
pub use rotation::{RetentionWindow, RotationPolicy, RotationReport};
pub use severity::Severity;
pub use value::LogValue;
