//! Convenience constructors and one-shot logging
//!
//! [`LoggerFactory`] hands out loggers that share one configuration, and
//! offers `*_log` shortcuts that create a logger, add a single entry and
//! flush it in one call.

use super::{
    config::{LoggerConfig, SharedConfig},
    engine::{JsonLogger, Logger},
    error::Result,
    severity::Severity,
    value::LogValue,
};
use std::panic::Location;

/// Frames between a shortcut's caller and the logger's `add_value`:
/// the public shortcut and [`LoggerFactory::log_at`].
const SHORTCUT_FRAMES: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct LoggerFactory {
    config: SharedConfig,
}

macro_rules! severity_shortcuts {
    ($(($severity:ident, $text:ident, $json:ident, $log:ident)),+ $(,)?) => {
        $(
            #[must_use]
            pub fn $text(&self) -> Logger {
                self.make(Severity::$severity)
            }

            #[must_use]
            pub fn $json(&self) -> JsonLogger {
                self.make_json(Severity::$severity)
            }

            /// One-shot write at this severity; see [`LoggerFactory::log`].
            #[track_caller]
            #[inline(never)]
            pub fn $log(
                &self,
                message: impl Into<LogValue>,
                value: impl Into<LogValue>,
                json: bool,
            ) -> Result<()> {
                self.log_at(Severity::$severity, message.into(), value.into(), json, Location::caller())
            }
        )+
    };
}

impl LoggerFactory {
    pub fn new(config: impl Into<SharedConfig>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// Factory over [`LoggerConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LoggerConfig::from_env()?))
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    #[must_use]
    pub fn make(&self, severity: Severity) -> Logger {
        Logger::new(severity, self.config.clone())
    }

    #[must_use]
    pub fn make_json(&self, severity: Severity) -> JsonLogger {
        JsonLogger::new(severity, self.config.clone())
    }

    severity_shortcuts!(
        (Debug, debug, debug_json, debug_log),
        (Info, info, info_json, info_log),
        (Notice, notice, notice_json, notice_log),
        (Warning, warning, warning_json, warning_log),
        (Error, error, error_json, error_log),
        (Critical, critical, critical_json, critical_log),
        (Alert, alert, alert_json, alert_log),
        (Emergency, emergency, emergency_json, emergency_log),
    );

    /// Write one entry immediately, attributed to the caller of this method.
    ///
    /// Pass `()` as `value` for a plain message.
    ///
    /// # Errors
    ///
    /// Whatever [`Logger::logging`] returns.
    #[track_caller]
    #[inline(never)]
    pub fn log(
        &self,
        severity: Severity,
        message: impl Into<LogValue>,
        value: impl Into<LogValue>,
        json: bool,
    ) -> Result<()> {
        self.log_at(severity, message.into(), value.into(), json, Location::caller())
    }

    #[inline(never)]
    fn log_at(
        &self,
        severity: Severity,
        message: LogValue,
        value: LogValue,
        json: bool,
        caller: &'static Location<'static>,
    ) -> Result<()> {
        if json {
            let mut logger = self.make_json(severity);
            logger
                .set_stack_trace_index(SHORTCUT_FRAMES)
                .add_located(message, value, caller);
            logger.logging()
        } else {
            let mut logger = self.make(severity);
            logger
                .set_stack_trace_index(SHORTCUT_FRAMES)
                .add_located(message, value, caller);
            logger.logging()
        }
    }
}
