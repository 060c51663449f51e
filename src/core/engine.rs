//! Buffered logger engine
//!
//! A [`LogEngine`] renders every `add` into its buffer immediately and only
//! touches the file system when [`LogEngine::logging`] is called. Settings
//! that were not set explicitly fall back to the shared configuration at
//! the moment they are read.

use super::{
    appender::{Appender, FilePermissions, OutputTarget},
    buffer::EntryBuffer,
    call_site::{CallSite, CallSiteResolver, FACILITY_FRAMES},
    clock::{self, Clock},
    config::SharedConfig,
    error::Result,
    format_token::FormatToken,
    formatter::{EntryFormatter, RenderContext, StructuredFormatter, TemplateFormatter},
    memory::{MemoryProbe, MemoryReading},
    rotation::{RetentionWindow, RotationPolicy},
    severity::Severity,
    value::LogValue,
};
use crate::appenders::FileAppender;
use chrono::{DateTime, Local};
use std::fmt;
use std::panic::Location;
use std::path::PathBuf;

/// Line written by [`Logger::add_divider`]
pub const DIVIDER: &str = "===========================";

/// Plain-text logger
pub type Logger = LogEngine<TemplateFormatter>;

/// JSON Lines logger
pub type JsonLogger = LogEngine<StructuredFormatter>;

pub struct LogEngine<F: EntryFormatter> {
    severity: Severity,
    config: SharedConfig,
    formatter: F,
    log_format: Option<F::Spec>,
    base_directory: Option<PathBuf>,
    directory: Option<PathBuf>,
    file_name: Option<String>,
    file_name_format: Option<String>,
    file_extension: Option<String>,
    file_mode: Option<u32>,
    file_owner: Option<u32>,
    file_group: Option<u32>,
    rotate_log: Option<bool>,
    retention_days: Option<i64>,
    stack_trace_index: usize,
    buffer: EntryBuffer,
    appender: Box<dyn Appender>,
    clock: Clock,
    memory: MemoryProbe,
}

impl<F: EntryFormatter + Default> LogEngine<F> {
    #[must_use]
    pub fn new(severity: Severity, config: impl Into<SharedConfig>) -> Self {
        Self::with_formatter(severity, config, F::default())
    }
}

impl<F: EntryFormatter> LogEngine<F> {
    #[must_use]
    pub fn with_formatter(severity: Severity, config: impl Into<SharedConfig>, formatter: F) -> Self {
        Self {
            severity,
            config: config.into(),
            formatter,
            log_format: None,
            base_directory: None,
            directory: None,
            file_name: None,
            file_name_format: None,
            file_extension: None,
            file_mode: None,
            file_owner: None,
            file_group: None,
            rotate_log: None,
            retention_days: None,
            stack_trace_index: 0,
            buffer: EntryBuffer::new(),
            appender: Box::new(FileAppender::new()),
            clock: Clock::default(),
            memory: MemoryProbe::new(),
        }
    }

    /// Replace the file appender, e.g. with a test double.
    #[must_use = "builder methods return a new value"]
    pub fn with_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appender = appender;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }

    // ---- output location ----

    pub fn base_directory(&self) -> PathBuf {
        self.base_directory
            .clone()
            .unwrap_or_else(|| self.config.read().base_directory.clone())
    }

    /// Empty input is ignored.
    pub fn set_base_directory(&mut self, directory: impl Into<PathBuf>) -> &mut Self {
        let directory = directory.into();
        if !directory.as_os_str().is_empty() {
            self.base_directory = Some(directory);
        }
        self
    }

    /// Append a path segment to the explicit base directory, or set it when
    /// there is none yet.
    pub fn add_base_directory(&mut self, segment: impl Into<PathBuf>) -> &mut Self {
        let segment = segment.into();
        if segment.as_os_str().is_empty() {
            return self;
        }
        match &mut self.base_directory {
            Some(base) => base.push(segment),
            None => self.base_directory = Some(segment),
        }
        self
    }

    /// Sub-directory under the base; the severity name unless overridden.
    pub fn directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.severity.as_str()))
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) -> &mut Self {
        let directory = directory.into();
        if !directory.as_os_str().is_empty() {
            self.directory = Some(directory);
        }
        self
    }

    pub fn add_directory(&mut self, segment: impl Into<PathBuf>) -> &mut Self {
        let segment = segment.into();
        if segment.as_os_str().is_empty() {
            return self;
        }
        match &mut self.directory {
            Some(directory) => directory.push(segment),
            None => self.directory = Some(segment),
        }
        self
    }

    /// `<base>/<directory>`, the directory that is written and rotated.
    pub fn output_directory(&self) -> PathBuf {
        self.base_directory().join(self.directory())
    }

    /// Explicit file name, or today's date through the file name pattern.
    ///
    /// # Errors
    ///
    /// Returns [`super::LoggerError::InvalidConfiguration`] when the pattern
    /// is not a valid strftime pattern.
    pub fn file_name(&self) -> Result<String> {
        self.file_name_at(&self.clock.now())
    }

    fn file_name_at(&self, now: &DateTime<Local>) -> Result<String> {
        match &self.file_name {
            Some(name) => Ok(name.clone()),
            None => clock::strftime(now, &self.file_name_format()),
        }
    }

    pub fn set_file_name(&mut self, file_name: impl Into<String>) -> &mut Self {
        let file_name = file_name.into();
        if !file_name.is_empty() {
            self.file_name = Some(file_name);
        }
        self
    }

    pub fn file_name_format(&self) -> String {
        self.file_name_format
            .clone()
            .unwrap_or_else(|| self.config.read().file_name_format.clone())
    }

    pub fn set_file_name_format(&mut self, pattern: impl Into<String>) -> &mut Self {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.file_name_format = Some(pattern);
        }
        self
    }

    pub fn file_extension(&self) -> String {
        self.file_extension
            .clone()
            .unwrap_or_else(|| self.config.read().file_extension.clone())
    }

    /// An empty extension is kept and produces files without one.
    pub fn set_file_extension(&mut self, extension: impl Into<String>) -> &mut Self {
        let extension = extension.into();
        self.file_extension = Some(extension.trim_start_matches('.').to_string());
        self
    }

    /// Full path the next flush writes to.
    pub fn file_path(&self) -> Result<PathBuf> {
        Ok(self.output_target()?.path())
    }

    fn output_target(&self) -> Result<OutputTarget> {
        Ok(OutputTarget {
            directory: self.output_directory(),
            file_name: self.file_name()?,
            extension: self.file_extension(),
        })
    }

    // ---- permissions of created files ----

    pub fn file_mode(&self) -> u32 {
        self.file_mode
            .unwrap_or_else(|| self.config.read().file_mode)
    }

    pub fn set_file_mode(&mut self, mode: u32) -> &mut Self {
        self.file_mode = Some(mode);
        self
    }

    /// Numeric user id applied to new files, if any. Account names are not resolved.
    pub fn file_owner(&self) -> Option<u32> {
        self.file_owner.or_else(|| self.config.read().file_owner)
    }

    pub fn set_file_owner(&mut self, uid: u32) -> &mut Self {
        self.file_owner = Some(uid);
        self
    }

    /// Numeric group id applied to new files, if any
    pub fn file_group(&self) -> Option<u32> {
        self.file_group.or_else(|| self.config.read().file_group)
    }

    pub fn set_file_group(&mut self, gid: u32) -> &mut Self {
        self.file_group = Some(gid);
        self
    }

    pub fn file_permissions(&self) -> FilePermissions {
        FilePermissions {
            mode: self.file_mode(),
            owner: self.file_owner(),
            group: self.file_group(),
        }
    }

    // ---- rotation ----

    pub fn is_rotate_log(&self) -> bool {
        self.rotate_log
            .unwrap_or_else(|| self.config.read().is_rotate_log)
    }

    pub fn set_rotate_log(&mut self, rotate: bool) -> &mut Self {
        self.rotate_log = Some(rotate);
        self
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
            .unwrap_or_else(|| self.config.read().retention_days)
    }

    pub fn set_retention_days(&mut self, days: i64) -> &mut Self {
        self.retention_days = Some(days);
        self
    }

    pub fn retention_window(&self) -> RetentionWindow {
        if self.is_rotate_log() {
            RetentionWindow::days(self.retention_days())
        } else {
            RetentionWindow::disabled()
        }
    }

    // ---- attribution ----

    pub fn stack_trace_index(&self) -> usize {
        self.stack_trace_index
    }

    /// Attribute entries to a caller further up the stack, for code that
    /// wraps this logger in its own helpers.
    pub fn set_stack_trace_index(&mut self, index: usize) -> &mut Self {
        self.stack_trace_index = index;
        self
    }

    // ---- format ----

    pub fn log_format(&self) -> F::Spec {
        match &self.log_format {
            Some(spec) => spec.clone(),
            None => F::default_spec(&self.config.read()),
        }
    }

    pub fn set_log_format(&mut self, format: impl Into<F::Spec>) -> &mut Self {
        self.log_format = Some(format.into());
        self
    }

    // ---- entries ----

    /// Buffer `message`.
    #[track_caller]
    #[inline(never)]
    pub fn add(&mut self, message: impl Into<LogValue>) -> &mut Self {
        self.add_entry(message.into(), LogValue::Null, Location::caller())
    }

    /// Buffer `message` with an attached value, rendered as `message: value`
    /// in text and as `{"message": "value"}` in JSON.
    #[track_caller]
    #[inline(never)]
    pub fn add_value(
        &mut self,
        message: impl Into<LogValue>,
        value: impl Into<LogValue>,
    ) -> &mut Self {
        self.add_entry(message.into(), value.into(), Location::caller())
    }

    /// Entry point for wrappers that already captured their caller's
    /// location. Counts as one facility frame.
    #[inline(never)]
    pub(crate) fn add_located(
        &mut self,
        message: LogValue,
        value: LogValue,
        caller: &'static Location<'static>,
    ) -> &mut Self {
        self.add_entry(message, value, caller)
    }

    /// Render one entry. Must be called directly from a public entry point
    /// so [`FACILITY_FRAMES`] stays accurate.
    #[inline(never)]
    fn add_entry(
        &mut self,
        message: LogValue,
        value: LogValue,
        caller: &'static Location<'static>,
    ) -> &mut Self {
        let spec = self.log_format();
        let uses = |predicate: fn(&FormatToken) -> bool| {
            FormatToken::ALL
                .iter()
                .any(|token| predicate(token) && F::uses(&spec, *token))
        };

        let call_site = if uses(FormatToken::is_call_site) {
            CallSiteResolver::resolve(FACILITY_FRAMES, self.stack_trace_index, caller)
        } else {
            CallSite::default()
        };

        let (datetime_format, real_usage, memory_display) = {
            let config = self.config.read();
            (
                config.datetime_format.clone(),
                config.is_memory_real_usage,
                config.memory_display(),
            )
        };

        let memory = if uses(FormatToken::is_memory) {
            self.memory.sample(real_usage)
        } else {
            MemoryReading::default()
        };

        let datetime = clock::strftime(&self.clock.now(), &datetime_format)
            .unwrap_or_else(|_| datetime_format.clone());

        let message = message.into_message();
        let value = value.into_value();

        let ctx = RenderContext {
            severity: self.severity,
            message: &message,
            value: value.as_deref(),
            datetime: &datetime,
            call_site: &call_site,
            memory,
            memory_display,
        };

        let entry = self.formatter.render(&spec, &ctx);
        self.buffer.push(entry);
        self
    }

    /// Entries rendered since the last successful flush
    pub fn contents(&self) -> &[String] {
        self.buffer.entries()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop buffered entries without writing them.
    pub fn flush(&mut self) -> &mut Self {
        self.buffer.clear();
        self
    }

    // ---- output ----

    /// Rotate, then append the buffer to the log file and clear it.
    ///
    /// # Errors
    ///
    /// Fails when the file name pattern is invalid or the file cannot be
    /// written. The buffer is kept on failure so a later call can retry.
    pub fn logging(&mut self) -> Result<()> {
        self.logging_with(true)
    }

    /// Like [`logging`](Self::logging), keeping the buffer when
    /// `auto_flush` is false.
    pub fn logging_with(&mut self, auto_flush: bool) -> Result<()> {
        let location = self.flush_location();
        self.write_to(location, auto_flush)
    }

    /// Directory and extension shared by the rotation pass and the write.
    fn flush_location(&self) -> FlushLocation {
        FlushLocation {
            directory: self.output_directory(),
            extension: self.file_extension(),
            now: self.clock.now(),
        }
    }

    fn write_to(&mut self, location: FlushLocation, auto_flush: bool) -> Result<()> {
        let FlushLocation {
            directory,
            extension,
            now,
        } = location;

        let report = RotationPolicy::apply(&directory, &extension, self.retention_window(), now);
        if !report.is_empty() {
            log::debug!(
                "rotation removed {} file(s), {} failure(s)",
                report.deleted.len(),
                report.failed.len()
            );
        }

        if self.buffer.is_empty() {
            return Ok(());
        }

        let target = OutputTarget {
            directory,
            file_name: self.file_name_at(&now)?,
            extension,
        };
        let permissions = self.file_permissions();
        let payload = self.buffer.payload();

        if let Err(e) = self.appender.append(&target, &permissions, payload.as_bytes()) {
            log::warn!(
                "{} appender failed, keeping {} buffered entries: {}",
                self.appender.name(),
                self.buffer.len(),
                e
            );
            return Err(e);
        }

        if auto_flush {
            self.buffer.clear();
        }
        Ok(())
    }
}

/// Output location captured once per flush
#[derive(Debug, Clone)]
struct FlushLocation {
    directory: PathBuf,
    extension: String,
    now: DateTime<Local>,
}

impl LogEngine<TemplateFormatter> {
    /// Append a token or literal text to the template, followed by a space.
    ///
    /// Starts from an empty template, not the configured one.
    pub fn add_log_format(&mut self, part: impl fmt::Display) -> &mut Self {
        self.add_log_format_with(part, "", " ")
    }

    pub fn add_log_format_with(
        &mut self,
        part: impl fmt::Display,
        before: &str,
        after: &str,
    ) -> &mut Self {
        let template = self.log_format.get_or_insert_with(String::new);
        template.push_str(before);
        template.push_str(&part.to_string());
        template.push_str(after);
        self
    }

    /// Buffer an entry with an empty message.
    #[track_caller]
    #[inline(never)]
    pub fn add_empty(&mut self) -> &mut Self {
        self.add_entry(LogValue::Text(String::new()), LogValue::Null, Location::caller())
    }

    /// Buffer a divider line between two empty entries.
    #[track_caller]
    #[inline(never)]
    pub fn add_divider(&mut self) -> &mut Self {
        let caller = Location::caller();
        self.add_entry(LogValue::Text(String::new()), LogValue::Null, caller);
        self.add_entry(DIVIDER.into(), LogValue::Null, caller);
        self.add_entry(LogValue::Text(String::new()), LogValue::Null, caller)
    }
}

impl LogEngine<StructuredFormatter> {
    /// Request another key in structured output.
    ///
    /// Starts from an empty list, not the configured one.
    pub fn add_log_format(&mut self, token: impl fmt::Display) -> &mut Self {
        self.log_format
            .get_or_insert_with(Vec::new)
            .push(token.to_string());
        self
    }
}

impl<F: EntryFormatter> fmt::Debug for LogEngine<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEngine")
            .field("formatter", &self.formatter.name())
            .field("severity", &self.severity)
            .field("appender", &self.appender.name())
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoggerConfig, LoggerError};
    use chrono::{Local, TimeZone};
    use parking_lot::Mutex;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Records payloads instead of touching the file system
    #[derive(Default, Clone)]
    struct RecordingAppender {
        writes: Arc<Mutex<Vec<(PathBuf, String)>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl Appender for RecordingAppender {
        fn append(
            &mut self,
            target: &OutputTarget,
            _permissions: &FilePermissions,
            payload: &[u8],
        ) -> Result<()> {
            if *self.fail.lock() {
                return Err(LoggerError::file_appender(
                    target.path().display().to_string(),
                    "disk full",
                ));
            }
            self.writes
                .lock()
                .push((target.path(), String::from_utf8_lossy(payload).into_owned()));
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn config_in(base: &std::path::Path) -> LoggerConfig {
        LoggerConfig {
            base_directory: base.to_path_buf(),
            ..LoggerConfig::default()
        }
    }

    fn fixed_clock() -> Clock {
        Clock::Manual(Local.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap())
    }

    #[test]
    fn test_every_severity_writes_to_its_own_directory() -> Result<()> {
        let dir = tempdir()?;
        let config = SharedConfig::new(config_in(dir.path()));

        for severity in Severity::ALL {
            let mut logger = Logger::new(severity, config.clone()).with_clock(fixed_clock());
            logger.add("hello").logging()?;

            let path = dir
                .path()
                .join(severity.as_str())
                .join("2024-05-01.log");
            let content = fs::read_to_string(&path)?;
            assert_eq!(
                content,
                format!("[2024-05-01 10:30:00] {}: hello\n", severity.as_str())
            );
        }
        Ok(())
    }

    #[test]
    fn test_entries_render_at_add_time() -> Result<()> {
        let dir = tempdir()?;
        let mut logger = Logger::new(Severity::Info, config_in(dir.path())).with_clock(fixed_clock());

        logger.add("first");
        logger
            .clock_mut()
            .set_now(Local.with_ymd_and_hms(2024, 5, 1, 10, 31, 0).unwrap());
        logger.add("second");

        assert_eq!(
            logger.contents(),
            [
                "[2024-05-01 10:30:00] info: first",
                "[2024-05-01 10:31:00] info: second"
            ]
        );
        Ok(())
    }

    #[test]
    fn test_failed_write_keeps_buffer_for_retry() -> Result<()> {
        let dir = tempdir()?;
        let appender = RecordingAppender::default();
        let mut logger = Logger::new(Severity::Error, config_in(dir.path()))
            .with_clock(fixed_clock())
            .with_appender(Box::new(appender.clone()));

        logger.add("a").add("b");
        *appender.fail.lock() = true;
        assert!(logger.logging().is_err());
        assert_eq!(logger.len(), 2);

        *appender.fail.lock() = false;
        logger.logging()?;
        assert!(logger.is_empty());

        let writes = appender.writes.lock();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].1.ends_with("error: a\n[2024-05-01 10:30:00] error: b\n"));
        Ok(())
    }

    #[test]
    fn test_empty_buffer_skips_write() -> Result<()> {
        let dir = tempdir()?;
        let appender = RecordingAppender::default();
        let mut logger = Logger::new(Severity::Info, config_in(dir.path()))
            .with_appender(Box::new(appender.clone()));

        logger.logging()?;
        assert!(appender.writes.lock().is_empty());
        Ok(())
    }

    #[test]
    fn test_logging_without_auto_flush_keeps_entries() -> Result<()> {
        let dir = tempdir()?;
        let appender = RecordingAppender::default();
        let mut logger = Logger::new(Severity::Info, config_in(dir.path()))
            .with_clock(fixed_clock())
            .with_appender(Box::new(appender.clone()));

        logger.add("kept");
        logger.logging_with(false)?;
        assert_eq!(logger.len(), 1);

        logger.logging()?;
        assert!(logger.is_empty());
        assert_eq!(appender.writes.lock().len(), 2);
        Ok(())
    }

    #[test]
    fn test_flush_discards() {
        let mut logger = Logger::new(Severity::Info, LoggerConfig::default());
        logger.add("x").add("y").flush();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_explicit_settings_override_config() -> Result<()> {
        let dir = tempdir()?;
        let mut logger = Logger::new(Severity::Notice, config_in(dir.path())).with_clock(fixed_clock());

        assert_eq!(logger.file_path()?, dir.path().join("notice").join("2024-05-01.log"));

        logger
            .set_base_directory(dir.path().join("app"))
            .add_base_directory("v2")
            .set_directory("")
            .add_directory("audit")
            .set_file_name("")
            .set_file_name_format("%Y%m%d")
            .set_file_extension("txt");

        assert_eq!(
            logger.file_path()?,
            dir.path().join("app").join("v2").join("audit").join("20240501.txt")
        );

        logger.set_file_name("events").set_file_extension("");
        assert_eq!(
            logger.file_path()?,
            dir.path().join("app").join("v2").join("audit").join("events")
        );
        Ok(())
    }

    #[test]
    fn test_config_updates_are_observed() -> Result<()> {
        let dir = tempdir()?;
        let config = SharedConfig::new(config_in(dir.path()));
        let mut logger = Logger::new(Severity::Info, config.clone()).with_clock(fixed_clock());

        config.update(|c| {
            c.log_format = "%level%|%message%".to_string();
            c.file_extension = "txt".to_string();
            c.retention_days = 30;
        });

        logger.add("updated");
        assert_eq!(logger.contents(), ["info|updated"]);
        assert_eq!(logger.file_extension(), "txt");
        assert_eq!(logger.retention_days(), 30);
        Ok(())
    }

    #[test]
    fn test_invalid_file_name_pattern_fails_logging() -> Result<()> {
        let dir = tempdir()?;
        let mut logger = Logger::new(Severity::Info, config_in(dir.path()));
        logger.set_file_name_format("%Q-broken").add("x");

        assert!(matches!(
            logger.logging(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert_eq!(logger.len(), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_datetime_pattern_renders_literally() {
        let mut config = LoggerConfig::default();
        config.datetime_format = "%Q".to_string();
        config.log_format = "%datetime% %message%".to_string();

        let mut logger = Logger::new(Severity::Info, config);
        logger.add("x");
        assert_eq!(logger.contents(), ["%Q x"]);
    }

    #[test]
    fn test_add_log_format_builds_template() {
        let mut logger = Logger::new(Severity::Debug, LoggerConfig::default());
        logger
            .add_log_format(FormatToken::Level)
            .add_log_format_with(FormatToken::Message, "-> ", "")
            .add_value("user", 42);

        assert_eq!(logger.log_format(), "%level% -> %message%");
        assert_eq!(logger.contents(), ["debug -> user: 42"]);
    }

    #[test]
    fn test_divider_and_empty_entries() {
        let mut logger = Logger::new(Severity::Info, LoggerConfig::default());
        logger.set_log_format("%message%").add_empty().add_divider();

        assert_eq!(logger.contents(), ["", "", DIVIDER, ""]);
    }

    #[test]
    fn test_call_site_tokens() {
        let mut logger = Logger::new(Severity::Info, LoggerConfig::default());
        logger.set_log_format("%file%:%line%");
        logger.add("where");

        let entry = &logger.contents()[0];
        assert!(entry.contains("engine.rs:"), "{}", entry);
        assert!(!entry.ends_with(":0"), "{}", entry);
    }

    #[test]
    fn test_json_logger() -> Result<()> {
        let dir = tempdir()?;
        let mut logger =
            JsonLogger::new(Severity::Critical, config_in(dir.path())).with_clock(fixed_clock());

        logger.add("started").add_value("user_id", 7).logging()?;

        let content = fs::read_to_string(dir.path().join("critical").join("2024-05-01.log"))?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            [
                r#"{"level":"critical","datetime":"2024-05-01 10:30:00","message":"started"}"#,
                r#"{"level":"critical","datetime":"2024-05-01 10:30:00","user_id":"7"}"#,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_json_add_log_format() {
        let mut logger = JsonLogger::new(Severity::Info, LoggerConfig::default());
        logger
            .add_log_format("message")
            .add_log_format(FormatToken::Level)
            .add("hi");

        assert_eq!(logger.contents(), [r#"{"level":"info","message":"hi"}"#]);
    }

    #[test]
    fn test_logging_rotates_even_when_empty() -> Result<()> {
        let dir = tempdir()?;
        let output = dir.path().join("info");
        fs::create_dir_all(&output)?;
        let stale = output.join("2024-04-01.log");
        fs::write(&stale, "old\n")?;
        let mtime = Local.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        filetime::set_file_mtime(
            &stale,
            filetime::FileTime::from_unix_time(mtime.timestamp(), 0),
        )?;

        let mut logger = Logger::new(Severity::Info, config_in(dir.path())).with_clock(fixed_clock());
        logger.logging()?;
        assert!(!stale.exists());

        fs::write(&stale, "old\n")?;
        filetime::set_file_mtime(
            &stale,
            filetime::FileTime::from_unix_time(mtime.timestamp(), 0),
        )?;
        logger.set_rotate_log(false).logging()?;
        assert!(stale.exists());
        Ok(())
    }

    fn set_mtime(path: &std::path::Path, time: chrono::DateTime<Local>) -> Result<()> {
        filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(time.timestamp(), 0))?;
        Ok(())
    }

    #[test]
    fn test_rotation_and_write_share_one_location() -> Result<()> {
        let dir = tempdir()?;
        let config = SharedConfig::new(config_in(&dir.path().join("before")));
        let mut logger = Logger::new(Severity::Info, config.clone()).with_clock(fixed_clock());
        logger.set_log_format("%message%").add("entry");

        let output = dir.path().join("before").join("info");
        fs::create_dir_all(&output)?;
        let stale = output.join("2024-04-01.log");
        fs::write(&stale, "old\n")?;
        set_mtime(&stale, Local.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap())?;

        let location = logger.flush_location();
        config.update(|c| {
            c.base_directory = dir.path().join("after");
            c.file_extension = "txt".to_string();
        });
        logger.write_to(location, true)?;

        assert!(!stale.exists());
        assert_eq!(fs::read_to_string(output.join("2024-05-01.log"))?, "entry\n");
        assert!(!dir.path().join("after").exists());

        // The next flush follows the updated configuration.
        assert_eq!(
            logger.file_path()?,
            dir.path().join("after").join("info").join("2024-05-01.txt")
        );
        Ok(())
    }

    #[test]
    fn test_file_permissions_fall_back_to_config() {
        let config = LoggerConfig {
            file_mode: 0o640,
            file_owner: Some(1000),
            ..LoggerConfig::default()
        };
        let mut logger = Logger::new(Severity::Info, config);
        assert_eq!(
            logger.file_permissions(),
            FilePermissions {
                mode: 0o640,
                owner: Some(1000),
                group: None,
            }
        );

        logger.set_file_mode(0o600).set_file_owner(1001).set_file_group(50);
        assert_eq!(logger.file_mode(), 0o600);
        assert_eq!(logger.file_owner(), Some(1001));
        assert_eq!(logger.file_group(), Some(50));
    }

    #[test]
    fn test_file_mode_override_reaches_appender() -> Result<()> {
        let dir = tempdir()?;
        let appender = RecordingPermissions::default();
        let config = LoggerConfig {
            file_mode: 0o644,
            ..config_in(dir.path())
        };
        let mut logger = Logger::new(Severity::Info, config)
            .with_appender(Box::new(appender.clone()));

        logger.set_file_mode(0o600).add("x").logging()?;
        assert_eq!(appender.seen.lock().as_slice(), [0o600]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_file_mode_override_on_disk() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let config = LoggerConfig {
            file_mode: 0o644,
            ..config_in(dir.path())
        };
        let mut logger = Logger::new(Severity::Info, config).with_clock(fixed_clock());
        logger.set_file_mode(0o600).add("secret").logging()?;

        let mode = fs::metadata(dir.path().join("info").join("2024-05-01.log"))?
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    /// Records the mode each append was asked to apply
    #[derive(Default, Clone)]
    struct RecordingPermissions {
        seen: Arc<Mutex<Vec<u32>>>,
    }

    impl Appender for RecordingPermissions {
        fn append(
            &mut self,
            _target: &OutputTarget,
            permissions: &FilePermissions,
            _payload: &[u8],
        ) -> Result<()> {
            self.seen.lock().push(permissions.mode);
            Ok(())
        }

        fn name(&self) -> &str {
            "recording-permissions"
        }
    }

    #[inline(never)]
    fn record_audit(logger: &mut Logger, message: &str) {
        logger.add(message);
    }

    #[cfg(feature = "stack-trace")]
    #[test]
    fn test_stack_trace_index_skips_wrappers() {
        let mut logger = Logger::new(Severity::Info, LoggerConfig::default());
        logger
            .set_log_format("%function%|%line%|%message%")
            .set_stack_trace_index(1);

        let line = line!() + 1;
        record_audit(&mut logger, "wrapped");

        assert_eq!(
            logger.contents(),
            [format!("test_stack_trace_index_skips_wrappers|{}|wrapped", line)]
        );
    }

    #[cfg(feature = "stack-trace")]
    #[test]
    fn test_call_site_is_the_direct_caller() {
        let mut logger = Logger::new(Severity::Info, LoggerConfig::default());
        logger.set_log_format("%function%|%line%");

        let line = line!() + 1;
        logger.add("direct");

        assert_eq!(
            logger.contents(),
            [format!("test_call_site_is_the_direct_caller|{}", line)]
        );
    }
}
