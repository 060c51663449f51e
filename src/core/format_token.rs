//! Placeholders that can appear in a log format
//!
//! Declaration order is significant: both formatters walk [`FormatToken::ALL`]
//! front to back, so it decides substitution order for templates and key
//! order for structured output.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatToken {
    Level,
    Datetime,
    FileName,
    LineNumber,
    FunctionName,
    ClassName,
    MemoryUsage,
    MemoryPeakUsage,
    Message,
}

impl FormatToken {
    pub const ALL: [FormatToken; 9] = [
        FormatToken::Level,
        FormatToken::Datetime,
        FormatToken::FileName,
        FormatToken::LineNumber,
        FormatToken::FunctionName,
        FormatToken::ClassName,
        FormatToken::MemoryUsage,
        FormatToken::MemoryPeakUsage,
        FormatToken::Message,
    ];

    /// Key used by structured output and in structured format lists.
    pub fn key(&self) -> &'static str {
        match self {
            FormatToken::Level => "level",
            FormatToken::Datetime => "datetime",
            FormatToken::FileName => "file",
            FormatToken::LineNumber => "line",
            FormatToken::FunctionName => "function",
            FormatToken::ClassName => "class",
            FormatToken::MemoryUsage => "memory",
            FormatToken::MemoryPeakUsage => "memory_peak",
            FormatToken::Message => "message",
        }
    }

    /// Delimited form used inside plain-text templates, e.g. `%level%`.
    pub fn delimiter(&self) -> &'static str {
        match self {
            FormatToken::Level => "%level%",
            FormatToken::Datetime => "%datetime%",
            FormatToken::FileName => "%file%",
            FormatToken::LineNumber => "%line%",
            FormatToken::FunctionName => "%function%",
            FormatToken::ClassName => "%class%",
            FormatToken::MemoryUsage => "%memory%",
            FormatToken::MemoryPeakUsage => "%memory_peak%",
            FormatToken::Message => "%message%",
        }
    }

    /// Whether rendering this token needs the caller's stack frame.
    pub fn is_call_site(&self) -> bool {
        matches!(
            self,
            FormatToken::FileName
                | FormatToken::LineNumber
                | FormatToken::FunctionName
                | FormatToken::ClassName
        )
    }

    /// Whether rendering this token needs a process memory sample.
    pub fn is_memory(&self) -> bool {
        matches!(self, FormatToken::MemoryUsage | FormatToken::MemoryPeakUsage)
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.delimiter())
    }
}

/// Accepts either the key (`level`) or the delimited form (`%level%`).
impl FromStr for FormatToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name
            .strip_prefix('%')
            .and_then(|n| n.strip_suffix('%'))
            .unwrap_or(name);

        FormatToken::ALL
            .into_iter()
            .find(|token| token.key() == name)
            .ok_or_else(|| format!("Unknown format token: '{}'", s))
    }
}
