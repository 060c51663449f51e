//! Entry formatters
//!
//! Provides the two on-disk representations of an entry:
//! - [`TemplateFormatter`]: plain text from a `%token%` template
//! - [`StructuredFormatter`]: one JSON object per entry (JSON Lines)

use super::call_site::CallSite;
use super::config::LoggerConfig;
use super::format_token::FormatToken;
use super::memory::{MemoryDisplay, MemoryReading};
use super::severity::Severity;
use std::fmt;

/// Everything known about an entry at the moment `add` is called
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub severity: Severity,
    pub message: &'a str,
    pub value: Option<&'a str>,
    /// Already rendered through the datetime pattern
    pub datetime: &'a str,
    pub call_site: &'a CallSite,
    pub memory: MemoryReading,
    pub memory_display: MemoryDisplay,
}

/// Resolved value of a non-message token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Text(String),
    Number(u64),
}

impl TokenValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TokenValue::Text(s) => serde_json::Value::String(s.clone()),
            TokenValue::Number(n) => serde_json::Value::Number((*n).into()),
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Text(s) => f.write_str(s),
            TokenValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl RenderContext<'_> {
    /// Value of `token`; [`FormatToken::Message`] yields the bare message.
    pub fn token_value(&self, token: FormatToken) -> TokenValue {
        match token {
            FormatToken::Level => TokenValue::Text(self.severity.as_str().to_string()),
            FormatToken::Datetime => TokenValue::Text(self.datetime.to_string()),
            FormatToken::FileName => TokenValue::Text(self.call_site.file.clone()),
            FormatToken::LineNumber => TokenValue::Number(u64::from(self.call_site.line)),
            FormatToken::FunctionName => TokenValue::Text(self.call_site.function.clone()),
            FormatToken::ClassName => TokenValue::Text(self.call_site.class.clone()),
            FormatToken::MemoryUsage => {
                TokenValue::Text(self.memory_display.render(self.memory.current))
            }
            FormatToken::MemoryPeakUsage => {
                TokenValue::Text(self.memory_display.render(self.memory.peak))
            }
            FormatToken::Message => TokenValue::Text(self.message.to_string()),
        }
    }
}

/// Renders one entry from a format specification
pub trait EntryFormatter: Send + Sync {
    /// Format specification this formatter consumes
    type Spec: Clone + fmt::Debug + Send + Sync;

    /// Specification used when a logger was not given one.
    fn default_spec(config: &LoggerConfig) -> Self::Spec;

    /// Whether `spec` references `token`. Used to skip call-site capture and
    /// memory sampling when nothing would print them.
    fn uses(spec: &Self::Spec, token: FormatToken) -> bool;

    fn render(&self, spec: &Self::Spec, ctx: &RenderContext<'_>) -> String;

    fn name(&self) -> &str;
}

/// Plain-text formatter driven by a template such as
/// `[%datetime%] %level%: %message%`
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateFormatter;

impl EntryFormatter for TemplateFormatter {
    type Spec = String;

    fn default_spec(config: &LoggerConfig) -> String {
        config.log_format.clone()
    }

    fn uses(spec: &String, token: FormatToken) -> bool {
        spec.contains(token.delimiter())
    }

    fn render(&self, spec: &String, ctx: &RenderContext<'_>) -> String {
        let mut content = spec.trim_end().to_string();

        for token in FormatToken::ALL {
            if !content.contains(token.delimiter()) {
                continue;
            }

            let replacement = match (token, ctx.value) {
                (FormatToken::Message, Some(value)) => format!("{}: {}", ctx.message, value),
                (FormatToken::Message, None) => ctx.message.to_string(),
                _ => ctx.token_value(token).to_string(),
            };

            content = content.replace(token.delimiter(), &replacement);
        }

        content
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// JSON formatter driven by a list of token names
///
/// Keys always come out in [`FormatToken::ALL`] order regardless of the
/// order the tokens were listed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredFormatter;

impl StructuredFormatter {
    fn requested(spec: &[String], token: FormatToken) -> bool {
        spec.iter()
            .any(|name| name.parse::<FormatToken>() == Ok(token))
    }
}

impl EntryFormatter for StructuredFormatter {
    type Spec = Vec<String>;

    fn default_spec(config: &LoggerConfig) -> Vec<String> {
        config.json_tokens()
    }

    fn uses(spec: &Vec<String>, token: FormatToken) -> bool {
        Self::requested(spec, token)
    }

    fn render(&self, spec: &Vec<String>, ctx: &RenderContext<'_>) -> String {
        let mut json_obj = serde_json::Map::new();

        for token in FormatToken::ALL {
            if !Self::requested(spec, token) {
                continue;
            }

            if token == FormatToken::Message {
                // A value turns the message into the key.
                let (key, value) = match ctx.value {
                    Some(value) => (ctx.message.to_string(), value.to_string()),
                    None => (token.key().to_string(), ctx.message.to_string()),
                };
                json_obj.insert(key, serde_json::Value::String(value));
                continue;
            }

            json_obj.insert(token.key().to_string(), ctx.token_value(token).to_json());
        }

        serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
    }

    fn name(&self) -> &str {
        "structured"
    }
}
