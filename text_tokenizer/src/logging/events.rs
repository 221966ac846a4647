//! Log events and their text/JSON renderings

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use crate::config::runtime::LogLevel;

// Placeholder codes for events without a registered one
const UNCODED_WARNING: Code = Code::new("W000");
const UNCODED_INFO: Code = Code::new("I000");
const UNCODED_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: truncate_message(message),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, UNCODED_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, UNCODED_INFO, message)
    }

    /// Info-level event carrying a success code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, UNCODED_DEBUG, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Later values replace earlier ones for the same key
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    /// `[LEVEL] CODE - message at chars S..E (k=v, ...)`
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// One JSON object. Error events also carry the registry's description,
    /// recommended action, and halt/recover flags.
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let code = self.code.as_str();
        let record = JsonEvent {
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: self.level.as_str(),
            code,
            category: self.category(),
            severity: self.severity(),
            message: &self.message,
            span: self.span,
            context: &self.context,
            error: self.is_error().then(|| ErrorDetails {
                recoverable: codes::is_recoverable(code),
                requires_halt: codes::requires_halt(code),
                description: codes::get_description(code),
                action: codes::get_action(code),
            }),
        };
        serde_json::to_string(&record)
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.level.as_str(), self.code, self.message)?;
        if let Some(span) = self.span {
            write!(f, " at chars {}", span)?;
        }
        if !self.context.is_empty() {
            f.write_str(" (")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: String,
    level: &'static str,
    code: &'static str,
    category: &'static str,
    severity: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<Span>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetails>,
}

#[derive(Serialize)]
struct ErrorDetails {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    action: &'static str,
}

fn truncate_message(message: &str) -> String {
    let limit = super::config::get_max_log_message_length();
    match message.char_indices().nth(limit) {
        Some((byte_index, _)) => format!("{}...", &message[..byte_index]),
        None => message.to_string(),
    }
}
