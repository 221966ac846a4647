// RUNTIME PREFERENCES (User Experience)

use crate::config::compile_time::{batch::MAX_WORKER_THREADS, tokenizer::*};
use crate::lexical::TokenizerError;
use crate::logging::codes::{self, Code};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerPreferences {
    /// Tokens strictly longer than this (in characters) are dropped
    pub max_token_length: usize,

    /// Whether to keep per-type counters for each scan session
    pub collect_metrics: bool,

    /// Whether to emit a debug event for every dropped overlong token
    pub log_skipped_tokens: bool,
}

impl Default for TokenizerPreferences {
    fn default() -> Self {
        Self {
            max_token_length: env::var(env_vars::TOKENIZER_MAX_TOKEN_LENGTH)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKEN_LENGTH),
            collect_metrics: env::var(env_vars::TOKENIZER_COLLECT_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_skipped_tokens: env::var(env_vars::TOKENIZER_LOG_SKIPPED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl TokenizerPreferences {
    /// Reject settings the adapter cannot honor.
    pub fn validate(&self) -> Result<(), TokenizerError> {
        if self.max_token_length == 0 || self.max_token_length > MAX_LOOKAHEAD_CHARS {
            return Err(TokenizerError::InvalidMaxTokenLength {
                value: self.max_token_length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Upper bound on worker threads (clamped to the compile-time maximum)
    pub max_threads: usize,

    /// Whether directory discovery descends into subdirectories
    pub recursive: bool,

    /// Accepted document extensions, compared case-insensitively.
    /// An empty list accepts every regular file.
    pub extensions: Vec<String>,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            max_threads: env::var(env_vars::BATCH_MAX_THREADS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    std::thread::available_parallelism()
                        .map(|n| n.get().min(8))
                        .unwrap_or(4)
                })
                .clamp(1, MAX_WORKER_THREADS),
            recursive: env::var(env_vars::BATCH_RECURSIVE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            extensions: env::var(env_vars::BATCH_EXTENSIONS)
                .ok()
                .map(|v| parse_extension_list(&v))
                .unwrap_or_else(|| vec!["txt".to_string(), "text".to_string(), "md".to_string()]),
        }
    }
}

fn parse_extension_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Every runtime preference group. Missing tables and keys fall back to the
/// environment-derived defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tokenizer: TokenizerPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read preferences file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid preferences in '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> Code {
        codes::system::INVALID_CONFIGURATION
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read a preferences file, e.g.
    ///
    /// ```toml
    /// [tokenizer]
    /// max_token_length = 40
    ///
    /// [batch]
    /// extensions = ["txt", "html"]
    ///
    /// [logging]
    /// min_log_level = "debug"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Tokenizer
    pub const TOKENIZER_MAX_TOKEN_LENGTH: &str = "TOKENIZER_MAX_TOKEN_LENGTH";
    pub const TOKENIZER_COLLECT_METRICS: &str = "TOKENIZER_COLLECT_METRICS";
    pub const TOKENIZER_LOG_SKIPPED: &str = "TOKENIZER_LOG_SKIPPED";

    // Batch
    pub const BATCH_MAX_THREADS: &str = "TOKENIZER_BATCH_MAX_THREADS";
    pub const BATCH_RECURSIVE: &str = "TOKENIZER_BATCH_RECURSIVE";
    pub const BATCH_EXTENSIONS: &str = "TOKENIZER_BATCH_EXTENSIONS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "TOKENIZER_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "TOKENIZER_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "TOKENIZER_LOGGING_MIN_LEVEL";
}
