//! Logging limits from the build profile, and the installed runtime preferences

use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH};
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install preferences before [`init_global_logging`](super::init_global_logging).
/// Only the first call takes effect.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Logging preferences already installed".to_string())
}

/// Installed preferences, or the environment defaults
pub fn runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Capacity of in-memory event buffers
pub fn get_event_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Longer messages are cut and suffixed with `...`
pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 || LOG_BUFFER_SIZE > 1_000_000 {
        return Err(format!("Log buffer size out of range: {}", LOG_BUFFER_SIZE));
    }
    if MAX_LOG_MESSAGE_LENGTH < 16 {
        return Err(format!(
            "Log message length too small: {}",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    Ok(())
}
