//! Global logging for the tokenizer
//!
//! Events are dropped silently until [`init_global_logging`] installs a
//! service, so library users pay nothing unless they opt in.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{EventFormat, Logger, LoggingService, MemoryLogger, WriterLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static DOCUMENT_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(LoggingService::from_preferences(&config::runtime_preferences()));

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether a debug event would reach any logger
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// DOCUMENT CONTEXT
// ============================================================================

/// Run `f` with `document` attached to every event logged on this thread
pub fn with_document_context<F, R>(document: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = DOCUMENT_CONTEXT.with(|ctx| ctx.borrow_mut().replace(document.to_string()));
    let result = f();
    DOCUMENT_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

pub fn current_document() -> Option<String> {
    DOCUMENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

type Context<'a> = Vec<(&'a str, String)>;

fn dispatch(mut event: LogEvent, context: Context<'_>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    for (key, value) in &context {
        event = event.with_context(key, value);
    }
    if let Some(document) = current_document() {
        event = event.with_context("document", &document);
    }

    logger.log_event(event);
}

/// Used by `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Context<'_>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(span) = span {
        event = event.with_span(span);
    }
    dispatch(event, context);
}

/// Used by `log_warning!`
pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Context<'_>) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    dispatch(event, context);
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Context<'_>) {
    dispatch(LogEvent::success(code, message), context);
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: Context<'_>) {
    dispatch(LogEvent::info(message), context);
}

/// Used by `log_debug!`
pub fn log_debug_with_context(message: &str, context: Context<'_>) {
    dispatch(LogEvent::debug(message), context);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_context_is_scoped() {
        assert!(current_document().is_none());

        let seen = with_document_context("a.txt", || {
            let inner = with_document_context("b.txt", current_document);
            assert_eq!(inner.as_deref(), Some("b.txt"));
            current_document()
        });

        assert_eq!(seen.as_deref(), Some("a.txt"));
        assert!(current_document().is_none());
    }
}
