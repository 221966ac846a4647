//! Events the tokenizer reports through an installed logging service.
//! Kept in one test: the global service can only be installed once.

use std::sync::Arc;
use text_tokenizer::config::runtime::TokenizerPreferences;
use text_tokenizer::logging::{self, codes, LogLevel, LoggingService, MemoryLogger};
use text_tokenizer::{Tokenizer, TokenizerError};

#[test]
fn tokenizer_events_reach_the_installed_service() {
    let memory = Arc::new(MemoryLogger::with_capacity(1000));
    let service = LoggingService::new(LogLevel::Debug).with_sink(memory.clone());
    logging::init_global_logging_with_service(Arc::new(service)).unwrap();
    assert!(logging::debug_enabled());

    let prefs = TokenizerPreferences {
        max_token_length: 3,
        collect_metrics: true,
        log_skipped_tokens: true,
    };
    let mut tokenizer = Tokenizer::with_preferences("abc enormous ok".as_bytes(), prefs).unwrap();
    let tokens = logging::with_document_context("notes.txt", || tokenizer.collect_stream()).unwrap();
    assert_eq!(tokens.texts(), vec!["abc", "ok"]);

    let skipped = memory.with_code(codes::lexical::TOKEN_SKIPPED);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].level, LogLevel::Warning);
    assert_eq!(skipped[0].context["length"], "8");
    assert_eq!(skipped[0].context["document"], "notes.txt");

    let done = memory.with_code(codes::success::TOKENIZATION_COMPLETE);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].context["tokens"], "2");
    assert_eq!(done[0].context["skipped"], "1");

    memory.clear();
    let mut broken = Tokenizer::new(&b"ok \xff"[..]);
    assert!(matches!(
        broken.collect_stream(),
        Err(TokenizerError::InvalidEncoding { offset: 3 })
    ));
    assert!(memory.contains(LogLevel::Error, codes::lexical::INVALID_ENCODING));
    assert!(memory.with_code(codes::success::TOKENIZATION_COMPLETE).is_empty());
}
