//! Lexical analysis: character classes, grammar rules, scanner and tokenizer
//!
//! [`Scanner`] turns a byte reader into raw rule matches. [`Tokenizer`]
//! applies the max-token-length policy on top and hands out [`Token`]s.
//!
//! [`Token`]: crate::tokens::Token

pub mod chars;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod scanner;
pub mod tokenizer;

use crate::config::compile_time::tokenizer::*;
use crate::config::runtime::TokenizerPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;
use std::io::Read;

pub use cursor::DecodeError;
pub use error::TokenizerError;
pub use scanner::{RawMatch, Scanner};
pub use tokenizer::{Tokenizer, TokenizerMetrics};

// ============================================================================
// MODULE API
// ============================================================================

/// Tokenize in-memory text with default preferences
pub fn tokenize_str(text: &str) -> Result<TokenStream, TokenizerError> {
    Tokenizer::from_text(text).collect_stream()
}

pub fn tokenize_str_with_preferences(
    text: &str,
    preferences: TokenizerPreferences,
) -> Result<TokenStream, TokenizerError> {
    Tokenizer::with_preferences(text.as_bytes(), preferences)?.collect_stream()
}

/// Tokenize everything a reader yields
pub fn tokenize_reader<R: Read>(reader: R) -> Result<TokenStream, TokenizerError> {
    Tokenizer::new(reader).collect_stream()
}

pub fn create_tokenizer<R: Read>(reader: R) -> Tokenizer<R> {
    Tokenizer::new(reader)
}

pub fn create_tokenizer_with_preferences<R: Read>(
    reader: R,
    preferences: TokenizerPreferences,
) -> Result<Tokenizer<R>, TokenizerError> {
    Tokenizer::with_preferences(reader, preferences)
}

// ============================================================================
// MODULE INITIALIZATION
// ============================================================================

/// Check that every lexical code is registered (for system startup)
pub fn init_lexical_logging() -> Result<(), String> {
    let lexical_codes = [
        codes::lexical::STREAM_READ_FAILURE,
        codes::lexical::INVALID_ENCODING,
        codes::lexical::TOKEN_SKIPPED,
        codes::lexical::INVALID_MAX_TOKEN_LENGTH,
        codes::success::TOKENIZATION_COMPLETE,
    ];

    for code in &lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "default_max_token_length" => DEFAULT_MAX_TOKEN_LENGTH,
        "max_lookahead_chars" => MAX_LOOKAHEAD_CHARS,
        "read_buffer_size" => READ_BUFFER_SIZE
    );

    Ok(())
}

/// Compile-time limits in effect, for reporting
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LexicalLimits {
    pub default_max_token_length: usize,
    pub max_lookahead_chars: usize,
    pub read_buffer_size: usize,
}

pub fn get_lexical_limits() -> LexicalLimits {
    LexicalLimits {
        default_max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        max_lookahead_chars: MAX_LOOKAHEAD_CHARS,
        read_buffer_size: READ_BUFFER_SIZE,
    }
}
