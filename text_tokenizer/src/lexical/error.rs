use crate::config::compile_time::tokenizer::MAX_LOOKAHEAD_CHARS;
use crate::lexical::cursor::DecodeError;
use crate::logging::codes;
use std::io;

/// Failures surfaced by a scan session
#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("Failed to read input stream: {source}")]
    Io { source: io::Error },

    #[error("Invalid UTF-8 input at character offset {offset}")]
    InvalidEncoding { offset: usize },

    #[error("Invalid max token length: {value} (must be between 1 and {MAX_LOOKAHEAD_CHARS})")]
    InvalidMaxTokenLength { value: usize },
}

impl TokenizerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            TokenizerError::Io { .. } => codes::lexical::STREAM_READ_FAILURE,
            TokenizerError::InvalidEncoding { .. } => codes::lexical::INVALID_ENCODING,
            TokenizerError::InvalidMaxTokenLength { .. } => codes::lexical::INVALID_MAX_TOKEN_LENGTH,
        }
    }
}

impl From<io::Error> for TokenizerError {
    fn from(source: io::Error) -> Self {
        let decode = source
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<DecodeError>())
            .map(|e| e.offset);
        match decode {
            Some(offset) => TokenizerError::InvalidEncoding { offset },
            None => TokenizerError::Io { source },
        }
    }
}
