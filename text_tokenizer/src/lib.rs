// Internal modules
pub mod batch;
pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchError, BatchResults, DocumentSummary};
pub use lexical::{tokenize_str, RawMatch, Scanner, Tokenizer, TokenizerError, TokenizerMetrics};
pub use tokens::{token_type_label, Token, TokenStream, TokenType};
