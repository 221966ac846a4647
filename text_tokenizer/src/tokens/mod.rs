//! Token model
//!
//! - [`TokenType`]: the closed set of token classes with stable ids and labels
//! - [`Token`]: one emitted token with character offsets and position increment
//! - [`TokenStream`]: a fully materialized session with per-type counts

pub mod token;
pub mod token_stream;

pub use token::{token_type_label, Token, TokenType, UnknownTokenType};
pub use token_stream::TokenStream;
