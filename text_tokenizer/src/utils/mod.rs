//! Shared primitive types

pub mod span;

pub use span::Span;
