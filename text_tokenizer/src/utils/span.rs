//! Flat character-offset spans
//!
//! Offsets count Unicode scalar values from the start of a scan session.
//! No line or column bookkeeping is kept.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open range `[start, end)` of character offsets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Span of `len` characters starting at `start`
    pub fn with_len(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// True when `self` ends at or before `other` starts
    pub fn precedes(&self, other: &Span) -> bool {
        self.end <= other.start
    }

    /// Smallest span covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The text this span covers in `input`, or `None` if out of range.
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        let mut indices = input
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(input.len()));
        let start = indices.nth(self.start)?;
        let end = if self.is_empty() {
            start
        } else {
            indices.nth(self.len() - 1)?
        };
        Some(&input[start..end])
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
