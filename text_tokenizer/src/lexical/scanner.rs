//! Rule-driven scanner producing raw matches
//!
//! Characters that cannot start a token are skipped. CJ characters become
//! one-character matches. Everything else is handed to the grammar, which
//! picks the longest rule match over the run of candidate characters.
//! A match that fills the whole lookahead window is carried on through the
//! rest of its token without buffering it, and comes back as one match
//! longer than the window.

use crate::config::compile_time::tokenizer::MAX_LOOKAHEAD_CHARS;
use crate::lexical::chars;
use crate::lexical::cursor::ScanCursor;
use crate::lexical::grammar;
use crate::tokens::TokenType;
use crate::utils::Span;
use std::io::{self, Read};

/// One rule match before the length policy is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMatch {
    pub start_offset: usize,
    /// Length in characters
    pub length: usize,
    pub token_type: TokenType,
}

impl RawMatch {
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.length
    }

    pub fn span(&self) -> Span {
        Span::with_len(self.start_offset, self.length)
    }
}

#[derive(Debug)]
pub struct Scanner<R> {
    cursor: ScanCursor<R>,
    max_lookahead: usize,
    /// Buffered characters of the last match; zero after an overrun
    last_length: usize,
}

impl<R: Read> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_lookahead(reader, MAX_LOOKAHEAD_CHARS)
    }

    /// Scanner whose lookahead window is capped at `max_lookahead` characters.
    pub fn with_lookahead(reader: R, max_lookahead: usize) -> Self {
        Self {
            cursor: ScanCursor::new(reader),
            max_lookahead: max_lookahead.max(1),
            last_length: 0,
        }
    }

    /// Rebind to a new reader; offsets restart at 0.
    pub fn reset(&mut self, reader: R) {
        self.cursor.reset(reader);
        self.last_length = 0;
    }

    pub fn max_lookahead(&self) -> usize {
        self.max_lookahead
    }

    /// Offset of the next unread character
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Next match, or `None` at end of input.
    ///
    /// Read and decode failures are returned unchanged.
    pub fn next_match(&mut self) -> io::Result<Option<RawMatch>> {
        self.last_length = 0;
        loop {
            let Some(c) = self.cursor.peek()? else {
                return Ok(None);
            };

            let start_offset = self.cursor.offset();
            let (length, token_type, window_full) = if chars::is_cj(c) {
                (1, TokenType::Cj, false)
            } else if chars::is_alnum(c) {
                let window = self.cursor.fill_while(self.max_lookahead, chars::is_run_char)?;
                let (length, token_type) = grammar::longest_match(window);
                (length, token_type, length == self.max_lookahead)
            } else {
                (0, TokenType::Alphanum, false)
            };

            if length == 0 {
                self.cursor.advance(1);
                continue;
            }

            self.cursor.advance(length);
            let overrun = if window_full {
                self.cursor.skip_while(overrun_predicate(token_type))?
            } else {
                0
            };
            self.last_length = if overrun == 0 { length } else { 0 };
            return Ok(Some(RawMatch {
                start_offset,
                length: length + overrun,
                token_type,
            }));
        }
    }

    /// Characters of the match most recently returned by [`Self::next_match`].
    /// Empty for a match that ran past the lookahead window.
    pub fn matched_chars(&self) -> &[char] {
        self.cursor.consumed_tail(self.last_length)
    }

    pub fn matched_text(&self) -> String {
        self.matched_chars().iter().collect()
    }
}

/// Characters that keep a token going past a full window
fn overrun_predicate(token_type: TokenType) -> fn(char) -> bool {
    match token_type {
        TokenType::Uri => chars::is_run_char,
        _ => chars::is_alnum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<(String, usize, usize, TokenType)> {
        scan_with(Scanner::new(text.as_bytes()))
    }

    fn scan_with<R: Read>(mut scanner: Scanner<R>) -> Vec<(String, usize, usize, TokenType)> {
        let mut out = Vec::new();
        while let Some(m) = scanner.next_match().unwrap() {
            out.push((scanner.matched_text(), m.start_offset, m.end_offset(), m.token_type));
        }
        out
    }

    #[test]
    fn test_skips_separators() {
        let matches = scan("  hello,   world! ");
        assert_eq!(
            matches,
            vec![
                ("hello".to_string(), 2, 7, TokenType::Alphanum),
                ("world".to_string(), 11, 16, TokenType::Alphanum),
            ]
        );
    }

    #[test]
    fn test_cj_characters_are_single_matches() {
        let matches = scan("東京abc");
        assert_eq!(
            matches,
            vec![
                ("東".to_string(), 0, 1, TokenType::Cj),
                ("京".to_string(), 1, 2, TokenType::Cj),
                ("abc".to_string(), 2, 5, TokenType::Alphanum),
            ]
        );
    }

    #[test]
    fn test_offsets_count_characters() {
        let matches = scan("über café");
        assert_eq!(matches[1], ("café".to_string(), 5, 9, TokenType::Alphanum));
    }

    #[test]
    fn test_run_past_lookahead_is_one_match() {
        let scanner = Scanner::with_lookahead("abcdefghij xy".as_bytes(), 4);
        assert_eq!(
            scan_with(scanner),
            vec![
                (String::new(), 0, 10, TokenType::Alphanum),
                ("xy".to_string(), 11, 13, TokenType::Alphanum),
            ]
        );
    }

    #[test]
    fn test_run_filling_lookahead_exactly_keeps_text() {
        let scanner = Scanner::with_lookahead("abcd, ef".as_bytes(), 4);
        assert_eq!(
            scan_with(scanner),
            vec![
                ("abcd".to_string(), 0, 4, TokenType::Alphanum),
                ("ef".to_string(), 6, 8, TokenType::Alphanum),
            ]
        );
    }

    #[test]
    fn test_overrun_stops_at_word_boundary() {
        let scanner = Scanner::with_lookahead("abcdefg!hi".as_bytes(), 4);
        let spans: Vec<(usize, usize)> = scan_with(scanner).into_iter().map(|m| (m.1, m.2)).collect();
        assert_eq!(spans, vec![(0, 7), (8, 10)]);
    }

    #[test]
    fn test_reset_restarts_offsets() {
        let mut scanner = Scanner::new("one two".as_bytes());
        assert!(scanner.next_match().unwrap().is_some());
        scanner.reset("three".as_bytes());
        let m = scanner.next_match().unwrap().unwrap();
        assert_eq!(m.start_offset, 0);
        assert_eq!(scanner.matched_text(), "three");
        assert_eq!(scanner.next_match().unwrap(), None);
        assert_eq!(scanner.offset(), 5);
    }

    #[test]
    fn test_empty_and_separator_only_input() {
        assert!(scan("").is_empty());
        assert!(scan(" \t\n-- ... !!").is_empty());
    }
}
