//! Pull-based tokenizer over a [`Scanner`]
//!
//! Applies the max-token-length policy and position-increment accounting,
//! and keeps per-session metrics.

use crate::config::runtime::TokenizerPreferences;
use crate::lexical::error::TokenizerError;
use crate::lexical::scanner::{RawMatch, Scanner};
use crate::logging::codes;
use crate::tokens::{Token, TokenStream, TokenType};
use crate::{log_debug, log_error, log_success, log_warning};
use serde::Serialize;
use std::io::Read;

/// Counters for one scan session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenizerMetrics {
    pub tokens_emitted: usize,
    pub tokens_skipped: usize,
    pub type_counts: [usize; TokenType::ALL.len()],
    pub chars_consumed: usize,
}

impl TokenizerMetrics {
    fn record(&mut self, token_type: TokenType, preferences: &TokenizerPreferences) {
        self.tokens_emitted += 1;
        if preferences.collect_metrics {
            self.type_counts[usize::from(token_type.id())] += 1;
        }
    }

    pub fn count(&self, token_type: TokenType) -> usize {
        self.type_counts[usize::from(token_type.id())]
    }
}

/// One scan session over a reader.
///
/// Not meant to be shared between threads; give each worker its own
/// instance and reuse it with [`Tokenizer::reset`].
#[derive(Debug)]
pub struct Tokenizer<R> {
    scanner: Scanner<R>,
    max_token_length: usize,
    /// Raw matches dropped since the last emitted token
    skipped_count: u32,
    finished: bool,
    preferences: TokenizerPreferences,
    metrics: TokenizerMetrics,
}

impl<'a> Tokenizer<&'a [u8]> {
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self::from_scanner(Scanner::new(reader), TokenizerPreferences::default())
    }

    /// Fails when the preferred max token length is 0 or wider than the
    /// lookahead window.
    pub fn with_preferences(
        reader: R,
        preferences: TokenizerPreferences,
    ) -> Result<Self, TokenizerError> {
        preferences.validate()?;
        Ok(Self::from_scanner(Scanner::new(reader), preferences))
    }

    /// Wrap an already configured scanner, e.g. one with a small lookahead.
    /// The max token length is clamped to the scanner's window.
    pub fn from_scanner(scanner: Scanner<R>, preferences: TokenizerPreferences) -> Self {
        Self {
            max_token_length: clamp_length(preferences.max_token_length, &scanner),
            scanner,
            skipped_count: 0,
            finished: false,
            preferences,
            metrics: TokenizerMetrics::default(),
        }
    }

    /// Rebind to a new input. Offsets, skipped count and metrics restart;
    /// buffers are kept.
    pub fn reset(&mut self, reader: R) {
        self.scanner.reset(reader);
        self.skipped_count = 0;
        self.finished = false;
        self.metrics = TokenizerMetrics::default();
        log_debug!("Tokenizer reset",
            "max_token_length" => self.max_token_length
        );
    }

    /// Tokens strictly longer than `length` characters are dropped.
    /// Clamped between 1 and the scanner's lookahead window.
    pub fn set_max_token_length(&mut self, length: usize) {
        self.max_token_length = clamp_length(length, &self.scanner);
    }

    pub fn max_token_length(&self) -> usize {
        self.max_token_length
    }

    pub fn preferences(&self) -> &TokenizerPreferences {
        &self.preferences
    }

    pub fn metrics(&self) -> TokenizerMetrics {
        TokenizerMetrics {
            chars_consumed: self.scanner.offset(),
            ..self.metrics.clone()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn emit_next(&mut self) -> Result<Option<Token>, TokenizerError> {
        let mut token = Token::default();
        Ok(self.emit_next_into(&mut token)?.then_some(token))
    }

    /// Overwrite `token` with the next token, reusing its text buffer.
    ///
    /// Returns `false` at end of stream; `token` is left untouched then.
    pub fn emit_next_into(&mut self, token: &mut Token) -> Result<bool, TokenizerError> {
        if self.finished {
            return Ok(false);
        }

        loop {
            let raw = match self.scanner.next_match() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    self.finish();
                    return Ok(false);
                }
                Err(e) => return Err(self.fail(e.into())),
            };

            if raw.length > self.max_token_length {
                self.skip(&raw);
                continue;
            }

            token.text.clear();
            token.text.extend(self.scanner.matched_chars());
            token.start_offset = raw.start_offset;
            token.end_offset = raw.end_offset();
            token.position_increment = self.skipped_count.saturating_add(1);
            token.token_type = raw.token_type;

            self.skipped_count = 0;
            self.metrics.record(raw.token_type, &self.preferences);
            return Ok(true);
        }
    }

    /// Drain the rest of the session into a [`TokenStream`].
    pub fn collect_stream(&mut self) -> Result<TokenStream, TokenizerError> {
        let mut stream = TokenStream::new();
        while let Some(token) = self.emit_next()? {
            stream.push(token);
        }
        stream.set_skipped(self.metrics.tokens_skipped);
        Ok(stream)
    }

    fn skip(&mut self, raw: &RawMatch) {
        self.skipped_count = self.skipped_count.saturating_add(1);
        self.metrics.tokens_skipped += 1;

        if self.preferences.log_skipped_tokens {
            log_warning!(code = codes::lexical::TOKEN_SKIPPED, "Overlong token dropped",
                "span" => raw.span(),
                "length" => raw.length,
                "max_token_length" => self.max_token_length
            );
        } else {
            log_debug!("Overlong token dropped",
                "span" => raw.span(),
                "length" => raw.length
            );
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
            "tokens" => self.metrics.tokens_emitted,
            "skipped" => self.metrics.tokens_skipped,
            "chars" => self.scanner.offset()
        );
    }

    fn fail(&mut self, error: TokenizerError) -> TokenizerError {
        self.finished = true;
        log_error!(error.error_code(), &error.to_string(),
            "offset" => self.scanner.offset(),
            "tokens" => self.metrics.tokens_emitted
        );
        error
    }
}

// Longer matches only exist as window overruns, which carry no text.
fn clamp_length<R: Read>(length: usize, scanner: &Scanner<R>) -> usize {
    length.clamp(1, scanner.max_lookahead())
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Result<Token, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.emit_next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io;

    fn prefs(max_token_length: usize) -> TokenizerPreferences {
        TokenizerPreferences {
            max_token_length,
            collect_metrics: true,
            log_skipped_tokens: false,
        }
    }

    fn emit_all<R: Read>(tokenizer: &mut Tokenizer<R>) -> Vec<Token> {
        let mut out = Vec::new();
        while let Some(token) = tokenizer.emit_next().unwrap() {
            out.push(token);
        }
        out
    }

    struct FailAfter<'a> {
        data: &'a [u8],
    }

    impl Read for FailAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_overlong_tokens_bump_position_increment() {
        let mut tokenizer = Tokenizer::with_preferences("abcdef ghi".as_bytes(), prefs(5)).unwrap();
        let tokens = emit_all(&mut tokenizer);
        assert_eq!(tokens, vec![Token::new("ghi", 7, 10, 2, TokenType::Alphanum)]);
        assert_eq!(tokenizer.metrics().tokens_skipped, 1);
    }

    #[test]
    fn test_consecutive_skips_accumulate() {
        let mut tokenizer = Tokenizer::from_text("aaaa bbbb cc dddd ee");
        tokenizer.set_max_token_length(3);
        let tokens = emit_all(&mut tokenizer);
        let increments: Vec<(String, u32)> = tokens
            .into_iter()
            .map(|t| (t.text, t.position_increment))
            .collect();
        assert_eq!(increments, vec![("cc".to_string(), 3), ("ee".to_string(), 2)]);
    }

    #[test]
    fn test_end_of_stream_is_idempotent() {
        let mut tokenizer = Tokenizer::from_text("one");
        assert!(tokenizer.emit_next().unwrap().is_some());
        for _ in 0..3 {
            assert_eq!(tokenizer.emit_next().unwrap(), None);
        }
        assert!(tokenizer.is_finished());
        assert_eq!(tokenizer.metrics().chars_consumed, 3);
    }

    #[test]
    fn test_emit_next_into_reuses_token() {
        let mut tokenizer = Tokenizer::from_text("AT&T rocks");
        let mut token = Token::default();
        assert!(tokenizer.emit_next_into(&mut token).unwrap());
        assert_eq!(token, Token::new("AT&T", 0, 4, 1, TokenType::Company));
        assert!(tokenizer.emit_next_into(&mut token).unwrap());
        assert_eq!(token, Token::new("rocks", 5, 10, 1, TokenType::Alphanum));
        assert!(!tokenizer.emit_next_into(&mut token).unwrap());
        assert_eq!(token.text, "rocks");
    }

    #[test]
    fn test_reset_reuses_instance() {
        let mut tokenizer = Tokenizer::with_preferences("abcdef".as_bytes(), prefs(5)).unwrap();
        assert!(emit_all(&mut tokenizer).is_empty());

        tokenizer.reset("xy zz".as_bytes());
        let tokens = emit_all(&mut tokenizer);
        assert_eq!(tokens[0], Token::new("xy", 0, 2, 1, TokenType::Alphanum));
        assert_eq!(tokenizer.metrics().tokens_skipped, 0);
        assert_eq!(tokenizer.metrics().tokens_emitted, 2);
    }

    #[test]
    fn test_max_token_length_is_clamped() {
        let mut tokenizer = Tokenizer::from_text("a bc");
        tokenizer.set_max_token_length(0);
        assert_eq!(tokenizer.max_token_length(), 1);
        let texts: Vec<String> = emit_all(&mut tokenizer).into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["a"]);
    }

    #[test]
    fn test_max_token_length_never_exceeds_window() {
        let mut tokenizer = Tokenizer::from_scanner(
            Scanner::with_lookahead("abcdefgh abc".as_bytes(), 4),
            prefs(100),
        );
        assert_eq!(tokenizer.max_token_length(), 4);
        tokenizer.set_max_token_length(1000);
        assert_eq!(tokenizer.max_token_length(), 4);

        let tokens = emit_all(&mut tokenizer);
        assert_eq!(tokens, vec![Token::new("abc", 9, 12, 2, TokenType::Alphanum)]);
        assert_eq!(tokenizer.metrics().tokens_skipped, 1);
    }

    #[test]
    fn test_word_as_wide_as_window_is_kept() {
        let mut tokenizer = Tokenizer::from_scanner(
            Scanner::with_lookahead("abcd efghi".as_bytes(), 4),
            prefs(4),
        );
        let texts: Vec<String> = emit_all(&mut tokenizer).into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["abcd"]);
    }

    #[test]
    fn test_invalid_preferences_rejected() {
        assert_matches!(
            Tokenizer::with_preferences("".as_bytes(), prefs(0)),
            Err(TokenizerError::InvalidMaxTokenLength { value: 0 })
        );
    }

    #[test]
    fn test_stream_error_finishes_session() {
        let mut tokenizer = Tokenizer::new(FailAfter {
            data: b"partial words ",
        });
        let results: Vec<_> = tokenizer.by_ref().collect();
        assert_eq!(results.len(), 3);
        assert_matches!(&results[2], Err(TokenizerError::Io { .. }));
        assert_eq!(tokenizer.emit_next().unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_reports_offset() {
        let mut tokenizer = Tokenizer::new(&b"ok \xc3\x28"[..]);
        assert_eq!(tokenizer.emit_next().unwrap().unwrap().text, "ok");
        assert_matches!(
            tokenizer.emit_next(),
            Err(TokenizerError::InvalidEncoding { offset: 3 })
        );
        assert_eq!(tokenizer.emit_next().unwrap(), None);
    }

    #[test]
    fn test_metrics_by_type() {
        let mut tokenizer = Tokenizer::with_preferences(
            "I.B.M. and AT&T sold 1,000 units 東京".as_bytes(),
            prefs(255),
        )
        .unwrap();
        let stream = tokenizer.collect_stream().unwrap();
        let metrics = tokenizer.metrics();
        assert_eq!(metrics.tokens_emitted, stream.len());
        assert_eq!(metrics.count(TokenType::Acronym), 1);
        assert_eq!(metrics.count(TokenType::Company), 1);
        assert_eq!(metrics.count(TokenType::Num), 1);
        assert_eq!(metrics.count(TokenType::Cj), 2);
        assert_eq!(metrics.count(TokenType::Alphanum), 3);
    }
}
