//! Materialized token sequence for one scan session

use crate::tokens::token::{Token, TokenType};
use serde::Serialize;

/// All tokens of one session plus per-type counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
    type_counts: [usize; TokenType::ALL.len()],
    /// Raw matches dropped by the length policy
    skipped: usize,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.type_counts[usize::from(token.token_type.id())] += 1;
        self.tokens.push(token);
    }

    pub(crate) fn set_skipped(&mut self, skipped: usize) {
        self.skipped = skipped;
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn count(&self, token_type: TokenType) -> usize {
        self.type_counts[usize::from(token_type.id())]
    }

    /// Non-zero counts in id order
    pub fn type_counts(&self) -> Vec<(TokenType, usize)> {
        TokenType::ALL
            .into_iter()
            .map(|t| (t, self.count(t)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn types(&self) -> Vec<TokenType> {
        self.tokens.iter().map(|t| t.token_type).collect()
    }

    /// Absolute positions, starting at 0 for a leading increment of 1
    pub fn positions(&self) -> Vec<u64> {
        let mut position: u64 = 0;
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if i == 0 {
                    position = u64::from(t.position_increment) - 1;
                } else {
                    position += u64::from(t.position_increment);
                }
                position
            })
            .collect()
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut stream = TokenStream::new();
        for token in iter {
            stream.push(token);
        }
        stream
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenStream {
        vec![
            Token::new("hello", 0, 5, 1, TokenType::Alphanum),
            Token::new("A-1", 6, 9, 3, TokenType::Num),
            Token::new("東", 10, 11, 1, TokenType::Cj),
            Token::new("world", 12, 17, 1, TokenType::Alphanum),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_counts() {
        let stream = sample();
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.count(TokenType::Alphanum), 2);
        assert_eq!(stream.count(TokenType::Uri), 0);
        assert_eq!(
            stream.type_counts(),
            vec![
                (TokenType::Alphanum, 2),
                (TokenType::Num, 1),
                (TokenType::Cj, 1)
            ]
        );
    }

    #[test]
    fn test_positions_follow_increments() {
        assert_eq!(sample().positions(), vec![0, 3, 4, 5]);

        let leading_gap: TokenStream = vec![Token::new("ghi", 7, 10, 2, TokenType::Alphanum)]
            .into_iter()
            .collect();
        assert_eq!(leading_gap.positions(), vec![1]);
    }

    #[test]
    fn test_texts_and_types() {
        let stream = sample();
        assert_eq!(stream.texts(), vec!["hello", "A-1", "東", "world"]);
        assert_eq!(stream.types()[1], TokenType::Num);
        assert!(TokenStream::new().is_empty());
    }
}
