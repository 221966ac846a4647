//! Token classes and the emitted token value
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic class of an emitted token.
///
/// Numeric ids and labels are an integration contract with downstream
/// filters and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "<ALPHANUM>")]
    Alphanum = 0,
    /// Possessives and contractions: `O'Reilly's`, `you're`
    #[serde(rename = "<APOSTROPHE>")]
    Apostrophe = 1,
    /// Dotted initials: `I.B.M.`
    #[serde(rename = "<ACRONYM>")]
    Acronym = 2,
    /// Ampersand-joined names: `AT&T`
    #[serde(rename = "<COMPANY>")]
    Company = 3,
    #[serde(rename = "<EMAIL>")]
    Email = 4,
    #[serde(rename = "<URI>")]
    Uri = 5,
    /// Numbers and digit-bearing product codes: `3.14`, `A-1234-B`
    #[serde(rename = "<NUM>")]
    Num = 6,
    /// A single Chinese or Japanese character
    #[serde(rename = "<CJ>")]
    Cj = 7,
}

impl TokenType {
    /// Every class, ordered by id
    pub const ALL: [TokenType; 8] = [
        TokenType::Alphanum,
        TokenType::Apostrophe,
        TokenType::Acronym,
        TokenType::Company,
        TokenType::Email,
        TokenType::Uri,
        TokenType::Num,
        TokenType::Cj,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<TokenType> {
        Self::ALL.get(usize::from(id)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            TokenType::Alphanum => "<ALPHANUM>",
            TokenType::Apostrophe => "<APOSTROPHE>",
            TokenType::Acronym => "<ACRONYM>",
            TokenType::Company => "<COMPANY>",
            TokenType::Email => "<EMAIL>",
            TokenType::Uri => "<URI>",
            TokenType::Num => "<NUM>",
            TokenType::Cj => "<CJ>",
        }
    }
}

/// Label lookup by numeric id
pub fn token_type_label(id: u8) -> Option<&'static str> {
    TokenType::from_id(id).map(TokenType::label)
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown token type label: '{0}'")]
pub struct UnknownTokenType(pub String);

impl FromStr for TokenType {
    type Err = UnknownTokenType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenType::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| UnknownTokenType(s.to_string()))
    }
}

/// One emitted token.
///
/// `end_offset - start_offset` equals the character count of `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Emitted-token slots advanced since the previous token (always >= 1)
    pub position_increment: u32,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        start_offset: usize,
        end_offset: usize,
        position_increment: u32,
        token_type: TokenType,
    ) -> Self {
        Self {
            text: text.into(),
            start_offset,
            end_offset,
            position_increment,
            token_type,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start_offset, self.end_offset)
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new(String::new(), 0, 0, 1, TokenType::Alphanum)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{}", self.text, self.start_offset, self.end_offset)?;
        if self.token_type != TokenType::Alphanum {
            write!(f, ",type={}", self.token_type)?;
        }
        if self.position_increment != 1 {
            write!(f, ",posIncr={}", self.position_increment)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_labels_are_stable() {
        let expected = [
            (0, "<ALPHANUM>"),
            (1, "<APOSTROPHE>"),
            (2, "<ACRONYM>"),
            (3, "<COMPANY>"),
            (4, "<EMAIL>"),
            (5, "<URI>"),
            (6, "<NUM>"),
            (7, "<CJ>"),
        ];
        for (id, label) in expected {
            let token_type = TokenType::from_id(id).unwrap();
            assert_eq!(token_type.id(), id);
            assert_eq!(token_type.label(), label);
            assert_eq!(token_type_label(id), Some(label));
            assert_eq!(label.parse::<TokenType>().unwrap(), token_type);
        }
        assert_eq!(TokenType::from_id(8), None);
        assert_eq!(token_type_label(200), None);
    }

    #[test]
    fn test_unknown_label() {
        let err = "<ALPHANUMONLY>".parse::<TokenType>().unwrap_err();
        assert_eq!(err, UnknownTokenType("<ALPHANUMONLY>".to_string()));
    }

    #[test]
    fn test_serializes_as_label() {
        let token = Token::new("AT&T", 3, 7, 1, TokenType::Company);
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(
            json,
            r#"{"text":"AT&T","start_offset":3,"end_offset":7,"position_increment":1,"type":"<COMPANY>"}"#
        );
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Token::new("hello", 0, 5, 1, TokenType::Alphanum).to_string(),
            "(hello,0,5)"
        );
        assert_eq!(
            Token::new("ghi", 7, 10, 2, TokenType::Alphanum).to_string(),
            "(ghi,7,10,posIncr=2)"
        );
        assert_eq!(
            Token::new("I.B.M.", 0, 6, 1, TokenType::Acronym).to_string(),
            "(I.B.M.,0,6,type=<ACRONYM>)"
        );
    }

    #[test]
    fn test_span_and_len() {
        let token = Token::new("東", 4, 5, 1, TokenType::Cj);
        assert_eq!(token.span(), Span::new(4, 5));
        assert_eq!(token.len(), 1);
        assert!(!token.is_empty());
    }
}
