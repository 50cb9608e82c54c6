//! @ai:module:intent Define token kinds and tokens produced by the lexer
//! @ai:module:layer domain
//! @ai:module:public_api Token, TokenKind
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Kind of a lexeme as seen by the annotation grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    StartAnnotation,
    OpenParenthesis,
    CloseParenthesis,
    SingleQuote,
    DoubleQuote,
    OpenCurlyBrace,
    CloseCurlyBrace,
    Assign,
    Comma,
    Colon,
    True,
    False,
    Integer,
    Float,
    String,
    /// Anything the grammar has no use for: identifiers, stray punctuation.
    Unknown,
}

impl TokenKind {
    /// @ai:intent Human-readable name used in syntax diagnostics
    /// @ai:post None for Unknown
    /// @ai:effects pure
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            TokenKind::StartAnnotation => "start-annotation",
            TokenKind::OpenParenthesis => "open-parenthesis",
            TokenKind::CloseParenthesis => "close-parenthesis",
            TokenKind::SingleQuote => "single-quote",
            TokenKind::DoubleQuote => "double-quote",
            TokenKind::OpenCurlyBrace => "open-curly-brace",
            TokenKind::CloseCurlyBrace => "close-curly-brace",
            TokenKind::Assign => "assign",
            TokenKind::Comma => "comma",
            TokenKind::Colon => "colon",
            TokenKind::True => "boolean (true)",
            TokenKind::False => "boolean (false)",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Unknown => return None,
        };
        Some(name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("<unknown>"))
    }
}

/// @ai:intent A classified lexeme; immutable once produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
