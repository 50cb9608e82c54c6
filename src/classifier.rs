//! @ai:module:intent Map raw lexemes to token kinds for the lexer
//! @ai:module:layer domain
//! @ai:module:public_api Classifier, AnnotationClassifier
//! @ai:module:depends_on token
//! @ai:module:stateless true

use crate::token::TokenKind;
use regex::Regex;

/// Splitting pattern, in priority order: identifiers with namespace
/// separators (optionally fully qualified with a leading `::` or `\`), signed numbers, double-quoted strings (`""` escapes a quote),
/// whitespace and `*` runs, then any single character.
const ANNOTATION_PATTERN: &str = concat!(
    r"((?:::|\\)?[A-Za-z_][A-Za-z0-9_]*(?:(?:::|\\|\.)[A-Za-z_][A-Za-z0-9_]*)*)",
    r"|([+-]?[0-9]+(?:\.[0-9]+)*)",
    r#"|("(?:""|[^"])*")"#,
    r"|(\s+|\*+)",
    r"|(.)"
);

/// @ai:intent Pluggable policy deciding how text is split and what each fragment means
pub trait Classifier {
    /// Pattern whose matches (and the text between them) become fragments.
    fn pattern(&self) -> &Regex;

    /// @ai:intent Classify one fragment
    /// @ai:effects pure
    fn classify(&self, lexeme: &str) -> TokenKind;

    /// @ai:intent Decide whether a fragment is noise to drop before classification
    /// @ai:effects pure
    fn is_discarded(&self, fragment: &str) -> bool {
        fragment.trim().is_empty()
    }
}

/// @ai:intent Classifier for the annotation language found in doc comments
#[derive(Debug, Clone)]
pub struct AnnotationClassifier {
    pattern: Regex,
}

impl AnnotationClassifier {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(ANNOTATION_PATTERN).expect("Invalid regex pattern"),
        }
    }

    /// @ai:intent Look up a punctuation lexeme in the fixed symbol table
    /// @ai:example ("@") -> Some(StartAnnotation)
    /// @ai:example ("x") -> None
    /// @ai:effects pure
    pub fn symbol(lexeme: &str) -> Option<TokenKind> {
        let kind = match lexeme {
            "@" => TokenKind::StartAnnotation,
            "(" => TokenKind::OpenParenthesis,
            ")" => TokenKind::CloseParenthesis,
            "'" => TokenKind::SingleQuote,
            "\"" => TokenKind::DoubleQuote,
            "{" => TokenKind::OpenCurlyBrace,
            "}" => TokenKind::CloseCurlyBrace,
            "=" => TokenKind::Assign,
            "," => TokenKind::Comma,
            ":" => TokenKind::Colon,
            _ => return None,
        };
        Some(kind)
    }
}

impl Default for AnnotationClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for AnnotationClassifier {
    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn classify(&self, lexeme: &str) -> TokenKind {
        if is_quoted(lexeme) {
            return TokenKind::String;
        }

        if let Some(has_fraction) = numeric_shape(lexeme) {
            return if has_fraction {
                TokenKind::Float
            } else {
                TokenKind::Integer
            };
        }

        match lexeme {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => Self::symbol(lexeme).unwrap_or(TokenKind::Unknown),
        }
    }

    fn is_discarded(&self, fragment: &str) -> bool {
        fragment.chars().all(char::is_whitespace) || fragment.chars().all(|c| c == '*')
    }
}

/// @ai:intent Check that a lexeme is bounded by double quotes on both ends
/// @ai:effects pure
fn is_quoted(lexeme: &str) -> bool {
    lexeme.len() >= 2 && lexeme.starts_with('"') && lexeme.ends_with('"')
}

/// @ai:intent Recognise `[+-]digits[.digits]` and report whether a fraction is present
/// @ai:example ("-12") -> Some(false)
/// @ai:example ("+1.5") -> Some(true)
/// @ai:example ("1.2.3") -> None
/// @ai:effects pure
fn numeric_shape(lexeme: &str) -> Option<bool> {
    let unsigned = lexeme
        .strip_prefix('-')
        .or_else(|| lexeme.strip_prefix('+'))
        .unwrap_or(lexeme);

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    match unsigned.split_once('.') {
        None => all_digits(unsigned).then_some(false),
        Some((whole, fraction)) => (all_digits(whole) && all_digits(fraction)).then_some(true),
    }
}
