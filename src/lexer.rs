//! @ai:module:intent Split comment text into a token stream with a forward-only cursor
//! @ai:module:layer domain
//! @ai:module:public_api Lexer
//! @ai:module:depends_on token, classifier
//! @ai:module:stateless false

use crate::classifier::{AnnotationClassifier, Classifier};
use crate::token::{Token, TokenKind};

/// @ai:intent Token stream over one input plus a read cursor
///
/// `position` indexes the next token `advance` will consume (the lookahead);
/// `current` is the token consumed last. Tokens are classified once, in
/// `set_input`, and never re-classified.
#[derive(Debug, Clone)]
pub struct Lexer<C = AnnotationClassifier> {
    classifier: C,
    tokens: Vec<Token>,
    position: usize,
    current: Option<usize>,
}

impl Default for Lexer<AnnotationClassifier> {
    fn default() -> Self {
        Self::new(AnnotationClassifier::new())
    }
}

impl<C: Classifier> Lexer<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            tokens: Vec::new(),
            position: 0,
            current: None,
        }
    }

    /// @ai:intent Drop all tokens and cursor state
    pub fn reset(&mut self) {
        self.tokens.clear();
        self.position = 0;
        self.current = None;
    }

    /// @ai:intent Discard prior state and tokenize new input
    /// @ai:post cursor is before the first token
    pub fn set_input(&mut self, input: &str) {
        self.reset();
        self.tokens = self.tokenize(input);
    }

    /// @ai:intent Split input into classified tokens, dropping noise fragments
    /// @ai:effects pure
    fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut fragments = Vec::new();
        let mut last = 0;

        for m in self.classifier.pattern().find_iter(input) {
            if m.start() > last {
                fragments.push(&input[last..m.start()]);
            }
            fragments.push(m.as_str());
            last = m.end();
        }
        if last < input.len() {
            fragments.push(&input[last..]);
        }

        fragments
            .into_iter()
            .filter(|f| !f.is_empty() && !self.classifier.is_discarded(f))
            .map(|f| Token::new(self.classifier.classify(f), f))
            .collect()
    }

    /// @ai:intent Consume the lookahead token
    /// @ai:post returns true when a token is now current
    pub fn advance(&mut self) -> bool {
        if self.position < self.tokens.len() {
            self.current = Some(self.position);
            self.position += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    /// @ai:intent Move the cursor back to the start without retokenizing
    pub fn rewind(&mut self) {
        self.position = 0;
        self.current = None;
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current.and_then(|idx| self.tokens.get(idx))
    }

    pub fn current_value(&self) -> Option<&str> {
        self.current_token().map(|t| t.value.as_str())
    }

    /// @ai:intent Token that the next `advance` would make current
    pub fn lookahead(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub fn next_kind(&self) -> Option<TokenKind> {
        self.lookahead().map(|t| t.kind)
    }

    /// @ai:intent Test the kind of the not-yet-consumed token
    /// @ai:effects pure
    pub fn is_next(&self, kind: TokenKind) -> bool {
        self.next_kind() == Some(kind)
    }

    /// @ai:intent Token one beyond the lookahead
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position + 1)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub fn peek_value(&self) -> Option<&str> {
        self.peek().map(|t| t.value.as_str())
    }

    /// @ai:intent Classify a lexeme, or report the current token's kind when none is given
    /// @ai:post None only when no lexeme is given and nothing is current
    pub fn kind_of(&self, lexeme: Option<&str>) -> Option<TokenKind> {
        match lexeme {
            Some(lexeme) => Some(self.classifier.classify(lexeme)),
            None => self.current_token().map(|t| t.kind),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regex::Regex;

    fn kinds(lexer: &Lexer) -> Vec<TokenKind> {
        lexer.tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_docblock() {
        let mut lexer: Lexer = Lexer::default();
        lexer.set_input("/**\n * @Route(\"/a\", n=1)\n */");

        let values: Vec<&str> = lexer.tokens().iter().map(|t| t.value.as_str()).collect();
        assert_eq!(
            values,
            vec!["/", "@", "Route", "(", "\"/a\"", ",", "n", "=", "1", ")", "/"]
        );
        assert_eq!(
            kinds(&lexer),
            vec![
                TokenKind::Unknown,
                TokenKind::StartAnnotation,
                TokenKind::Unknown,
                TokenKind::OpenParenthesis,
                TokenKind::String,
                TokenKind::Comma,
                TokenKind::Unknown,
                TokenKind::Assign,
                TokenKind::Integer,
                TokenKind::CloseParenthesis,
                TokenKind::Unknown,
            ]
        );
    }

    #[test]
    fn test_cursor_queries() {
        let mut lexer: Lexer = Lexer::default();
        lexer.set_input("a = 1");

        assert!(lexer.current_token().is_none());
        assert!(lexer.is_next(TokenKind::Unknown));
        assert_eq!(lexer.peek_kind(), Some(TokenKind::Assign));
        assert_eq!(lexer.peek_value(), Some("="));

        assert!(lexer.advance());
        assert_eq!(lexer.current_value(), Some("a"));
        assert!(lexer.is_next(TokenKind::Assign));
        assert_eq!(lexer.peek_kind(), Some(TokenKind::Integer));

        assert!(lexer.advance());
        assert!(lexer.advance());
        assert_eq!(lexer.current_value(), Some("1"));
        assert_eq!(lexer.next_kind(), None);
        assert_eq!(lexer.peek(), None);

        assert!(!lexer.advance());
        assert!(lexer.current_token().is_none());
    }

    #[test]
    fn test_rewind_keeps_tokens() {
        let mut lexer: Lexer = Lexer::default();
        lexer.set_input("@X(1)");
        while lexer.advance() {}
        assert_eq!(lexer.position(), 5);

        lexer.rewind();
        assert_eq!(lexer.position(), 0);
        assert_eq!(lexer.tokens().len(), 5);
        assert!(lexer.is_next(TokenKind::StartAnnotation));
    }

    #[test]
    fn test_set_input_discards_previous_state() {
        let mut lexer: Lexer = Lexer::default();
        lexer.set_input("@A @B");
        lexer.advance();
        lexer.set_input("true");

        assert!(lexer.current_token().is_none());
        assert_eq!(kinds(&lexer), vec![TokenKind::True]);
    }

    #[test]
    fn test_kind_of() {
        let mut lexer: Lexer = Lexer::default();
        lexer.set_input("\"s\"");
        assert_eq!(lexer.kind_of(None), None);

        lexer.advance();
        assert_eq!(lexer.kind_of(None), Some(TokenKind::String));
        assert_eq!(lexer.kind_of(Some("1.5")), Some(TokenKind::Float));
        assert_eq!(lexer.kind_of(Some("name")), Some(TokenKind::Unknown));
    }

    #[test]
    fn test_empty_input() {
        let mut lexer: Lexer = Lexer::default();
        lexer.set_input("   \n * ");
        assert!(lexer.tokens().is_empty());
        assert!(!lexer.advance());
    }

    struct WordClassifier {
        pattern: Regex,
    }

    impl Classifier for WordClassifier {
        fn pattern(&self) -> &Regex {
            &self.pattern
        }

        fn classify(&self, lexeme: &str) -> TokenKind {
            match lexeme {
                "," => TokenKind::Comma,
                _ => TokenKind::Unknown,
            }
        }
    }

    #[test]
    fn test_custom_classifier_keeps_text_between_matches() {
        let mut lexer = Lexer::new(WordClassifier {
            pattern: Regex::new(",").unwrap(),
        });
        lexer.set_input("alpha,beta, ");

        let values: Vec<&str> = lexer.tokens().iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["alpha", ",", "beta", ","]);
    }
}
