//! @ai:module:intent Recursive-descent parser for annotations in documentation comments
//! @ai:module:layer application
//! @ai:module:public_api DocParser
//! @ai:module:depends_on lexer, classifier, symbols, ignore, registry, annotation, error
//! @ai:module:stateless false
//!
//! Grammar:
//!
//! ```text
//! Directive   := '@' name [ Parenthesis ]
//! Parenthesis := '(' [ Value (',' Value)* [','] ] ')'
//! Value       := Assignment | Literal
//! Assignment  := key '=' Literal
//! Literal     := String | Integer | Float | 'true' | 'false' | Array
//! Array       := '{' [ Entry (',' Entry)* [','] ] '}'
//! Entry       := [ key ':' ] Literal
//! ```

use crate::annotation::{ArgumentList, Key, LiteralMap, ParseResult, Value};
use crate::classifier::{AnnotationClassifier, Classifier};
use crate::error::{Error, Result};
use crate::ignore::IgnoredNames;
use crate::lexer::Lexer;
use crate::registry::TypeCatalog;
use crate::symbols::{resolve, Resolution, SymbolTable};
use crate::token::TokenKind;

/// @ai:intent Parser turning one comment block into resolved parse results
///
/// Owns its lexer, so one instance must not be shared between concurrent
/// parses; the ignored-name set is fixed at construction.
#[derive(Debug, Clone)]
pub struct DocParser<C = AnnotationClassifier> {
    lexer: Lexer<C>,
    ignored: IgnoredNames,
}

impl Default for DocParser<AnnotationClassifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl DocParser<AnnotationClassifier> {
    /// @ai:intent Parser with the annotation lexer and the default ignored names
    pub fn new() -> Self {
        Self::with_lexer(Lexer::default(), IgnoredNames::default())
    }

    pub fn with_ignored_names(ignored: IgnoredNames) -> Self {
        Self::with_lexer(Lexer::default(), ignored)
    }
}

impl<C: Classifier> DocParser<C> {
    pub fn with_lexer(lexer: Lexer<C>, ignored: IgnoredNames) -> Self {
        Self { lexer, ignored }
    }

    pub fn ignored_names(&self) -> &IgnoredNames {
        &self.ignored
    }

    pub fn set_ignored_names(&mut self, ignored: IgnoredNames) {
        self.ignored = ignored;
    }

    /// @ai:intent Parse every directive in a comment block
    /// @ai:pre symbols holds the imports of the file the comment belongs to
    /// @ai:post results are in source order; ignored directives are absent
    /// @ai:effects pure
    pub fn parse(
        &mut self,
        input: &str,
        context: &str,
        symbols: &SymbolTable,
        catalog: &dyn TypeCatalog,
    ) -> Result<Vec<ParseResult>> {
        self.lexer.set_input(input);

        Session {
            lexer: &mut self.lexer,
            ignored: &self.ignored,
            context,
            symbols,
            catalog,
        }
        .aggregate()
    }
}

/// State of one `parse` call.
struct Session<'p, C> {
    lexer: &'p mut Lexer<C>,
    ignored: &'p IgnoredNames,
    context: &'p str,
    symbols: &'p SymbolTable,
    catalog: &'p dyn TypeCatalog,
}

impl<C: Classifier> Session<'_, C> {
    /// @ai:intent Walk the whole stream, processing each directive and skipping other tokens
    fn aggregate(&mut self) -> Result<Vec<ParseResult>> {
        let mut results = Vec::new();

        while self.lexer.lookahead().is_some() {
            if !self.lexer.is_next(TokenKind::StartAnnotation) {
                self.lexer.advance();
                continue;
            }

            if let Some(result) = self.process()? {
                results.push(result);
            }
        }

        Ok(results)
    }

    fn process(&mut self) -> Result<Option<ParseResult>> {
        self.expect(TokenKind::StartAnnotation, "directive")?;
        let name = self.parse_directive()?;

        if self.ignored.contains(&name) {
            tracing::debug!("Skipping ignored annotation @{} in {}", name, self.context);
            self.skip_parenthesis();
            return Ok(None);
        }

        let resolved = self.resolve_name(&name)?;
        let arguments = self
            .parse_parenthesis()?
            .unwrap_or_else(ArgumentList::placeholder);

        Ok(Some(ParseResult {
            name: resolved,
            context: self.context.to_string(),
            arguments,
        }))
    }

    /// Directive ::= name
    fn parse_directive(&mut self) -> Result<String> {
        if !self.lexer.advance() {
            return Err(Error::syntax(self.context, "directive", "annotation name"));
        }
        Ok(self.lexer.current_value().unwrap_or_default().to_string())
    }

    fn resolve_name(&self, name: &str) -> Result<String> {
        match resolve(name, self.symbols) {
            Resolution::Alias(symbol) => {
                tracing::debug!("@{} resolved by alias to {}", name, symbol.fully_qualified_name);
                Ok(symbol.fully_qualified_name.clone())
            }
            Resolution::ShortName(symbol)
                if self.catalog.type_exists(&symbol.fully_qualified_name) =>
            {
                Ok(symbol.fully_qualified_name.clone())
            }
            Resolution::ShortName(symbol) => {
                tracing::debug!(
                    "@{} matched import {} but the type is unknown",
                    name,
                    symbol.fully_qualified_name
                );
                Err(self.unresolved(name))
            }
            Resolution::Unresolved => Err(self.unresolved(name)),
        }
    }

    fn unresolved(&self, name: &str) -> Error {
        Error::UnresolvedName {
            name: name.to_string(),
            context: self.context.to_string(),
        }
    }

    /// @ai:intent Consume a balanced parenthesis group without interpreting it
    fn skip_parenthesis(&mut self) {
        if !self.lexer.is_next(TokenKind::OpenParenthesis) {
            return;
        }

        let mut depth = 0usize;
        while let Some(kind) = self.lexer.next_kind() {
            self.lexer.advance();
            match kind {
                TokenKind::OpenParenthesis => depth += 1,
                TokenKind::CloseParenthesis => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    /// Parenthesis ::= '(' [ Value (',' Value)* [','] ] ')'
    fn parse_parenthesis(&mut self) -> Result<Option<ArgumentList>> {
        if !self.lexer.is_next(TokenKind::OpenParenthesis) {
            return Ok(None);
        }

        self.expect(TokenKind::OpenParenthesis, "parenthesis")?;
        let mut arguments = ArgumentList::default();

        if !self.lexer.is_next(TokenKind::CloseParenthesis) {
            loop {
                self.parse_value(&mut arguments)?;

                if !self.lexer.is_next(TokenKind::Comma) {
                    break;
                }
                self.expect(TokenKind::Comma, "parenthesis")?;

                if self.lexer.is_next(TokenKind::CloseParenthesis) {
                    break;
                }
            }
        }

        self.expect(TokenKind::CloseParenthesis, "parenthesis")?;
        Ok(Some(arguments))
    }

    /// Value ::= Assignment | Literal
    fn parse_value(&mut self, arguments: &mut ArgumentList) -> Result<()> {
        if self.lexer.peek_kind() == Some(TokenKind::Assign) {
            let (key, value) = self.parse_assignment()?;
            arguments.set_named(&key, value);
        } else {
            let value = self.parse_literal()?;
            arguments.positional.push(value);
        }
        Ok(())
    }

    /// Assignment ::= key '=' Literal
    fn parse_assignment(&mut self) -> Result<(String, Value)> {
        self.lexer.advance();
        let key = self.lexer.current_value().unwrap_or_default().to_string();
        self.expect(TokenKind::Assign, "assignment")?;
        let value = self.parse_literal()?;
        Ok((key, value))
    }

    /// Literal ::= String | Integer | Float | 'true' | 'false' | Array
    fn parse_literal(&mut self) -> Result<Value> {
        match self.lexer.next_kind() {
            Some(TokenKind::OpenCurlyBrace) => self.parse_array(),
            Some(TokenKind::String) => {
                let lexeme = self.expect(TokenKind::String, "literal")?;
                Ok(Value::String(unquote(&lexeme).to_string()))
            }
            Some(TokenKind::Integer) => {
                let lexeme = self.expect(TokenKind::Integer, "literal")?;
                lexeme.parse::<i64>().map(Value::Integer).map_err(|_| {
                    Error::syntax(
                        self.context,
                        "literal",
                        "an integer within the 64-bit signed range",
                    )
                })
            }
            Some(TokenKind::Float) => {
                let lexeme = self.expect(TokenKind::Float, "literal")?;
                lexeme
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| Error::syntax(self.context, "literal", "a float"))
            }
            Some(TokenKind::True) => {
                self.expect(TokenKind::True, "literal")?;
                Ok(Value::Bool(true))
            }
            Some(TokenKind::False) => {
                self.expect(TokenKind::False, "literal")?;
                Ok(Value::Bool(false))
            }
            _ => Err(Error::syntax(self.context, "literal", "a literal value")),
        }
    }

    /// Array ::= '{' [ Entry (',' Entry)* [','] ] '}'
    fn parse_array(&mut self) -> Result<Value> {
        self.expect(TokenKind::OpenCurlyBrace, "array")?;
        let mut map = LiteralMap::new();

        if !self.lexer.is_next(TokenKind::CloseCurlyBrace) {
            loop {
                let key = self.parse_entry_key(&map)?;
                let value = self.parse_literal()?;
                map.insert(key, value);

                if !self.lexer.is_next(TokenKind::Comma) {
                    break;
                }
                self.expect(TokenKind::Comma, "array")?;

                if self.lexer.is_next(TokenKind::CloseCurlyBrace) {
                    break;
                }
            }
        }

        self.expect(TokenKind::CloseCurlyBrace, "array")?;
        Ok(Value::Map(map))
    }

    /// Entry ::= [ key ':' ]; unkeyed entries take the next free sequence index.
    fn parse_entry_key(&mut self, map: &LiteralMap) -> Result<Key> {
        if self.lexer.peek_kind() != Some(TokenKind::Colon) {
            return Ok(Key::Index(map.next_index()));
        }

        self.lexer.advance();
        let key = match self.lexer.current_token() {
            Some(token) => match token.kind {
                TokenKind::Integer => token
                    .value
                    .parse::<i64>()
                    .map(Key::Index)
                    .unwrap_or_else(|_| Key::Name(token.value.clone())),
                TokenKind::String => Key::Name(unquote(&token.value).to_string()),
                _ => Key::Name(token.value.clone()),
            },
            None => return Err(Error::syntax(self.context, "array", "an entry key")),
        };
        self.expect(TokenKind::Colon, "array")?;
        Ok(key)
    }

    /// @ai:intent Consume the lookahead if it has the expected kind, else fail
    /// @ai:post returns the consumed lexeme
    fn expect(&mut self, kind: TokenKind, construct: &'static str) -> Result<String> {
        if !self.lexer.is_next(kind) {
            return Err(Error::syntax(self.context, construct, kind.to_string()));
        }

        self.lexer.advance();
        Ok(self.lexer.current_value().unwrap_or_default().to_string())
    }
}

/// @ai:intent Strip exactly one layer of surrounding double quotes
/// @ai:example ("\"a\"") -> "a"
/// @ai:example ("\"a\"\"b\"") -> "a\"\"b"
/// @ai:effects pure
fn unquote(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, TrustImports};
    use crate::symbols::Symbol;
    use pretty_assertions::assert_eq;

    const CONTEXT: &str = "type Fixture";

    fn symbols() -> SymbolTable {
        vec![
            Symbol::aliased("fixtures::Foo", "X"),
            Symbol::new("app::routing::Route"),
            Symbol::aliased("fixtures::Param", "param"),
        ]
        .into_iter()
        .collect()
    }

    fn parse(input: &str) -> Result<Vec<ParseResult>> {
        DocParser::new().parse(input, CONTEXT, &symbols(), &TrustImports)
    }

    fn arguments(input: &str) -> ArgumentList {
        let mut results = parse(input).unwrap();
        assert_eq!(results.len(), 1, "expected one result for {}", input);
        results.remove(0).arguments
    }

    fn map(entries: Vec<(Key, Value)>) -> Value {
        Value::Map(entries.into_iter().collect())
    }

    #[test]
    fn test_parse_docblock_with_text_and_tags() {
        let doc = "/**\n * Handles the index page.\n *\n * @param int $id the id\n * @Route(\"/index\", methods={\"GET\"})\n * @return void\n */";
        let results = parse(doc).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "app::routing::Route");
        assert_eq!(results[0].context, CONTEXT);
        assert_eq!(results[0].arguments.positional, vec![Value::from("/index")]);
        assert_eq!(
            results[0].arguments.named.get_named("methods"),
            Some(&map(vec![(Key::Index(0), Value::from("GET"))]))
        );
    }

    #[test]
    fn test_directive_at_start_of_input() {
        assert_eq!(arguments("@X(-1)").positional, vec![Value::Integer(-1)]);
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let mut parser = DocParser::new();
        let doc = "@X(1, a={k: 2}) @Route";
        let first = parser.parse(doc, CONTEXT, &symbols(), &TrustImports).unwrap();
        let second = parser.parse(doc, CONTEXT, &symbols(), &TrustImports).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_ignored_name_wins_over_alias() {
        let results = parse("@param(1) @X").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "fixtures::Foo");
    }

    #[test]
    fn test_ignored_directive_skips_free_text_parenthesis() {
        let results = parse("@todo(fix (this) later) @X(2)").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].arguments.positional, vec![Value::Integer(2)]);
    }

    #[test]
    fn test_custom_ignored_names() {
        let mut parser = DocParser::with_ignored_names(IgnoredNames::with_names(["X"]));
        let results = parser
            .parse("@X(1) @Route", CONTEXT, &symbols(), &TrustImports)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(parser.ignored_names().contains("X"));
    }

    #[test]
    fn test_trailing_comma_tolerated() {
        assert_eq!(arguments("@X(1,2,)"), arguments("@X(1,2)"));
        assert_eq!(arguments("@X({1,2,})"), arguments("@X({1,2})"));
    }

    #[test]
    fn test_numeric_signs() {
        assert_eq!(arguments("@X(-1)").positional, vec![Value::Integer(-1)]);
        assert_eq!(arguments("@X(+1.5)").positional, vec![Value::Float(1.5)]);
        assert_eq!(arguments("@X(-1.1)").positional, vec![Value::Float(-1.1)]);
        assert_eq!(arguments("@X(+7)").positional, vec![Value::Integer(7)]);
    }

    #[test]
    fn test_named_and_positional_split() {
        let args = arguments("@X(1, a=2, 3)");
        assert_eq!(args.positional, vec![Value::Integer(1), Value::Integer(3)]);
        assert_eq!(args.named.len(), 1);
        assert_eq!(args.named.get_named("a"), Some(&Value::Integer(2)));
        assert_eq!(
            args.constructor_args(),
            vec![
                Value::Integer(1),
                Value::Integer(3),
                map(vec![(Key::from("a"), Value::Integer(2))]),
            ]
        );
    }

    #[test]
    fn test_named_last_write_wins() {
        let args = arguments("@X(a=1, b=true, a=\"z\")");
        assert_eq!(args.named.len(), 2);
        assert_eq!(args.named.get_named("a"), Some(&Value::from("z")));
    }

    #[test]
    fn test_empty_parenthesis_differs_from_none() {
        let empty = arguments("@X()");
        assert!(empty.positional.is_empty());
        assert!(empty.named.is_empty());

        let bare = arguments("@X");
        assert_eq!(bare.positional, vec![Value::Null]);
        assert!(bare.named.is_empty());
    }

    #[test]
    fn test_all_literal_kinds() {
        let args = arguments(
            "@X(10, -1, \"a\", +1, -1.1, +1.1, a=10, true, false, {\"x\", \"y\"},)",
        );
        assert_eq!(
            args.positional,
            vec![
                Value::Integer(10),
                Value::Integer(-1),
                Value::from("a"),
                Value::Integer(1),
                Value::Float(-1.1),
                Value::Float(1.1),
                Value::Bool(true),
                Value::Bool(false),
                map(vec![
                    (Key::Index(0), Value::from("x")),
                    (Key::Index(1), Value::from("y")),
                ]),
            ]
        );
        assert_eq!(args.named.get_named("a"), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_string_strips_one_quote_layer() {
        assert_eq!(arguments("@X(\"a\"\"b\")").positional, vec![Value::from("a\"\"b")]);
        assert_eq!(arguments("@X(\"\")").positional, vec![Value::from("")]);
    }

    #[test]
    fn test_empty_array() {
        let args = arguments("@X({})");
        assert_eq!(args.positional, vec![Value::Map(LiteralMap::new())]);
    }

    #[test]
    fn test_keyed_array() {
        assert_eq!(
            arguments("@X({x: 1, y: 2})").positional,
            vec![map(vec![
                (Key::from("x"), Value::Integer(1)),
                (Key::from("y"), Value::Integer(2)),
            ])]
        );
        assert_eq!(
            arguments("@X({1,2})").positional,
            vec![map(vec![
                (Key::Index(0), Value::Integer(1)),
                (Key::Index(1), Value::Integer(2)),
            ])]
        );
    }

    #[test]
    fn test_nested_and_mixed_keys() {
        let args = arguments("@X({a: {1, 2}, \"b c\": true, 5: 1.5, \"z\"})");
        assert_eq!(
            args.positional,
            vec![map(vec![
                (
                    Key::from("a"),
                    map(vec![
                        (Key::Index(0), Value::Integer(1)),
                        (Key::Index(1), Value::Integer(2)),
                    ]),
                ),
                (Key::from("b c"), Value::Bool(true)),
                (Key::Index(5), Value::Float(1.5)),
                (Key::Index(6), Value::from("z")),
            ])]
        );
    }

    #[test]
    fn test_unkeyed_entry_follows_largest_index() {
        assert_eq!(
            arguments("@X({1: \"a\", \"b\"})").positional,
            vec![map(vec![
                (Key::Index(1), Value::from("a")),
                (Key::Index(2), Value::from("b")),
            ])]
        );
        assert_eq!(
            arguments("@X({-3: 1, x: 2, 3})").positional,
            vec![map(vec![
                (Key::Index(-3), Value::Integer(1)),
                (Key::from("x"), Value::Integer(2)),
                (Key::Index(0), Value::Integer(3)),
            ])]
        );
    }

    #[test]
    fn test_fully_qualified_directive_names() {
        let symbols: SymbolTable = vec![Symbol::new("App\\Annotation\\Route")]
            .into_iter()
            .collect();
        let results = DocParser::new()
            .parse(
                "/** @\\App\\Annotation\\Route(\"/\") */",
                CONTEXT,
                &symbols,
                &TrustImports,
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "App\\Annotation\\Route");
        assert_eq!(results[0].arguments.positional, vec![Value::from("/")]);

        let results = parse("@::app::routing::Route").unwrap();
        assert_eq!(results[0].name, "app::routing::Route");
    }

    #[test]
    fn test_unresolved_name() {
        let err = parse("@Unknown").unwrap_err();
        match err {
            Error::UnresolvedName { name, context } => {
                assert_eq!(name, "Unknown");
                assert_eq!(context, CONTEXT);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_name_needs_known_type() {
        let mut parser = DocParser::new();
        let err = parser
            .parse("@Route", CONTEXT, &symbols(), &Registry::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedName { .. }));

        let registry: Registry = ["app::routing::Route"].into_iter().collect();
        let results = parser.parse("@Route", CONTEXT, &symbols(), &registry).unwrap();
        assert_eq!(results[0].name, "app::routing::Route");
    }

    #[test]
    fn test_alias_does_not_consult_catalog() {
        let results = DocParser::new()
            .parse("@X", CONTEXT, &symbols(), &Registry::new())
            .unwrap();
        assert_eq!(results[0].name, "fixtures::Foo");
    }

    #[test]
    fn test_missing_close_parenthesis() {
        let err = parse("@X(1").unwrap_err();
        match err {
            Error::Syntax {
                construct,
                expected,
                ..
            } => {
                assert_eq!(construct, "parenthesis");
                assert_eq!(expected, "close-parenthesis");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bare_identifiers_are_not_literals() {
        let err = parse("@X(x, y)").unwrap_err();
        assert!(matches!(err, Error::Syntax { construct: "literal", .. }));
    }

    #[test]
    fn test_unclosed_array() {
        let err = parse("@X({1, 2)").unwrap_err();
        assert!(matches!(err, Error::Syntax { construct: "array", .. }));
    }

    #[test]
    fn test_dangling_marker() {
        let err = parse("text @").unwrap_err();
        assert!(matches!(err, Error::Syntax { construct: "directive", .. }));
    }

    #[test]
    fn test_integer_overflow_is_syntax_error() {
        let err = parse("@X(99999999999999999999)").unwrap_err();
        assert!(matches!(err, Error::Syntax { construct: "literal", .. }));
    }

    #[test]
    fn test_no_directives() {
        assert!(parse("/** Plain documentation only. */").unwrap().is_empty());
        assert!(parse("").unwrap().is_empty());
    }
}
