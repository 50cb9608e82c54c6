//! @ai:module:intent Parse constructor-style annotations embedded in documentation comments
//! @ai:module:layer infrastructure
//! @ai:module:public_api lexer, parser, symbols, registry, extractor, reader, linter, output, config, error
//! @ai:module:stateless true
//!
//! # docanno
//!
//! A lexer and recursive-descent parser for annotations such as
//! `@Route("/home", name="home", methods={"GET", "POST"})` written inside
//! documentation comments. Directive names are resolved against the imports of
//! the file the comment lives in, and a host constructs the resulting instances.
//!
//! ## Example
//!
//! ```rust,no_run
//! use docanno_parser::{extractor, AnnotationReader, Registry};
//! use std::path::Path;
//!
//! let mut registry = Registry::new();
//! registry.register("app::routing::Route");
//!
//! let source = extractor::scan_file(Path::new("src/home.rs")).unwrap();
//! let mut reader = AnnotationReader::new(registry);
//! for (declaration, annotations) in reader.read_source(&source).unwrap() {
//!     for annotation in annotations {
//!         println!("{} on {}", annotation.type_name, declaration.context_label());
//!     }
//! }
//! ```
//!
//! Parsing a single comment block directly:
//!
//! ```rust
//! use docanno_parser::{DocParser, Symbol, SymbolTable, TrustImports, Value};
//!
//! let symbols: SymbolTable = vec![Symbol::new("app::routing::Route")].into_iter().collect();
//! let mut parser = DocParser::new();
//! let results = parser
//!     .parse("/** @Route(-1, name=\"home\") */", "type Home", &symbols, &TrustImports)
//!     .unwrap();
//!
//! assert_eq!(results[0].name, "app::routing::Route");
//! assert_eq!(results[0].arguments.positional, vec![Value::Integer(-1)]);
//! ```

pub mod annotation;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ignore;
pub mod imports;
pub mod language;
pub mod lexer;
pub mod linter;
pub mod output;
pub mod parser;
pub mod reader;
pub mod registry;
pub mod symbols;
pub mod token;

pub use annotation::{ArgumentList, Key, LiteralMap, Location, ParseResult, Value};
pub use classifier::{AnnotationClassifier, Classifier};
pub use config::Config;
pub use error::{Error, Result};
pub use extractor::{scan_file, scan_source, Declaration, DeclarationKind, SourceFile};
pub use ignore::{IgnoredNames, DEFAULT_IGNORED_NAMES};
pub use imports::{build_symbol_table, symbols_from_source};
pub use language::{detect_language, is_supported_file, Language};
pub use lexer::Lexer;
pub use linter::{lint_directory, lint_file, LintConfig, LintIssue, LintResult, Severity};
pub use output::{format_lint_result, format_source_results, format_tokens, to_json, OutputFormat};
pub use parser::DocParser;
pub use reader::{parse_files, parse_source, Annotation, AnnotationReader, DeclarationResults};
pub use registry::{Host, Instance, Registry, TrustImports, TypeCatalog};
pub use symbols::{resolve, short_name, Resolution, Symbol, SymbolTable};
pub use token::{Token, TokenKind};
