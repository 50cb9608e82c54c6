//! @ai:module:intent Turn the documentation of scanned declarations into annotation instances
//! @ai:module:layer application
//! @ai:module:public_api AnnotationReader, Annotation, DeclarationResults, parse_source, parse_files
//! @ai:module:depends_on parser, extractor, registry, annotation, error
//! @ai:module:stateless false

use crate::annotation::ParseResult;
use crate::classifier::{AnnotationClassifier, Classifier};
use crate::error::{Error, Result};
use crate::extractor::{scan_file, Declaration, SourceFile};
use crate::parser::DocParser;
use crate::registry::{Host, TypeCatalog};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// @ai:intent Parse results of one declaration
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationResults {
    pub declaration: Declaration,
    pub results: Vec<ParseResult>,
}

/// @ai:intent Parse every annotated declaration of a scanned file without constructing anything
/// @ai:post declarations without any `@` in their documentation are skipped
/// @ai:effects pure
pub fn parse_source<C: Classifier>(
    parser: &mut DocParser<C>,
    source: &SourceFile,
    catalog: &dyn TypeCatalog,
) -> Result<Vec<DeclarationResults>> {
    source
        .annotated()
        .map(|declaration| {
            let results = parser.parse(
                declaration.documentation_text(),
                &declaration.context_label(),
                &source.symbols,
                catalog,
            )?;
            Ok(DeclarationResults {
                declaration: declaration.clone(),
                results,
            })
        })
        .collect()
}

/// @ai:intent Scan and parse several files, leaving out the ones that fail
/// @ai:post a file that cannot be read or parsed is logged and skipped
pub fn parse_files<C: Classifier>(
    parser: &mut DocParser<C>,
    files: &[PathBuf],
    catalog: &dyn TypeCatalog,
) -> Vec<(PathBuf, Vec<DeclarationResults>)> {
    files
        .iter()
        .filter_map(|file| {
            match scan_file(file).and_then(|source| parse_source(parser, &source, catalog)) {
                Ok(declarations) => Some((file.clone(), declarations)),
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "skipping file");
                    None
                }
            }
        })
        .collect()
}

/// @ai:intent A constructed annotation attached to a declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation<I> {
    pub type_name: String,
    pub context: String,
    pub instance: I,
}

/// @ai:intent Parser plus host: reads annotations the way application code consumes them
#[derive(Debug)]
pub struct AnnotationReader<H, C = AnnotationClassifier> {
    parser: DocParser<C>,
    host: H,
}

impl<H: Host> AnnotationReader<H> {
    pub fn new(host: H) -> Self {
        Self::with_parser(DocParser::new(), host)
    }
}

impl<H: Host, C: Classifier> AnnotationReader<H, C> {
    pub fn with_parser(parser: DocParser<C>, host: H) -> Self {
        Self { parser, host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn parser(&self) -> &DocParser<C> {
        &self.parser
    }

    /// @ai:intent Parse one declaration's documentation against the file's imports
    pub fn parse_declaration(
        &mut self,
        source: &SourceFile,
        declaration: &Declaration,
    ) -> Result<Vec<ParseResult>> {
        self.parser.parse(
            declaration.documentation_text(),
            &declaration.context_label(),
            &source.symbols,
            &self.host,
        )
    }

    /// @ai:intent Construct every annotation of one declaration, in source order
    /// @ai:post a failing construction aborts the whole declaration
    pub fn annotations_for(
        &mut self,
        source: &SourceFile,
        declaration: &Declaration,
    ) -> Result<Vec<Annotation<H::Instance>>> {
        let results = self.parse_declaration(source, declaration)?;

        results
            .into_iter()
            .map(|result| self.construct(result))
            .collect()
    }

    /// @ai:intent First annotation of the given fully qualified type on a declaration
    /// @ai:post None when the declaration carries no such annotation
    pub fn annotation_for(
        &mut self,
        source: &SourceFile,
        declaration: &Declaration,
        type_name: &str,
    ) -> Result<Option<H::Instance>> {
        let results = self.parse_declaration(source, declaration)?;

        match results.into_iter().find(|r| r.name == type_name) {
            Some(result) => Ok(Some(self.construct(result)?.instance)),
            None => Ok(None),
        }
    }

    /// @ai:intent Annotations of every annotated declaration in a scanned file
    pub fn read_source(
        &mut self,
        source: &SourceFile,
    ) -> Result<Vec<(Declaration, Vec<Annotation<H::Instance>>)>> {
        let mut all = Vec::new();
        for declaration in source.annotated() {
            let annotations = self.annotations_for(source, declaration)?;
            if !annotations.is_empty() {
                all.push((declaration.clone(), annotations));
            }
        }
        Ok(all)
    }

    /// @ai:intent Scan a file and read its annotations
    /// @ai:effects fs:read
    pub fn read_file(
        &mut self,
        path: &Path,
    ) -> Result<Vec<(Declaration, Vec<Annotation<H::Instance>>)>> {
        let source = scan_file(path)?;
        self.read_source(&source)
    }

    fn construct(&self, result: ParseResult) -> Result<Annotation<H::Instance>> {
        let instance = self
            .host
            .construct(&result.name, &result.arguments)
            .map_err(|message| Error::Construction {
                name: result.name.clone(),
                context: result.context.clone(),
                message,
            })?;

        Ok(Annotation {
            type_name: result.name,
            context: result.context,
            instance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Value;
    use crate::language::Language;
    use crate::registry::{Instance, Registry, TrustImports};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SOURCE: &str = r#"use app::routing::Route;
use app::cache::Cached as Cache;

/// @Route("/home", name="home")
/// @Cache(60)
/// @param unused
pub struct Home;

impl Home {
    /// @Route("/index")
    pub fn index(&self) {}

    /// @Missing
    pub fn broken(&self) {}
}
"#;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("app::routing::Route");
        registry.register_with("app::cache::Cached", |args| match args {
            [Value::Integer(ttl)] => Ok(Value::Integer(*ttl)),
            _ => Err("expected a single ttl".to_string()),
        });
        registry
    }

    fn source() -> SourceFile {
        crate::extractor::scan_source(SOURCE, Language::Rust, Path::new("home.rs"))
    }

    #[test]
    fn test_annotations_for_type() {
        let source = source();
        let home = source.find("type Home").unwrap();
        let mut reader = AnnotationReader::new(registry());

        let annotations = reader.annotations_for(&source, home).unwrap();
        assert_eq!(
            annotations,
            vec![
                Annotation {
                    type_name: "app::routing::Route".to_string(),
                    context: "type Home".to_string(),
                    instance: Instance {
                        type_name: "app::routing::Route".to_string(),
                        state: Value::Null,
                    },
                },
                Annotation {
                    type_name: "app::cache::Cached".to_string(),
                    context: "type Home".to_string(),
                    instance: Instance {
                        type_name: "app::cache::Cached".to_string(),
                        state: Value::Integer(60),
                    },
                },
            ]
        );
    }

    #[test]
    fn test_annotation_for_finds_first_of_type() {
        let source = source();
        let index = source.find("method Home::index").unwrap();
        let mut reader = AnnotationReader::new(registry());

        let route = reader
            .annotation_for(&source, index, "app::routing::Route")
            .unwrap();
        assert!(route.is_some());

        let cache = reader
            .annotation_for(&source, index, "app::cache::Cached")
            .unwrap();
        assert!(cache.is_none());
    }

    #[test]
    fn test_unresolved_name_propagates() {
        let source = source();
        let broken = source.find("method Home::broken").unwrap();
        let mut reader = AnnotationReader::new(registry());

        let err = reader.annotations_for(&source, broken).unwrap_err();
        assert!(matches!(err, Error::UnresolvedName { ref name, .. } if name == "Missing"));
        assert!(reader.read_source(&source).is_err());
    }

    #[test]
    fn test_construction_failure_is_reported() {
        let mut file = NamedTempFile::with_suffix(".rs").unwrap();
        writeln!(file, "use app::cache::Cached;\n\n/// @Cached(\"soon\")\nfn f() {{}}").unwrap();

        let mut reader = AnnotationReader::new(registry());
        let err = reader.read_file(file.path()).unwrap_err();
        match err {
            Error::Construction {
                name,
                context,
                message,
            } => {
                assert_eq!(name, "app::cache::Cached");
                assert_eq!(context, "function f");
                assert_eq!(message, "expected a single ttl");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_source_with_trusted_imports() {
        let source = source();
        let mut parser = DocParser::new();
        let err = parse_source(&mut parser, &source, &TrustImports).unwrap_err();
        assert!(matches!(err, Error::UnresolvedName { .. }));

        let only_type = SourceFile {
            declarations: source.declarations[..1].to_vec(),
            ..source.clone()
        };
        let parsed = parse_source(&mut parser, &only_type, &TrustImports).unwrap();
        assert_eq!(parsed.len(), 1);
        let names: Vec<&str> = parsed[0].results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["app::routing::Route", "app::cache::Cached"]);
    }

    #[test]
    fn test_parse_files_skips_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.rs");
        let bad = dir.path().join("bad.rs");
        std::fs::write(&good, "use app::routing::Route;\n\n/// @Route(\"/\")\npub struct Home;\n")
            .unwrap();
        std::fs::write(&bad, "/// @Missing\nfn f() {}\n").unwrap();
        let missing = dir.path().join("missing.rs");

        let mut parser = DocParser::new();
        let parsed = parse_files(
            &mut parser,
            &[bad.clone(), good.clone(), missing],
            &TrustImports,
        );

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0, good);
        assert_eq!(parsed[0].1.len(), 1);
        assert_eq!(parsed[0].1[0].results[0].name, "app::routing::Route");
    }
}
