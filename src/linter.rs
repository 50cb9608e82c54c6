//! @ai:module:intent Check the annotations of source files without constructing them
//! @ai:module:layer application
//! @ai:module:public_api lint_file, lint_source, lint_directory, LintConfig, LintResult, LintIssue, Severity
//! @ai:module:depends_on extractor, parser, registry, error
//! @ai:module:stateless true

use crate::annotation::Location;
use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::extractor::{scan_file, SourceFile};
use crate::parser::DocParser;
use crate::registry::TypeCatalog;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// @ai:intent Severity level for lint issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
}

/// @ai:intent A single lint issue found in the code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub location: Location,
    /// Context label of the declaration, when the issue belongs to one.
    pub context: Option<String>,
    pub suggestion: Option<String>,
}

/// @ai:intent Configuration for the linter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Report unresolved names as W001 instead of E002.
    pub unresolved_as_warning: bool,
    pub warn_duplicate_annotations: bool,
}

impl LintConfig {
    /// @ai:intent Create a strict lint configuration
    pub fn strict() -> Self {
        Self {
            unresolved_as_warning: false,
            warn_duplicate_annotations: true,
        }
    }
}

/// @ai:intent Result of linting a file or directory
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LintResult {
    pub files_checked: usize,
    pub declarations_checked: usize,
    pub annotations_found: usize,
    pub issues: Vec<LintIssue>,
    pub errors: usize,
    pub warnings: usize,
}

impl LintResult {
    /// @ai:intent Check if linting passed (no errors)
    pub fn passed(&self) -> bool {
        self.errors == 0
    }

    /// @ai:intent Merge another lint result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.files_checked += other.files_checked;
        self.declarations_checked += other.declarations_checked;
        self.annotations_found += other.annotations_found;
        self.issues.extend(other.issues);
        self.errors += other.errors;
        self.warnings += other.warnings;
    }

    fn push(&mut self, issue: LintIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.issues.push(issue);
    }
}

/// @ai:intent Lint a single file
/// @ai:effects fs:read
pub fn lint_file<C: Classifier>(
    path: &Path,
    parser: &mut DocParser<C>,
    catalog: &dyn TypeCatalog,
    config: &LintConfig,
) -> Result<LintResult> {
    let source = scan_file(path)?;
    Ok(lint_source(&source, parser, catalog, config))
}

/// @ai:intent Lint all supported files in a directory
/// @ai:post unreadable files become E000 issues instead of aborting the walk
/// @ai:effects fs:read
pub fn lint_directory<C: Classifier>(
    path: &Path,
    parser: &mut DocParser<C>,
    catalog: &dyn TypeCatalog,
    config: &LintConfig,
) -> Result<LintResult> {
    if !path.exists() {
        return Err(Error::InvalidArgument(format!(
            "path '{}' does not exist",
            path.display()
        )));
    }

    let mut result = LintResult::default();

    for entry in WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let file_path = entry.path();

        if crate::language::is_supported_file(file_path) {
            match lint_file(file_path, parser, catalog, config) {
                Ok(file_result) => result.merge(file_result),
                Err(e) => {
                    tracing::warn!(path = %file_path.display(), error = %e, "skipping file");
                    result.push(LintIssue {
                        severity: Severity::Error,
                        code: "E000".to_string(),
                        message: format!("Failed to scan file: {}", e),
                        location: Location::new(file_path.to_path_buf(), 0),
                        context: None,
                        suggestion: None,
                    });
                }
            }
        }
    }

    Ok(result)
}

/// @ai:intent Lint a scanned file
/// @ai:effects pure
pub fn lint_source<C: Classifier>(
    source: &SourceFile,
    parser: &mut DocParser<C>,
    catalog: &dyn TypeCatalog,
    config: &LintConfig,
) -> LintResult {
    let mut result = LintResult {
        files_checked: 1,
        declarations_checked: source.declarations.len(),
        ..Default::default()
    };

    for declaration in source.annotated() {
        let context = declaration.context_label();
        let issue = |severity, code: &str, message: String, suggestion: Option<String>| LintIssue {
            severity,
            code: code.to_string(),
            message,
            location: declaration.location.clone(),
            context: Some(context.clone()),
            suggestion,
        };

        match parser.parse(
            declaration.documentation_text(),
            &context,
            &source.symbols,
            catalog,
        ) {
            Ok(results) => {
                result.annotations_found += results.len();

                if config.warn_duplicate_annotations {
                    let mut seen = HashSet::new();
                    for parsed in &results {
                        if !seen.insert(parsed.name.as_str()) {
                            result.push(issue(
                                Severity::Warning,
                                "W002",
                                format!("Annotation {} appears more than once", parsed.name),
                                None,
                            ));
                        }
                    }
                }
            }
            Err(Error::UnresolvedName { name, .. }) => {
                let (severity, code) = if config.unresolved_as_warning {
                    (Severity::Warning, "W001")
                } else {
                    (Severity::Error, "E002")
                };
                result.push(issue(
                    severity,
                    code,
                    format!("Annotation @{} does not resolve to a known type", name),
                    Some(format!(
                        "Import the type behind @{} or add it to the ignored names",
                        name
                    )),
                ));
            }
            Err(e @ Error::Syntax { .. }) => {
                result.push(issue(Severity::Error, "E001", e.to_string(), None));
            }
            Err(e) => {
                result.push(issue(Severity::Error, "E000", e.to_string(), None));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::registry::{Registry, TrustImports};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const SOURCE: &str = r#"use app::Route;

/// @Route("/a")
/// @Route("/b")
fn twice() {}

/// @Route("/c"
fn broken() {}

/// @Unknown
fn unknown() {}

fn plain() {}
"#;

    fn source() -> SourceFile {
        crate::extractor::scan_source(SOURCE, Language::Rust, Path::new("routes.rs"))
    }

    #[test]
    fn test_lint_reports_syntax_and_unresolved() {
        let mut parser = DocParser::new();
        let result = lint_source(&source(), &mut parser, &TrustImports, &LintConfig::default());

        assert_eq!(result.declarations_checked, 4);
        assert_eq!(result.annotations_found, 2);
        assert_eq!(result.errors, 2);
        assert_eq!(result.warnings, 0);

        let codes: Vec<&str> = result.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["E001", "E002"]);
        assert_eq!(result.issues[0].context.as_deref(), Some("function broken"));
        assert!(!result.passed());
    }

    #[test]
    fn test_lint_strict_warns_on_duplicates() {
        let mut parser = DocParser::new();
        let config = LintConfig {
            unresolved_as_warning: true,
            ..LintConfig::strict()
        };
        let result = lint_source(&source(), &mut parser, &TrustImports, &config);

        let codes: Vec<&str> = result.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["W002", "E001", "W001"]);
        assert_eq!(result.errors, 1);
        assert_eq!(result.warnings, 2);
    }

    #[test]
    fn test_lint_file_with_registry() {
        let mut file = NamedTempFile::with_suffix(".rs").unwrap();
        writeln!(file, "use app::Route;\n\n/// @Route\nfn f() {{}}").unwrap();

        let mut parser = DocParser::new();
        let registry = Registry::new();
        let result =
            lint_file(file.path(), &mut parser, &registry, &LintConfig::default()).unwrap();
        assert_eq!(result.errors, 1);

        let registry: Registry = ["app::Route"].into_iter().collect();
        let result =
            lint_file(file.path(), &mut parser, &registry, &LintConfig::default()).unwrap();
        assert!(result.passed());
        assert_eq!(result.annotations_found, 1);
    }

    #[test]
    fn test_lint_directory_walks_supported_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.rs"), "/// @Missing\nfn a() {}\n").unwrap();
        std::fs::write(dir.path().join("b.py"), "# @param x\ndef b():\n    pass\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "@Missing").unwrap();

        let mut parser = DocParser::new();
        let result =
            lint_directory(dir.path(), &mut parser, &TrustImports, &LintConfig::default())
                .unwrap();

        assert_eq!(result.files_checked, 2);
        assert_eq!(result.errors, 1);
        assert_eq!(result.issues[0].code, "E002");
    }

    #[test]
    fn test_lint_directory_missing_path() {
        let mut parser = DocParser::new();
        let err = lint_directory(
            Path::new("/no/such/dir"),
            &mut parser,
            &TrustImports,
            &LintConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
