//! @ai:module:intent Format output for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_lint_result, format_source_results, format_tokens, to_json
//! @ai:module:depends_on linter, reader, token, annotation
//! @ai:module:stateless true

use crate::annotation::ArgumentList;
use crate::linter::{LintResult, Severity};
use crate::reader::DeclarationResults;
use crate::token::Token;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// Parse results of one file, as emitted by `extract`.
#[derive(Debug, Serialize)]
pub struct FileResults<'a> {
    pub path: &'a Path,
    pub declarations: &'a [DeclarationResults],
}

/// @ai:intent Format lint results as a string
/// @ai:effects pure
pub fn format_lint_result(result: &LintResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(result, false),
        OutputFormat::JsonPretty => to_json(result, true),
        OutputFormat::Text => format_lint_result_text(result),
    }
}

/// @ai:intent Format lint results as human-readable text
/// @ai:effects pure
fn format_lint_result_text(result: &LintResult) -> String {
    let mut output = String::new();

    for issue in &result.issues {
        let severity_str = match issue.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warning => "WARN".yellow().bold(),
        };

        let location = format!(
            "{}:{}",
            issue.location.file.display(),
            issue.location.line
        );

        output.push_str(&format!(
            "{} {} - {} ({})\n",
            severity_str,
            location.dimmed(),
            issue.message,
            issue.code.dimmed()
        ));

        if let Some(suggestion) = &issue.suggestion {
            output.push_str(&format!("  {} {}\n", "hint:".cyan(), suggestion));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Checked {} files, {} declarations, {} annotations\n",
        result.files_checked, result.declarations_checked, result.annotations_found
    ));

    if result.errors > 0 {
        output.push_str(&format!(
            "{} errors, {} warnings\n",
            result.errors.to_string().red().bold(),
            result.warnings.to_string().yellow()
        ));
    } else if result.warnings > 0 {
        output.push_str(&format!(
            "{} {} warnings\n",
            "OK".green().bold(),
            result.warnings.to_string().yellow()
        ));
    } else {
        output.push_str(&format!("{} No issues found\n", "OK".green().bold()));
    }

    output
}

/// @ai:intent Format the parse results of scanned files
/// @ai:effects pure
pub fn format_source_results(files: &[FileResults<'_>], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&files, false),
        OutputFormat::JsonPretty => to_json(&files, true),
        OutputFormat::Text => files.iter().map(format_file_results_text).collect(),
    }
}

/// @ai:intent Format one file's parse results as human-readable text
/// @ai:effects pure
fn format_file_results_text(file: &FileResults<'_>) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", file.path.display().to_string().bold()));

    if file.declarations.is_empty() {
        output.push_str(&format!("  {}\n", "no annotations".dimmed()));
    }

    for entry in file.declarations {
        output.push_str(&format!(
            "  {} (line {})\n",
            entry.declaration.context_label().cyan(),
            entry.declaration.location.line
        ));

        for result in &entry.results {
            output.push_str(&format!(
                "    @{}{}\n",
                result.name.green(),
                format_arguments(&result.arguments)
            ));
        }
    }

    output
}

/// @ai:example ([1, 3], {a: 2}) -> "(1, 3, a=2)"
/// @ai:example (placeholder) -> ""
fn format_arguments(arguments: &ArgumentList) -> String {
    if arguments.positional.len() == 1
        && arguments.positional[0].is_null()
        && arguments.named.is_empty()
    {
        return String::new();
    }

    let parts: Vec<String> = arguments
        .positional
        .iter()
        .map(|v| v.to_string())
        .chain(arguments.named.iter().map(|(k, v)| format!("{}={}", k, v)))
        .collect();

    format!("({})", parts.join(", "))
}

/// @ai:intent Format a token dump
/// @ai:effects pure
pub fn format_tokens(tokens: &[Token], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&tokens, false),
        OutputFormat::JsonPretty => to_json(&tokens, true),
        OutputFormat::Text => {
            let mut output = String::new();
            for (idx, token) in tokens.iter().enumerate() {
                output.push_str(&format!(
                    "{:>4}  {:<20} {}\n",
                    idx.to_string().dimmed(),
                    token.kind.to_string(),
                    token.value
                ));
            }
            output
        }
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Key, LiteralMap, Location, Value};
    use crate::lexer::Lexer;
    use crate::linter::LintIssue;

    #[test]
    fn test_format_arguments() {
        let mut args = ArgumentList::default();
        args.positional.push(Value::Integer(1));
        args.positional.push(Value::Integer(3));
        args.set_named("a", Value::Integer(2));
        assert_eq!(format_arguments(&args), "(1, 3, a=2)");

        assert_eq!(format_arguments(&ArgumentList::placeholder()), "");
        assert_eq!(format_arguments(&ArgumentList::default()), "()");
    }

    #[test]
    fn test_tokens_json() {
        let mut lexer: Lexer = Lexer::default();
        lexer.set_input("@X(1)");
        let json = format_tokens(lexer.tokens(), OutputFormat::Json);
        assert!(json.starts_with(r#"[{"kind":"start-annotation","value":"@"}"#));
    }

    #[test]
    fn test_lint_result_json_roundtrip_fields() {
        let mut result = LintResult::default();
        result.issues.push(LintIssue {
            severity: Severity::Error,
            code: "E001".to_string(),
            message: "bad".to_string(),
            location: Location::new("a.rs".into(), 3),
            context: Some("function a".to_string()),
            suggestion: None,
        });
        result.errors = 1;

        let json: serde_json::Value =
            serde_json::from_str(&format_lint_result(&result, OutputFormat::Json)).unwrap();
        assert_eq!(json["errors"], 1);
        assert_eq!(json["issues"][0]["severity"], "error");
        assert_eq!(json["issues"][0]["context"], "function a");
    }

    #[test]
    fn test_map_values_serialize_as_objects() {
        let map: LiteralMap = vec![
            (Key::Name("x".to_string()), Value::Integer(1)),
            (Key::Index(0), Value::Bool(true)),
        ]
        .into_iter()
        .collect();
        assert_eq!(to_json(&Value::Map(map), false), r#"{"x":1,"0":true}"#);
    }
}
