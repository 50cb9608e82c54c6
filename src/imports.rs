//! @ai:module:intent Build symbol tables from the import statements of a source file
//! @ai:module:layer application
//! @ai:module:public_api build_symbol_table, symbols_from_source
//! @ai:module:depends_on language, symbols, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::language::{detect_language, Language};
use crate::symbols::{Symbol, SymbolTable};
use std::path::Path;

/// @ai:intent Scan a file's top-level imports into a symbol table
/// @ai:pre path names an existing file of a supported language
/// @ai:post entries are in declaration order
/// @ai:effects fs:read
pub fn build_symbol_table(path: &Path) -> Result<SymbolTable> {
    if !path.is_file() {
        return Err(Error::InvalidArgument(format!(
            "file '{}' does not exist",
            path.display()
        )));
    }

    let language = detect_language(path)
        .ok_or_else(|| Error::UnsupportedFileType(path.display().to_string()))?;

    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(symbols_from_source(&content, language))
}

/// @ai:intent Extract the symbol table from source text
/// @ai:effects pure
pub fn symbols_from_source(content: &str, language: Language) -> SymbolTable {
    let mut symbols = Vec::new();

    for statement in import_statements(content, language) {
        match language {
            Language::Rust => {
                if let Some(tree) = strip_rust_use(&statement) {
                    expand_use_list(tree, "::", &mut symbols);
                }
            }
            Language::Php => {
                if let Some(tree) = strip_php_use(&statement) {
                    expand_use_list(tree, "\\", &mut symbols);
                }
            }
            Language::Java => symbols.extend(java_import(&statement)),
            Language::Python => python_import(&statement, &mut symbols),
        }
    }

    symbols.into_iter().collect()
}

/// @ai:intent Collect complete top-level import statements, joining continuation lines
/// @ai:effects pure
fn import_statements(content: &str, language: Language) -> Vec<String> {
    let mut statements = Vec::new();
    let mut pending: Option<String> = None;

    for line in content.lines() {
        if let Some(mut statement) = pending.take() {
            statement.push(' ');
            statement.push_str(line.trim());
            if is_complete(&statement, language) {
                statements.push(statement);
            } else {
                pending = Some(statement);
            }
            continue;
        }

        // Indented imports live inside functions or modules and are not file scope.
        if line.starts_with(char::is_whitespace) {
            continue;
        }

        let trimmed = line.trim_end();
        if starts_import(trimmed, language) {
            let statement = trimmed.to_string();
            if is_complete(&statement, language) {
                statements.push(statement);
            } else {
                pending = Some(statement);
            }
        }
    }

    statements
}

fn starts_import(line: &str, language: Language) -> bool {
    match language {
        Language::Rust => strip_visibility(line).starts_with("use "),
        Language::Php => line.starts_with("use "),
        Language::Java => line.starts_with("import "),
        Language::Python => line.starts_with("import ") || line.starts_with("from "),
    }
}

fn is_complete(statement: &str, language: Language) -> bool {
    match language {
        Language::Python => {
            let opens = statement.matches('(').count();
            let closes = statement.matches(')').count();
            opens <= closes && !statement.ends_with('\\')
        }
        _ => statement.contains(';'),
    }
}

/// @ai:intent Remove a leading Rust visibility qualifier
/// @ai:example ("pub(crate) use a::B;") -> "use a::B;"
fn strip_visibility(line: &str) -> &str {
    let Some(rest) = line.strip_prefix("pub") else {
        return line;
    };

    let rest = match rest.strip_prefix('(') {
        Some(inner) => match inner.find(')') {
            Some(close) => &inner[close + 1..],
            None => return line,
        },
        None => rest,
    };

    if rest.starts_with(char::is_whitespace) {
        rest.trim_start()
    } else {
        line
    }
}

fn strip_rust_use(statement: &str) -> Option<&str> {
    let body = strip_visibility(statement).strip_prefix("use ")?;
    Some(body.split(';').next().unwrap_or(body).trim())
}

fn strip_php_use(statement: &str) -> Option<&str> {
    let body = statement.strip_prefix("use ")?.trim_start();
    if body.starts_with("function ") || body.starts_with("const ") {
        return None;
    }
    Some(body.split(';').next().unwrap_or(body).trim())
}

/// @ai:intent Expand a comma-separated list of use trees
fn expand_use_list(list: &str, separator: &str, out: &mut Vec<Symbol>) {
    for tree in split_top_level(list) {
        expand_use_tree("", tree, separator, out);
    }
}

/// @ai:intent Expand one use tree (`a::b::{C, d::E as F, self}`) into symbols
fn expand_use_tree(prefix: &str, tree: &str, separator: &str, out: &mut Vec<Symbol>) {
    let tree = tree.trim().trim_start_matches(separator);
    if tree.is_empty() {
        return;
    }

    if let (Some(open), Some(close)) = (tree.find('{'), tree.rfind('}')) {
        if open < close {
            let base = tree[..open].trim().trim_end_matches(separator);
            let nested_prefix = join_path(prefix, base, separator);
            for part in split_top_level(&tree[open + 1..close]) {
                expand_use_tree(&nested_prefix, part, separator, out);
            }
        }
        return;
    }

    let (path, alias) = match tree.split_once(" as ") {
        Some((path, alias)) => (path.trim(), Some(alias.trim())),
        None => (tree, None),
    };

    if path == "*" || path.ends_with(&format!("{}*", separator)) || alias == Some("_") {
        return;
    }

    let full = if path == "self" {
        prefix.to_string()
    } else {
        join_path(prefix, path, separator)
    };
    if full.is_empty() {
        return;
    }

    out.push(match alias {
        Some(alias) => Symbol::aliased(full, alias),
        None => Symbol::new(full),
    });
}

fn join_path(prefix: &str, path: &str, separator: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}{}{}", prefix, separator, path),
    }
}

/// @ai:intent Split on commas that are not nested inside braces or parentheses
/// @ai:example ("a, b::{c, d}") -> ["a", "b::{c, d}"]
fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, ch) in list.char_indices() {
        match ch {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(list[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// `import a.b.C;` and `import static a.b.C.member;`
fn java_import(statement: &str) -> Option<Symbol> {
    let body = statement.strip_prefix("import ")?.trim_start();
    let body = body.strip_prefix("static ").unwrap_or(body);
    let path = body.split(';').next()?.trim();

    if path.is_empty() || path.ends_with(".*") {
        return None;
    }
    Some(Symbol::new(path))
}

/// `import a.b as c, d` and `from a.b import (C, D as E)`
fn python_import(statement: &str, out: &mut Vec<Symbol>) {
    let cleaned: String = statement
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '\\'))
        .collect();
    let cleaned = cleaned.split('#').next().unwrap_or_default().trim();

    if let Some(body) = cleaned.strip_prefix("import ") {
        for part in split_top_level(body) {
            match part.split_once(" as ") {
                Some((path, alias)) => out.push(Symbol::aliased(path.trim(), alias.trim())),
                None => out.push(Symbol::new(part)),
            }
        }
        return;
    }

    let Some(body) = cleaned.strip_prefix("from ") else {
        return;
    };
    let Some((module, names)) = body.split_once(" import ") else {
        return;
    };
    let module = module.trim();

    for part in split_top_level(names) {
        let (name, alias) = match part.split_once(" as ") {
            Some((name, alias)) => (name.trim(), Some(alias.trim())),
            None => (part, None),
        };
        if name == "*" {
            continue;
        }

        let full = if module.ends_with('.') {
            format!("{}{}", module, name)
        } else {
            format!("{}.{}", module, name)
        };
        out.push(match alias {
            Some(alias) => Symbol::aliased(full, alias),
            None => Symbol::new(full),
        });
    }
}
