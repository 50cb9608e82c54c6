//! @ai:module:intent Define language-specific comment and naming conventions
//! @ai:module:layer domain
//! @ai:module:public_api Language, CommentStyle, detect_language, is_supported_file
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Represents a supported programming language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    Java,
    Php,
}

/// @ai:intent Documentation comment syntax for a language
#[derive(Debug, Clone)]
pub struct CommentStyle {
    /// Line prefixes that mark documentation (`///`).
    pub doc_line: Vec<&'static str>,
    /// Line prefixes that look like `doc_line` but are plain comments (`////`).
    pub not_doc_line: Vec<&'static str>,
    pub doc_block_start: Option<&'static str>,
    pub doc_block_end: Option<&'static str>,
    pub block_line_prefix: Option<&'static str>,
    /// Plain comment prefixes; such lines keep a pending doc block alive.
    pub comment_line: Vec<&'static str>,
    /// Attribute or decorator prefixes that may sit between docs and a declaration.
    pub attribute_prefix: Vec<&'static str>,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Rust, Language::Python, Language::Java, Language::Php];

    /// @ai:intent Get the comment style for this language
    /// @ai:effects pure
    pub fn comment_style(&self) -> CommentStyle {
        match self {
            Language::Rust => CommentStyle {
                doc_line: vec!["///"],
                not_doc_line: vec!["////"],
                doc_block_start: Some("/**"),
                doc_block_end: Some("*/"),
                block_line_prefix: Some("*"),
                comment_line: vec!["//", "/*"],
                attribute_prefix: vec!["#["],
            },
            Language::Python => CommentStyle {
                doc_line: vec!["#"],
                not_doc_line: vec!["#!"],
                doc_block_start: None,
                doc_block_end: None,
                block_line_prefix: None,
                comment_line: vec![],
                attribute_prefix: vec!["@"],
            },
            Language::Java => CommentStyle {
                doc_line: vec![],
                not_doc_line: vec![],
                doc_block_start: Some("/**"),
                doc_block_end: Some("*/"),
                block_line_prefix: Some("*"),
                comment_line: vec!["//", "/*"],
                attribute_prefix: vec!["@"],
            },
            Language::Php => CommentStyle {
                doc_line: vec![],
                not_doc_line: vec![],
                doc_block_start: Some("/**"),
                doc_block_end: Some("*/"),
                block_line_prefix: Some("*"),
                comment_line: vec!["//", "/*", "#"],
                attribute_prefix: vec!["#["],
            },
        }
    }

    /// @ai:intent Get file extensions for this language
    /// @ai:effects pure
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Rust => &["rs"],
            Language::Python => &["py", "pyi"],
            Language::Java => &["java"],
            Language::Php => &["php"],
        }
    }

    /// @ai:intent Get language name as string
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::Java => "java",
            Language::Php => "php",
        }
    }

    /// @ai:intent Separator between namespace segments in import paths
    /// @ai:effects pure
    pub fn namespace_separator(&self) -> &'static str {
        match self {
            Language::Rust => "::",
            Language::Python | Language::Java => ".",
            Language::Php => "\\",
        }
    }

    /// @ai:intent Whether block structure is delimited by braces (vs indentation)
    pub fn uses_braces(&self) -> bool {
        !matches!(self, Language::Python)
    }
}

/// @ai:intent Detect the programming language from a file path
/// @ai:example ("test.rs") -> Some(Rust)
/// @ai:example ("Test.java") -> Some(Java)
/// @ai:example ("test.txt") -> None
/// @ai:effects pure
pub fn detect_language(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?;

    Language::ALL
        .into_iter()
        .find(|lang| lang.extensions().contains(&ext))
}

/// @ai:intent Check if a file should be scanned based on extension
/// @ai:effects pure
pub fn is_supported_file(path: &Path) -> bool {
    detect_language(path).is_some()
}
