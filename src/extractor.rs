//! @ai:module:intent Locate declarations and their documentation comments in source files
//! @ai:module:layer application
//! @ai:module:public_api scan_file, scan_source, Declaration, DeclarationKind, SourceFile
//! @ai:module:depends_on language, imports, annotation, error
//! @ai:module:stateless true

use crate::annotation::Location;
use crate::error::{Error, Result};
use crate::imports::symbols_from_source;
use crate::language::{detect_language, CommentStyle, Language};
use crate::symbols::SymbolTable;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// @ai:intent The kind of program element a comment documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Type,
    Function,
    Method,
    Field,
}

/// @ai:intent A declaration together with the documentation comment preceding it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    /// Enclosing type for methods and fields.
    pub owner: Option<String>,
    pub location: Location,
    /// Comment text with the comment markers removed; empty when undocumented.
    pub documentation: String,
}

impl Declaration {
    /// @ai:intent Human-readable name of the declaration, used as the parse context
    /// @ai:example (Method bar of Foo) -> "method Foo::bar"
    /// @ai:effects pure
    pub fn context_label(&self) -> String {
        let qualified = match &self.owner {
            Some(owner) => format!("{}::{}", owner, self.name),
            None => self.name.clone(),
        };
        match self.kind {
            DeclarationKind::Type => format!("type {}", qualified),
            DeclarationKind::Function => format!("function {}", qualified),
            DeclarationKind::Method => format!("method {}", qualified),
            DeclarationKind::Field => format!("field {}", qualified),
        }
    }

    /// @ai:intent Comment block associated with the declaration; may be empty
    pub fn documentation_text(&self) -> &str {
        &self.documentation
    }

    /// @ai:intent Cheap check whether the comment may contain any directive
    pub fn has_annotations(&self) -> bool {
        self.documentation.contains('@')
    }
}

/// @ai:intent Everything annotation reading needs from one file
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    pub symbols: SymbolTable,
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    /// @ai:intent Find a declaration by its context label
    pub fn find(&self, context_label: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.context_label() == context_label)
    }

    pub fn annotated(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.has_annotations())
    }
}

/// @ai:intent Read and scan a source file
/// @ai:pre path exists and is a supported file type
/// @ai:effects fs:read
pub fn scan_file(path: &Path) -> Result<SourceFile> {
    let language = detect_language(path)
        .ok_or_else(|| Error::UnsupportedFileType(path.display().to_string()))?;

    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(scan_source(&content, language, path))
}

/// @ai:intent Scan source text for imports and documented declarations
/// @ai:effects pure
pub fn scan_source(content: &str, language: Language, path: &Path) -> SourceFile {
    tracing::trace!(path = %path.display(), language = language.name(), "scanning source");

    SourceFile {
        path: path.to_path_buf(),
        language,
        symbols: symbols_from_source(content, language),
        declarations: Scanner::new(language, path).run(content),
    }
}

/// Declaration patterns for one language. Names are always in the last capture group.
struct Patterns {
    /// Captures the keyword (1) and the name (2).
    type_decl: Regex,
    /// Type keywords whose bodies hold fields.
    field_owners: &'static [&'static str],
    function: Option<Regex>,
    method: Option<Regex>,
    field: Option<Regex>,
    /// Blocks whose bodies are scanned like the file scope (`mod x {`, `namespace X {`).
    module: Option<Regex>,
    impl_block: Option<Regex>,
}

const RUST_VIS: &str = r"(?:pub(?:\([^)]*\))?\s+)?";
const JAVA_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "new", "throw", "else",
    "do", "try",
];

impl Patterns {
    fn for_language(language: Language) -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("Invalid regex");

        match language {
            Language::Rust => {
                let function = format!(
                    r#"^{}(?:(?:default|const|async|unsafe|extern(?:\s+"[^"]*")?)\s+)*fn\s+([A-Za-z_][A-Za-z0-9_]*)"#,
                    RUST_VIS
                );
                Self {
                    type_decl: re(&format!(
                        r"^{}(struct|enum|trait|union|type)\s+([A-Za-z_][A-Za-z0-9_]*)",
                        RUST_VIS
                    )),
                    field_owners: &["struct", "union"],
                    function: Some(re(&function)),
                    method: Some(re(&function)),
                    field: Some(re(&format!(
                        r"^{}([A-Za-z_][A-Za-z0-9_]*)\s*:(?:[^:]|$)",
                        RUST_VIS
                    ))),
                    module: Some(re(&format!(r"^{}mod\s+[A-Za-z_][A-Za-z0-9_]*\s*\{{", RUST_VIS))),
                    impl_block: Some(re(r"^(?:unsafe\s+)?impl\b")),
                }
            }
            Language::Java => Self {
                type_decl: re(
                    r"^(?:(?:public|protected|private|static|abstract|final|sealed|non-sealed|strictfp)\s+)*(class|interface|enum|record|@interface)\s+([A-Za-z_][A-Za-z0-9_]*)",
                ),
                field_owners: &["class"],
                function: None,
                method: Some(re(r"^(?:[\w.<>\[\],?]+\s+)*([A-Za-z_]\w*)\s*\(")),
                field: Some(re(r"^[\w.<>\[\],?\s]+\s([A-Za-z_]\w*)\s*(?:=|;)")),
                module: None,
                impl_block: None,
            },
            Language::Php => {
                let function =
                    r"^(?:(?:public|protected|private|static|abstract|final)\s+)*function\s+&?([A-Za-z_]\w*)";
                Self {
                    type_decl: re(
                        r"^(?:(?:abstract|final|readonly)\s+)*(class|interface|trait|enum)\s+([A-Za-z_]\w*)",
                    ),
                    field_owners: &["class", "trait"],
                    function: Some(re(function)),
                    method: Some(re(function)),
                    field: Some(re(
                        r"^(?:(?:public|protected|private|static|readonly|var)\s+)+(?:\??[\w\\|]+\s+)?\$([A-Za-z_]\w*)",
                    )),
                    module: Some(re(r"^namespace\b[^;]*\{")),
                    impl_block: None,
                }
            }
            Language::Python => Self {
                type_decl: re(r"^(class)\s+([A-Za-z_]\w*)"),
                field_owners: &[],
                function: Some(re(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)")),
                method: Some(re(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)")),
                field: None,
                module: None,
                impl_block: None,
            },
        }
    }
}

fn last_capture(re: &Regex, line: &str) -> Option<String> {
    let captures = re.captures(line)?;
    captures
        .iter()
        .flatten()
        .last()
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone)]
enum ScopeKind {
    Module,
    Owner { name: String, fields: bool },
}

#[derive(Debug)]
struct Scope {
    body_depth: usize,
    kind: ScopeKind,
}

#[derive(Debug)]
struct PythonClass {
    name: String,
    body_indent: Option<usize>,
}

/// Line-oriented declaration scanner.
struct Scanner<'a> {
    language: Language,
    style: CommentStyle,
    patterns: Patterns,
    path: &'a Path,
    doc: Option<Vec<String>>,
    doc_block: Option<Vec<String>>,
    in_comment: bool,
    depth: usize,
    scopes: Vec<Scope>,
    pending_scope: Option<ScopeKind>,
    python_class: Option<PythonClass>,
    declarations: Vec<Declaration>,
}

impl<'a> Scanner<'a> {
    fn new(language: Language, path: &'a Path) -> Self {
        Self {
            language,
            style: language.comment_style(),
            patterns: Patterns::for_language(language),
            path,
            doc: None,
            doc_block: None,
            in_comment: false,
            depth: 0,
            scopes: Vec::new(),
            pending_scope: None,
            python_class: None,
            declarations: Vec::new(),
        }
    }

    fn run(mut self, content: &str) -> Vec<Declaration> {
        for (idx, line) in content.lines().enumerate() {
            self.line(line, idx + 1);
        }
        self.declarations
    }

    fn line(&mut self, line: &str, number: usize) {
        let trimmed = line.trim();

        if self.doc_block.is_some() {
            self.continue_doc_block(trimmed);
            return;
        }

        if self.in_comment {
            if trimmed.contains("*/") {
                self.in_comment = false;
            }
            return;
        }

        if trimmed.is_empty() {
            return;
        }

        if self.start_doc_block(trimmed) {
            return;
        }

        if let Some(text) = self.doc_line(trimmed) {
            self.doc.get_or_insert_with(Vec::new).push(text.to_string());
            return;
        }

        if self.style.attribute_prefix.iter().any(|p| trimmed.starts_with(p)) {
            return;
        }

        if self.style.comment_line.iter().any(|p| trimmed.starts_with(p)) {
            if trimmed.starts_with("/*") && !trimmed.contains("*/") {
                self.in_comment = true;
            }
            return;
        }

        let doc = self.doc.take();
        if self.language.uses_braces() {
            self.code_line(line, trimmed, number, doc);
        } else {
            self.python_line(line, trimmed, number, doc);
        }
    }

    fn start_doc_block(&mut self, trimmed: &str) -> bool {
        let (Some(start), Some(end)) = (self.style.doc_block_start, self.style.doc_block_end) else {
            return false;
        };
        let Some(rest) = trimmed.strip_prefix(start) else {
            return false;
        };
        // `/**/` is an empty plain comment
        if rest.starts_with('/') {
            return false;
        }

        match rest.find(end) {
            Some(pos) => self.doc = Some(vec![rest[..pos].trim().to_string()]),
            None => self.doc_block = Some(vec![rest.trim().to_string()]),
        }
        true
    }

    fn continue_doc_block(&mut self, trimmed: &str) {
        let end = self.style.doc_block_end.unwrap_or("*/");
        let (text, closed) = match trimmed.find(end) {
            Some(pos) => (&trimmed[..pos], true),
            None => (trimmed, false),
        };

        let text = match self.style.block_line_prefix {
            Some(prefix) => text.strip_prefix(prefix).unwrap_or(text),
            None => text,
        };

        if let Some(block) = self.doc_block.as_mut() {
            block.push(text.trim().to_string());
        }
        if closed {
            self.doc = self.doc_block.take();
        }
    }

    fn doc_line<'l>(&self, trimmed: &'l str) -> Option<&'l str> {
        if self.style.not_doc_line.iter().any(|p| trimmed.starts_with(p)) {
            return None;
        }
        let text = self
            .style
            .doc_line
            .iter()
            .find_map(|p| trimmed.strip_prefix(p))?;
        Some(text.strip_prefix(' ').unwrap_or(text))
    }

    fn current_scope(&self) -> Option<ScopeKind> {
        if self.depth == 0 {
            return Some(ScopeKind::Module);
        }
        self.scopes
            .last()
            .filter(|s| s.body_depth == self.depth)
            .map(|s| s.kind.clone())
    }

    fn code_line(&mut self, line: &str, trimmed: &str, number: usize, doc: Option<Vec<String>>) {
        match self.current_scope() {
            Some(ScopeKind::Module) => self.module_member(line, trimmed, number, doc),
            Some(ScopeKind::Owner { name, fields }) => {
                self.type_member(line, trimmed, number, doc, &name, fields)
            }
            None => {}
        }

        self.track_braces(trimmed);
    }

    fn module_member(&mut self, line: &str, trimmed: &str, number: usize, doc: Option<Vec<String>>) {
        if let Some(captures) = self.patterns.type_decl.captures(trimmed) {
            let keyword = captures.get(1).map_or("", |m| m.as_str());
            let name = captures.get(2).map_or("", |m| m.as_str()).to_string();
            self.pending_scope = Some(ScopeKind::Owner {
                name: name.clone(),
                fields: self.patterns.field_owners.contains(&keyword),
            });
            self.push(DeclarationKind::Type, name, None, line, number, doc);
            return;
        }

        if self
            .patterns
            .impl_block
            .as_ref()
            .is_some_and(|re| re.is_match(trimmed))
        {
            if let Some(target) = impl_target(trimmed) {
                self.pending_scope = Some(ScopeKind::Owner {
                    name: target,
                    fields: false,
                });
            }
            return;
        }

        if self
            .patterns
            .module
            .as_ref()
            .is_some_and(|re| re.is_match(trimmed))
        {
            self.pending_scope = Some(ScopeKind::Module);
            return;
        }

        if let Some(name) = self
            .patterns
            .function
            .as_ref()
            .and_then(|re| last_capture(re, trimmed))
        {
            self.push(DeclarationKind::Function, name, None, line, number, doc);
        }
    }

    fn type_member(
        &mut self,
        line: &str,
        trimmed: &str,
        number: usize,
        doc: Option<Vec<String>>,
        owner: &str,
        fields: bool,
    ) {
        if let Some(name) = self
            .patterns
            .method
            .as_ref()
            .and_then(|re| last_capture(re, trimmed))
            .filter(|name| {
                self.language != Language::Java || !JAVA_RESERVED.contains(&name.as_str())
            })
        {
            self.push(
                DeclarationKind::Method,
                name,
                Some(owner.to_string()),
                line,
                number,
                doc,
            );
            return;
        }

        if !fields {
            return;
        }

        if let Some(name) = self
            .patterns
            .field
            .as_ref()
            .and_then(|re| last_capture(re, trimmed))
        {
            self.push(
                DeclarationKind::Field,
                name,
                Some(owner.to_string()),
                line,
                number,
                doc,
            );
        }
    }

    fn python_line(&mut self, line: &str, trimmed: &str, number: usize, doc: Option<Vec<String>>) {
        let indent = line.len() - line.trim_start().len();

        if indent == 0 {
            self.python_class = None;

            if let Some(name) = last_capture(&self.patterns.type_decl, trimmed) {
                self.python_class = Some(PythonClass {
                    name: name.clone(),
                    body_indent: None,
                });
                self.push(DeclarationKind::Type, name, None, line, number, doc);
            } else if let Some(name) = self
                .patterns
                .function
                .as_ref()
                .and_then(|re| last_capture(re, trimmed))
            {
                self.push(DeclarationKind::Function, name, None, line, number, doc);
            }
            return;
        }

        let Some(class) = self.python_class.as_mut() else {
            return;
        };
        let body_indent = *class.body_indent.get_or_insert(indent);
        let owner = class.name.clone();

        if indent != body_indent {
            return;
        }

        if let Some(name) = self
            .patterns
            .method
            .as_ref()
            .and_then(|re| last_capture(re, trimmed))
        {
            self.push(DeclarationKind::Method, name, Some(owner), line, number, doc);
        }
    }

    fn push(
        &mut self,
        kind: DeclarationKind,
        name: String,
        owner: Option<String>,
        line: &str,
        number: usize,
        doc: Option<Vec<String>>,
    ) {
        let indent = line.len() - line.trim_start().len();
        let location = Location {
            file: self.path.to_path_buf(),
            line: number,
            column: Some(indent + 1),
        };

        self.declarations.push(Declaration {
            kind,
            name,
            owner,
            location,
            documentation: doc.map(join_doc).unwrap_or_default(),
        });
    }

    fn track_braces(&mut self, code: &str) {
        for ch in structural_chars(code, self.language) {
            match ch {
                '{' => {
                    self.depth += 1;
                    if let Some(kind) = self.pending_scope.take() {
                        self.scopes.push(Scope {
                            body_depth: self.depth,
                            kind,
                        });
                    }
                }
                '}' => {
                    self.depth = self.depth.saturating_sub(1);
                    while self
                        .scopes
                        .last()
                        .is_some_and(|s| s.body_depth > self.depth)
                    {
                        self.scopes.pop();
                    }
                }
                ';' => self.pending_scope = None,
                _ => {}
            }
        }
    }
}

/// @ai:intent Join doc lines, dropping leading and trailing blank lines
fn join_doc(lines: Vec<String>) -> String {
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

/// @ai:intent Name of the type an `impl` block attaches methods to
/// @ai:example ("impl<T> Display for Wrapper<T> {") -> Some("Wrapper")
/// @ai:example ("impl Foo {") -> Some("Foo")
fn impl_target(line: &str) -> Option<String> {
    let rest = line.trim_start_matches("unsafe").trim_start();
    let mut rest = rest.strip_prefix("impl")?;

    // generic parameter list directly after `impl`
    if rest.starts_with('<') {
        let mut depth = 0usize;
        let mut cut = rest.len();
        for (idx, ch) in rest.char_indices() {
            match ch {
                '<' => depth += 1,
                '>' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        cut = idx + 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        rest = &rest[cut..];
    }

    let header = rest.split('{').next().unwrap_or(rest);
    let header = header.split(" where ").next().unwrap_or(header);
    let target = match header.split_once(" for ") {
        Some((_, target)) => target,
        None => header,
    };

    let path = target
        .trim()
        .trim_start_matches('&')
        .split(|c: char| c == '<' || c.is_whitespace())
        .next()?;
    let name = crate::symbols::short_name(path);

    (!name.is_empty()).then(|| name.to_string())
}

/// @ai:intent Braces and semicolons of a code line, outside strings and comments
fn structural_chars(code: &str, language: Language) -> Vec<char> {
    let chars: Vec<char> = code.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let next = chars.get(i + 1).copied();
        match chars[i] {
            '/' if next == Some('/') => break,
            '/' if next == Some('*') => {
                match (i + 2..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                {
                    Some(j) => {
                        i = j + 2;
                        continue;
                    }
                    None => break,
                }
            }
            '#' if language == Language::Php && next != Some('[') => break,
            '"' => {
                i = skip_string(&chars, i, '"');
                continue;
            }
            '\'' if language != Language::Rust => {
                i = skip_string(&chars, i, '\'');
                continue;
            }
            '\'' => {
                // char literal; anything else is a lifetime
                if next == Some('\\') {
                    if let Some(close) = (i + 3..chars.len()).find(|&j| chars[j] == '\'') {
                        i = close + 1;
                        continue;
                    }
                } else if chars.get(i + 2) == Some(&'\'') {
                    i += 3;
                    continue;
                }
            }
            c @ ('{' | '}' | ';') => out.push(c),
            _ => {}
        }
        i += 1;
    }

    out
}

fn skip_string(chars: &[char], start: usize, quote: char) -> usize {
    let mut j = start + 1;
    while j < chars.len() {
        if chars[j] == '\\' {
            j += 2;
            continue;
        }
        if chars[j] == quote {
            return j + 1;
        }
        j += 1;
    }
    chars.len()
}
