//! @ai:module:intent Resolve bare annotation names against imported symbols
//! @ai:module:layer domain
//! @ai:module:public_api Symbol, SymbolTable, Resolution, resolve, short_name
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// Namespace separators accepted in directive and import names.
pub const SEPARATORS: [&str; 3] = ["::", "\\", "."];

/// @ai:intent One imported name: `use fully::qualified::Name as Alias`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub fully_qualified_name: String,
    pub short_name: String,
    pub alias: Option<String>,
}

impl Symbol {
    /// @ai:intent Create a symbol whose short name is the last segment of the path
    pub fn new(fully_qualified_name: impl Into<String>) -> Self {
        let fully_qualified_name = fully_qualified_name.into();
        let short_name = short_name(&fully_qualified_name).to_string();
        Self {
            fully_qualified_name,
            short_name,
            alias: None,
        }
    }

    pub fn aliased(fully_qualified_name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::new(fully_qualified_name)
        }
    }
}

/// @ai:intent Imports of one source file, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl FromIterator<Symbol> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// @ai:intent Outcome of looking a directive name up in a symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The last segment matched an alias; the whole name is replaced.
    Alias(&'a Symbol),
    /// The last segment matched a short name; the host must confirm the type exists.
    ShortName(&'a Symbol),
    Unresolved,
}

impl<'a> Resolution<'a> {
    pub fn fully_qualified_name(&self) -> Option<&'a str> {
        match self {
            Resolution::Alias(s) | Resolution::ShortName(s) => Some(&s.fully_qualified_name),
            Resolution::Unresolved => None,
        }
    }
}

/// @ai:intent Last namespace segment of a name
/// @ai:example ("app::routing::Route") -> "Route"
/// @ai:example ("Foo\\Bar") -> "Bar"
/// @ai:example ("Route") -> "Route"
/// @ai:effects pure
pub fn short_name(name: &str) -> &str {
    let start = SEPARATORS
        .iter()
        .filter_map(|sep| name.rfind(sep).map(|idx| idx + sep.len()))
        .max()
        .unwrap_or(0);
    &name[start..]
}

/// @ai:intent Map a directive name to a symbol, aliases first, then short names
/// @ai:post first match in table order wins within each pass
/// @ai:effects pure
pub fn resolve<'a>(name: &str, table: &'a SymbolTable) -> Resolution<'a> {
    let short = short_name(name);

    if let Some(symbol) = table.iter().find(|s| s.alias.as_deref() == Some(short)) {
        return Resolution::Alias(symbol);
    }

    table
        .iter()
        .find(|s| s.short_name == short)
        .map(Resolution::ShortName)
        .unwrap_or(Resolution::Unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SymbolTable {
        vec![
            Symbol::new("app::routing::Route"),
            Symbol::aliased("app::cache::Cached", "Cache"),
            Symbol::aliased("other::Route", "Endpoint"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_short_name_with_each_separator() {
        assert_eq!(short_name("a::b::C"), "C");
        assert_eq!(short_name("a\\b\\C"), "C");
        assert_eq!(short_name("a.b.C"), "C");
        assert_eq!(short_name("C"), "C");
        assert_eq!(short_name("a.b::C"), "C");
    }

    #[test]
    fn test_alias_replaces_whole_name() {
        let table = table();
        let resolution = resolve("anything::Cache", &table);
        assert_eq!(resolution.fully_qualified_name(), Some("app::cache::Cached"));
        assert!(matches!(resolution, Resolution::Alias(_)));
    }

    #[test]
    fn test_short_name_match() {
        let table = table();
        let resolution = resolve("Route", &table);
        assert!(matches!(resolution, Resolution::ShortName(_)));
        assert_eq!(resolution.fully_qualified_name(), Some("app::routing::Route"));
    }

    #[test]
    fn test_alias_wins_over_short_name() {
        let table: SymbolTable = vec![
            Symbol::new("first::Shared"),
            Symbol::aliased("second::Thing", "Shared"),
        ]
        .into_iter()
        .collect();

        let resolution = resolve("Shared", &table);
        assert!(matches!(resolution, Resolution::Alias(_)));
        assert_eq!(resolution.fully_qualified_name(), Some("second::Thing"));
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(resolve("Unknown", &table()), Resolution::Unresolved);
        assert_eq!(resolve("Unknown", &SymbolTable::new()), Resolution::Unresolved);
    }

    #[test]
    fn test_symbol_new_derives_short_name() {
        let symbol = Symbol::new("Foo\\Bar\\Baz");
        assert_eq!(symbol.short_name, "Baz");
        assert_eq!(symbol.alias, None);
    }
}
