//! @ai:module:intent Decide which directive names are documentation tags, not annotations
//! @ai:module:layer domain
//! @ai:module:public_api IgnoredNames, DEFAULT_IGNORED_NAMES
//! @ai:module:stateless true

use std::collections::HashSet;

/// Conventional documentation tags that are never resolved.
pub const DEFAULT_IGNORED_NAMES: &[&str] = &[
    "abstract",
    "access",
    "api",
    "author",
    "category",
    "codeCoverageIgnore",
    "copyright",
    "covers",
    "dataProvider",
    "deprecated",
    "depends",
    "example",
    "exception",
    "expectedException",
    "extends",
    "filesource",
    "final",
    "FIXME",
    "fixme",
    "global",
    "group",
    "ignore",
    "implements",
    "inheritDoc",
    "inheritdoc",
    "internal",
    "license",
    "link",
    "method",
    "mixin",
    "noinspection",
    "override",
    "package",
    "param",
    "property",
    "return",
    "returns",
    "see",
    "since",
    "source",
    "static",
    "staticvar",
    "subpackage",
    "SuppressWarnings",
    "template",
    "throw",
    "throws",
    "TODO",
    "todo",
    "type",
    "uses",
    "var",
    "version",
];

/// @ai:intent Effective set of ignored names for one parser instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredNames {
    names: HashSet<String>,
}

impl Default for IgnoredNames {
    fn default() -> Self {
        Self::with_names(std::iter::empty::<String>())
    }
}

impl IgnoredNames {
    /// @ai:intent Default tags unioned with caller-supplied names
    pub fn with_names<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: HashSet<String> =
            DEFAULT_IGNORED_NAMES.iter().map(|s| s.to_string()).collect();
        names.extend(extra.into_iter().map(Into::into));
        Self { names }
    }

    /// @ai:intent A set with no names at all, not even the defaults
    pub fn none() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// @ai:intent Membership test on the directive name as written
    /// @ai:effects pure
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// @ai:intent Names in sorted order, for display and config round-trips
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_contain_doc_tags() {
        let ignored = IgnoredNames::default();
        for tag in ["param", "return", "var", "throws"] {
            assert!(ignored.contains(tag), "{} should be ignored", tag);
        }
        assert!(!ignored.contains("Route"));
    }

    #[test]
    fn test_extra_names_are_unioned() {
        let ignored = IgnoredNames::with_names(["ai", "Route"]);
        assert!(ignored.contains("ai"));
        assert!(ignored.contains("Route"));
        assert!(ignored.contains("param"));
        assert_eq!(ignored.len(), DEFAULT_IGNORED_NAMES.len() + 2);
    }

    #[test]
    fn test_none_is_empty() {
        let mut ignored = IgnoredNames::none();
        assert!(ignored.is_empty());
        ignored.insert("x");
        assert_eq!(ignored.sorted(), vec!["x"]);
    }

    #[test]
    fn test_membership_is_exact() {
        let ignored = IgnoredNames::default();
        assert!(!ignored.contains("app::param"));
        assert!(!ignored.contains("Param"));
    }
}
