//! @ai:module:intent Define literal values, argument lists and parse results
//! @ai:module:layer domain
//! @ai:module:public_api Value, Key, LiteralMap, ArgumentList, ParseResult, Location
//! @ai:module:stateless true

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// @ai:intent Represents a source code location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: Option<usize>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            line: 0,
            column: None,
        }
    }
}

impl Location {
    /// @ai:intent Create a new Location
    pub fn new(file: PathBuf, line: usize) -> Self {
        Self {
            file,
            line,
            column: None,
        }
    }
}

/// @ai:intent Key of an array literal entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{}", index),
            Key::Name(name) => f.write_str(name),
        }
    }
}

/// @ai:intent Insertion-ordered map from key to literal value
///
/// Re-inserting an existing key replaces its value in place, so the
/// original position is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralMap {
    entries: Vec<(Key, Value)>,
}

impl LiteralMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// @ai:intent Insert or overwrite an entry
    /// @ai:post returns the replaced value when the key already existed
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// @ai:intent Index for an unkeyed entry: one past the largest non-negative integer key
    /// @ai:example ({1: "a"}) -> 2
    /// @ai:example ({x: 1}) -> 0
    pub fn next_index(&self) -> i64 {
        self.keys()
            .filter_map(|k| match k {
                Key::Index(i) if *i >= 0 => Some(i.saturating_add(1)),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// @ai:intent Look up an entry by string key
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, Key::Name(n) if n == name))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl FromIterator<(Key, Value)> for LiteralMap {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        let mut map = LiteralMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for LiteralMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// @ai:intent Result of evaluating one literal expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Map(LiteralMap),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&LiteralMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<LiteralMap> for Value {
    fn from(m: LiteralMap) -> Self {
        Value::Map(m)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Map(m) => {
                f.write_str("{")?;
                for (idx, (key, value)) in m.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// @ai:intent Arguments of one directive, split into positional and named buckets
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArgumentList {
    pub positional: Vec<Value>,
    pub named: LiteralMap,
}

impl ArgumentList {
    /// @ai:intent Arguments for a directive written without parentheses
    /// @ai:post positional is exactly [Null]
    pub fn placeholder() -> Self {
        Self {
            positional: vec![Value::Null],
            named: LiteralMap::new(),
        }
    }

    /// @ai:intent Record a named argument; a repeated name keeps the last value
    pub fn set_named(&mut self, name: &str, value: Value) {
        self.named.insert(Key::from(name), value);
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// @ai:intent Flatten into constructor order: positional values, then named map if any
    /// @ai:example (@X(1, a=2, 3)) -> [1, 3, {a: 2}]
    /// @ai:effects pure
    pub fn constructor_args(&self) -> Vec<Value> {
        let mut args = self.positional.clone();
        if !self.named.is_empty() {
            args.push(Value::Map(self.named.clone()));
        }
        args
    }
}

/// @ai:intent One recognised directive, ready for the host to construct
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    /// Fully qualified type name after alias resolution.
    pub name: String,
    pub context: String,
    pub arguments: ArgumentList,
}
