//! @ai:module:intent Host capabilities for checking and constructing annotation types
//! @ai:module:layer infrastructure
//! @ai:module:public_api TypeCatalog, Host, Registry, Instance, Constructor, TrustImports
//! @ai:module:depends_on annotation
//! @ai:module:stateless false

use crate::annotation::{ArgumentList, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// @ai:intent Answer whether a fully qualified type name denotes a known type
pub trait TypeCatalog {
    fn type_exists(&self, fully_qualified_name: &str) -> bool;
}

/// @ai:intent Build runtime annotation instances from parse results
pub trait Host: TypeCatalog {
    type Instance;

    /// @ai:intent Construct an instance of a resolved type
    /// @ai:post Err carries a human-readable reason
    fn construct(
        &self,
        fully_qualified_name: &str,
        arguments: &ArgumentList,
    ) -> std::result::Result<Self::Instance, String>;
}

/// @ai:intent Catalog that accepts every name; short-name matches are trusted as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustImports;

impl TypeCatalog for TrustImports {
    fn type_exists(&self, _fully_qualified_name: &str) -> bool {
        true
    }
}

impl<T: TypeCatalog + ?Sized> TypeCatalog for &T {
    fn type_exists(&self, fully_qualified_name: &str) -> bool {
        (**self).type_exists(fully_qualified_name)
    }
}

/// Constructor invoked with the flattened argument list (positional, then named map).
pub type Constructor = Box<dyn Fn(&[Value]) -> std::result::Result<Value, String> + Send + Sync>;

/// @ai:intent A constructed annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub type_name: String,
    /// Constructor output, or Null when the type has no constructor.
    pub state: Value,
}

/// @ai:intent In-memory set of known annotation types with optional constructors
#[derive(Default)]
pub struct Registry {
    types: HashMap<String, Option<Constructor>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("types", &names).finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Register a type that is instantiated without a constructor
    pub fn register(&mut self, fully_qualified_name: impl Into<String>) {
        self.types.insert(fully_qualified_name.into(), None);
    }

    /// @ai:intent Register a type with a constructor
    pub fn register_with<F>(&mut self, fully_qualified_name: impl Into<String>, constructor: F)
    where
        F: Fn(&[Value]) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.types
            .insert(fully_qualified_name.into(), Some(Box::new(constructor)));
    }

    pub fn has(&self, fully_qualified_name: &str) -> bool {
        self.types.contains_key(fully_qualified_name)
    }

    pub fn unregister(&mut self, fully_qualified_name: &str) -> bool {
        self.types.remove(fully_qualified_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Registry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for name in iter {
            registry.register(name);
        }
        registry
    }
}

impl TypeCatalog for Registry {
    fn type_exists(&self, fully_qualified_name: &str) -> bool {
        self.has(fully_qualified_name)
    }
}

impl Host for Registry {
    type Instance = Instance;

    fn construct(
        &self,
        fully_qualified_name: &str,
        arguments: &ArgumentList,
    ) -> std::result::Result<Instance, String> {
        let constructor = self
            .types
            .get(fully_qualified_name)
            .ok_or_else(|| format!("type {} is not registered", fully_qualified_name))?;

        let state = match constructor {
            Some(construct) => construct(&arguments.constructor_args())?,
            None => Value::Null,
        };

        Ok(Instance {
            type_name: fully_qualified_name.to_string(),
            state,
        })
    }
}
