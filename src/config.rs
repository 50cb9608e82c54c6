//! @ai:module:intent TOML configuration for parsing, type lookup and linting
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config, ParserConfig, CatalogConfig, DEFAULT_CONFIG_FILE
//! @ai:module:depends_on ignore, registry, parser, linter, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::ignore::IgnoredNames;
use crate::linter::LintConfig;
use crate::parser::DocParser;
use crate::registry::{Registry, TrustImports, TypeCatalog};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "docanno.toml";

/// @ai:intent Root configuration, one section per concern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub catalog: CatalogConfig,
    pub lint: LintConfig,
}

/// @ai:intent Parser settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Unioned with the built-in documentation tags.
    pub ignored_names: Vec<String>,
}

/// @ai:intent Which fully qualified names count as existing types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub known_types: Vec<String>,
    /// Accept every imported name without consulting `known_types`.
    pub trust_imports: bool,
}

impl Config {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// @ai:intent Load the file if present, defaults otherwise
    /// @ai:effects fs:read
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn ignored_names(&self) -> IgnoredNames {
        IgnoredNames::with_names(self.parser.ignored_names.iter().cloned())
    }

    /// @ai:intent Parser carrying the configured ignored names
    pub fn parser(&self) -> DocParser {
        DocParser::with_ignored_names(self.ignored_names())
    }

    /// @ai:intent Registry of the configured known types, without constructors
    pub fn registry(&self) -> Registry {
        self.catalog.known_types.iter().cloned().collect()
    }

    /// @ai:intent Type catalog the parser should consult for short-name matches
    pub fn type_catalog(&self) -> Box<dyn TypeCatalog> {
        if self.catalog.trust_imports {
            Box::new(TrustImports)
        } else {
            Box::new(self.registry())
        }
    }
}
