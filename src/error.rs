//! @ai:module:intent Define error types for annotation parsing and scanning
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all docanno operations
#[derive(Error, Debug)]
pub enum Error {
    /// The annotation grammar was violated at `construct`.
    #[error("[{context}] {construct}: next token must be {expected}")]
    Syntax {
        context: String,
        construct: &'static str,
        expected: String,
    },

    #[error(
        "Annotation @{name} did not exist in {context}. \
         Did you forget to import the associated type or alias?"
    )]
    UnresolvedName { name: String, context: String },

    #[error("Failed to construct {name} for {context}: {message}")]
    Construction {
        name: String,
        context: String,
        message: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// @ai:intent Build a syntax error for a construct that required a specific token
    pub fn syntax(context: &str, construct: &'static str, expected: impl Into<String>) -> Self {
        Error::Syntax {
            context: context.to_string(),
            construct,
            expected: expected.into(),
        }
    }

    /// @ai:intent Check whether the error comes from the annotation text itself
    /// @ai:effects pure
    pub fn is_annotation_error(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. } | Error::UnresolvedName { .. } | Error::Construction { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
