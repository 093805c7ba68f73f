//! Generation errors

use std::path::PathBuf;

/// Result type for generation
pub type GenResult<T> = Result<T, GenError>;

/// Errors raised while generating bindings.
///
/// Member-level errors (operators, kinds, special names, indexers, render
/// failures) abort only the offending method and are collected as
/// diagnostics; catalogue and I/O errors abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Special-named operator outside the supported set, or wrong arity
    #[error("Unsupported operator {name} on {declaring}")]
    UnsupportedOperator {
        /// Declaring type reference string
        declaring: String,
        /// Method name
        name: String,
    },

    /// Parameter or return type outside the fixed value-kind set
    #[error("Unsupported value kind for {ty} in {method}")]
    UnsupportedKind {
        /// Method identity
        method: String,
        /// Offending type
        ty: String,
    },

    /// Special-named method that is neither a property accessor nor an operator
    #[error("Unsupported special-named method {name} on {declaring}")]
    UnsupportedSpecialName {
        /// Declaring type reference string
        declaring: String,
        /// Method name
        name: String,
    },

    /// Property accessor whose parameter count fits neither form
    #[error("Invalid indexer {name} on {declaring}: {params} parameters")]
    InvalidIndexer {
        /// Declaring type reference string
        declaring: String,
        /// Accessor name
        name: String,
        /// Parameter count
        params: usize,
    },

    /// Catalogue lookup or consistency failure
    #[error("Catalogue error: {0}")]
    Catalogue(String),

    /// Output could not be written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalogue JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration TOML could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// An option value cannot be used in emitted code
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Rust source could not be rendered for a member
    #[error("Render error: {0}")]
    Render(String),
}

impl GenError {
    /// Check if this error aborts only one member
    pub fn is_member_error(&self) -> bool {
        matches!(
            self,
            GenError::UnsupportedOperator { .. }
                | GenError::UnsupportedKind { .. }
                | GenError::UnsupportedSpecialName { .. }
                | GenError::InvalidIndexer { .. }
                | GenError::Render(_)
        )
    }
}
