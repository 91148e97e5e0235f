use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ToolsmithError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ToolsmithError {
    #[error("function '{name}' not found")]
    NotFound { name: String },

    #[error("function '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("invalid function definition: {reason}")]
    InvalidDefinition { reason: String },

    #[error("function name in code ('{found}') does not match addressed name ('{expected}')")]
    NameMismatch { expected: String, found: String },

    #[error("backing file '{path}' is not valid source: {detail}")]
    StorageCorrupt { path: PathBuf, detail: String },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl ToolsmithError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
