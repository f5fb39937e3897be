//! Error types for the workspace store

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`WorkspaceStore`](super::WorkspaceStore) operations
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Input failed a format or presence check
    #[error("{0}")]
    Validation(String),

    /// The named (or active) workspace does not exist
    #[error("{0}")]
    NotFound(String),

    /// Reading or writing a store file failed
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded
    #[error("failed to encode workspace record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkspaceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for workspace operations
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
