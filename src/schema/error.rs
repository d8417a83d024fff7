//! Error types for loading type descriptors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from building the operation registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Cannot read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Operation '{0}' is declared more than once")]
    DuplicateOperation(String),

    #[error("Operation is missing an operationId")]
    MissingOperationId,
}

pub type RegistryResult<T> = Result<T, RegistryError>;
