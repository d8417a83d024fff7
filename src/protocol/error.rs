//! Error types for protocol-level translation.

use thiserror::Error;

/// Errors from translating or applying request credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("'__reserved' must be an object")]
    InvalidReserved,

    #[error("Credentials must be an object or an array of objects")]
    InvalidCredentials,

    #[error("Credential entry {index} is not an object")]
    InvalidCredentialEntry { index: usize },

    #[error("Credential type tag must be a string")]
    InvalidTypeTag,

    #[error("No credential provider registered for '{0}'")]
    UnknownProvider(String),

    #[error("Credential provider '{provider}' requires property '{property}'")]
    MissingProperty { provider: String, property: String },
}
