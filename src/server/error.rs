//! Error types for the dispatcher.

use thiserror::Error;

use crate::framing::ProtocolError;
use crate::schema::RegistryError;

/// Errors ending a server run.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Server is already running")]
    AlreadyRunning,
}

/// Errors raised by a command executor instead of a result set.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command '{command}' could not be started: {reason}")]
    Launch { command: String, reason: String },

    #[error("Command '{command}' was cancelled")]
    Cancelled { command: String },

    #[error("Executor I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
