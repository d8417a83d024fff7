//! Request dispatch: binds each JSON-RPC request to an operation of the
//! loaded module, runs it through a [`CommandExecutor`] and writes the
//! response back on the same stream.

pub mod binding;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod providers;

pub use binding::bind_invocation;
pub use dispatcher::{DEFAULT_MAX_IN_FLIGHT, LiveTestServer, ServerOptions};
pub use error::{ExecutionError, ServerError};
pub use executor::{CommandExecutor, CredentialStep, EchoExecutor, OperationInvocation};
pub use providers::{AzureCredentialProvider, CredentialProvider, CredentialProviders};
