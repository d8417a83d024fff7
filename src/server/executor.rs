//! Interface to the external command runner.

use async_trait::async_trait;
use indexmap::IndexMap;

use super::error::ExecutionError;
use crate::convert::{DynamicValue, TypedObject};
use crate::protocol::{CommandExecutionResult, RecordingTracer};

/// A login step produced by a credential provider, run before the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStep {
    pub provider: String,
    pub properties: IndexMap<String, String>,
}

/// Everything the executor needs to run one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationInvocation {
    pub operation_id: String,
    pub command: String,
    /// Decoded arguments keyed by declared parameter name.
    pub parameters: IndexMap<String, DynamicValue>,
    pub credentials: Vec<CredentialStep>,
}

/// Runs commands of the module under test.
///
/// HTTP responses observed while running should be recorded on `tracer`.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        invocation: &OperationInvocation,
        tracer: &RecordingTracer,
    ) -> Result<CommandExecutionResult, ExecutionError>;
}

/// Returns the bound parameters as the single result.
///
/// Lets the harness be exercised end to end without a command runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoExecutor;

#[async_trait]
impl CommandExecutor for EchoExecutor {
    async fn execute(
        &self,
        invocation: &OperationInvocation,
        _tracer: &RecordingTracer,
    ) -> Result<CommandExecutionResult, ExecutionError> {
        let echoed: TypedObject = invocation
            .parameters
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        crate::debug_event!(
            "executor",
            "echo",
            "{} ({} parameters)",
            invocation.command,
            echoed.len()
        );
        Ok(CommandExecutionResult::success(vec![DynamicValue::Object(
            echoed,
        )]))
    }
}
