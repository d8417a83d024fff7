//! JSON-RPC response envelope and its builder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::execution::{CommandExecutionResult, ServiceTracer};
use super::request::{JSONRPC_VERSION, LiveTestRequest};
use crate::convert::{DynamicValue, NullHandling, encode};
use crate::schema::RuntimeTypeData;

/// Error codes used on this protocol.
pub mod codes {
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    /// The command ran and reported errors.
    pub const COMMAND_FAILED: i64 = -32000;
}

/// Payload of a successful call, also used as the `data` of an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTestError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LiveTestResult>,
}

/// Outgoing response: exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTestResponse {
    pub jsonrpc: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<LiveTestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LiveTestError>,
}

impl LiveTestResponse {
    pub fn success(id: impl Into<String>, result: LiveTestResult) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, error: LiveTestError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            result: None,
            error: Some(error),
        }
    }

    /// An error with no data, for failures before execution.
    pub fn error(id: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self::failure(
            id,
            LiveTestError {
                code,
                message: message.into(),
                data: None,
            },
        )
    }

    /// Build the response for a finished command.
    ///
    /// `had_errors` selects an error envelope even when no error entries
    /// were reported. Entries collapse to null (none), the entry itself
    /// (one) or an array (several). Results are encoded against
    /// `response_type`; error entries pass through structurally. The HTTP
    /// trace overlay is applied only when the request asked for it.
    pub fn from_execution(
        request: &LiveTestRequest,
        execution: &CommandExecutionResult,
        tracer: &dyn ServiceTracer,
        response_type: Option<&RuntimeTypeData>,
        nulls: NullHandling,
    ) -> Self {
        if execution.had_errors {
            let mut data = LiveTestResult {
                response: collapse(encode_all(&execution.errors, None, nulls)),
                ..LiveTestResult::default()
            };
            if request.http_response {
                overlay_trace(&mut data, tracer);
            }
            tracing::debug!(
                "[response] request {} failed with {} error(s)",
                request.id,
                execution.errors.len()
            );
            return Self::failure(
                &request.id,
                LiveTestError {
                    code: codes::COMMAND_FAILED,
                    message: "Command execution reported errors".to_string(),
                    data: Some(data),
                },
            );
        }

        let mut result = LiveTestResult {
            response: collapse(encode_all(&execution.results, response_type, nulls)),
            ..LiveTestResult::default()
        };
        if request.http_response {
            overlay_trace(&mut result, tracer);
        }
        Self::success(&request.id, result)
    }

    /// Build the response for an error raised while executing.
    ///
    /// The error itself becomes `data.response`.
    pub fn from_exception(
        id: impl Into<String>,
        error: &(dyn std::error::Error + 'static),
        code: i64,
    ) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let mut exception = json!({ "message": error.to_string() });
        if !causes.is_empty() {
            exception["causes"] = json!(causes);
        }

        Self::failure(
            id,
            LiveTestError {
                code,
                message: error.to_string(),
                data: Some(LiveTestResult {
                    response: Some(exception),
                    ..LiveTestResult::default()
                }),
            },
        )
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn encode_all(
    values: &[DynamicValue],
    descriptor: Option<&RuntimeTypeData>,
    nulls: NullHandling,
) -> Vec<Value> {
    values.iter().map(|v| encode(v, descriptor, nulls)).collect()
}

/// None for no entries, the entry for one, an array for more.
fn collapse(mut values: Vec<Value>) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::Array(values)),
    }
}

/// Copy the last traced status and headers onto `target`.
fn overlay_trace(target: &mut LiveTestResult, tracer: &dyn ServiceTracer) {
    if let Some(last) = tracer.last_response() {
        target.status_code = Some(last.status_code);
        target.headers = Some(last.header_map());
    }
}
