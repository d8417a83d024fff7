//! JSON-RPC envelopes exchanged with the test client.
//!
//! Request:
//! ```json
//! {"jsonrpc": "2.0", "id": "1", "method": "Widgets_Get",
//!  "params": {"widgetName": "w1", "__reserved": {"credentials": {...}, "httpResponse": true}}}
//! ```
//!
//! Response (success, or the same shape under `error.data`):
//! ```json
//! {"jsonrpc": "2.0", "id": "1", "result": {"statusCode": 200, "headers": {...}, "response": {...}}}
//! ```

pub mod credentials;
pub mod error;
pub mod execution;
pub mod request;
pub mod response;

pub use credentials::{translate_credentials, translate_credentials_value};
pub use error::CredentialError;
pub use execution::{CommandExecutionResult, RecordingTracer, ServiceTracer, TracedResponse};
pub use request::{
    DEFAULT_CREDENTIAL_TYPE, JSONRPC_VERSION, LiveTestCredentials, LiveTestRequest,
    RESERVED_PARAM, ReservedParams,
};
pub use response::{LiveTestError, LiveTestResponse, LiveTestResult, codes};
