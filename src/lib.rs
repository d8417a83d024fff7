//! Live test harness for command modules.
//!
//! A test client sends JSON-RPC requests framed with `Content-Length`
//! headers; each request names an operation of the module under test. The
//! harness binds the parameters through the operation's type descriptors,
//! runs the command through a [`server::CommandExecutor`] and answers with
//! the encoded results, optionally echoing the last HTTP status and headers.

pub mod cli;
pub mod config;
pub mod convert;
pub mod framing;
pub mod logging;
pub mod protocol;
pub mod schema;
pub mod server;

pub use config::Settings;
pub use convert::{DynamicValue, NullHandling, TypedObject};
pub use framing::{FrameReader, FrameWriter, ProtocolError};
pub use protocol::{LiveTestRequest, LiveTestResponse};
pub use schema::{ModuleRegistry, OperationData, ParameterData, RuntimeTypeData};
pub use server::{CommandExecutor, EchoExecutor, LiveTestServer, ServerOptions};
