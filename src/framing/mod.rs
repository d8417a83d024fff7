//! Content-length framing for JSON-RPC over a byte stream.
//!
//! # Wire Format
//!
//! ```text
//! <header-name>: <value>\r\n      (zero or more, case-insensitive names)
//! \r\n
//! <payload: exactly content-length bytes of UTF-8 JSON>
//! ```
//!
//! `content-length` is mandatory. A payload that is a JSON array is a batch:
//! its elements are handed out one read at a time, in order, before the next
//! frame is read from the stream.

pub mod error;
pub mod header;
pub mod reader;
pub mod writer;

pub use error::{ProtocolError, ProtocolResult};
pub use header::{CONTENT_LENGTH, CONTENT_TYPE, FrameHeaders, JSONRPC_CONTENT_TYPE};
pub use reader::{BatchQueue, Frame, FrameLimits, FrameReader};
pub use writer::{FrameWriter, SharedFrameWriter};
