//! Error types for the frame codec.

use thiserror::Error;

/// Errors raised while reading or writing a frame.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stream ended in the middle of a frame header")]
    UnexpectedEof,

    #[error("Header line exceeds {limit} bytes")]
    HeaderTooLong { limit: usize },

    #[error("Malformed header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("Frame is missing the mandatory content-length header")]
    MissingContentLength,

    #[error("Invalid content-length value {value:?}")]
    InvalidContentLength { value: String },

    #[error("Declared payload of {declared} bytes exceeds the limit of {limit}")]
    PayloadTooLarge { declared: usize, limit: usize },

    #[error("Payload truncated: expected {expected} bytes, received {received}")]
    TruncatedPayload { expected: usize, received: usize },

    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Payload is not valid JSON: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Batch of {size} messages exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Batch payload contains no messages")]
    EmptyBatch,

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ProtocolError {
    /// Whether the stream is still positioned on a frame boundary.
    ///
    /// Only errors raised after the whole payload was consumed qualify; any
    /// header or length problem leaves the stream position unknown.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidUtf8(_)
                | ProtocolError::MalformedPayload(_)
                | ProtocolError::BatchTooLarge { .. }
                | ProtocolError::EmptyBatch
        )
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
