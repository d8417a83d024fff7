//! Frame writer.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use super::error::{ProtocolError, ProtocolResult};
use super::header::JSONRPC_CONTENT_TYPE;

/// Writes one JSON payload per frame.
///
/// Null-valued fields are left out by the payload types themselves
/// (`skip_serializing_if`), so the writer serializes them as-is.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Serialize `message` compactly and write it as a frame.
    ///
    /// Returns the payload length announced in the header.
    pub async fn write<T: Serialize + ?Sized>(&mut self, message: &T) -> ProtocolResult<usize> {
        let payload = serde_json::to_vec(message).map_err(ProtocolError::Serialize)?;
        let header = format!(
            "Content-Length: {}\r\nContent-Type: {JSONRPC_CONTENT_TYPE}\r\n\r\n",
            payload.len()
        );

        self.writer.write_all(header.as_bytes()).await?;
        self.writer.write_all(&payload).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;

        crate::debug_event!("framing", "wrote", "{} bytes", payload.len());
        Ok(payload.len())
    }
}

/// A [`FrameWriter`] shared between concurrent workers.
///
/// Each write holds the lock for the whole frame, so frames never interleave.
pub struct SharedFrameWriter<W> {
    inner: Arc<Mutex<FrameWriter<W>>>,
}

impl<W> Clone for SharedFrameWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: AsyncWrite + Unpin> SharedFrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FrameWriter::new(writer))),
        }
    }

    pub async fn write<T: Serialize + ?Sized>(&self, message: &T) -> ProtocolResult<usize> {
        self.inner.lock().await.write(message).await
    }
}
