//! Frame reader with batch splitting.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

use super::error::{ProtocolError, ProtocolResult};
use super::header::{FrameHeaders, HeaderLine, parse_header_line};

pub const DEFAULT_MAX_HEADER_LINE: usize = 8192;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 256;
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

const READ_CHUNK: usize = 64 * 1024;

/// Bounds applied while reading frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    /// Longest accepted header line, excluding the CRLF.
    pub max_header_line: usize,
    /// Most messages a single array payload may carry.
    pub max_batch_size: usize,
    /// Largest accepted `Content-Length`, checked before any payload byte.
    pub max_content_length: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_header_line: DEFAULT_MAX_HEADER_LINE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

/// One wire frame: headers plus the raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub headers: FrameHeaders,
    pub payload: Vec<u8>,
}

/// Fixed-capacity FIFO holding the tail of a batch payload.
///
/// Refilled only once fully drained, so it never holds more than one batch.
#[derive(Debug)]
pub struct BatchQueue {
    items: Vec<Value>,
    head: usize,
    capacity: usize,
}

impl BatchQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            head: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Split a batch: the first message is returned, the rest are queued.
    fn load(&mut self, batch: Vec<Value>) -> ProtocolResult<Value> {
        debug_assert!(self.is_empty(), "batch loaded before queue drained");
        if batch.is_empty() {
            return Err(ProtocolError::EmptyBatch);
        }
        if batch.len() > self.capacity {
            return Err(ProtocolError::BatchTooLarge {
                size: batch.len(),
                limit: self.capacity,
            });
        }

        self.items = batch;
        self.head = 0;
        Ok(self.pop().unwrap_or(Value::Null))
    }

    pub fn pop(&mut self) -> Option<Value> {
        if self.head >= self.items.len() {
            if !self.items.is_empty() {
                self.items.clear();
                self.head = 0;
            }
            return None;
        }
        let value = std::mem::take(&mut self.items[self.head]);
        self.head += 1;
        Some(value)
    }
}

/// Reads content-length framed JSON messages from a byte stream.
///
/// Reads go through a `BufReader`, so [`into_inner`](Self::into_inner)
/// discards any bytes already buffered past the last frame.
pub struct FrameReader<R> {
    reader: BufReader<R>,
    queue: BatchQueue,
    limits: FrameLimits,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, FrameLimits::default())
    }

    pub fn with_limits(reader: R, limits: FrameLimits) -> Self {
        Self {
            reader: BufReader::new(reader),
            queue: BatchQueue::new(limits.max_batch_size),
            limits,
        }
    }

    /// Messages from an earlier batch still waiting to be returned.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Read one CRLF-terminated line. `None` means the stream ended before
    /// any byte of the line arrived.
    async fn read_header_line(&mut self) -> ProtocolResult<Option<String>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            let n = self.reader.read(&mut byte).await?;
            if n == 0 {
                if line.is_empty() {
                    return Ok(None);
                }
                return Err(ProtocolError::UnexpectedEof);
            }

            line.push(byte[0]);
            if line.ends_with(b"\r\n") {
                line.truncate(line.len() - 2);
                return String::from_utf8(line).map(Some).map_err(|e| {
                    ProtocolError::MalformedHeader {
                        line: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    }
                });
            }

            // +1 leaves room for a CR waiting on its LF
            if line.len() > self.limits.max_header_line + 1 {
                return Err(ProtocolError::HeaderTooLong {
                    limit: self.limits.max_header_line,
                });
            }
        }
    }

    /// Read the next raw frame. Returns `Ok(None)` on a clean end of stream.
    ///
    /// Blank lines before the first header are skipped, which tolerates the
    /// CRLF trailing every payload written by [`super::FrameWriter`].
    pub async fn read_frame(&mut self) -> ProtocolResult<Option<Frame>> {
        let mut headers = FrameHeaders::new();

        loop {
            let Some(line) = self.read_header_line().await? else {
                if headers.is_empty() {
                    return Ok(None);
                }
                return Err(ProtocolError::UnexpectedEof);
            };

            match parse_header_line(&line)? {
                HeaderLine::End if headers.is_empty() => continue,
                HeaderLine::End => break,
                HeaderLine::Field { name, value } => headers.insert(name, value),
            }
        }

        let expected = headers.content_length()?;
        if expected > self.limits.max_content_length {
            return Err(ProtocolError::PayloadTooLarge {
                declared: expected,
                limit: self.limits.max_content_length,
            });
        }

        // Grows with the bytes that arrive, not with the declared length
        let mut payload = Vec::with_capacity(expected.min(READ_CHUNK));
        let received = (&mut self.reader)
            .take(expected as u64)
            .read_to_end(&mut payload)
            .await?;
        if received < expected {
            return Err(ProtocolError::TruncatedPayload { expected, received });
        }

        crate::debug_event!("framing", "frame", "{expected} bytes, {} headers", headers.len());
        Ok(Some(Frame { headers, payload }))
    }

    /// Read the next logical message.
    ///
    /// Queued batch messages are returned first; only when the queue is
    /// drained is a new frame pulled from the stream. An array payload yields
    /// its elements one call at a time, in order.
    pub async fn read_message(&mut self) -> ProtocolResult<Option<Value>> {
        if let Some(queued) = self.queue.pop() {
            return Ok(Some(queued));
        }

        let Some(frame) = self.read_frame().await? else {
            return Ok(None);
        };

        let text = String::from_utf8(frame.payload)?;
        let value: Value = serde_json::from_str(&text).map_err(ProtocolError::MalformedPayload)?;

        match value {
            Value::Array(batch) => {
                crate::debug_event!("framing", "batch", "{} messages", batch.len());
                self.queue.load(batch).map(Some)
            }
            single => Ok(Some(single)),
        }
    }

    /// Read the next logical message and deserialize it.
    pub async fn read<T: DeserializeOwned>(&mut self) -> ProtocolResult<Option<T>> {
        match self.read_message().await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(ProtocolError::MalformedPayload),
            None => Ok(None),
        }
    }
}
