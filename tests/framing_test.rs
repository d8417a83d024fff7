//! Wire-level behavior of the frame reader and writer.

use std::io::{Cursor, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use livetest::framing::{FrameLimits, FrameReader, FrameWriter, ProtocolError};
use serde_json::json;
use tokio::io::{AsyncRead, ReadBuf};

/// Byte source that counts how often it is polled for data.
struct CountingReader {
    inner: Cursor<Vec<u8>>,
    reads: Arc<AtomicUsize>,
}

impl CountingReader {
    fn new(bytes: Vec<u8>) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = Self {
            inner: Cursor::new(bytes),
            reads: Arc::clone(&reads),
        };
        (reader, reads)
    }
}

impl AsyncRead for CountingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        this.reads.fetch_add(1, Ordering::SeqCst);
        let n = this.inner.read(buf.initialize_unfilled())?;
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}

fn frame(body: &str) -> Vec<u8> {
    format!("Content-Length: {}\r\n\r\n{body}", body.len()).into_bytes()
}

#[tokio::test]
async fn test_batch_second_message_comes_from_queue() {
    let body = r#"[{"jsonrpc":"2.0","id":"1","method":"A"},{"jsonrpc":"2.0","id":"2","method":"B"}]"#;
    let (source, reads) = CountingReader::new(frame(body));
    let mut reader = FrameReader::new(source);

    let first = reader.read_message().await.unwrap().unwrap();
    assert_eq!(first["id"], "1");
    assert_eq!(reader.pending(), 1);

    let polled = reads.load(Ordering::SeqCst);
    let second = reader.read_message().await.unwrap().unwrap();
    assert_eq!(second["id"], "2");
    assert_eq!(reads.load(Ordering::SeqCst), polled);

    assert!(reader.read_message().await.unwrap().is_none());
}

#[tokio::test]
async fn test_content_length_longer_than_stream() {
    // 12 bytes follow the headers but 13 are declared
    let bytes = b"Content-Length: 13\r\n\r\n{\"a\":\"b\"}xyz".to_vec();
    let mut reader = FrameReader::new(bytes.as_slice());

    let err = reader.read_message().await.unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::TruncatedPayload {
            expected: 13,
            received: 12
        }
    ));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_trailing_garbage_inside_declared_length() {
    let bytes = b"Content-Length: 12\r\n\r\n{\"a\":\"b\"}xyz".to_vec();
    let mut reader = FrameReader::new(bytes.as_slice());

    let err = reader.read_message().await.unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedPayload(_)));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_writer_output_reads_back_in_order() {
    let mut writer = FrameWriter::new(Vec::new());
    writer.write(&json!({"id": "1", "text": "héllo"})).await.unwrap();
    writer
        .write(&json!([{"id": "2"}, {"id": "3"}]))
        .await
        .unwrap();
    let bytes = writer.into_inner();

    let mut reader = FrameReader::new(bytes.as_slice());
    let mut ids = Vec::new();
    while let Some(message) = reader.read_message().await.unwrap() {
        ids.push(message["id"].as_str().unwrap().to_string());
    }
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_read_then_write_keeps_content_length() {
    let body = r#"{"jsonrpc":"2.0","id":"1","method":"Vaults_Get","params":{"text":"héllo wörld"}}"#;
    assert!(body.len() > body.chars().count());
    let bytes = frame(body);
    let mut reader = FrameReader::new(bytes.as_slice());
    let message = reader.read_message().await.unwrap().unwrap();

    let mut writer = FrameWriter::new(Vec::new());
    let written = writer.write(&message).await.unwrap();
    assert_eq!(written, body.len());

    let output = String::from_utf8(writer.into_inner()).unwrap();
    let header = format!("Content-Length: {}\r\n", body.len());
    assert!(output.starts_with(&header));
    assert!(output.contains(body));
}

#[tokio::test]
async fn test_limits_are_configurable() {
    let limits = FrameLimits {
        max_header_line: 64,
        max_batch_size: 1,
        ..FrameLimits::default()
    };

    let batch = frame("[1,2]");
    let mut reader = FrameReader::with_limits(batch.as_slice(), limits);
    assert!(matches!(
        reader.read_message().await.unwrap_err(),
        ProtocolError::BatchTooLarge { size: 2, limit: 1 }
    ));

    let long_header = format!("X-Padding: {}\r\n", "a".repeat(80));
    let mut bytes = long_header.into_bytes();
    bytes.extend(frame("{}"));
    let mut reader = FrameReader::with_limits(bytes.as_slice(), limits);
    assert!(matches!(
        reader.read_message().await.unwrap_err(),
        ProtocolError::HeaderTooLong { limit: 64 }
    ));
}

#[tokio::test]
async fn test_frames_over_duplex_pipe() {
    let (client, server) = tokio::io::duplex(64);

    let send = tokio::spawn(async move {
        let mut writer = FrameWriter::new(client);
        for id in 0..5 {
            writer.write(&json!({ "id": id })).await.unwrap();
        }
    });

    let mut reader = FrameReader::new(server);
    for id in 0..5 {
        let message = reader.read_message().await.unwrap().unwrap();
        assert_eq!(message["id"], id);
    }
    send.await.unwrap();
    assert!(reader.read_message().await.unwrap().is_none());
}
