//! The read loop and per-request pipeline.
//!
//! One task reads frames; each decoded message is handled on its own task,
//! so responses may leave in a different order than requests arrived. At most
//! `max_in_flight` handlers run at once; the reader waits for a free slot
//! before pulling the next message.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::binding::bind_invocation;
use super::error::ServerError;
use super::executor::CommandExecutor;
use super::providers::CredentialProviders;
use crate::config::ServerConfig;
use crate::convert::NullHandling;
use crate::framing::{FrameLimits, FrameReader, SharedFrameWriter};
use crate::protocol::{
    LiveTestRequest, LiveTestResponse, RecordingTracer, codes, translate_credentials,
};
use crate::schema::{ModuleRegistry, ResponseTypeData};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Tunables for a server run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    pub limits: FrameLimits,
    pub nulls: NullHandling,
    /// Requests handled concurrently. Zero is treated as one.
    pub max_in_flight: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            limits: FrameLimits::default(),
            nulls: NullHandling::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl From<&ServerConfig> for ServerOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            limits: FrameLimits {
                max_header_line: config.max_header_line,
                max_batch_size: config.max_batch_size,
                max_content_length: config.max_content_length,
            },
            nulls: NullHandling::from_include(config.include_nulls),
            max_in_flight: config.max_in_flight,
        }
    }
}

/// State shared by every worker task.
struct Dispatch {
    registry: ModuleRegistry,
    executor: Arc<dyn CommandExecutor>,
    providers: CredentialProviders,
    nulls: NullHandling,
}

impl Dispatch {
    async fn handle(&self, message: Value) -> Option<LiveTestResponse> {
        let mut request = match LiveTestRequest::deserialize(&message) {
            Ok(request) => request,
            Err(e) => return undecodable(&message, &e),
        };
        crate::debug_event!("dispatch", "request", "{} {}", request.id, request.method);

        if let Err(e) = translate_credentials(&mut request) {
            tracing::warn!("[dispatch] request {}: {e}", request.id);
            return Some(LiveTestResponse::from_exception(
                &request.id,
                &e,
                codes::INVALID_PARAMS,
            ));
        }

        let Some(operation) = self.registry.operation(&request.method) else {
            tracing::warn!(
                "[dispatch] request {}: unknown operation '{}'",
                request.id,
                request.method
            );
            return Some(LiveTestResponse::error(
                &request.id,
                codes::METHOD_NOT_FOUND,
                format!("Operation '{}' is not available", request.method),
            ));
        };

        let mut invocation = bind_invocation(&request, operation);
        if let Err(e) = self
            .providers
            .apply_all(request.credentials(), &mut invocation)
        {
            tracing::warn!("[dispatch] request {}: {e}", request.id);
            return Some(LiveTestResponse::from_exception(
                &request.id,
                &e,
                codes::INTERNAL_ERROR,
            ));
        }

        let tracer = RecordingTracer::new();
        let response = match self.executor.execute(&invocation, &tracer).await {
            Ok(execution) => LiveTestResponse::from_execution(
                &request,
                &execution,
                &tracer,
                operation
                    .response_type
                    .as_ref()
                    .map(ResponseTypeData::resolved),
                self.nulls,
            ),
            Err(e) => {
                tracing::error!("[dispatch] {} failed: {e}", invocation.command);
                LiveTestResponse::from_exception(&request.id, &e, codes::INTERNAL_ERROR)
            }
        };

        crate::log_event!(
            "dispatch",
            "handled",
            "{} {} ({})",
            request.id,
            operation.operation_id,
            if response.is_error() { "error" } else { "ok" }
        );
        Some(response)
    }
}

/// Answer with -32600 when the message carries an id, otherwise drop it.
fn undecodable(message: &Value, error: &serde_json::Error) -> Option<LiveTestResponse> {
    let id = match message.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            tracing::warn!("[dispatch] dropping message without id: {error}");
            return None;
        }
    };
    tracing::warn!("[dispatch] request {id} is not a valid request: {error}");
    Some(LiveTestResponse::error(
        id,
        codes::INVALID_REQUEST,
        format!("Invalid request: {error}"),
    ))
}

/// Serves JSON-RPC requests against a loaded module.
pub struct LiveTestServer {
    dispatch: Arc<Dispatch>,
    limits: FrameLimits,
    max_in_flight: usize,
    shutdown: CancellationToken,
    running: AtomicBool,
}

impl LiveTestServer {
    pub fn new(
        registry: ModuleRegistry,
        executor: Arc<dyn CommandExecutor>,
        providers: CredentialProviders,
        options: ServerOptions,
    ) -> Self {
        Self {
            dispatch: Arc::new(Dispatch {
                registry,
                executor,
                providers,
                nulls: options.nulls,
            }),
            limits: options.limits,
            max_in_flight: options.max_in_flight.max(1),
            shutdown: CancellationToken::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Handle one decoded message without any transport.
    pub async fn handle_message(&self, message: Value) -> Option<LiveTestResponse> {
        self.dispatch.handle(message).await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop reading. Requests already dispatched still get their responses.
    ///
    /// A stopped server cannot be run again.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Token cancelled by [`stop`](Self::stop), for wiring to signals.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Read requests from `input` and write responses to `output` until the
    /// input ends, [`stop`](Self::stop) is called, or an unrecoverable
    /// protocol error occurs.
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyRunning);
        }
        crate::log_event!("server", "started");

        let mut reader = FrameReader::with_limits(input, self.limits);
        let writer = SharedFrameWriter::new(output);
        let slots = Arc::new(Semaphore::new(self.max_in_flight));
        let mut workers = JoinSet::new();

        let outcome = loop {
            // The permit is taken before reading so no message is left waiting
            let permit = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                permit = Arc::clone(&slots).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                crate::log_event!("server", "stopping", "stop requested");
                break Ok(());
            };

            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                next = reader.read_message() => Some(next),
            };
            let Some(next) = next else {
                crate::log_event!("server", "stopping", "stop requested");
                break Ok(());
            };

            match next {
                Ok(Some(message)) => {
                    let dispatch = Arc::clone(&self.dispatch);
                    let writer = writer.clone();
                    workers.spawn(async move {
                        let _permit = permit;
                        let Some(response) = dispatch.handle(message).await else {
                            return;
                        };
                        if let Err(e) = writer.write(&response).await {
                            tracing::error!(
                                "[server] failed to write response {}: {e}",
                                response.id
                            );
                        }
                    });
                }
                Ok(None) => {
                    crate::log_event!("server", "stopping", "input closed");
                    break Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("[server] skipping message: {e}");
                }
                Err(e) => {
                    tracing::error!("[server] protocol error: {e}");
                    break Err(ServerError::from(e));
                }
            }

            while let Some(done) = workers.try_join_next() {
                if let Err(e) = done {
                    tracing::error!("[server] worker failed: {e}");
                }
            }
        };

        while let Some(done) = workers.join_next().await {
            if let Err(e) = done {
                tracing::error!("[server] worker failed: {e}");
            }
        }

        self.running.store(false, Ordering::SeqCst);
        crate::log_event!("server", "stopped");
        outcome
    }
}
