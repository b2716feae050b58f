//! Correlated RPC client
//!
//! Turns a `(method, args)` pair into an [`Outcome`]: serialize a request
//! envelope, write it to the request pipe, and either return after the write
//! (fire-and-forget) or wait for the matching response with a per-call
//! deadline.

use crate::fifo;
use crate::transport::{AsyncWriter, WaiterTx, dispatcher_task};
use pipecall_core::{Outcome, RequestEnvelope, Result, RpcError, encode_request};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Configuration for one client instance
///
/// Constructed once and never mutated; clones are cheap. The defaults are the
/// DreamBot shim convention paths — always overridable, never assumed
/// anywhere but here.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// FIFO the receiver reads method calls from
    pub request_path: PathBuf,
    /// FIFO the receiver writes replies to; `None` makes the whole instance
    /// fire-and-forget
    pub response_path: Option<PathBuf>,
    /// Deadline applied to calls that wait for a response
    pub default_timeout: Duration,
    /// Guard timeout for attaching to the request pipe at connect
    pub open_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_path: PathBuf::from("/tmp/dreambot_shim_pipe"),
            response_path: Some(PathBuf::from("/tmp/dreambot_shim_response_pipe")),
            default_timeout: Duration::from_secs(5),
            open_timeout: Duration::from_secs(5),
        }
    }
}

/// Per-call overrides, defaulting to the instance configuration
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Response deadline for this call
    pub timeout: Option<Duration>,
    /// Wait for a response (`false` forces fire-and-forget for this call)
    pub wait: Option<bool>,
    /// Cancellation signal; firing it resolves the call to `Cancelled`
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Default::default()
        }
    }

    pub fn no_wait() -> Self {
        Self {
            wait: Some(false),
            ..Default::default()
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// RPC client over a pair of named pipes
///
/// Safe to share across tasks: writes serialize through an internal lock and
/// every waiting call owns a distinct correlation id, so concurrent calls
/// each receive only their own reply.
pub struct RpcClient {
    config: ClientConfig,
    /// Writer half of the request channel; writes are one-at-a-time so
    /// concurrent calls cannot interleave partial lines
    writer: Arc<Mutex<Box<dyn AsyncWriter>>>,
    /// Registration channel to the response dispatcher, absent in
    /// fire-and-forget instances
    register_tx: Option<mpsc::Sender<(String, WaiterTx)>>,
    /// Next correlation id
    next_id: AtomicU64,
    /// Background dispatcher task handle
    _dispatcher_handle: Option<tokio::task::JoinHandle<()>>,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Open the configured channels and start the response dispatcher
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        info!("Opening request pipe {}", config.request_path.display());
        let writer = fifo::open_for_write(&config.request_path, config.open_timeout).await?;

        let (register_tx, dispatcher_handle) = match &config.response_path {
            Some(path) => {
                info!("Opening response pipe {}", path.display());
                let reader = fifo::open_for_read(path)?;
                let (register_tx, register_rx) = mpsc::channel(16);
                let handle = tokio::spawn(dispatcher_task(reader, register_rx));
                (Some(register_tx), Some(handle))
            }
            None => (None, None),
        };

        Ok(Self {
            config,
            writer: Arc::new(Mutex::new(Box::new(writer))),
            register_tx,
            next_id: AtomicU64::new(1),
            _dispatcher_handle: dispatcher_handle,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Invoke a method with the instance defaults
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Outcome> {
        self.call_with(method, args, CallOptions::default()).await
    }

    /// Invoke a method with per-call overrides
    pub async fn call_with(
        &self,
        method: &str,
        args: Vec<Value>,
        opts: CallOptions,
    ) -> Result<Outcome> {
        if method.is_empty() {
            return Err(RpcError::InvalidArgument(
                "method name must not be empty".into(),
            ));
        }
        let timeout = opts.timeout.unwrap_or(self.config.default_timeout);
        if timeout.is_zero() {
            return Err(RpcError::InvalidArgument("timeout must be positive".into()));
        }
        let wait = opts.wait.unwrap_or(self.register_tx.is_some());

        let mut envelope = RequestEnvelope::new(method, args);

        // Register the waiter before writing, so a reply cannot race past the
        // dispatcher while the caller is still between write and wait.
        let mut wait_rx = None;
        if wait {
            let register_tx = self.register_tx.as_ref().ok_or_else(|| {
                RpcError::InvalidArgument(
                    "response waiting requires a response pipe in the configuration".into(),
                )
            })?;

            let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
            envelope = envelope.with_id(id.clone());

            let (waiter_tx, waiter_rx) = oneshot::channel();
            register_tx
                .send((id, waiter_tx))
                .await
                .map_err(|_| RpcError::Transport("dispatcher not running".into()))?;
            wait_rx = Some(waiter_rx);
        }

        let data = encode_request(&envelope)?;
        let json_preview: String = String::from_utf8_lossy(&data).chars().take(200).collect();
        debug!("[client→shim] len={} json={}", data.len(), json_preview);

        {
            let mut guard = self.writer.lock().await;
            if let Err(e) = guard.write_message(&data).await {
                return Ok(Outcome::TransportError(e.to_string()));
            }
        }

        let Some(wait_rx) = wait_rx else {
            // Fire-and-forget: the caller learns the write landed, nothing
            // about what the receiver did with it
            return Ok(Outcome::Success(Value::Null));
        };

        let cancel = opts.cancel.unwrap_or_default();
        tokio::select! {
            _ = cancel.cancelled() => Ok(Outcome::Cancelled),
            waited = tokio::time::timeout(timeout, wait_rx) => match waited {
                Err(_) => Ok(Outcome::Timeout),
                Ok(Err(_)) => Ok(Outcome::TransportError(
                    "dispatcher stopped before replying".into(),
                )),
                Ok(Ok(Ok(resp))) => Ok(Outcome::from_response(resp)),
                Ok(Ok(Err(e))) => Ok(Outcome::TransportError(e.to_string())),
            },
        }
    }
}
