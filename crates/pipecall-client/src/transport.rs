//! Transport seam and response dispatcher
//!
//! Provides AsyncReader/AsyncWriter traits for newline-delimited message
//! channels, plus the background dispatcher task that owns the response
//! channel and routes replies to waiters by correlation id.

use async_trait::async_trait;
use pipecall_core::{Result, RpcError, ResponseEnvelope, decode_response};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Trait for async reading from a transport
#[async_trait]
pub trait AsyncReader: Send {
    /// Read one complete message from the transport.
    /// Messages are newline-delimited JSON documents.
    async fn read_message(&mut self) -> Result<Vec<u8>>;
}

/// Trait for async writing to a transport
#[async_trait]
pub trait AsyncWriter: Send + Sync {
    /// Write one complete message to the transport.
    /// Messages are newline-delimited JSON documents.
    async fn write_message(&mut self, data: &[u8]) -> Result<()>;
}

/// Channel half a waiter listens on for its matched response
pub type WaiterTx = oneshot::Sender<Result<ResponseEnvelope>>;

/// Background dispatcher that owns the response channel
///
/// This task:
/// - Accepts `(correlation id, reply channel)` registrations from callers
/// - Reads response lines from the transport
/// - Routes each response to the waiter registered under its id
///
/// Responses with no id are accepted only while exactly one waiter is
/// pending — compatibility with receivers that serialize all work and never
/// echo an id. With two or more waiters pending an un-correlated response is
/// ambiguous and is dropped rather than guessed at.
///
/// Duplicate and unknown ids are dropped; a waiter that gave up (timeout,
/// cancellation) has dropped its reply channel, so a late response for its id
/// is discarded the same way.
pub async fn dispatcher_task<R: AsyncReader>(
    mut reader: R,
    mut register_rx: mpsc::Receiver<(String, WaiterTx)>,
) {
    let mut pending: HashMap<String, WaiterTx> = HashMap::new();

    loop {
        tokio::select! {
            // Biased so a registration already queued is processed before the
            // next response line; callers register before writing, and this
            // keeps that ordering through the dispatcher.
            biased;

            // New waiter from a caller
            reg = register_rx.recv() => {
                match reg {
                    Some((id, waiter_tx)) => {
                        prune_expired(&mut pending);
                        pending.insert(id, waiter_tx);
                    }
                    None => {
                        debug!("Registration channel closed, dispatcher exiting");
                        break;
                    }
                }
            }

            // Response line from the receiver
            msg_result = reader.read_message() => {
                match msg_result {
                    Ok(data) => {
                        let json_preview: String = String::from_utf8_lossy(&data).chars().take(200).collect();
                        debug!("[shim→client] len={} json={}", data.len(), json_preview);

                        match decode_response(&data) {
                            Ok(resp) => route_response(&mut pending, resp),
                            Err(e) => {
                                warn!("Discarding undecodable response line: {}", e);
                            }
                        }
                    }
                    Err(e) => {
                        error!("Response channel read failed: {}", e);
                        // Notify all pending waiters of failure
                        for (_, waiter_tx) in pending.drain() {
                            let _ = waiter_tx.send(Err(RpcError::Transport(
                                "response channel lost".into(),
                            )));
                        }
                        break;
                    }
                }
            }
        }
    }
}

/// Drop entries whose caller already gave up (timeout, cancellation, write
/// failure). Without this a long-lived client grows the map without bound,
/// and a single abandoned call would leave the id-less compatibility mode
/// seeing two "pending" waiters forever.
fn prune_expired(pending: &mut HashMap<String, WaiterTx>) {
    pending.retain(|id, waiter_tx| {
        if waiter_tx.is_closed() {
            debug!("Pruning expired waiter for id {}", id);
            false
        } else {
            true
        }
    });
}

/// Deliver one response to at most one waiter
fn route_response(pending: &mut HashMap<String, WaiterTx>, resp: ResponseEnvelope) {
    prune_expired(pending);
    match resp.id.clone() {
        Some(id) => match pending.remove(&id) {
            Some(waiter_tx) => {
                if waiter_tx.send(Ok(resp)).is_err() {
                    warn!("Waiter for id {} gave up, dropping response", id);
                }
            }
            None => {
                warn!("No pending waiter for response id {}, dropping", id);
            }
        },
        None => {
            // Single-outstanding-call compatibility: an id-less reply is only
            // unambiguous when one waiter is pending.
            if pending.len() == 1 {
                if let Some(id) = pending.keys().next().cloned() {
                    if let Some(waiter_tx) = pending.remove(&id) {
                        let _ = waiter_tx.send(Ok(resp));
                    }
                }
            } else {
                warn!(
                    "Un-correlated response with {} waiters pending, dropping",
                    pending.len()
                );
            }
        }
    }
}
