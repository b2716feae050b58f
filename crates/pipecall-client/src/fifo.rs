//! Named-pipe (FIFO) transport implementation
//!
//! Each channel is a filesystem FIFO carrying newline-delimited JSON in one
//! direction. The node is created on first open if absent; the receiver
//! process conventionally creates both with `mkfifo` as well, whichever side
//! starts first wins.

use crate::transport::{AsyncReader, AsyncWriter};
use async_trait::async_trait;
use pipecall_core::{Result, RpcError};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::pipe;
use tokio::time::Instant;
use tracing::debug;

/// How often to re-attempt opening the write end while no reader is attached
const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Create the FIFO node if it does not exist yet
fn ensure_fifo(path: &Path) -> Result<()> {
    use nix::sys::stat::Mode;

    match nix::unistd::mkfifo(path, Mode::from_bits_truncate(0o666)) {
        Ok(()) => {
            debug!("Created fifo {}", path.display());
            Ok(())
        }
        Err(nix::errno::Errno::EEXIST) => Ok(()),
        Err(e) => Err(RpcError::ChannelUnavailable(format!(
            "Cannot create fifo {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Open a FIFO for writing, waiting up to `open_timeout` for a reader.
///
/// A FIFO write end cannot open before some process holds the read end, and
/// the receiver may not be up yet — that is expected, not exceptional. The
/// open is retried non-blocking until the guard timeout, then reported as
/// `ChannelUnavailable`. A path that cannot exist (missing parent directory)
/// fails immediately.
pub async fn open_for_write(path: &Path, open_timeout: Duration) -> Result<FifoWriter> {
    ensure_fifo(path)?;

    let deadline = Instant::now() + open_timeout;
    let sender = loop {
        match pipe::OpenOptions::new().open_sender(path) {
            Ok(tx) => break tx,
            Err(e) if e.raw_os_error() == Some(nix::libc::ENXIO) => {
                // No reader attached yet
                if Instant::now() >= deadline {
                    return Err(RpcError::ChannelUnavailable(format!(
                        "No reader on {} within {:?}",
                        path.display(),
                        open_timeout
                    )));
                }
                tokio::time::sleep(OPEN_RETRY_INTERVAL).await;
            }
            Err(e) => {
                return Err(RpcError::ChannelUnavailable(format!(
                    "Cannot open {} for writing: {}",
                    path.display(),
                    e
                )));
            }
        }
    };

    debug!("Opened {} for writing", path.display());
    Ok(FifoWriter { inner: sender })
}

/// Open a FIFO for reading.
///
/// The descriptor is opened read-write: holding a write end of our own means
/// an absent or restarting writer is a quiet pipe rather than instant EOF,
/// so this never waits for the peer and needs no guard timeout.
pub fn open_for_read(path: &Path) -> Result<FifoReader> {
    ensure_fifo(path)?;

    let receiver = pipe::OpenOptions::new()
        .read_write(true)
        .open_receiver(path)
        .map_err(|e| {
            RpcError::ChannelUnavailable(format!(
                "Cannot open {} for reading: {}",
                path.display(),
                e
            ))
        })?;

    debug!("Opened {} for reading", path.display());
    Ok(FifoReader {
        inner: receiver,
        buf: Vec::new(),
    })
}

/// Write half of a FIFO channel
pub struct FifoWriter {
    inner: pipe::Sender,
}

impl std::fmt::Debug for FifoWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoWriter").finish_non_exhaustive()
    }
}

#[async_trait]
impl AsyncWriter for FifoWriter {
    async fn write_message(&mut self, data: &[u8]) -> Result<()> {
        self.inner
            .write_all(data)
            .await
            .map_err(|e| RpcError::Transport(format!("Fifo write failed: {}", e)))?;
        self.inner
            .write_all(b"\n")
            .await
            .map_err(|e| RpcError::Transport(format!("Fifo write newline failed: {}", e)))?;
        self.inner
            .flush()
            .await
            .map_err(|e| RpcError::Transport(format!("Fifo flush failed: {}", e)))?;
        Ok(())
    }
}

/// Read half of a FIFO channel, with line buffering
pub struct FifoReader {
    inner: pipe::Receiver,
    buf: Vec<u8>,
}

impl FifoReader {
    /// Pop one complete line off the buffer, newline stripped
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
        line.pop();
        Some(line)
    }

    /// Read one message, or `None` if the deadline passes first.
    ///
    /// A timeout consumes nothing: bytes of a partially received line stay
    /// buffered, and a later read continues the same logical message.
    pub async fn read_message_deadline(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }

            let mut chunk = [0u8; 1024];
            match tokio::time::timeout_at(deadline, self.inner.read(&mut chunk)).await {
                Ok(Ok(0)) => return Err(RpcError::Transport("fifo closed".into())),
                Ok(Ok(n)) => self.buf.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => return Err(RpcError::Transport(format!("Fifo read failed: {}", e))),
                Err(_) => return Ok(None),
            }
        }
    }
}

#[async_trait]
impl AsyncReader for FifoReader {
    async fn read_message(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }

            let mut chunk = [0u8; 1024];
            match self.inner.read(&mut chunk).await {
                Ok(0) => return Err(RpcError::Transport("fifo closed".into())),
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) => return Err(RpcError::Transport(format!("Fifo read failed: {}", e))),
            }
        }
    }
}
