//! # pipecall-client
//!
//! Correlated RPC client over a pair of named pipes.
//!
//! This crate provides:
//! - AsyncReader/AsyncWriter traits for newline-delimited message channels
//! - A FIFO transport (creation, guarded open, line framing)
//! - A background dispatcher routing responses to waiters by correlation id
//! - [`RpcClient`]: call a remote method and get a classified [`Outcome`](pipecall_core::Outcome)

#[cfg(unix)]
pub mod client;
#[cfg(unix)]
pub mod fifo;
#[cfg(unix)]
pub mod methods;
pub mod transport;

#[cfg(unix)]
pub use client::{CallOptions, ClientConfig, RpcClient};
pub use transport::{AsyncReader, AsyncWriter, dispatcher_task};
