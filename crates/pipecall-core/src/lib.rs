//! # pipecall-core
//!
//! Wire envelopes and outcome types for the pipecall RPC protocol.
//!
//! This crate defines the pieces shared by clients and test harnesses:
//! - Request and response envelopes (one JSON document per line)
//! - The call outcome taxonomy
//! - Error types

pub mod envelope;
pub mod error;
pub mod outcome;

pub use envelope::{RequestEnvelope, ResponseEnvelope, decode_response, encode_request};
pub use error::{Result, RpcError};
pub use outcome::Outcome;
