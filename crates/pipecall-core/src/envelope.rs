//! Wire envelopes for the pipe RPC protocol
//!
//! One JSON document per line in each direction. Requests carry `method`,
//! `args`, and an optional correlation `id`; responses carry `success`,
//! `result`, `error`, and echo the `id` when the receiver saw one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single method invocation, written once to the request channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub method: String,
    pub args: Vec<Value>,
    /// Correlation id, present when the caller waits for a response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RequestEnvelope {
    /// Create an envelope with no correlation id (fire-and-forget)
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
            id: None,
        }
    }

    /// Attach a correlation id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A single reply read from the response channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Echo of the request correlation id, absent from receivers that
    /// serialize all work and never correlate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// Serialize a request to JSON bytes (no line terminator)
pub fn encode_request(req: &RequestEnvelope) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(req)
}

/// Deserialize a response from JSON bytes
pub fn decode_response(bytes: &[u8]) -> Result<ResponseEnvelope, serde_json::Error> {
    serde_json::from_slice(bytes)
}
