//! Call outcome classification
//!
//! Every call resolves to exactly one [`Outcome`]. A missing response is
//! reported as `Timeout` or `TransportError`; the client never substitutes a
//! placeholder value for an answer the receiver did not give.

use crate::envelope::ResponseEnvelope;
use serde_json::Value;

/// The client-facing result of one call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Remote executed and reported success; fire-and-forget writes resolve
    /// to `Success(Value::Null)` once the write lands
    Success(Value),
    /// Remote executed but reported failure
    ApplicationError(String),
    /// No matching response arrived before the deadline
    Timeout,
    /// The channel failed mid-call (broken pipe, dispatcher gone)
    TransportError(String),
    /// The caller aborted the wait
    Cancelled,
}

impl Outcome {
    /// Classify a response envelope
    pub fn from_response(resp: ResponseEnvelope) -> Self {
        if resp.success {
            Outcome::Success(resp.result)
        } else {
            Outcome::ApplicationError(
                resp.error
                    .unwrap_or_else(|| "unspecified remote error".to_string()),
            )
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The success payload, if any
    pub fn success_value(&self) -> Option<&Value> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }

    /// Normalize a boolean success payload.
    ///
    /// Receivers format results loosely: a bank check may answer `true` or
    /// the string `"true"`. Callers get one answer here instead of sniffing
    /// types themselves.
    pub fn as_bool(&self) -> Option<bool> {
        match self.success_value()? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Normalize an integer success payload (number or numeric string)
    pub fn as_i64(&self) -> Option<i64> {
        match self.success_value()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(success: bool, result: Value, error: Option<&str>) -> ResponseEnvelope {
        ResponseEnvelope {
            id: None,
            success,
            result,
            error: error.map(String::from),
        }
    }

    #[test]
    fn test_classify_success() {
        let outcome = Outcome::from_response(response(true, json!(42), None));
        assert_eq!(outcome, Outcome::Success(json!(42)));
    }

    #[test]
    fn test_classify_application_error() {
        let outcome = Outcome::from_response(response(false, Value::Null, Some("Item not found")));
        assert_eq!(
            outcome,
            Outcome::ApplicationError("Item not found".to_string())
        );
    }

    #[test]
    fn test_classify_failure_without_message() {
        let outcome = Outcome::from_response(response(false, Value::Null, None));
        match outcome {
            Outcome::ApplicationError(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected ApplicationError, got {:?}", other),
        }
    }

    #[test]
    fn test_bool_normalization() {
        assert_eq!(Outcome::Success(json!(true)).as_bool(), Some(true));
        assert_eq!(Outcome::Success(json!("False")).as_bool(), Some(false));
        assert_eq!(Outcome::Success(json!("open")).as_bool(), None);
        assert_eq!(Outcome::Timeout.as_bool(), None);
    }

    #[test]
    fn test_count_normalization() {
        assert_eq!(Outcome::Success(json!(28)).as_i64(), Some(28));
        assert_eq!(Outcome::Success(json!("28")).as_i64(), Some(28));
        assert_eq!(Outcome::Success(json!(true)).as_i64(), None);
    }
}
