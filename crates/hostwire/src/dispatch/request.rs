//! Request decoding.
//!
//! Requests are lenient: a missing or mistyped `id` becomes `-1`, a missing
//! `method` becomes the empty string, and `params` that are not an object are
//! treated as empty. Only a payload that is not a JSON object is fatal.

use serde_json::{Map, Value};

use crate::transport::FrameError;

/// Request id reported when the client sent none.
pub(crate) const MISSING_REQUEST_ID: i64 = -1;

/// Decoded request envelope.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Request {
    id: i64,
    method: String,
    params: Map<String, Value>,
}

impl Request {
    /// Parses one frame payload.
    pub(crate) fn parse(payload: &[u8]) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|error| FrameError::malformed(error.to_string()))?;
        let Value::Object(mut envelope) = value else {
            return Err(FrameError::malformed("payload is not a JSON object"));
        };
        let id = envelope
            .get("id")
            .and_then(integer)
            .unwrap_or(MISSING_REQUEST_ID);
        let method = match envelope.remove("method") {
            Some(Value::String(method)) => method,
            _ => String::new(),
        };
        let params = match envelope.remove("params") {
            Some(Value::Object(params)) => params,
            _ => Map::new(),
        };
        Ok(Self { id, method, params })
    }

    pub(crate) const fn id(&self) -> i64 {
        self.id
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    /// `params.id`, or `0` when absent or not an integer.
    pub(crate) fn target(&self) -> i64 {
        self.params.get("id").and_then(integer).unwrap_or(0)
    }

    /// `params.text`, or the empty string when absent or not a string.
    pub(crate) fn text(&self) -> &str {
        self.params
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Reads a JSON number as an integer, accepting whole-valued floats.
fn integer(value: &Value) -> Option<i64> {
    if let Some(int) = value.as_i64() {
        return Some(int);
    }
    let float = value.as_f64()?;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range and fraction are checked before the cast"
    )]
    let whole = float as i64;
    let in_range = float >= -9.007_199_254_740_992e15 && float <= 9.007_199_254_740_992e15;
    (float.fract() == 0.0 && in_range).then_some(whole)
}
