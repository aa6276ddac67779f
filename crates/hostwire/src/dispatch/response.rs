//! Response envelopes and their wire encoding.

use serde::Serialize;
use serde_json::Value;

use super::errors::{DispatchError, RpcError};
use crate::transport::encode_frame;

/// Body of a response: either a result or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outcome {
    Result(Value),
    Error(RpcError),
}

/// Response envelope echoing the request id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Response {
    id: i64,
    #[serde(flatten)]
    outcome: Outcome,
}

impl Response {
    pub(crate) fn new(id: i64, body: Result<Value, RpcError>) -> Self {
        let outcome = match body {
            Ok(result) => Outcome::Result(result),
            Err(error) => Outcome::Error(error),
        };
        Self { id, outcome }
    }

    #[cfg(test)]
    pub(crate) fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Serialises the envelope as one compact JSON frame.
    pub(crate) fn to_frame(&self) -> Result<Vec<u8>, DispatchError> {
        let payload = serde_json::to_vec(self)?;
        Ok(encode_frame(&payload))
    }
}
