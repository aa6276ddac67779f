//! Error types for request dispatch.
//!
//! [`RpcError`] is the protocol-level failure a handler reports back to the
//! client in an error envelope; the connection stays open. [`DispatchError`]
//! covers failures that end the connection instead.

use serde::Serialize;
use thiserror::Error;

use crate::registry::RegistryError;
use crate::transport::FrameError;

/// Protocol-level error carried in the `error` member of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message} ({code})")]
pub(crate) struct RpcError {
    pub(crate) code: i32,
    pub(crate) message: String,
}

impl RpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The handle was never issued, or its object has been destroyed.
    pub(crate) fn unknown_id() -> Self {
        Self::new(-32602, "Invalid params: unknown id")
    }

    /// The method is not part of the protocol (strict mode only).
    pub(crate) fn method_not_found() -> Self {
        Self::new(-32601, "Method not found")
    }

    /// The graphics item behind a handle was destroyed.
    pub(crate) fn stale_item() -> Self {
        Self::new(-32004, "Stale handle: graphics item destroyed")
    }

    /// A graphics item without an object facet cannot be clicked.
    pub(crate) fn item_not_clickable() -> Self {
        Self::new(
            -32000,
            "Graphics item is not an object; semantic click unsupported",
        )
    }

    /// A graphics object offers none of the click operations.
    pub(crate) fn item_without_click() -> Self {
        Self::new(-32001, "Graphics object has no invokable click/trigger/clicked")
    }

    /// A tab strip without a selected tab cannot be clicked.
    pub(crate) fn no_current_tab() -> Self {
        Self::new(-32006, "Tab bar has no current index")
    }

    /// The object offers no way to be clicked.
    pub(crate) fn click_unsupported() -> Self {
        Self::new(-32008, "Unsupported object type for semantic click")
    }

    /// The object refuses text, or the text does not fit the field.
    pub(crate) fn text_unsupported() -> Self {
        Self::new(-32010, "Unsupported object type or read-only")
    }

    /// A graphics item shows no editable text.
    pub(crate) fn item_not_text_editable() -> Self {
        Self::new(-32020, "Graphics item not text-editable")
    }

    /// A graphics object refused the text.
    pub(crate) fn item_text_rejected() -> Self {
        Self::new(-32021, "Graphics object has no writable text/value")
    }

    /// An engine-side failure unrelated to the request.
    pub(crate) fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(-32603, format!("Internal error: {detail}"))
    }
}

impl From<RegistryError> for RpcError {
    fn from(error: RegistryError) -> Self {
        Self::internal(error)
    }
}

/// Failures that close the connection without a response.
#[derive(Debug, Error)]
pub(crate) enum DispatchError {
    /// The client violated the framing or payload rules.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The response could not be serialised.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}
