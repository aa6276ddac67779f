//! Protocol method handlers.
//!
//! Handlers run on the loop thread and never block. Introspection handlers
//! answer from the live model; mutation handlers validate synchronously and
//! defer the actual change to a later loop iteration.

mod introspection;
mod mutation;
mod summary;
mod temporal;

use serde::Serialize;
use serde_json::Value;

use super::errors::RpcError;

pub(crate) use self::introspection::{app_info, children, info, ping, roots};
pub(crate) use self::mutation::{click, set_text};

/// What every handler returns.
pub(crate) type HandlerResult = Result<Value, RpcError>;

fn to_result<T: Serialize>(value: &T) -> HandlerResult {
    serde_json::to_value(value).map_err(RpcError::internal)
}
