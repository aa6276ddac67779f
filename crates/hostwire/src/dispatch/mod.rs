//! Request dispatch for the session protocol.
//!
//! A [`Session`] owns everything handlers need: the host model, the handle
//! registry, and the deferrer for mutations. One session serves every
//! connection of an engine, on the loop thread.

mod errors;
mod handlers;
mod request;
mod response;
mod router;
mod session;

pub(crate) use self::errors::DispatchError;
pub(crate) use self::session::{Session, UnknownMethodPolicy};

#[cfg(test)]
pub(crate) use self::{errors::RpcError, request::Request, response::Outcome};
