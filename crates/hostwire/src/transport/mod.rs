//! TCP transport for the automation endpoint.
//!
//! Everything here is non-blocking and driven from the host loop thread: the
//! engine polls the listener for new clients and each connection for bytes at
//! every pump. Frames are `<decimal length>\n<payload>`.

mod codec;
mod connection;
mod errors;
mod listener;

pub(crate) use self::codec::encode_frame;
pub(crate) use self::connection::{Connection, ReadOutcome};
pub use self::errors::{FrameError, ListenerError};
pub(crate) use self::listener::EndpointListener;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
