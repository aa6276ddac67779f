//! Error types for the listener and the framing codec.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or polling the listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The bind host did not resolve.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        /// Host that failed to resolve.
        host: String,
        /// Requested port.
        port: u16,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// The bind host resolved to nothing.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Host that resolved to nothing.
        host: String,
        /// Requested port.
        port: u16,
    },
    /// Binding the socket failed.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Bind error.
        #[source]
        source: io::Error,
    },
    /// The listener could not be switched to non-blocking mode.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The bound address could not be read back.
    #[error("failed to read listener address: {source}")]
    LocalAddr {
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Protocol violations that terminate a connection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// More bytes arrived than a length line may hold without a newline.
    #[error("length line exceeds {limit} bytes")]
    LengthLineTooLong {
        /// Longest accepted length line.
        limit: usize,
    },
    /// The length line is not valid UTF-8.
    #[error("length line is not valid UTF-8")]
    LengthNotUtf8,
    /// The length line is not a decimal integer.
    #[error("invalid frame length {line:?}")]
    InvalidLength {
        /// Offending line, whitespace trimmed.
        line: String,
    },
    /// The declared length is zero or negative.
    #[error("frame length must be positive, got {declared}")]
    NonPositiveLength {
        /// Declared length.
        declared: i64,
    },
    /// The declared length exceeds the configured maximum.
    #[error("frame of {declared} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Declared length.
        declared: u64,
        /// Configured maximum.
        limit: usize,
    },
    /// The payload is not a JSON object.
    #[error("malformed payload: {message}")]
    MalformedPayload {
        /// Parser message.
        message: String,
    },
}

impl FrameError {
    /// Creates a malformed payload error.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }
}
