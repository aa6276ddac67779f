//! One accepted client connection.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

use super::codec::FrameDecoder;
use super::errors::FrameError;

const READ_CHUNK: usize = 8 * 1024;
/// Upper bound on chunks read per pump so one chatty client cannot starve
/// the host loop.
const READ_BUDGET: usize = 64;

/// State of the peer's half of the connection after a read pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    /// More bytes may still arrive.
    Open,
    /// The peer closed its writing half.
    Closed,
}

/// Client connection with its inbound decoder and outbound buffer.
#[derive(Debug)]
pub(crate) struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    decoder: FrameDecoder,
    outbox: Vec<u8>,
}

impl Connection {
    pub(crate) fn new(
        stream: TcpStream,
        peer: SocketAddr,
        max_frame_bytes: usize,
    ) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            peer,
            decoder: FrameDecoder::new(max_frame_bytes),
            outbox: Vec::new(),
        })
    }

    pub(crate) const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads whatever the socket has buffered, within the per-pump budget.
    pub(crate) fn read_available(&mut self) -> io::Result<ReadOutcome> {
        let mut chunk = [0_u8; READ_CHUNK];
        for _ in 0..READ_BUDGET {
            match self.stream.read(&mut chunk) {
                Ok(0) => return Ok(ReadOutcome::Closed),
                Ok(read) => {
                    if let Some(bytes) = chunk.get(..read) {
                        self.decoder.extend(bytes);
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => break,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
        Ok(ReadOutcome::Open)
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        self.decoder.next_frame()
    }

    /// Appends a complete frame to the outbound buffer.
    pub(crate) fn queue(&mut self, frame: &[u8]) {
        self.outbox.extend_from_slice(frame);
    }

    pub(crate) const fn has_pending_output(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Writes as much buffered output as the socket accepts.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        while !self.outbox.is_empty() {
            match self.stream.write(&self.outbox) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(written) => {
                    self.outbox.drain(..written);
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => break,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }
}
