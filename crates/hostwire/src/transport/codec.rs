//! Length-prefixed framing.

use super::errors::FrameError;

/// Longest length line accepted before its newline arrives.
pub(crate) const MAX_LENGTH_LINE: usize = 20;

/// Incremental decoder for `<decimal length>\n<payload>` frames.
///
/// Bytes are appended as they arrive; complete payloads are taken out one at
/// a time in arrival order.
#[derive(Debug)]
pub(crate) struct FrameDecoder {
    buffer: Vec<u8>,
    max_frame_bytes: usize,
}

impl FrameDecoder {
    pub(crate) const fn new(max_frame_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_bytes,
        }
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received but not yet returned as part of a frame.
    pub(crate) const fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Takes the next complete payload, if one has fully arrived.
    ///
    /// A frame whose length line is already invalid is reported as soon as
    /// the line is complete, without waiting for the payload.
    pub(crate) fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') else {
            if self.buffer.len() > MAX_LENGTH_LINE {
                return Err(FrameError::LengthLineTooLong {
                    limit: MAX_LENGTH_LINE,
                });
            }
            return Ok(None);
        };
        if newline > MAX_LENGTH_LINE {
            return Err(FrameError::LengthLineTooLong {
                limit: MAX_LENGTH_LINE,
            });
        }

        let Some((line, rest)) = self.buffer.split_at_checked(newline) else {
            return Ok(None);
        };
        let declared = self.parse_length(line)?;
        let Some(body) = rest.get(1..).and_then(|after| after.get(..declared)) else {
            return Ok(None);
        };
        let payload = body.to_vec();
        self.buffer.drain(..=newline + declared);
        Ok(Some(payload))
    }

    fn parse_length(&self, line: &[u8]) -> Result<usize, FrameError> {
        let text = std::str::from_utf8(line).map_err(|_| FrameError::LengthNotUtf8)?;
        let trimmed = text.trim();
        let declared: i64 = trimmed.parse().map_err(|_| FrameError::InvalidLength {
            line: trimmed.to_owned(),
        })?;
        let Ok(size) = u64::try_from(declared) else {
            return Err(FrameError::NonPositiveLength { declared });
        };
        if size == 0 {
            return Err(FrameError::NonPositiveLength { declared });
        }
        match usize::try_from(size) {
            Ok(bytes) if bytes <= self.max_frame_bytes => Ok(bytes),
            _ => Err(FrameError::TooLarge {
                declared: size,
                limit: self.max_frame_bytes,
            }),
        }
    }
}

/// Frames `payload` for the wire.
pub(crate) fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let prefix = format!("{}\n", payload.len());
    let mut frame = Vec::with_capacity(prefix.len() + payload.len());
    frame.extend_from_slice(prefix.as_bytes());
    frame.extend_from_slice(payload);
    frame
}
