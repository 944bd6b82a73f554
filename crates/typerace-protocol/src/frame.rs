//! Length-prefixed framing for stream transports.
//!
//! Message-oriented transports (WebSocket) deliver exactly one message per
//! frame, so the codec needs no framing there. Over a byte stream (raw TCP)
//! message boundaries are lost, so each message is wrapped as:
//!
//! ```text
//! [u32 len (big-endian)] [len bytes of message]
//! ```
//!
//! [`FrameDecoder`] accepts reads of any size and yields whole messages.

use crate::ProtocolError;

/// Largest message body accepted in a frame. A `LobbyHello` with a few
/// thousand words is well under this.
pub const MAX_FRAME_LEN: usize = 1 << 20;

const LEN_PREFIX: usize = 4;

/// Wraps one encoded message in a length prefix.
pub fn encode_frame(message: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if message.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len: message.len(),
            max: MAX_FRAME_LEN,
        });
    }
    let mut buf = Vec::with_capacity(LEN_PREFIX + message.len());
    buf.extend_from_slice(&(message.len() as u32).to_be_bytes());
    buf.extend_from_slice(message);
    Ok(buf)
}

/// Reassembles frames from arbitrarily split reads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes read from the stream.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes buffered but not yet returned as a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Pops the next complete message, if one is buffered.
    ///
    /// # Errors
    /// [`ProtocolError::FrameTooLarge`] if the prefix announces more than
    /// [`MAX_FRAME_LEN`]. The stream cannot be resynchronized after that,
    /// so the caller should close the connection.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ProtocolError> {
        if self.buf.len() < LEN_PREFIX {
            return Ok(None);
        }
        let len = u32::from_be_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]])
            as usize;
        if len > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameTooLarge { len, max: MAX_FRAME_LEN });
        }
        if self.buf.len() < LEN_PREFIX + len {
            return Ok(None);
        }
        let frame = self.buf[LEN_PREFIX..LEN_PREFIX + len].to_vec();
        self.buf.drain(..LEN_PREFIX + len);
        Ok(Some(frame))
    }
}
