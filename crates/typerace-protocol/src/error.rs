//! Error types for the protocol layer.
//!
//! Every failure here is local to one message. The caller drops the
//! offending message and keeps the connection.

/// Errors that can occur while encoding, decoding, or framing messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The first byte is not an opcode this side understands.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    /// A powerup or status-effect byte outside the known set.
    #[error("unknown powerup id {0}")]
    UnknownPowerup(u8),

    /// The buffer ended before a fixed-size field or a declared length.
    ///
    /// `needed` is how many bytes the next read required, `remaining` is
    /// how many were left at that point.
    #[error("truncated message: needed {needed} bytes, {remaining} remaining")]
    TruncatedMessage { needed: usize, remaining: usize },

    /// A `Register` name longer than its one-byte length prefix allows.
    /// Raised at encode time so the UI can reject the input before sending.
    #[error("name is {0} bytes, the limit is 255")]
    NameTooLong(usize),

    /// A list or string too long for its length prefix.
    #[error("{what} has {len} entries, the limit is {max}")]
    ListTooLong {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// A length-prefixed frame larger than the framing layer accepts.
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
}
