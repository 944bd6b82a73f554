//! Big-endian primitives shared by both directions of the codec.
//!
//! Reads are bounds-checked against the declared lengths before any
//! allocation, so a hostile count byte can never make us read past the
//! buffer or reserve more memory than the buffer could describe.

use crate::{PlayerId, PlayerRecord, PowerupId, ProtocolError};

/// Largest value a one-byte length prefix can carry.
pub(crate) const MAX_U8_LEN: usize = u8::MAX as usize;

/// A forward-only cursor over one message.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        if n > self.remaining() {
            return Err(ProtocolError::TruncatedMessage {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// `u8 len` followed by `len` bytes of UTF-8.
    ///
    /// Invalid UTF-8 is replaced rather than rejected: a garbled name or
    /// word should not cost us the whole message.
    pub(crate) fn read_str8(&mut self) -> Result<String, ProtocolError> {
        let len = usize::from(self.read_u8()?);
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub(crate) fn read_player_id(&mut self) -> Result<PlayerId, ProtocolError> {
        Ok(PlayerId(self.read_u8()?))
    }

    pub(crate) fn read_powerup(&mut self) -> Result<PowerupId, ProtocolError> {
        PowerupId::try_from(self.read_u8()?)
    }

    /// `u8 id` followed by a `str8` name.
    pub(crate) fn read_player(&mut self) -> Result<PlayerRecord, ProtocolError> {
        let id = self.read_player_id()?;
        let name = self.read_str8()?;
        Ok(PlayerRecord { id, name })
    }

    /// Reads `count` items, each at least `min_item_len` bytes long.
    ///
    /// The count is checked against the remaining buffer first, which
    /// caps the up-front allocation at what the buffer could hold.
    pub(crate) fn read_list<T>(
        &mut self,
        count: usize,
        min_item_len: usize,
        mut read_item: impl FnMut(&mut Self) -> Result<T, ProtocolError>,
    ) -> Result<Vec<T>, ProtocolError> {
        let needed = count.saturating_mul(min_item_len);
        if needed > self.remaining() {
            return Err(ProtocolError::TruncatedMessage {
                needed,
                remaining: self.remaining(),
            });
        }
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read_item(self)?);
        }
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

pub(crate) fn put_u8(buf: &mut Vec<u8>, value: u8) {
    buf.push(value);
}

pub(crate) fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Checks that a list fits a one-byte count and returns that count.
pub(crate) fn count8(what: &'static str, len: usize) -> Result<u8, ProtocolError> {
    u8::try_from(len).map_err(|_| ProtocolError::ListTooLong {
        what,
        len,
        max: MAX_U8_LEN,
    })
}

/// Writes `u8 len` followed by the string's bytes.
pub(crate) fn put_str8(
    buf: &mut Vec<u8>,
    what: &'static str,
    value: &str,
) -> Result<(), ProtocolError> {
    let len = count8(what, value.len())?;
    put_u8(buf, len);
    buf.extend_from_slice(value.as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reads_big_endian() {
        let mut r = Reader::new(&[0x01, 0x02, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
        assert_eq!(r.read_u32().unwrap(), 0x0000_0100);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_reader_refuses_to_read_past_end() {
        let mut r = Reader::new(&[0x00, 0x01]);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::TruncatedMessage { needed: 4, remaining: 2 }
        ));
    }

    #[test]
    fn test_str8_length_beyond_buffer_is_truncated() {
        // Declares 10 bytes, only 3 follow.
        let mut r = Reader::new(&[10, b'a', b'b', b'c']);
        assert!(matches!(
            r.read_str8(),
            Err(ProtocolError::TruncatedMessage { needed: 10, remaining: 3 })
        ));
    }

    #[test]
    fn test_str8_invalid_utf8_is_replaced() {
        let mut r = Reader::new(&[2, 0xff, b'a']);
        assert_eq!(r.read_str8().unwrap(), "\u{fffd}a");
    }

    #[test]
    fn test_read_list_rejects_count_larger_than_buffer() {
        let mut r = Reader::new(&[1, 2, 3]);
        let err = r
            .read_list(1_000_000, 1, |r| r.read_u8())
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::TruncatedMessage { needed: 1_000_000, remaining: 3 }
        ));
    }

    #[test]
    fn test_put_str8_rejects_long_values() {
        let mut buf = Vec::new();
        let long = "x".repeat(256);
        let err = put_str8(&mut buf, "word", &long).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ListTooLong { what: "word", len: 256, max: 255 }
        ));
        assert!(buf.is_empty());
    }
}
