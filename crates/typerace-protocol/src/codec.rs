//! The [`Codec`] trait and the binary wire codec.
//!
//! Layout is big-endian with no padding. Every message starts with a
//! one-byte opcode; what follows depends on the opcode.
//!
//! ```text
//! Client → server
//!   Register        [0] [u8 len] [len × u8 name]
//!   Submit          [1] [u32 word_index]
//!   PurchasePowerup [2] [u8 powerup] [u8 target]
//!   SkipWait        [3]
//!   SelectPowerup   [4] [u8 count] [count × u8 powerup]
//!
//! Server → client
//!   HubHello        [0]
//!   LobbyHello      [1] [u8 player_id] [u16 time_left]
//!                       [u8 count] [count × player]
//!                       [u32 count] [count × (u8 len, len bytes)]
//!                       [u8 count] [count × u8 powerup]
//!   NewPlayer       [2] [player]
//!   StartGame       [3]
//!   ProgressUpdate  [4] [u8 player_id] [u32 progress]
//!   PlayerFinished  [5] [u8 player_id] [u8 place]
//!   StatusChanged   [6] [u8 player_id] [u8 count] [count × u8 effect]
//!   PurchaseResult  [7] [u8 powerup] [u8 success]
//!   UpdateWords     [8] [u32 start_index] [u8 count] [count × (u8 len, len bytes)]
//!
//! player = [u8 id] [u8 len] [len × u8 name]
//! ```
//!
//! The word count in `LobbyHello` is four bytes because the stream can be
//! longer than 255 words; every other count is one byte.

use crate::wire::{self, Reader};
use crate::{ClientMessage, ProtocolError, ServerMessage, ServerOpcode};

/// Converts the client's outbound messages to bytes and the server's
/// inbound bytes to messages.
///
/// The client never decodes its own outbound format, so the two
/// directions are deliberately asymmetric.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an outbound message.
    ///
    /// # Errors
    /// [`ProtocolError::NameTooLong`] for a `Register` name over 255 bytes,
    /// [`ProtocolError::ListTooLong`] for a selection over 255 entries.
    fn encode(&self, msg: &ClientMessage) -> Result<Vec<u8>, ProtocolError>;

    /// Parses one inbound message.
    ///
    /// # Errors
    /// [`ProtocolError::UnknownOpcode`] for an unrecognized first byte,
    /// [`ProtocolError::TruncatedMessage`] when the buffer is shorter than
    /// the layout or a declared length requires.
    fn decode(&self, data: &[u8]) -> Result<ServerMessage, ProtocolError>;
}

/// The production [`Codec`]: the compact binary layout above.
///
/// ```rust
/// use typerace_protocol::{BinaryCodec, ClientMessage, Codec};
///
/// let bytes = BinaryCodec.encode(&ClientMessage::Submit { word_index: 3 }).unwrap();
/// assert_eq!(bytes, vec![1, 0, 0, 0, 3]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode(&self, msg: &ClientMessage) -> Result<Vec<u8>, ProtocolError> {
        encode_client_message(msg)
    }

    fn decode(&self, data: &[u8]) -> Result<ServerMessage, ProtocolError> {
        decode_server_message(data)
    }
}

/// Encodes a client → server message.
pub fn encode_client_message(
    msg: &ClientMessage,
) -> Result<Vec<u8>, ProtocolError> {
    let opcode = msg.opcode() as u8;
    let buf = match msg {
        ClientMessage::Register { name } => {
            if name.len() > wire::MAX_U8_LEN {
                return Err(ProtocolError::NameTooLong(name.len()));
            }
            let mut buf = Vec::with_capacity(2 + name.len());
            wire::put_u8(&mut buf, opcode);
            wire::put_str8(&mut buf, "name", name)?;
            buf
        }
        ClientMessage::Submit { word_index } => {
            let mut buf = Vec::with_capacity(5);
            wire::put_u8(&mut buf, opcode);
            wire::put_u32(&mut buf, *word_index);
            buf
        }
        ClientMessage::PurchasePowerup(purchase) => {
            vec![opcode, purchase.powerup.to_u8(), purchase.target.0]
        }
        ClientMessage::SkipWait => vec![opcode],
        ClientMessage::SelectPowerup { powerups } => {
            let count = wire::count8("powerup selection", powerups.len())?;
            let mut buf = Vec::with_capacity(2 + powerups.len());
            wire::put_u8(&mut buf, opcode);
            wire::put_u8(&mut buf, count);
            buf.extend(powerups.iter().map(|p| p.to_u8()));
            buf
        }
    };
    Ok(buf)
}

/// Decodes a server → client message.
///
/// Bytes after a complete message are ignored.
pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage, ProtocolError> {
    let mut r = Reader::new(data);
    let opcode = ServerOpcode::try_from(r.read_u8()?)?;

    let msg = match opcode {
        ServerOpcode::HubHello => ServerMessage::HubHello,

        ServerOpcode::LobbyHello => {
            let player_id = r.read_player_id()?;
            let time_left = r.read_u16()?;

            let player_count = usize::from(r.read_u8()?);
            // id + name length byte
            let players = r.read_list(player_count, 2, Reader::read_player)?;

            let word_count = r.read_u32()? as usize;
            let words = r.read_list(word_count, 1, Reader::read_str8)?;

            let powerup_count = usize::from(r.read_u8()?);
            let powerups = r.read_list(powerup_count, 1, Reader::read_powerup)?;

            ServerMessage::LobbyHello {
                player_id,
                time_left,
                players,
                words,
                powerups,
            }
        }

        ServerOpcode::NewPlayer => ServerMessage::NewPlayer(r.read_player()?),

        ServerOpcode::StartGame => ServerMessage::StartGame,

        ServerOpcode::ProgressUpdate => ServerMessage::ProgressUpdate {
            player_id: r.read_player_id()?,
            progress: r.read_u32()?,
        },

        ServerOpcode::PlayerFinished => ServerMessage::PlayerFinished {
            player_id: r.read_player_id()?,
            place: r.read_u8()?,
        },

        ServerOpcode::StatusChanged => {
            let player_id = r.read_player_id()?;
            let count = usize::from(r.read_u8()?);
            let effects = r.read_list(count, 1, Reader::read_powerup)?;
            ServerMessage::StatusChanged { player_id, effects }
        }

        ServerOpcode::PurchaseResult => ServerMessage::PurchaseResult {
            powerup: r.read_powerup()?,
            success: r.read_u8()? == 1,
        },

        ServerOpcode::UpdateWords => {
            let start_index = r.read_u32()?;
            let count = usize::from(r.read_u8()?);
            let words = r.read_list(count, 1, Reader::read_str8)?;
            ServerMessage::UpdateWords { start_index, words }
        }
    };

    Ok(msg)
}

// =========================================================================
// Tests
// =========================================================================
