//! The server's side of the codec: encode [`ServerMessage`]s, decode
//! [`ClientMessage`]s.
//!
//! The client never needs this. It exists so test servers, bots, and
//! replay tools can speak the same layout without hand-assembling bytes.

use crate::wire::{self, Reader};
use crate::{
    ClientMessage, ClientOpcode, PlayerRecord, ProtocolError, Purchase,
    ServerMessage,
};

fn put_player(buf: &mut Vec<u8>, player: &PlayerRecord) -> Result<(), ProtocolError> {
    wire::put_u8(buf, player.id.0);
    if player.name.len() > wire::MAX_U8_LEN {
        return Err(ProtocolError::NameTooLong(player.name.len()));
    }
    wire::put_str8(buf, "name", &player.name)
}

/// Encodes a server → client message.
pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = vec![msg.opcode() as u8];
    match msg {
        ServerMessage::HubHello | ServerMessage::StartGame => {}

        ServerMessage::LobbyHello {
            player_id,
            time_left,
            players,
            words,
            powerups,
        } => {
            wire::put_u8(&mut buf, player_id.0);
            wire::put_u16(&mut buf, *time_left);

            wire::put_u8(&mut buf, wire::count8("players", players.len())?);
            for p in players {
                put_player(&mut buf, p)?;
            }

            let word_count =
                u32::try_from(words.len()).map_err(|_| ProtocolError::ListTooLong {
                    what: "words",
                    len: words.len(),
                    max: u32::MAX as usize,
                })?;
            wire::put_u32(&mut buf, word_count);
            for w in words {
                wire::put_str8(&mut buf, "word", w)?;
            }

            wire::put_u8(&mut buf, wire::count8("powerups", powerups.len())?);
            buf.extend(powerups.iter().map(|p| p.to_u8()));
        }

        ServerMessage::NewPlayer(player) => put_player(&mut buf, player)?,

        ServerMessage::ProgressUpdate { player_id, progress } => {
            wire::put_u8(&mut buf, player_id.0);
            wire::put_u32(&mut buf, *progress);
        }

        ServerMessage::PlayerFinished { player_id, place } => {
            wire::put_u8(&mut buf, player_id.0);
            wire::put_u8(&mut buf, *place);
        }

        ServerMessage::StatusChanged { player_id, effects } => {
            wire::put_u8(&mut buf, player_id.0);
            wire::put_u8(&mut buf, wire::count8("status effects", effects.len())?);
            buf.extend(effects.iter().map(|p| p.to_u8()));
        }

        ServerMessage::PurchaseResult { powerup, success } => {
            wire::put_u8(&mut buf, powerup.to_u8());
            wire::put_u8(&mut buf, u8::from(*success));
        }

        ServerMessage::UpdateWords { start_index, words } => {
            wire::put_u32(&mut buf, *start_index);
            wire::put_u8(&mut buf, wire::count8("words", words.len())?);
            for w in words {
                wire::put_str8(&mut buf, "word", w)?;
            }
        }
    }
    Ok(buf)
}

/// Decodes a client → server message.
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let mut r = Reader::new(data);
    let opcode = ClientOpcode::try_from(r.read_u8()?)?;

    Ok(match opcode {
        ClientOpcode::Register => ClientMessage::Register { name: r.read_str8()? },
        ClientOpcode::Submit => ClientMessage::Submit { word_index: r.read_u32()? },
        ClientOpcode::PurchasePowerup => ClientMessage::PurchasePowerup(Purchase {
            powerup: r.read_powerup()?,
            target: r.read_player_id()?,
        }),
        ClientOpcode::SkipWait => ClientMessage::SkipWait,
        ClientOpcode::SelectPowerup => {
            let count = usize::from(r.read_u8()?);
            let powerups = r.read_list(count, 1, Reader::read_powerup)?;
            ClientMessage::SelectPowerup { powerups }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryCodec, Codec, PlayerId, PowerupId};

    #[test]
    fn test_server_encoding_is_read_back_by_client_codec() {
        let msg = ServerMessage::LobbyHello {
            player_id: PlayerId(1),
            time_left: 600,
            players: vec![PlayerRecord { id: PlayerId(1), name: "me".into() }],
            words: (0..300).map(|i| format!("w{i}")).collect(),
            powerups: vec![PowerupId::Fog, PowerupId::Scrambler],
        };
        let bytes = encode_server_message(&msg).unwrap();
        assert_eq!(BinaryCodec.decode(&bytes).unwrap(), msg);
    }

    #[test]
    fn test_client_encoding_is_read_back_by_mirror() {
        let msg = ClientMessage::PurchasePowerup(Purchase {
            powerup: PowerupId::IcyRoads,
            target: PlayerId(3),
        });
        let bytes = BinaryCodec.encode(&msg).unwrap();
        assert_eq!(decode_client_message(&bytes).unwrap(), msg);
    }

    #[test]
    fn test_update_words_rejects_more_than_255_words() {
        let msg = ServerMessage::UpdateWords {
            start_index: 0,
            words: vec!["a".into(); 256],
        };
        assert!(matches!(
            encode_server_message(&msg),
            Err(ProtocolError::ListTooLong { what: "words", len: 256, .. })
        ));
    }

    #[test]
    fn test_decode_client_unknown_opcode() {
        assert!(matches!(
            decode_client_message(&[5]),
            Err(ProtocolError::UnknownOpcode(5))
        ));
    }
}
