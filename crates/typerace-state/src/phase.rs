//! Session phase and player records.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use typerace_protocol::{PlayerId, PlayerRecord, PowerupId};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Which screen the session is on.
///
/// Inbound events only ever move it forward:
///
/// ```text
/// Login ──(LobbyHello)──→ Lobby ──(StartGame)──→ Game
///   ↑                                              │
///   └──────────── connection closed / reset ───────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Phase {
    #[default]
    Login,
    Lobby,
    Game,
}

impl Phase {
    /// The phase after an event asks for `target`: `target` if it is later
    /// than `self`, otherwise `self` unchanged.
    pub fn advance_to(self, target: Phase) -> Phase {
        self.max(target)
    }

    pub fn is_racing(self) -> bool {
        self == Self::Game
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "Login"),
            Self::Lobby => write!(f, "Lobby"),
            Self::Game => write!(f, "Game"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Everything the client knows about one racer.
///
/// Created by `LobbyHello` or `NewPlayer`, then only mutated by events.
/// Players are never removed during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Effects currently on this player, as last reported by the server.
    pub status_effects: Vec<PowerupId>,
    pub finished: bool,
    pub place: Option<u8>,
    /// Index of the next word the player has to type.
    pub progress: u32,
    /// Words per minute since the race started, derived client-side.
    pub wpm: f64,
}

impl Player {
    pub fn has_effect(&self, effect: PowerupId) -> bool {
        self.status_effects.contains(&effect)
    }
}

/// Leaderboard order: finishers by place, then everyone else by progress
/// (highest first), ties by id.
pub(crate) fn by_standing(a: &Player, b: &Player) -> Ordering {
    match (a.place, b.place) {
        (Some(pa), Some(pb)) => pa.cmp(&pb).then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.progress.cmp(&a.progress).then(a.id.cmp(&b.id)),
    }
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            status_effects: Vec::new(),
            finished: false,
            place: None,
            progress: 0,
            wpm: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_only_moves_forward() {
        assert_eq!(Phase::Login.advance_to(Phase::Lobby), Phase::Lobby);
        assert_eq!(Phase::Lobby.advance_to(Phase::Game), Phase::Game);
        assert_eq!(Phase::Login.advance_to(Phase::Game), Phase::Game);
        assert_eq!(Phase::Game.advance_to(Phase::Lobby), Phase::Game);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Lobby.to_string(), "Lobby");
    }

    #[test]
    fn test_player_from_record_uses_defaults() {
        let p = Player::from(PlayerRecord { id: PlayerId(3), name: "kai".into() });
        assert_eq!(p.id, PlayerId(3));
        assert!(p.status_effects.is_empty());
        assert!(!p.finished);
        assert_eq!(p.place, None);
        assert_eq!(p.progress, 0);
        assert_eq!(p.wpm, 0.0);
    }
}
