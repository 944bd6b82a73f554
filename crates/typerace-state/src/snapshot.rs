//! Read-only copy of the game state for renderers.

use serde::Serialize;
use typerace_engine::TypedWord;
use typerace_protocol::{PlayerId, PowerupId};

use crate::phase::{Phase, Player, by_standing};
use crate::state::PurchaseOutcome;

/// Everything a UI needs to draw one frame, detached from the live state.
///
/// The client runtime publishes one of these after every change; it
/// serializes to JSON for UIs living outside the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub own_id: Option<PlayerId>,
    pub time_left: u16,
    /// Ascending id order.
    pub players: Vec<Player>,
    pub words: Vec<TypedWord>,
    pub current_word_index: usize,
    pub input: String,
    pub overflow: String,
    /// Our own player is under Fog: pending words past the active one are
    /// drawn obscured.
    pub fogged: bool,
    pub draft_pool: Vec<PowerupId>,
    pub draft_picks: Vec<PowerupId>,
    pub draft_sent: bool,
    pub last_purchase: Option<PurchaseOutcome>,
}

impl GameSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn own_player(&self) -> Option<&Player> {
        self.own_id.and_then(|id| self.player(id))
    }

    /// Players in leaderboard order, same as `GameState::standings`.
    pub fn standings(&self) -> Vec<&Player> {
        let mut out: Vec<&Player> = self.players.iter().collect();
        out.sort_by(|a, b| by_standing(a, b));
        out
    }
}

#[cfg(test)]
mod tests {
    use typerace_protocol::{PlayerId, PlayerRecord, ServerMessage};

    use super::*;
    use crate::GameState;

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut state = GameState::new();
        state.apply(ServerMessage::LobbyHello {
            player_id: PlayerId(1),
            time_left: 10,
            players: vec![PlayerRecord { id: PlayerId(1), name: "me".into() }],
            words: vec!["hi".into()],
            powerups: vec![],
        });

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["phase"], "Lobby");
        assert_eq!(json["own_id"], 1);
        assert_eq!(json["players"][0]["name"], "me");
        assert_eq!(json["words"][0]["status"], "pending");
    }

    #[test]
    fn test_snapshot_standings_match_state() {
        let mut state = GameState::new();
        state.apply(ServerMessage::LobbyHello {
            player_id: PlayerId(1),
            time_left: 10,
            players: vec![
                PlayerRecord { id: PlayerId(1), name: "me".into() },
                PlayerRecord { id: PlayerId(2), name: "you".into() },
            ],
            words: vec![],
            powerups: vec![],
        });
        state.apply(ServerMessage::ProgressUpdate { player_id: PlayerId(2), progress: 4 });

        let snap = state.snapshot();
        let from_snap: Vec<_> = snap.standings().iter().map(|p| p.id).collect();
        let from_state: Vec<_> = state.standings().iter().map(|p| p.id).collect();
        assert_eq!(from_snap, vec![PlayerId(2), PlayerId(1)]);
        assert_eq!(from_snap, from_state);
        assert_eq!(snap.own_player().map(|p| p.name.as_str()), Some("me"));
    }

    #[test]
    fn test_default_snapshot_is_login() {
        let snap = GameSnapshot::default();
        assert_eq!(snap.phase, Phase::Login);
        assert!(snap.players.is_empty());
    }
}
