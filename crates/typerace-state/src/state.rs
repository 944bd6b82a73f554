//! The single authoritative client state and its event reducer.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use typerace_engine::{
    CaretGeometry, InputOutcome, Standing, Strategy, TypingEngine, WordStatus,
    resolve_target,
};
use typerace_protocol::{
    ClientMessage, PlayerId, PowerupId, Purchase, ServerMessage,
};

use crate::draft::Draft;
use crate::phase::{Phase, Player, by_standing};
use crate::snapshot::GameSnapshot;
use crate::StateError;

/// What the server said about our latest purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub powerup: PowerupId,
    pub success: bool,
}

/// Everything one client knows about its session.
///
/// Inbound [`ServerMessage`]s are folded in with [`apply`](Self::apply);
/// local actions ([`handle_input`](Self::handle_input),
/// [`purchase`](Self::purchase), [`select_powerup`](Self::select_powerup))
/// update local state and hand back the [`ClientMessage`] to send. Nothing
/// in here performs I/O.
#[derive(Debug, Default)]
pub struct GameState {
    phase: Phase,
    own_id: Option<PlayerId>,
    players: BTreeMap<PlayerId, Player>,
    race: TypingEngine,
    time_left: u16,
    draft: Draft,
    last_purchase: Option<PurchaseOutcome>,
    race_started_at: Option<Instant>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn own_id(&self) -> Option<PlayerId> {
        self.own_id
    }

    pub fn own_player(&self) -> Option<&Player> {
        self.own_id.and_then(|id| self.players.get(&id))
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// All known players in ascending id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn race(&self) -> &TypingEngine {
        &self.race
    }

    pub fn time_left(&self) -> u16 {
        self.time_left
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn last_purchase(&self) -> Option<PurchaseOutcome> {
        self.last_purchase
    }

    // -----------------------------------------------------------------------
    // Inbound events
    // -----------------------------------------------------------------------

    /// Folds one server event into the state.
    ///
    /// Events that cannot be applied are logged and dropped.
    pub fn apply(&mut self, event: ServerMessage) {
        self.apply_at(event, Instant::now());
    }

    /// [`apply`](Self::apply) with an explicit clock reading, used for the
    /// WPM calculation.
    pub fn apply_at(&mut self, event: ServerMessage, now: Instant) {
        let opcode = event.opcode();
        if let Err(e) = self.try_apply_at(event, now) {
            warn!(?opcode, error = %e, "dropping server event");
        }
    }

    pub fn try_apply(&mut self, event: ServerMessage) -> Result<(), StateError> {
        self.try_apply_at(event, Instant::now())
    }

    /// Applies one event, or fails without touching the state.
    pub fn try_apply_at(
        &mut self,
        event: ServerMessage,
        now: Instant,
    ) -> Result<(), StateError> {
        match event {
            ServerMessage::HubHello => {
                debug!("hub accepted connection");
            }

            ServerMessage::LobbyHello {
                player_id,
                time_left,
                players,
                words,
                powerups,
            } => {
                info!(
                    %player_id,
                    players = players.len(),
                    words = words.len(),
                    time_left,
                    "joined lobby"
                );
                self.own_id = Some(player_id);
                for record in players {
                    self.players.insert(record.id, Player::from(record));
                }
                if self.phase < Phase::Game || self.race.words().is_empty() {
                    self.race = TypingEngine::new(words);
                } else {
                    warn!("lobby hello during race, reconciling word list");
                    self.race.set_words(words);
                }
                if !self.draft.is_sent() {
                    self.draft = Draft::new(powerups);
                }
                self.time_left = time_left;
                self.phase = self.phase.advance_to(Phase::Lobby);
            }

            ServerMessage::NewPlayer(record) => {
                if self.players.contains_key(&record.id) {
                    warn!(player_id = %record.id, "duplicate player announcement, replacing");
                } else {
                    debug!(player_id = %record.id, name = %record.name, "player joined");
                }
                self.players.insert(record.id, Player::from(record));
            }

            ServerMessage::StartGame => {
                info!("race started");
                self.phase = self.phase.advance_to(Phase::Game);
                self.race_started_at = Some(now);
            }

            ServerMessage::ProgressUpdate {
                player_id,
                progress,
            } => {
                let started = self.race_started_at;
                let player = self.player_mut(player_id)?;
                player.progress = progress;
                player.wpm = words_per_minute(progress, started, now);
            }

            ServerMessage::PlayerFinished { player_id, place } => {
                let player = self.player_mut(player_id)?;
                if player.finished {
                    debug!(%player_id, place, "repeated finish ignored");
                } else {
                    info!(%player_id, place, "player finished");
                    player.finished = true;
                    player.place = Some(place);
                }
            }

            ServerMessage::StatusChanged { player_id, effects } => {
                let player = self.player_mut(player_id)?;
                debug!(%player_id, ?effects, "status effects changed");
                player.status_effects = effects;
            }

            ServerMessage::PurchaseResult { powerup, success } => {
                debug!(%powerup, success, "purchase result");
                self.last_purchase = Some(PurchaseOutcome { powerup, success });
            }

            ServerMessage::UpdateWords { start_index, words } => {
                let start = start_index as usize;
                if start > self.race.words().len() {
                    warn!(
                        start,
                        len = self.race.words().len(),
                        "word update starts past end of stream, appending"
                    );
                }
                self.race.splice_words(start, words);
            }
        }
        Ok(())
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, StateError> {
        self.players.get_mut(&id).ok_or(StateError::UnknownPlayer(id))
    }

    // -----------------------------------------------------------------------
    // Local actions
    // -----------------------------------------------------------------------

    /// Feeds an input-buffer change to the typing engine.
    ///
    /// Use [`InputOutcome::submit_message`] on the result to get the
    /// `Submit` to send.
    pub fn handle_input(
        &mut self,
        value: &str,
        geometry: &impl CaretGeometry,
    ) -> InputOutcome {
        self.race.handle_input(value, geometry)
    }

    /// Aims `powerup` at an opponent chosen by `strategy`.
    ///
    /// Returns `None` if there is no opponent to aim at or we don't know
    /// our own id yet.
    pub fn purchase(
        &self,
        powerup: PowerupId,
        strategy: Strategy,
    ) -> Option<ClientMessage> {
        let target = self.resolve_target(strategy)?;
        debug!(%powerup, %target, %strategy, "purchasing powerup");
        Some(ClientMessage::PurchasePowerup(Purchase { powerup, target }))
    }

    /// The opponent `strategy` picks right now.
    pub fn resolve_target(&self, strategy: Strategy) -> Option<PlayerId> {
        let own_id = self.own_id?;
        let standings = self.players.values().map(|p| Standing {
            id: p.id,
            progress: p.progress,
        });
        resolve_target(standings, own_id, strategy)
    }

    /// Drafts one powerup; the second pick yields the `SelectPowerup`.
    pub fn select_powerup(
        &mut self,
        powerup: PowerupId,
    ) -> Result<Option<ClientMessage>, StateError> {
        self.draft.pick(powerup)
    }

    /// Closes the draft, filling empty slots from the pool.
    pub fn draft_expired(&mut self) -> Option<ClientMessage> {
        let msg = self.draft.auto_fill();
        if let Some(ClientMessage::SelectPowerup { powerups }) = &msg {
            info!(?powerups, "draft timed out, auto-selected");
        }
        msg
    }

    /// Counts the lobby timer down by one second.
    ///
    /// Once it is at zero the draft is closed and the resulting
    /// `SelectPowerup` (if one is still owed) is returned. A lobby that
    /// opens with no time left closes the draft on its first tick.
    pub fn tick_countdown(&mut self) -> Option<ClientMessage> {
        if self.phase != Phase::Lobby {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            return self.draft_expired();
        }
        None
    }

    /// The connection went away: back to login.
    ///
    /// Players, places and words stay readable so the last standings can
    /// still be shown. Only [`reset`](Self::reset) clears them.
    pub fn connection_lost(&mut self) {
        info!(phase = %self.phase, "connection lost, returning to login");
        self.phase = Phase::Login;
    }

    /// Clears the session for another round.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Whether the word at `index` should be drawn obscured.
    ///
    /// Fog on our own player hides every word still ahead of us, except
    /// the one being typed.
    pub fn is_word_hidden(&self, index: usize) -> bool {
        let fogged = self
            .own_player()
            .is_some_and(|p| p.has_effect(PowerupId::Fog));
        if !fogged || index == self.race.current_word_index() {
            return false;
        }
        self.race
            .typed_words()
            .get(index)
            .is_some_and(|w| w.status == WordStatus::Pending)
    }

    /// Players in finishing order: finishers by place, then everyone else
    /// by progress (highest first), ties by id.
    pub fn standings(&self) -> Vec<&Player> {
        let mut out: Vec<&Player> = self.players.values().collect();
        out.sort_by(|a, b| by_standing(a, b));
        out
    }

    /// A serializable copy of everything a UI needs to draw.
    pub fn snapshot(&self) -> GameSnapshot {
        let fogged = self
            .own_player()
            .is_some_and(|p| p.has_effect(PowerupId::Fog));
        GameSnapshot {
            phase: self.phase,
            own_id: self.own_id,
            time_left: self.time_left,
            players: self.players.values().cloned().collect(),
            words: self.race.typed_words().to_vec(),
            current_word_index: self.race.current_word_index(),
            input: self.race.input().to_owned(),
            overflow: self.race.overflow().to_owned(),
            fogged,
            draft_pool: self.draft.pool().to_vec(),
            draft_picks: self.draft.picks().to_vec(),
            draft_sent: self.draft.is_sent(),
            last_purchase: self.last_purchase,
        }
    }
}

/// Words per minute from the race start to `now`.
fn words_per_minute(progress: u32, started: Option<Instant>, now: Instant) -> f64 {
    let Some(started) = started else {
        return 0.0;
    };
    let minutes = now.saturating_duration_since(started).as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    f64::from(progress) / minutes
}
