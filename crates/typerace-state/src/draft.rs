//! The pre-race powerup draft.
//!
//! The lobby offers a pool; the player keeps two. The selection goes out
//! once, either when the second pick is made or when the lobby countdown
//! runs out (in which case the pool fills the gaps).

use typerace_protocol::{ClientMessage, PowerupId};

use crate::StateError;

/// How many powerups a player drafts.
pub const DRAFT_PICKS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct Draft {
    pool: Vec<PowerupId>,
    picks: Vec<PowerupId>,
    sent: bool,
}

impl Draft {
    pub fn new(pool: Vec<PowerupId>) -> Self {
        Self {
            pool,
            picks: Vec::new(),
            sent: false,
        }
    }

    pub fn pool(&self) -> &[PowerupId] {
        &self.pool
    }

    pub fn picks(&self) -> &[PowerupId] {
        &self.picks
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Drafts `powerup`. Returns the `SelectPowerup` to send once the
    /// second pick is in.
    pub fn pick(
        &mut self,
        powerup: PowerupId,
    ) -> Result<Option<ClientMessage>, StateError> {
        if self.sent {
            return Err(StateError::DraftClosed);
        }
        if !self.pool.contains(&powerup) {
            return Err(StateError::NotInPool(powerup));
        }
        if self.picks.contains(&powerup) {
            return Err(StateError::AlreadyPicked(powerup));
        }
        self.picks.push(powerup);
        if self.picks.len() == DRAFT_PICKS {
            return Ok(Some(self.close()));
        }
        Ok(None)
    }

    /// Completes the draft from the pool when time runs out.
    ///
    /// Gaps are filled in pool order, skipping what was already picked.
    /// Returns `None` if the draft was already sent or there is nothing
    /// at all to select.
    pub fn auto_fill(&mut self) -> Option<ClientMessage> {
        if self.sent {
            return None;
        }
        for candidate in &self.pool {
            if self.picks.len() >= DRAFT_PICKS {
                break;
            }
            if !self.picks.contains(candidate) {
                self.picks.push(*candidate);
            }
        }
        if self.picks.is_empty() {
            return None;
        }
        Some(self.close())
    }

    fn close(&mut self) -> ClientMessage {
        self.sent = true;
        ClientMessage::SelectPowerup {
            powerups: self.picks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PowerupId::*;

    fn pool() -> Draft {
        Draft::new(vec![Fog, TireBoot, Scrambler])
    }

    #[test]
    fn test_second_pick_sends_selection() {
        let mut d = pool();
        assert!(d.pick(Scrambler).unwrap().is_none());
        let msg = d.pick(Fog).unwrap();
        assert_eq!(
            msg,
            Some(ClientMessage::SelectPowerup { powerups: vec![Scrambler, Fog] })
        );
        assert!(d.is_sent());
    }

    #[test]
    fn test_pick_outside_pool_rejected() {
        let mut d = pool();
        assert!(matches!(d.pick(SpikeStrip), Err(StateError::NotInPool(SpikeStrip))));
    }

    #[test]
    fn test_duplicate_pick_rejected() {
        let mut d = pool();
        d.pick(Fog).unwrap();
        assert!(matches!(d.pick(Fog), Err(StateError::AlreadyPicked(Fog))));
    }

    #[test]
    fn test_pick_after_send_rejected() {
        let mut d = pool();
        d.pick(Fog).unwrap();
        d.pick(TireBoot).unwrap();
        assert!(matches!(d.pick(Scrambler), Err(StateError::DraftClosed)));
    }

    #[test]
    fn test_auto_fill_completes_from_pool_skipping_picks() {
        let mut d = pool();
        d.pick(Fog).unwrap();
        assert_eq!(
            d.auto_fill(),
            Some(ClientMessage::SelectPowerup { powerups: vec![Fog, TireBoot] })
        );
    }

    #[test]
    fn test_auto_fill_with_no_picks_takes_first_two() {
        let mut d = pool();
        assert_eq!(
            d.auto_fill(),
            Some(ClientMessage::SelectPowerup { powerups: vec![Fog, TireBoot] })
        );
    }

    #[test]
    fn test_auto_fill_is_sent_once() {
        let mut d = pool();
        d.pick(Fog).unwrap();
        d.pick(Scrambler).unwrap();
        assert_eq!(d.auto_fill(), None);
    }

    #[test]
    fn test_auto_fill_empty_pool_sends_nothing() {
        let mut d = Draft::new(vec![]);
        assert_eq!(d.auto_fill(), None);
        assert!(!d.is_sent());
    }
}
