//! Picking the opponent a powerup is aimed at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typerace_protocol::PlayerId;

/// How to choose a target among the other players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// The leader: highest progress.
    #[default]
    First,
    /// The straggler: lowest progress.
    Last,
    /// Whoever is nearest to our own progress, ahead or behind.
    Closest,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Closest => "closest",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown targeting strategy {0:?} (expected first, last, or closest)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "closest" => Ok(Self::Closest),
            other => Err(UnknownStrategy(other.to_owned())),
        }
    }
}

/// One player's position in the race, as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub id: PlayerId,
    pub progress: u32,
}

/// Chooses a target for `strategy` from `standings`, never `self_id`.
///
/// Returns `None` when there is nobody else. Ties go to the candidate that
/// comes first in `standings`; callers that want stable results should pass
/// players in a fixed order (the game state passes ascending id). If
/// `self_id` is missing from `standings`, `Closest` measures from zero.
pub fn resolve_target(
    standings: impl IntoIterator<Item = Standing>,
    self_id: PlayerId,
    strategy: Strategy,
) -> Option<PlayerId> {
    let standings: Vec<Standing> = standings.into_iter().collect();
    let own = standings
        .iter()
        .find(|s| s.id == self_id)
        .map_or(0, |s| s.progress);

    let mut best: Option<Standing> = None;
    for candidate in standings.iter().filter(|s| s.id != self_id) {
        let better = match best {
            None => true,
            Some(b) => match strategy {
                Strategy::First => candidate.progress > b.progress,
                Strategy::Last => candidate.progress < b.progress,
                Strategy::Closest => {
                    candidate.progress.abs_diff(own) < b.progress.abs_diff(own)
                }
            },
        };
        if better {
            best = Some(*candidate);
        }
    }
    best.map(|s| s.id)
}
