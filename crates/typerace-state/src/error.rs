//! Error types for the state layer.

use typerace_protocol::{PlayerId, PowerupId};

/// Errors from applying events or player actions to the game state.
///
/// None of these are fatal. An event that fails is dropped and the state
/// is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// An update referenced a player we have no record of. Delivery can
    /// outrun player creation, so this is logged and dropped.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The pick is not one of the powerups offered in this lobby.
    #[error("{0} is not in the draft pool")]
    NotInPool(PowerupId),

    /// The same powerup cannot be drafted twice.
    #[error("{0} has already been picked")]
    AlreadyPicked(PowerupId),

    /// The selection has already been sent to the server.
    #[error("the draft is closed")]
    DraftClosed,
}
