//! Client game state for typerace.
//!
//! [`GameState`] is the one place session state lives. Server events are
//! folded in through [`GameState::apply`]; local actions go through its
//! methods and hand back the message to send. The client runtime owns a
//! single `GameState` and publishes [`GameSnapshot`]s for renderers.

mod draft;
mod error;
mod phase;
mod snapshot;
mod state;

pub use draft::{DRAFT_PICKS, Draft};
pub use error::StateError;
pub use phase::{Phase, Player};
pub use snapshot::GameSnapshot;
pub use state::{GameState, PurchaseOutcome};
