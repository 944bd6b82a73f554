//! Client-side race logic for typerace.
//!
//! Two pure pieces that sit under the game state:
//!
//! 1. **Typing** ([`TypingEngine`]): turns raw input-buffer changes into
//!    per-word correctness and `Submit` intents, with the mistake limit and
//!    the line-wrap guard.
//! 2. **Targeting** ([`resolve_target`]): picks the opponent a powerup is
//!    aimed at from live progress.
//!
//! Neither touches the network or the UI. Layout enters only through the
//! [`CaretGeometry`] trait.

mod geometry;
mod target;
mod typing;

pub use geometry::{CaretGeometry, MeasuredLine, Unbounded};
pub use target::{Standing, Strategy, UnknownStrategy, resolve_target};
pub use typing::{
    InputOutcome, LetterStatus, MISTAKE_LIMIT, RejectReason, TypedWord, TypingEngine,
    WordStatus, count_mistakes, letter_statuses,
};
