//! # typerace
//!
//! Client runtime for a real-time multiplayer typing race.
//!
//! The layers underneath are separate crates: the binary wire codec
//! (`typerace-protocol`), the typing engine and targeting resolver
//! (`typerace-engine`), the game state reducer (`typerace-state`), and
//! the transports (`typerace-transport`). This crate ties them together
//! into a session task that owns the state, with a cloneable
//! [`ClientHandle`] for the UI side.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typerace::prelude::*;
//!
//! # async fn demo() -> Result<(), TypeRaceError> {
//! typerace::init_tracing();
//!
//! let handle = TypeRaceClient::builder()
//!     .url("ws://127.0.0.1:8080/ws")
//!     .name("ada")
//!     .build()?
//!     .connect()
//!     .await?;
//!
//! handle.wait_for(|s| s.phase == Phase::Game).await?;
//! handle.input("h", MeasuredLine { caret_x: 0.0, container_width: 600.0, char_width: 9.6 }).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod session;

pub use client::{ClientHandle, TypeRaceClient, TypeRaceClientBuilder};
pub use config::{ClientConfig, DEFAULT_URL, Endpoint, MAX_NAME_LEN};
pub use error::TypeRaceError;

/// Installs a `tracing` subscriber that honours `RUST_LOG`, defaulting
/// to `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .try_init();
}

/// Re-exports of the types most client code needs.
pub mod prelude {
    pub use crate::{ClientConfig, ClientHandle, TypeRaceClient, TypeRaceError};
    pub use typerace_engine::{
        CaretGeometry, InputOutcome, MeasuredLine, RejectReason, Strategy, Unbounded,
        UnknownStrategy, WordStatus,
    };
    pub use typerace_protocol::{PlayerId, PowerupId};
    pub use typerace_state::{GameSnapshot, Phase, Player};
}
