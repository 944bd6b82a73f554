//! Wire protocol for typerace.
//!
//! This crate defines what travels between the race client and the
//! authoritative server:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`PowerupId`], etc.):
//!   the closed, unversioned set of messages.
//! - **Codec** ([`Codec`] trait, [`BinaryCodec`]): the compact big-endian
//!   layout, one opcode byte first.
//! - **Framing** ([`encode_frame`], [`FrameDecoder`]): a length prefix for
//!   transports that do not preserve message boundaries.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (ServerMessage) → State (reducer)
//! ```
//!
//! # Feature Flags
//!
//! - `mirror`: the server's direction of the codec, for test servers and
//!   tooling.

mod codec;
mod error;
mod frame;
#[cfg(feature = "mirror")]
mod mirror;
mod types;
mod wire;

pub use codec::{BinaryCodec, Codec, decode_server_message, encode_client_message};
pub use error::ProtocolError;
pub use frame::{FrameDecoder, MAX_FRAME_LEN, encode_frame};
#[cfg(feature = "mirror")]
pub use mirror::{decode_client_message, encode_server_message};
pub use types::{
    Activation, ClientMessage, ClientOpcode, PlayerId, PlayerRecord, PowerupId,
    Purchase, ServerMessage, ServerOpcode,
};
