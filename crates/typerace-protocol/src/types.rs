//! Message types for the typerace wire protocol.
//!
//! Every type here maps one-to-one onto bytes on the wire. The protocol is
//! closed and unversioned: adding, removing, or reordering a field is a
//! breaking change for both sides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's identifier within one lobby session.
///
/// The server hands these out and they fit in a single byte on the wire.
/// Wrapping the `u8` keeps ids from being confused with places, counts,
/// or powerup ids, which are all `u8` on the wire as well.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Powerups
// ---------------------------------------------------------------------------

/// Whether a powerup acts on its own once bought, or needs the buyer to
/// trigger it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Passive,
    Active,
}

/// The closed set of powerups.
///
/// The same id plays two roles: it is the item drafted and purchased, and
/// it is the status-effect tag the server attaches to the affected player.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupId {
    SpikeStrip = 0,
    StickShift = 1,
    Fog = 2,
    IcyRoads = 3,
    TireBoot = 4,
    Scrambler = 5,
    RearViewMirror = 6,
}

impl PowerupId {
    /// Every powerup, in wire-id order.
    pub const ALL: [PowerupId; 7] = [
        Self::SpikeStrip,
        Self::StickShift,
        Self::Fog,
        Self::IcyRoads,
        Self::TireBoot,
        Self::Scrambler,
        Self::RearViewMirror,
    ];

    /// The byte used for this powerup on the wire.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name for menus and the draft screen.
    pub fn name(self) -> &'static str {
        match self {
            Self::SpikeStrip => "Spike Strip",
            Self::StickShift => "Stick Shift",
            Self::Fog => "Fog",
            Self::IcyRoads => "Icy Roads",
            Self::TireBoot => "Tire Boot",
            Self::Scrambler => "Scrambler",
            Self::RearViewMirror => "Rear View Mirror",
        }
    }

    /// One-line description of what the powerup does to its target.
    pub fn description(self) -> &'static str {
        match self {
            Self::SpikeStrip => "Add 5 additional words to opponent",
            Self::StickShift => {
                "Add punctuation and special characters for 10 words"
            }
            Self::Fog => "Opponent only sees 1 word for 10 seconds",
            Self::IcyRoads => "Add additional characters to next 10 words",
            Self::TireBoot => "Lock opponent ability for 10 seconds",
            Self::Scrambler => "Scramble opponent's next 10 words",
            Self::RearViewMirror => "Reflect other skills back for 10 seconds",
        }
    }

    pub fn activation(self) -> Activation {
        match self {
            Self::SpikeStrip | Self::StickShift | Self::Fog | Self::IcyRoads => {
                Activation::Passive
            }
            Self::TireBoot | Self::Scrambler | Self::RearViewMirror => {
                Activation::Active
            }
        }
    }
}

impl TryFrom<u8> for PowerupId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(ProtocolError::UnknownPowerup(value))
    }
}

impl fmt::Display for PowerupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request to buy `powerup` and aim it at `target`.
///
/// Produced from user input, consumed once by the outbound send. Nothing
/// correlates it with the later `PurchaseResult` except the powerup id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub powerup: PowerupId,
    pub target: PlayerId,
}

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

/// First byte of every client → server message.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOpcode {
    Register = 0,
    Submit = 1,
    PurchasePowerup = 2,
    SkipWait = 3,
    SelectPowerup = 4,
}

impl TryFrom<u8> for ClientOpcode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Register,
            1 => Self::Submit,
            2 => Self::PurchasePowerup,
            3 => Self::SkipWait,
            4 => Self::SelectPowerup,
            other => return Err(ProtocolError::UnknownOpcode(other)),
        })
    }
}

/// First byte of every server → client message.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOpcode {
    HubHello = 0,
    LobbyHello = 1,
    NewPlayer = 2,
    StartGame = 3,
    ProgressUpdate = 4,
    PlayerFinished = 5,
    StatusChanged = 6,
    PurchaseResult = 7,
    UpdateWords = 8,
}

impl TryFrom<u8> for ServerOpcode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::HubHello,
            1 => Self::LobbyHello,
            2 => Self::NewPlayer,
            3 => Self::StartGame,
            4 => Self::ProgressUpdate,
            5 => Self::PlayerFinished,
            6 => Self::StatusChanged,
            7 => Self::PurchaseResult,
            8 => Self::UpdateWords,
            other => return Err(ProtocolError::UnknownOpcode(other)),
        })
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Commands the client sends. All of them are fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Join the hub under a display name (at most 255 UTF-8 bytes).
    Register { name: String },

    /// The word at `word_index` has been completed.
    Submit { word_index: u32 },

    /// Buy a powerup for a target.
    PurchasePowerup(Purchase),

    /// Ask the server to skip the remaining lobby wait.
    SkipWait,

    /// The drafted powerups. The client always sends exactly two, but the
    /// layout carries a count byte.
    SelectPowerup { powerups: Vec<PowerupId> },
}

impl ClientMessage {
    pub fn opcode(&self) -> ClientOpcode {
        match self {
            Self::Register { .. } => ClientOpcode::Register,
            Self::Submit { .. } => ClientOpcode::Submit,
            Self::PurchasePowerup(_) => ClientOpcode::PurchasePowerup,
            Self::SkipWait => ClientOpcode::SkipWait,
            Self::SelectPowerup { .. } => ClientOpcode::SelectPowerup,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The part of a player that travels on the wire: id and name.
///
/// Status effects, finish state, and progress are not sent with the
/// record; the client starts them at their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Connection accepted by the hub. Carries nothing.
    HubHello,

    /// The client has been placed in a lobby.
    LobbyHello {
        /// The id the server assigned to this client.
        player_id: PlayerId,
        /// Seconds left before the race starts.
        time_left: u16,
        players: Vec<PlayerRecord>,
        words: Vec<String>,
        /// The draft pool offered to this client.
        powerups: Vec<PowerupId>,
    },

    /// Another player joined the lobby.
    NewPlayer(PlayerRecord),

    /// The race has begun.
    StartGame,

    /// A player's word index moved.
    ProgressUpdate { player_id: PlayerId, progress: u32 },

    /// A player crossed the line in `place`.
    PlayerFinished { player_id: PlayerId, place: u8 },

    /// The full, current set of effects on a player.
    StatusChanged {
        player_id: PlayerId,
        effects: Vec<PowerupId>,
    },

    /// Outcome of the latest purchase of `powerup`.
    PurchaseResult { powerup: PowerupId, success: bool },

    /// Replace the word stream from `start_index` onward with `words`.
    UpdateWords { start_index: u32, words: Vec<String> },
}

impl ServerMessage {
    pub fn opcode(&self) -> ServerOpcode {
        match self {
            Self::HubHello => ServerOpcode::HubHello,
            Self::LobbyHello { .. } => ServerOpcode::LobbyHello,
            Self::NewPlayer(_) => ServerOpcode::NewPlayer,
            Self::StartGame => ServerOpcode::StartGame,
            Self::ProgressUpdate { .. } => ServerOpcode::ProgressUpdate,
            Self::PlayerFinished { .. } => ServerOpcode::PlayerFinished,
            Self::StatusChanged { .. } => ServerOpcode::StatusChanged,
            Self::PurchaseResult { .. } => ServerOpcode::PurchaseResult,
            Self::UpdateWords { .. } => ServerOpcode::UpdateWords,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
