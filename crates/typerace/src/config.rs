//! Client configuration.

use serde::{Deserialize, Serialize};
use typerace_engine::Strategy;
use typerace_protocol::ProtocolError;
use typerace_transport::TransportError;

/// Where the game server listens when nothing else is configured.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";

/// Longest display name the `Register` message can carry, in UTF-8 bytes.
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Settings for one client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server address. `ws://` selects WebSocket, `tcp://host:port` selects
    /// length-prefixed TCP.
    pub url: String,

    /// Display name sent in `Register`.
    pub name: String,

    /// Capacity of the handle → session command channel.
    pub command_buffer: usize,

    /// Targeting used by purchases that don't name a strategy.
    pub default_strategy: Strategy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            name: "anonymous".to_string(),
            command_buffer: 64,
            default_strategy: Strategy::default(),
        }
    }
}

impl ClientConfig {
    /// Checks everything that can be checked before connecting.
    pub fn validate(&self) -> Result<Endpoint, crate::TypeRaceError> {
        if self.name.len() > MAX_NAME_LEN {
            return Err(ProtocolError::NameTooLong(self.name.len()).into());
        }
        Ok(Endpoint::parse(&self.url)?)
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// A server address resolved to the transport that reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A `ws://` or `wss://` URL, passed through unchanged.
    WebSocket(String),
    /// A `host:port` reached over raw TCP.
    Tcp(String),
}

impl Endpoint {
    pub fn parse(url: &str) -> Result<Self, TransportError> {
        if url.starts_with("ws://") || url.starts_with("wss://") {
            return Ok(Self::WebSocket(url.to_string()));
        }
        if let Some(addr) = url.strip_prefix("tcp://") {
            if addr.is_empty() {
                return Err(TransportError::InvalidAddress {
                    addr: url.to_string(),
                    reason: "missing host:port".into(),
                });
            }
            return Ok(Self::Tcp(addr.to_string()));
        }
        Err(TransportError::InvalidAddress {
            addr: url.to_string(),
            reason: "expected a ws://, wss:// or tcp:// address".into(),
        })
    }
}
