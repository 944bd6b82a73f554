//! Unified error type for the typerace client.

use typerace_protocol::ProtocolError;
use typerace_state::StateError;
use typerace_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TypeRaceError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, framing).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A local action the game state refused (e.g. an invalid draft pick).
    #[error(transparent)]
    State(#[from] StateError),

    /// The session task has stopped; the handle can no longer be used.
    #[error("client session has stopped")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use typerace_protocol::{PlayerId, PowerupId};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let client_err: TypeRaceError = err.into();
        assert!(matches!(client_err, TypeRaceError::Transport(_)));
        assert!(client_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::NameTooLong(300);
        let client_err: TypeRaceError = err.into();
        assert!(matches!(client_err, TypeRaceError::Protocol(_)));
    }

    #[test]
    fn test_from_state_error() {
        let err = StateError::UnknownPlayer(PlayerId(4));
        let client_err: TypeRaceError = err.into();
        assert!(matches!(client_err, TypeRaceError::State(_)));

        let err: TypeRaceError = StateError::NotInPool(PowerupId::Fog).into();
        assert!(err.to_string().contains("Fog"));
    }
}
