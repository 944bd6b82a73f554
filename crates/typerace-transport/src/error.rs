use typerace_protocol::ProtocolError;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer went away in a way the caller should hear about, e.g. in
    /// the middle of a frame.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The connector's address could not be used.
    #[error("invalid address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Opening the connection failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The length-prefix layer of a stream transport rejected a frame.
    #[error("framing error: {0}")]
    Framing(#[from] ProtocolError),
}
