//! Plain TCP transport with length-prefixed frames.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use typerace_protocol::{FrameDecoder, encode_frame};

use crate::{Connection, ConnectionId, Connector, TransportError};

const READ_CHUNK: usize = 4096;

/// Connects to a `host:port` over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    async fn connect(&self) -> Result<Self::Connection, TransportError> {
        let stream = TcpStream::connect(self.addr.as_str())
            .await
            .map_err(TransportError::ConnectFailed)?;
        stream.set_nodelay(true).map_err(TransportError::ConnectFailed)?;

        let id = ConnectionId::next();
        tracing::debug!(%id, addr = %self.addr, "TCP connected");

        let (read, write) = stream.into_split();
        Ok(TcpConnection {
            id,
            reader: Mutex::new(FrameReader {
                half: read,
                decoder: FrameDecoder::new(),
            }),
            writer: Mutex::new(write),
        })
    }
}

struct FrameReader {
    half: OwnedReadHalf,
    decoder: FrameDecoder,
}

/// A TCP connection carrying one length-prefixed frame per message.
pub struct TcpConnection {
    id: ConnectionId,
    reader: Mutex<FrameReader>,
    writer: Mutex<OwnedWriteHalf>,
}

impl Connection for TcpConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let frame = encode_frame(data)?;
        self.writer
            .lock()
            .await
            .write_all(&frame)
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut reader = self.reader.lock().await;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = reader.decoder.next_frame()? {
                return Ok(Some(frame));
            }
            let n = reader
                .half
                .read(&mut chunk)
                .await
                .map_err(TransportError::ReceiveFailed)?;
            if n == 0 {
                let pending = reader.decoder.buffered();
                if pending > 0 {
                    return Err(TransportError::ConnectionClosed(format!(
                        "{pending} bytes of an unfinished frame"
                    )));
                }
                return Ok(None);
            }
            reader.decoder.extend(&chunk[..n]);
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
