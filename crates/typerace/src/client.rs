//! `TypeRaceClient` builder and the handle returned by `connect`.

use tokio::sync::{mpsc, oneshot, watch};
use typerace_engine::{InputOutcome, MeasuredLine, Strategy};
use typerace_protocol::PowerupId;
use typerace_state::GameSnapshot;
use typerace_transport::{Connection, Connector, TcpConnector, WebSocketConnector};

use crate::config::{ClientConfig, Endpoint};
use crate::session::{Command, Session};
use crate::TypeRaceError;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a typerace client.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), typerace::TypeRaceError> {
/// use typerace::TypeRaceClient;
///
/// let client = TypeRaceClient::builder()
///     .url("ws://127.0.0.1:8080/ws")
///     .name("ada")
///     .build()?;
/// let handle = client.connect().await?;
/// println!("{:?}", handle.snapshot().phase);
/// # Ok(())
/// # }
/// ```
pub struct TypeRaceClientBuilder {
    config: ClientConfig,
}

impl TypeRaceClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Sets the server address.
    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    /// Sets the display name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// Sets the command channel capacity.
    pub fn command_buffer(mut self, size: usize) -> Self {
        self.config.command_buffer = size.max(1);
        self
    }

    /// Sets the targeting strategy used when a purchase names none.
    pub fn default_strategy(mut self, strategy: Strategy) -> Self {
        self.config.default_strategy = strategy;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration.
    ///
    /// Fails with `NameTooLong` or an invalid-address error before any
    /// connection is attempted.
    pub fn build(self) -> Result<TypeRaceClient, TypeRaceError> {
        let endpoint = self.config.validate()?;
        Ok(TypeRaceClient {
            config: self.config,
            endpoint,
        })
    }
}

impl Default for TypeRaceClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A validated client, ready to connect.
#[derive(Debug, Clone)]
pub struct TypeRaceClient {
    config: ClientConfig,
    endpoint: Endpoint,
}

impl TypeRaceClient {
    /// Creates a new builder.
    pub fn builder() -> TypeRaceClientBuilder {
        TypeRaceClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connects to the configured server and starts a session.
    ///
    /// Can be called again after a session ends to play another round.
    pub async fn connect(&self) -> Result<ClientHandle, TypeRaceError> {
        match &self.endpoint {
            Endpoint::WebSocket(url) => {
                self.connect_with(WebSocketConnector::new(url.as_str())).await
            }
            Endpoint::Tcp(addr) => self.connect_with(TcpConnector::new(addr.as_str())).await,
        }
    }

    /// Starts a session over a caller-supplied connector.
    pub async fn connect_with<K: Connector>(
        &self,
        connector: K,
    ) -> Result<ClientHandle, TypeRaceError> {
        let conn = connector.connect().await?;
        tracing::info!(conn_id = %conn.id(), url = %self.config.url, "connected");

        let (tx, rx) = mpsc::channel(self.config.command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(GameSnapshot::default());

        let session = Session::new(
            conn,
            self.config.name.clone(),
            self.config.default_strategy,
            rx,
            snapshot_tx,
        );
        tokio::spawn(async move {
            if let Err(e) = session.run().await {
                tracing::debug!(error = %e, "session ended with error");
            }
        });

        Ok(ClientHandle {
            sender: tx,
            snapshots: snapshot_rx,
        })
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running session. Used to send it actions and watch its
/// state.
///
/// This is cheap to clone; it's an `mpsc::Sender` plus a
/// `watch::Receiver`. Actions are fire-and-forget: their effect shows up
/// in later snapshots.
#[derive(Clone)]
pub struct ClientHandle {
    sender: mpsc::Sender<Command>,
    snapshots: watch::Receiver<GameSnapshot>,
}

impl ClientHandle {
    /// Feeds an input-buffer change to the typing engine.
    ///
    /// Before the race starts every change is rejected with
    /// `NoActiveWord`. Once this returns, [`snapshot`](Self::snapshot)
    /// already reflects the change.
    pub async fn input(
        &self,
        value: &str,
        geometry: MeasuredLine,
    ) -> Result<InputOutcome, TypeRaceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(Command::Input {
            value: value.to_string(),
            geometry,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| TypeRaceError::SessionClosed)
    }

    /// Buys `powerup` for the opponent picked by the configured strategy.
    pub async fn purchase(&self, powerup: PowerupId) -> Result<(), TypeRaceError> {
        self.command(Command::Purchase {
            powerup,
            strategy: None,
        })
        .await
    }

    /// Buys `powerup` for the opponent picked by `strategy`.
    pub async fn purchase_with(
        &self,
        powerup: PowerupId,
        strategy: Strategy,
    ) -> Result<(), TypeRaceError> {
        self.command(Command::Purchase {
            powerup,
            strategy: Some(strategy),
        })
        .await
    }

    /// Drafts `powerup` from the lobby pool.
    pub async fn select_powerup(&self, powerup: PowerupId) -> Result<(), TypeRaceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(Command::SelectPowerup {
            powerup,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| TypeRaceError::SessionClosed)??;
        Ok(())
    }

    /// Asks the server to start the race without waiting out the lobby.
    pub async fn skip_wait(&self) -> Result<(), TypeRaceError> {
        self.command(Command::SkipWait).await
    }

    /// Ends this session and resets to login.
    pub async fn play_again(&self) -> Result<(), TypeRaceError> {
        self.command(Command::PlayAgain).await
    }

    /// Closes the connection and stops the session.
    pub async fn shutdown(&self) -> Result<(), TypeRaceError> {
        self.command(Command::Shutdown).await
    }

    /// The latest published state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified whenever the state changes.
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Waits until the published state satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&GameSnapshot) -> bool,
    ) -> Result<GameSnapshot, TypeRaceError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| TypeRaceError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    /// Resolves once the session task has stopped.
    pub async fn closed(&self) {
        self.sender.closed().await;
    }

    async fn command(&self, cmd: Command) -> Result<(), TypeRaceError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| TypeRaceError::SessionClosed)
    }
}
