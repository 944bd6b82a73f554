//! Session actor: the one task that owns the game state.
//!
//! The session holds the connection and the [`GameState`]. Everything else
//! talks to it through a command channel and watches its snapshots, so
//! the state is only ever touched from one place. The loop:
//!   1. Send `Register(name)` as the first frame
//!   2. Select over inbound frames, handle commands, and the 1 s countdown
//!   3. Publish a snapshot after each step
//!   4. On close, force the state back to `Login`

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use typerace_engine::{InputOutcome, MeasuredLine, RejectReason, Strategy};
use typerace_protocol::{BinaryCodec, ClientMessage, Codec, PowerupId, ServerMessage};
use typerace_state::{GameSnapshot, GameState, StateError};
use typerace_transport::Connection;

use crate::TypeRaceError;

/// Commands sent from a [`ClientHandle`](crate::ClientHandle) to the
/// session.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the response on that channel.
pub(crate) enum Command {
    /// The input buffer changed.
    Input {
        value: String,
        geometry: MeasuredLine,
        reply: oneshot::Sender<InputOutcome>,
    },

    /// Buy a powerup; `None` uses the configured strategy.
    Purchase {
        powerup: PowerupId,
        strategy: Option<Strategy>,
    },

    /// Draft a powerup from the lobby pool.
    SelectPowerup {
        powerup: PowerupId,
        reply: oneshot::Sender<Result<(), StateError>>,
    },

    /// Ask the server to skip the lobby wait.
    SkipWait,

    /// Drop this session and return to login.
    PlayAgain,

    /// Close the connection and stop.
    Shutdown,
}

/// Whether the loop keeps going after a step.
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct Session<C: Connection> {
    conn: C,
    codec: BinaryCodec,
    state: GameState,
    name: String,
    default_strategy: Strategy,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<GameSnapshot>,
}

impl<C: Connection> Session<C> {
    pub(crate) fn new(
        conn: C,
        name: String,
        default_strategy: Strategy,
        commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<GameSnapshot>,
    ) -> Self {
        Self {
            conn,
            codec: BinaryCodec,
            state: GameState::new(),
            name,
            default_strategy,
            commands,
            snapshots,
        }
    }

    /// Runs the session until the connection closes or the handle asks it
    /// to stop.
    pub(crate) async fn run(mut self) -> Result<(), TypeRaceError> {
        let conn_id = self.conn.id();
        info!(%conn_id, name = %self.name, "session started");

        let register = ClientMessage::Register {
            name: self.name.clone(),
        };
        self.send(register).await?;

        let mut countdown = tokio::time::interval(Duration::from_secs(1));
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        countdown.tick().await;

        loop {
            let flow = tokio::select! {
                inbound = self.conn.recv() => match inbound {
                    Ok(Some(data)) => {
                        if self.on_frame(&data) {
                            countdown.reset();
                        }
                        Flow::Continue
                    }
                    Ok(None) => {
                        info!(%conn_id, "server closed the connection");
                        Flow::Stop
                    }
                    Err(e) => {
                        warn!(%conn_id, error = %e, "receive failed");
                        Flow::Stop
                    }
                },
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.on_command(cmd).await,
                    None => {
                        debug!(%conn_id, "all handles dropped");
                        self.close().await;
                        Flow::Stop
                    }
                },
                _ = countdown.tick() => match self.state.tick_countdown() {
                    Some(msg) => self.send_or_stop(msg).await,
                    None => Flow::Continue,
                },
            };

            self.publish();
            if let Flow::Stop = flow {
                break;
            }
        }

        self.state.connection_lost();
        self.publish();
        info!(%conn_id, "session stopped");
        Ok(())
    }

    /// Decodes and applies one inbound frame. Returns `true` if it was a
    /// `LobbyHello`, which restarts the countdown.
    fn on_frame(&mut self, data: &[u8]) -> bool {
        let event = match self.codec.decode(data) {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, len = data.len(), "dropping undecodable frame");
                return false;
            }
        };
        let joined_lobby = matches!(event, ServerMessage::LobbyHello { .. });
        self.state.apply(event);
        joined_lobby
    }

    async fn on_command(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Input {
                value,
                geometry,
                reply,
            } => {
                let outcome = if self.state.phase().is_racing() {
                    self.state.handle_input(&value, &geometry)
                } else {
                    InputOutcome::Rejected(RejectReason::NoActiveWord)
                };
                // The caller may read a snapshot as soon as it has the reply.
                self.publish();
                let _ = reply.send(outcome);
                match outcome.submit_message() {
                    Some(msg) => self.send_or_stop(msg).await,
                    None => Flow::Continue,
                }
            }

            Command::Purchase { powerup, strategy } => {
                let strategy = strategy.unwrap_or(self.default_strategy);
                match self.state.purchase(powerup, strategy) {
                    Some(msg) => self.send_or_stop(msg).await,
                    None => {
                        debug!(%powerup, %strategy, "no opponent to target");
                        Flow::Continue
                    }
                }
            }

            Command::SelectPowerup { powerup, reply } => {
                let result = self.state.select_powerup(powerup);
                let (reply_result, msg) = match result {
                    Ok(msg) => (Ok(()), msg),
                    Err(e) => (Err(e), None),
                };
                self.publish();
                let _ = reply.send(reply_result);
                match msg {
                    Some(msg) => self.send_or_stop(msg).await,
                    None => Flow::Continue,
                }
            }

            Command::SkipWait => self.send_or_stop(ClientMessage::SkipWait).await,

            Command::PlayAgain => {
                info!("leaving race to play again");
                self.state.reset();
                self.close().await;
                Flow::Stop
            }

            Command::Shutdown => {
                info!("shutting down session");
                self.close().await;
                Flow::Stop
            }
        }
    }

    async fn send(&self, msg: ClientMessage) -> Result<(), TypeRaceError> {
        let bytes = self.codec.encode(&msg)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    /// Sends `msg`; a failed send means the connection is gone.
    async fn send_or_stop(&self, msg: ClientMessage) -> Flow {
        let opcode = msg.opcode();
        match self.send(msg).await {
            Ok(()) => Flow::Continue,
            Err(TypeRaceError::Protocol(e)) => {
                warn!(?opcode, error = %e, "could not encode outbound message");
                Flow::Continue
            }
            Err(e) => {
                warn!(?opcode, error = %e, "send failed");
                Flow::Stop
            }
        }
    }

    async fn close(&self) {
        if let Err(e) = self.conn.close().await {
            debug!(error = %e, "close failed");
        }
    }

    fn publish(&self) {
        let snapshot = self.state.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}
