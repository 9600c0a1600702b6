//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: commands
//! arrive on a bounded queue drained with [`Adapter::try_recv`], replies go
//! back through [`Adapter::send`].

use std::sync::Arc;

use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{GameError, GameState};
use crate::engine::{plan_best_swap, PlanError};
use crate::protocol::{
    create_ack, create_error, AckMessage, ErrorCode, ErrorMessage, HintPayload,
    ObservationMessage,
};
use crate::server::{build_observation, run_server, AdapterStatus, ServerConfig, StatusCounters};
use crate::types::Pos;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A streaming client just said hello and wants the current state.
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Swap { from: Pos, to: Pos },
    Hint,
    Restart,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<StatusCounters>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `JEWEL_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            println!("[Adapter] AI control disabled (JEWEL_AI_DISABLED)");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Spawn the server on a dedicated runtime.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(StatusCounters::default());

        let rt = Runtime::new()?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None, Some(server_status)).await {
                eprintln!("[Adapter] Server stopped: {}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> AdapterStatus {
        self.status.snapshot()
    }
}

/// Apply one client command to the game.
///
/// The ack echoes the command's `seq`; a `hint` ack carries the planned swap.
pub fn apply_command(
    game: &mut GameState,
    seq: u64,
    command: &ClientCommand,
) -> Result<AckMessage, ErrorMessage> {
    match command {
        ClientCommand::Swap { from, to } => game
            .try_swap(*from, *to)
            .map(|_| create_ack(seq))
            .map_err(|e| game_error(seq, &e)),
        ClientCommand::Hint => {
            let planned = plan_best_swap(game)
                .ok_or_else(|| create_error(seq, ErrorCode::NoMove, &PlanError::NoMove.message()))?;
            let mut ack = create_ack(seq);
            ack.hint = Some(HintPayload {
                from: [planned.mv.a.row, planned.mv.a.col],
                to: [planned.mv.b.row, planned.mv.b.col],
                score: planned.score,
                cleared: planned.cleared,
                depth: planned.depth,
            });
            Ok(ack)
        }
        ClientCommand::Restart => game
            .restart()
            .map(|_| create_ack(seq))
            .map_err(|e| game_error(seq, &e)),
    }
}

fn game_error(seq: u64, err: &GameError) -> ErrorMessage {
    let code = match err {
        GameError::InvalidMove { .. } => ErrorCode::InvalidMove,
        GameError::IllegalSwap { .. } => ErrorCode::IllegalSwap,
        GameError::CascadeOverflow { .. } => ErrorCode::CascadeOverflow,
        GameError::InvalidConfig(_) | GameError::InvalidLayout(_) => ErrorCode::InvalidCommand,
    };
    create_error(seq, code, &err.to_string())
}

/// Turn one inbound command into the messages the game loop sends back.
///
/// `obs_seq` is the game's own outbound sequence counter; it advances once
/// per observation. A command that changed the board is followed by a
/// broadcast observation.
pub fn service(
    game: &mut GameState,
    inbound: InboundCommand,
    obs_seq: &mut u64,
) -> ArrayVec<OutboundMessage, 2> {
    let mut out = ArrayVec::new();
    let client_id = inbound.client_id;

    match inbound.payload {
        InboundPayload::SnapshotRequest => {
            *obs_seq += 1;
            out.push(OutboundMessage::ToClientObservation {
                client_id,
                obs: build_observation(game, *obs_seq),
            });
        }
        InboundPayload::Command(command) => {
            let before = (game.board_id(), game.episode_id());
            match apply_command(game, inbound.seq, &command) {
                Ok(ack) => out.push(OutboundMessage::ToClientAck { client_id, ack }),
                Err(err) => out.push(OutboundMessage::ToClientError { client_id, err }),
            }
            if (game.board_id(), game.episode_id()) != before {
                *obs_seq += 1;
                out.push(OutboundMessage::BroadcastObservation {
                    obs: build_observation(game, *obs_seq),
                });
            }
        }
    }
    out
}
