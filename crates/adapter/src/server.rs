//! TCP server for the remote-control adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::hash::Hasher;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::GameState;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::Pos;

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust releases.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }

    fn write_u32_le(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Read `JEWEL_AI_HOST`, `JEWEL_AI_PORT`, `JEWEL_AI_MAX_PENDING` and
    /// `JEWEL_AI_LOG_PATH`; anything missing or unparsable keeps its default.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("JEWEL_AI_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("JEWEL_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("JEWEL_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let log_path = env::var("JEWEL_AI_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            log_path,
        }
    }

    /// `JEWEL_AI_DISABLED=1` (or `true`) turns the adapter off.
    pub fn is_disabled() -> bool {
        std::env::var("JEWEL_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Major version a client must speak, e.g. `"1."` for `"1.0.0"`.
    fn major_prefix(&self) -> &str {
        match self.protocol_version.find('.') {
            Some(i) => &self.protocol_version[..=i],
            None => &self.protocol_version,
        }
    }
}

/// Lock-free connection counters, readable from the game loop.
#[derive(Debug, Default)]
pub struct StatusCounters {
    clients: AtomicU16,
    streaming: AtomicU16,
    /// 0 when nobody controls; client ids start at 1.
    controller: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterStatus {
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

impl StatusCounters {
    pub fn snapshot(&self) -> AdapterStatus {
        let controller = self.controller.load(Ordering::Relaxed);
        AdapterStatus {
            client_count: self.clients.load(Ordering::Relaxed),
            controller_id: (controller != 0).then_some(controller),
            streaming_count: self.streaming.load(Ordering::Relaxed),
        }
    }

    fn publish(&self, registry: &Registry) {
        let streaming = registry
            .clients
            .iter()
            .filter(|c| c.stream_observations)
            .count();
        self.clients
            .store(registry.clients.len() as u16, Ordering::Relaxed);
        self.streaming.store(streaming as u16, Ordering::Relaxed);
        self.controller
            .store(registry.controller.unwrap_or(0), Ordering::Relaxed);
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Default)]
struct Registry {
    clients: Vec<ClientHandle>,
    controller: Option<usize>,
}

impl Registry {
    fn get_mut(&mut self, client_id: usize) -> Option<&mut ClientHandle> {
        self.clients.iter_mut().find(|c| c.id == client_id)
    }

    fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        if let Some(c) = self.clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    registry: RwLock<Registry>,
    status: Arc<StatusCounters>,
}

impl ServerState {
    fn new(config: ServerConfig, status: Arc<StatusCounters>) -> Self {
        Self {
            config,
            registry: RwLock::new(Registry::default()),
            status,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    fn encode(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            ClientOutbound::Welcome(m) => serde_json::to_writer(&mut *buf, m),
            ClientOutbound::Ack(m) => serde_json::to_writer(&mut *buf, m),
            ClientOutbound::Error(m) => serde_json::to_writer(&mut *buf, m),
            ClientOutbound::Observation(m) => serde_json::to_writer(&mut *buf, m),
        }
    }
}

/// Start the TCP server.
///
/// Runs until the listener fails. `ready_tx` receives the bound address
/// (useful with port 0); `status` is kept up to date with connection counts.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    status: Option<Arc<StatusCounters>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config, status.unwrap_or_default()));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let registry = state.registry.read().await;
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        registry.send_to(client_id, ClientOutbound::Ack(ack));
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        registry.send_to(client_id, ClientOutbound::Error(err));
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        registry.send_to(client_id, ClientOutbound::Observation(obs));
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        for c in registry.clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, addr, client_id, state, command_tx, wire_log_tx).await
            {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Append every inbound and outbound line to `path`.
fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<Vec<u8>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Adapter] Wire log {} unavailable: {}", path, e);
                return;
            }
        };
        while let Some(mut line) = rx.recv().await {
            line.push(b'\n');
            if file.write_all(&line).await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut registry = state.registry.write().await;
        registry.clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.status.publish(&registry);
    }

    let wire_log_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if msg.encode(&mut buf).is_err() {
                continue;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send(buf.clone());
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut session = Session {
        client_id,
        state: &state,
        tx: &tx,
        command_tx: &command_tx,
    };
    let result = session.read_loop(reader, wire_log_tx.as_ref()).await;

    // Remove the client and hand control to the lowest remaining id, even
    // when the read loop ended with an I/O error.
    {
        let mut registry = state.registry.write().await;
        registry.clients.retain(|c| c.id != client_id);
        if registry.controller == Some(client_id) {
            let next_id = registry
                .clients
                .iter()
                .filter(|c| c.handshaken)
                .map(|c| c.id)
                .min();
            registry.controller = next_id;
            match next_id {
                Some(new_id) => println!("[Adapter] Controller {} promoted", new_id),
                None => println!("[Adapter] Controller {} released", client_id),
            }
        }
        state.status.publish(&registry);
    }

    drop(session);
    drop(tx);
    let _ = write_task.await;

    result
}

/// Per-connection message handling.
struct Session<'a> {
    client_id: usize,
    state: &'a ServerState,
    tx: &'a mpsc::UnboundedSender<ClientOutbound>,
    command_tx: &'a mpsc::Sender<InboundCommand>,
}

impl Session<'_> {
    async fn read_loop(
        &mut self,
        reader: tokio::net::tcp::OwnedReadHalf,
        wire_log_tx: Option<&mpsc::UnboundedSender<Vec<u8>>>,
    ) -> anyhow::Result<()> {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }

            let raw_line = line.trim_end_matches(['\n', '\r']);
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(log) = wire_log_tx {
                let _ = log.send(raw_line.as_bytes().to_vec());
            }

            let keep_open = match parse_message(trimmed) {
                Ok(ParsedMessage::Hello(hello)) => self.on_hello(hello).await,
                Ok(ParsedMessage::Command(cmd)) => {
                    self.on_command(cmd).await;
                    true
                }
                Ok(ParsedMessage::Control(ctrl)) => {
                    self.on_control(ctrl).await;
                    true
                }
                Ok(ParsedMessage::Unknown(msg)) => {
                    if self.admit(msg.seq, false).await {
                        self.error(msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
                    }
                    true
                }
                Err(e) => {
                    let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                    self.error(
                        seq,
                        ErrorCode::InvalidCommand,
                        &format!("JSON parse error: {}", e),
                    );
                    true
                }
            };
            if !keep_open {
                return Ok(());
            }
        }
    }

    fn error(&self, seq: u64, code: ErrorCode, message: &str) {
        let _ = self
            .tx
            .send(ClientOutbound::Error(create_error(seq, code, message)));
    }

    /// Handshake and sequencing gate. Sends the error itself and returns
    /// false when the message must be dropped.
    async fn admit(&self, seq: u64, require_handshake: bool) -> bool {
        let mut registry = self.state.registry.write().await;
        let Some(client) = registry.get_mut(self.client_id) else {
            return false;
        };
        if !client.handshaken {
            if require_handshake {
                drop(registry);
                self.error(seq, ErrorCode::HandshakeRequired, "Send hello first");
                return false;
            }
            return true;
        }
        if client.last_seq.is_some_and(|prev| seq <= prev) {
            drop(registry);
            self.error(
                seq,
                ErrorCode::InvalidCommand,
                "seq must be strictly increasing",
            );
            return false;
        }
        client.last_seq = Some(seq);
        true
    }

    /// Returns false when the connection must be closed.
    async fn on_hello(&mut self, hello: HelloMessage) -> bool {
        if !self.admit(hello.seq, false).await {
            return true;
        }

        if !hello
            .protocol_version
            .starts_with(self.state.config.major_prefix())
        {
            self.error(
                hello.seq,
                ErrorCode::ProtocolMismatch,
                &format!("Protocol version {} not supported", hello.protocol_version),
            );
            return false;
        }

        let stream = hello.requested.stream_observations;
        let (role, controller_id) = {
            let mut registry = self.state.registry.write().await;
            if let Some(client) = registry.get_mut(self.client_id) {
                client.handshaken = true;
                client.last_seq = Some(hello.seq);
                client.stream_observations = stream;
            }
            if registry.controller.is_none() {
                registry.controller = Some(self.client_id);
                println!("[Adapter] Client {} is now controller", self.client_id);
            }
            self.state.status.publish(&registry);
            let role = if registry.controller == Some(self.client_id) {
                AssignedRole::Controller
            } else {
                AssignedRole::Observer
            };
            (role, registry.controller)
        };

        let welcome = create_welcome(
            hello.seq,
            &self.state.config.protocol_version,
            self.client_id as u64,
            role,
            controller_id.map(|id| id as u64),
        );
        let _ = self.tx.send(ClientOutbound::Welcome(welcome));

        if stream {
            let _ = self.command_tx.try_send(InboundCommand {
                client_id: self.client_id,
                seq: hello.seq,
                payload: InboundPayload::SnapshotRequest,
            });
        }
        true
    }

    async fn on_command(&mut self, cmd: CommandMessage) {
        if !self.admit(cmd.seq, true).await {
            return;
        }

        let is_controller =
            self.state.registry.read().await.controller == Some(self.client_id);
        if !is_controller {
            self.error(
                cmd.seq,
                ErrorCode::NotController,
                "Only controller may send commands",
            );
            return;
        }

        let command = match map_command(&cmd) {
            Ok(c) => c,
            Err((code, message)) => {
                self.error(cmd.seq, code, &message);
                return;
            }
        };

        // Ack is sent by the game loop after the command is applied.
        if self
            .command_tx
            .try_send(InboundCommand {
                client_id: self.client_id,
                seq: cmd.seq,
                payload: InboundPayload::Command(command),
            })
            .is_err()
        {
            self.error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
        }
    }

    async fn on_control(&mut self, ctrl: ControlMessage) {
        if !self.admit(ctrl.seq, true).await {
            return;
        }

        let mut registry = self.state.registry.write().await;
        let outcome = match ctrl.action {
            ControlAction::Claim => match registry.controller {
                None => {
                    registry.controller = Some(self.client_id);
                    Ok(())
                }
                Some(id) if id == self.client_id => Ok(()),
                Some(_) => Err((ErrorCode::ControllerActive, "Controller already assigned")),
            },
            ControlAction::Release => {
                if registry.controller == Some(self.client_id) {
                    registry.controller = None;
                    Ok(())
                } else {
                    Err((ErrorCode::NotController, "Only controller may release"))
                }
            }
        };
        self.state.status.publish(&registry);
        drop(registry);

        match outcome {
            Ok(()) => {
                let _ = self.tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
            }
            Err((code, message)) => self.error(ctrl.seq, code, message),
        }
    }
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.mode {
        CommandMode::Swap => match (cmd.from, cmd.to) {
            (Some(from), Some(to)) => Ok(ClientCommand::Swap {
                from: Pos::new(from[0], from[1]),
                to: Pos::new(to[0], to[1]),
            }),
            _ => Err((
                ErrorCode::InvalidCommand,
                "swap needs both from and to".to_string(),
            )),
        },
        CommandMode::Hint => Ok(ClientCommand::Hint),
        CommandMode::Restart => Ok(ClientCommand::Restart),
    }
}

/// Build an observation of the current game state.
pub fn build_observation(game: &GameState, seq: u64) -> ObservationMessage {
    let snap = game.snapshot();
    let cells = snap.board.code_grid();
    let last_cascade = snap.last_cascade.map(LastCascade::from);

    let mut hasher = Fnv1aHasher::new();
    hasher.write(&[snap.board.rows(), snap.board.cols()]);
    for row in &cells {
        hasher.write(row);
    }
    hasher.write_u32_le(snap.board_id);
    hasher.write_u32_le(snap.episode_id);
    hasher.write_u32_le(snap.seed);
    hasher.write_u32_le(snap.score);
    hasher.write_u32_le(snap.moves);
    hasher.write(&[snap.has_moves as u8]);
    match last_cascade {
        Some(c) => {
            hasher.write(&[1]);
            hasher.write_u32_le(c.steps);
            hasher.write_u32_le(c.cleared);
            hasher.write_u32_le(c.score);
        }
        None => hasher.write(&[0]),
    }

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        episode_id: snap.episode_id,
        board_id: snap.board_id,
        seed: snap.seed,
        board: BoardGrid {
            rows: snap.board.rows(),
            cols: snap.board.cols(),
            cells,
        },
        score: snap.score,
        moves: snap.moves,
        has_moves: snap.has_moves,
        last_cascade,
        state_hash: StateHash(hasher.finish()),
    }
}
