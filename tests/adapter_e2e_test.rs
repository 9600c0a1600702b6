use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use jewel_match::adapter::{
    run_server, service, InboundCommand, OutboundMessage, ServerConfig, PROTOCOL_VERSION,
};
use jewel_match::core::{Board, GameConfig, GameState};

/// Only legal move: (0,2) <-> (1,2).
fn fixture_game() -> GameState {
    let board = Board::parse(&["RRG", "GBR", "YOY"]).unwrap();
    GameState::with_board(GameConfig::default().with_size(3, 3).with_seed(7), board).unwrap()
}

fn test_config(max_pending: usize) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: max_pending,
        log_path: None,
        ..ServerConfig::default()
    }
}

struct Harness {
    addr: SocketAddr,
    server: JoinHandle<()>,
    game_loop: Option<JoinHandle<()>>,
    cmd_rx: Option<mpsc::Receiver<InboundCommand>>,
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.server.abort();
        if let Some(h) = self.game_loop.take() {
            h.abort();
        }
    }
}

/// Start a server; with `run_game` a minimal game loop answers every command.
async fn start(config: ServerConfig, run_game: bool) -> Harness {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(config.max_pending_commands);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx), None).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    if !run_game {
        return Harness {
            addr,
            server,
            game_loop: None,
            cmd_rx: Some(cmd_rx),
        };
    }

    let game_loop = tokio::spawn(async move {
        let mut game = fixture_game();
        let mut obs_seq = 0;
        while let Some(inbound) = cmd_rx.recv().await {
            for msg in service(&mut game, inbound, &mut obs_seq) {
                let _ = out_tx.send(msg);
            }
        }
    });

    Harness {
        addr,
        server,
        game_loop: Some(game_loop),
        cmd_rx: None,
    }
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, msg: &Value) {
        let line = serde_json::to_string(msg).unwrap();
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn next_line(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timeout waiting for line")
            .expect("io error")
    }

    async fn recv(&mut self) -> Value {
        let line = self.next_line().await.expect("expected line");
        serde_json::from_str(&line).unwrap()
    }

    async fn hello(&mut self, seq: u64, stream: bool) -> Value {
        self.send(&json!({
            "type": "hello",
            "seq": seq,
            "ts": 0,
            "client": {"name": "e2e", "version": "0.1.0"},
            "protocol_version": PROTOCOL_VERSION,
            "requested": {"stream_observations": stream},
        }))
        .await;
        let welcome = self.recv().await;
        assert_eq!(welcome["type"], "welcome");
        assert_eq!(welcome["seq"], seq);
        welcome
    }
}

fn swap(seq: u64, from: [u8; 2], to: [u8; 2]) -> Value {
    json!({"type": "command", "seq": seq, "ts": 0, "mode": "swap", "from": from, "to": to})
}

fn hint(seq: u64) -> Value {
    json!({"type": "command", "seq": seq, "ts": 0, "mode": "hint"})
}

#[tokio::test]
async fn hello_swap_ack_and_observations() {
    let h = start(test_config(8), true).await;
    let mut client = Client::connect(h.addr).await;

    let welcome = client.hello(1, true).await;
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["client_id"], 1);
    assert_eq!(welcome["game_id"], "jewel-match");

    // Streaming clients get the current state right after the welcome.
    let obs = client.recv().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["board"]["cells"], json!([[1, 1, 4], [4, 5, 1], [3, 2, 3]]));
    assert_eq!(obs["moves"], 0);
    let first_hash = obs["state_hash"].as_str().unwrap().to_string();
    assert_eq!(first_hash.len(), 16);

    client.send(&hint(2)).await;
    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["hint"]["from"], json!([0, 2]));
    assert_eq!(ack["hint"]["to"], json!([1, 2]));

    client.send(&swap(3, [0, 2], [1, 2])).await;
    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 3);

    let obs = client.recv().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["moves"], 1);
    assert!(obs["score"].as_u64().unwrap() >= 9);
    assert!(obs["last_cascade"]["steps"].as_u64().unwrap() >= 1);
    assert!(obs["seq"].as_u64().unwrap() > 1);
    assert_ne!(obs["state_hash"].as_str().unwrap(), first_hash);
}

#[tokio::test]
async fn rejected_swaps_carry_game_error_codes() {
    let h = start(test_config(8), true).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(1, false).await;

    client.send(&swap(2, [2, 0], [2, 1])).await;
    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["seq"], 2);
    assert_eq!(err["code"], "illegal_swap");

    client.send(&swap(3, [0, 0], [2, 2])).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_move");

    client
        .send(&json!({"type": "command", "seq": 4, "ts": 0, "mode": "swap", "from": [0, 0]}))
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
}

#[tokio::test]
async fn handshake_and_sequencing_are_enforced() {
    let h = start(test_config(8), true).await;
    let mut client = Client::connect(h.addr).await;

    client.send(&hint(1)).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "handshake_required");

    client.hello(5, false).await;

    client.send(&hint(5)).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 5);

    client.send(&json!({"type": "ping", "seq": 6})).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 6);

    client.writer.write_all(b"{\"seq\": 7, oops\n").await.unwrap();
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 7);

    client.send(&hint(8)).await;
    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 8);
}

#[tokio::test]
async fn protocol_mismatch_closes_the_connection() {
    let h = start(test_config(8), true).await;
    let mut client = Client::connect(h.addr).await;

    client
        .send(&json!({
            "type": "hello",
            "seq": 1,
            "ts": 0,
            "client": {"name": "old", "version": "0"},
            "protocol_version": "9.0.0",
        }))
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "protocol_mismatch");
    assert_eq!(client.next_line().await, None);
}

#[tokio::test]
async fn observer_is_gated_and_promoted_when_controller_leaves() {
    let h = start(test_config(8), true).await;

    let mut first = Client::connect(h.addr).await;
    assert_eq!(first.hello(1, false).await["role"], "controller");

    let mut second = Client::connect(h.addr).await;
    let welcome = second.hello(1, false).await;
    assert_eq!(welcome["role"], "observer");
    assert_eq!(welcome["controller_id"], 1);

    second.send(&hint(2)).await;
    assert_eq!(second.recv().await["code"], "not_controller");

    second
        .send(&json!({"type": "control", "seq": 3, "ts": 0, "action": "claim"}))
        .await;
    assert_eq!(second.recv().await["code"], "controller_active");

    drop(first);

    // Cleanup runs when the server sees EOF; retry until the handoff lands.
    let mut seq = 4;
    loop {
        second.send(&hint(seq)).await;
        let reply = second.recv().await;
        if reply["type"] == "ack" {
            break;
        }
        assert_eq!(reply["code"], "not_controller");
        assert!(seq < 60, "controller was never handed over");
        seq += 1;
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn release_then_claim_moves_control() {
    let h = start(test_config(8), true).await;

    let mut first = Client::connect(h.addr).await;
    first.hello(1, false).await;
    let mut second = Client::connect(h.addr).await;
    second.hello(1, false).await;

    second
        .send(&json!({"type": "control", "seq": 2, "ts": 0, "action": "release"}))
        .await;
    assert_eq!(second.recv().await["code"], "not_controller");

    first
        .send(&json!({"type": "control", "seq": 2, "ts": 0, "action": "release"}))
        .await;
    assert_eq!(first.recv().await["type"], "ack");

    second
        .send(&json!({"type": "control", "seq": 3, "ts": 0, "action": "claim"}))
        .await;
    assert_eq!(second.recv().await["type"], "ack");

    first.send(&hint(3)).await;
    assert_eq!(first.recv().await["code"], "not_controller");
    second.send(&hint(4)).await;
    assert_eq!(second.recv().await["type"], "ack");
}

#[tokio::test]
async fn full_queue_reports_backpressure() {
    // Nobody drains the queue, so the second command cannot fit.
    let mut h = start(test_config(1), false).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(1, false).await;

    client.send(&hint(2)).await;
    client.send(&hint(3)).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 3);

    let queued = h.cmd_rx.as_mut().unwrap().recv().await.unwrap();
    assert_eq!(queued.seq, 2);
}

#[tokio::test]
async fn wire_log_records_both_directions() {
    let path = std::env::temp_dir().join(format!("jewel-wire-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let config = ServerConfig {
        log_path: Some(path.to_string_lossy().into_owned()),
        ..test_config(8)
    };
    let h = start(config, true).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(1, false).await;

    let mut contents = String::new();
    for _ in 0..40 {
        contents = std::fs::read_to_string(&path).unwrap_or_default();
        if contents.lines().count() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    let lines: Vec<&str> = contents.lines().collect();
    assert!(lines.iter().any(|l| l.contains("\"hello\"")));
    assert!(lines.iter().any(|l| l.contains("\"welcome\"")));

    drop(h);
    let _ = std::fs::remove_file(&path);
}
