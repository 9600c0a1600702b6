//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! Lets external agents play the game over a TCP connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Clients that asked for it get an observation
//!    after every board change
//! 5. **Commanding**: Only the controller may send commands
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `swap` two cells, ask for a `hint`, or `restart`
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with assigned role and capabilities
//! - **observation**: Board as kind codes, score, moves, ids, `state_hash`
//! - **ack**: Command applied (a `hint` ack carries the suggested swap)
//! - **error**: Error response with code and message
//!
//! Every sender's `seq` must strictly increase; replies echo the `seq` of the
//! message they answer. When the controller disconnects, control passes to
//! the connected client with the lowest id.
//!
//! # Environment Variables
//!
//! - `JEWEL_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `JEWEL_AI_PORT`: Port number (default: 7878)
//! - `JEWEL_AI_MAX_PENDING`: Command queue capacity (default: 10)
//! - `JEWEL_AI_LOG_PATH`: Append every wire line to this file
//! - `JEWEL_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"board":{"rows":8,"cols":8,"cells":[[1,4,...],...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":1700000000050,"mode":"swap","from":[3,4],"to":[3,5]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000051,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use jewel_match_core as core;
pub use jewel_match_engine as engine;
pub use jewel_match_types as types;

pub use protocol::*;
pub use runtime::{
    apply_command, service, Adapter, ClientCommand, InboundCommand, InboundPayload,
    OutboundMessage,
};
pub use server::{build_observation, run_server, AdapterStatus, ServerConfig, StatusCounters};
