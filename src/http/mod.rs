//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 subset the server speaks: GET requests
//! without bodies, answered with 200, 400 or 404 over keep-alive connections.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`reader`**: Reads CRLF-terminated lines under a per-line deadline
//! - **`header`**: Header key canonicalization and the sorted header map
//! - **`parser`**: Builds a request from lines, or a typed error
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//! - **`connection`**: The per-connection request-response state machine
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitingRequest  │ ← Read lines until a blank line
//!        └──────┬───────────┘
//!               │
//!        ┌──────┴──────┐
//!        ▼             ▼
//!   ┌─────────┐   ┌─────────┐
//!   │ Parsed  │   │ Failed  │ ─ idle timeout / EOF / I/O error → Closed
//!   └────┬────┘   └────┬────┘
//!        │ dispatch    │ parse error / partial timeout → 400
//!        ▼             ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Send response to client
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → AwaitingRequest (same connection)
//!               └─ 400 or Connection: close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sitan::config::Config;
//! use sitan::files::Dispatcher;
//! use sitan::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let dispatcher = Arc::new(Dispatcher::from_config(&cfg.static_files)?);
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let conn = Connection::new(socket, dispatcher.clone(), &cfg.server);
//!         tokio::spawn(conn.run());
//!     }
//! }
//! ```

pub mod connection;
pub mod header;
pub mod mime;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;

/// The only protocol version accepted and produced.
pub const HTTP_VERSION: &str = "HTTP/1.1";
