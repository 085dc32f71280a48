//! HTTP protocol implementation.
//!
//! This module implements the per-connection side of the server: an
//! incremental HTTP/1.1 request parser, the connection worker that drives it,
//! and the response generator.
//!
//! # Architecture
//!
//! - **`parser`**: Byte-at-a-time request parser emitting events
//! - **`request`**: Per-message state built from parser events
//! - **`connection`**: Read loop, keep-alive decision and teardown
//! - **`timer`**: Idle watchdog owned by each connection
//! - **`responder`**: Builds the response for a completed request
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection Loop
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for bytes, idle timer or shutdown
//!        └──────┬──────┘
//!               │ Bytes received
//!               ▼
//!        ┌──────────────────┐
//!        │   Parsing        │ ← Feed parser, apply events
//!        └──────┬───────────┘
//!               │ Message complete
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Build and send one response
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → rearm timer → Reading
//!               └─ Close → shut down stream
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dirhttpd::config::Config;
//! use dirhttpd::http::connection::{Connection, ConnectionContext};
//! use dirhttpd::listing::FsLister;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let ctx = Arc::new(ConnectionContext::from_config(&cfg, Arc::new(FsLister::new("."))));
//!     let (_stop, stopped) = tokio::sync::watch::channel(false);
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     let mut id = 0;
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         id += 1;
//!         let mut conn = Connection::new(id, socket, Arc::clone(&ctx), stopped.clone());
//!         tokio::spawn(async move { conn.run().await });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod responder;
pub mod response;
pub mod timer;
pub mod writer;
