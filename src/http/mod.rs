//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.x server: every connection carries exactly
//! one request and one response, then the send side is shut down.
//!
//! # Architecture
//!
//! - **`connection`**: the per-connection state machine
//! - **`parser`**: parses an incoming request from a byte buffer
//! - **`request`**: request representation
//! - **`response`**: response representation with builder pattern
//! - **`router`**: maps a request target to its canned response
//! - **`writer`**: serializes and writes a response to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a complete request
//!        └──────┬──────┘
//!               │ Request parsed
//!               ▼
//!        ┌──────────────────┐
//!        │     Routed       │ ← Build the response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │
//!               ├─ Sent → HalfClosed (outbound shut down)
//!               └─ Any error while Reading or Writing → Abandoned
//! ```
//!
//! # Example
//!
//! ```ignore
//! use healthd::http::connection::Connection;
//! use healthd::http::router::Router;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         tokio::spawn(async move {
//!             let _ = Connection::new(socket, Router::default()).run().await;
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;
