//! Transport abstraction layer for Matchpoint.
//!
//! Provides the [`Transport`] and [`Connection`] traits the server is
//! written against, so the orchestrator never touches sockets directly.
//! Connection identity ([`ConnId`]) is stamped here, at accept time, and
//! is valid only for that connection's lifetime.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use matchpoint_protocol::ConnId;

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive message frames.
///
/// Send and receive are independently locked: one task may sit in
/// [`recv`](Connection::recv) while another pushes outbound frames
/// through [`send`](Connection::send). The orchestrator relies on this —
/// its broadcasts are written by a drain task that runs concurrently
/// with the connection's read loop.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the identity assigned to this connection at accept.
    fn id(&self) -> ConnId;
}
