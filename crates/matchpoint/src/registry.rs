//! Channel registry: the live outbound channel for every connection.
//!
//! The orchestrator never touches sockets. Each connection handler
//! registers an unbounded sender here at connect time; the orchestrator
//! pushes [`ServerMessage`]s through it and a per-connection drain task
//! writes them to the wire. Sends are fire-and-forget — nothing in the
//! protocol waits for a client to acknowledge anything.

use std::collections::HashMap;

use matchpoint_protocol::{ConnId, ServerMessage};
use tokio::sync::mpsc;
use tracing::debug;

/// Channel sender for delivering outbound messages to one connection.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Tracks the outbound channel of every live connection.
///
/// Owned by the orchestrator task; registration and removal happen in
/// the same serialized event stream as everything else, so a
/// deregistered handle is invisible to all subsequent sends.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<ConnId, OutboundSender>,
}

impl ChannelRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Registers the outbound channel for a newly accepted connection.
    pub fn register(&mut self, conn: ConnId, sender: OutboundSender) {
        self.channels.insert(conn, sender);
        debug!(%conn, live = self.channels.len(), "connection registered");
    }

    /// Removes a connection. Returns `true` if it was registered.
    ///
    /// Dropping the sender here is what lets the connection's drain task
    /// wind down once the last queued message is written.
    pub fn deregister(&mut self, conn: ConnId) -> bool {
        let removed = self.channels.remove(&conn).is_some();
        if removed {
            debug!(%conn, live = self.channels.len(), "connection deregistered");
        }
        removed
    }

    /// Returns `true` if the connection is live.
    pub fn contains(&self, conn: ConnId) -> bool {
        self.channels.contains_key(&conn)
    }

    /// Sends a message to one connection. Silently drops the message if
    /// the handle is unknown or its drain task is gone — a stale send is
    /// a no-op, never an error.
    pub fn send(&self, conn: ConnId, msg: ServerMessage) {
        if let Some(sender) = self.channels.get(&conn) {
            let _ = sender.send(msg);
        }
    }

    /// Sends a message to every member of a room.
    ///
    /// Each recipient is attempted independently — one dead or missing
    /// handle never prevents delivery to the other.
    pub fn send_room(&self, room: &[ConnId], msg: ServerMessage) {
        for conn in room {
            self.send(*conn, msg.clone());
        }
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
