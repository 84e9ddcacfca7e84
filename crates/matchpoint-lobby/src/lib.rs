//! FIFO matchmaking queue for Matchpoint.
//!
//! The lobby is an ordered queue of connections waiting to be paired.
//! Matching is strictly first-in-first-out: whenever the queue holds two
//! or more handles, the two *oldest* are paired — no skipping, no
//! priority, no reordering.
//!
//! # Concurrency note
//!
//! `Lobby` is NOT thread-safe by itself — it's a plain `VecDeque` owned
//! by the orchestrator task, which serializes every event touching it.
//! Keeping it simple here avoids hidden locking; the serialization
//! boundary lives one layer up.

use std::collections::VecDeque;

use matchpoint_protocol::ConnId;
use tracing::debug;

/// An ordered queue of connections waiting for an opponent.
///
/// Invariant: no handle appears twice. [`enqueue`](Lobby::enqueue) is an
/// idempotent no-op for a handle that is already waiting, and a handle is
/// removed the instant it is paired or disconnects.
#[derive(Debug, Default)]
pub struct Lobby {
    waiting: VecDeque<ConnId>,
}

impl Lobby {
    /// Creates a new, empty lobby.
    pub fn new() -> Self {
        Self {
            waiting: VecDeque::new(),
        }
    }

    /// Appends a handle to the tail of the queue.
    ///
    /// Returns `true` if the handle was added, `false` if it was already
    /// waiting (the call is then a no-op — a client sending `join` twice
    /// must not hold two places in line).
    pub fn enqueue(&mut self, conn: ConnId) -> bool {
        if self.waiting.contains(&conn) {
            debug!(%conn, "already waiting, enqueue ignored");
            return false;
        }
        self.waiting.push_back(conn);
        debug!(%conn, waiting = self.waiting.len(), "enqueued");
        true
    }

    /// Removes a handle from the queue, wherever it sits.
    ///
    /// Must be called synchronously with the disconnect event so a
    /// dequeue never yields a dead handle. Returns `true` if the handle
    /// was actually waiting.
    pub fn remove(&mut self, conn: ConnId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|c| *c != conn);
        self.waiting.len() != before
    }

    /// Dequeues the two oldest handles if at least two are waiting.
    ///
    /// The pair comes back in queue order — the caller seats the first
    /// handle as white.
    pub fn take_pair(&mut self) -> Option<(ConnId, ConnId)> {
        if self.waiting.len() < 2 {
            return None;
        }
        let first = self.waiting.pop_front().expect("len checked above");
        let second = self.waiting.pop_front().expect("len checked above");
        debug!(%first, %second, "paired");
        Some((first, second))
    }

    /// Returns `true` if the handle is currently waiting.
    pub fn contains(&self, conn: ConnId) -> bool {
        self.waiting.contains(&conn)
    }

    /// Number of handles currently waiting.
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    /// Returns `true` if nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnId {
        ConnId(id)
    }

    #[test]
    fn test_enqueue_preserves_arrival_order() {
        let mut lobby = Lobby::new();
        lobby.enqueue(cid(1));
        lobby.enqueue(cid(2));
        lobby.enqueue(cid(3));

        assert_eq!(lobby.take_pair(), Some((cid(1), cid(2))));
        assert_eq!(lobby.len(), 1);
        assert!(lobby.contains(cid(3)));
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let mut lobby = Lobby::new();
        assert!(lobby.enqueue(cid(1)));
        assert!(!lobby.enqueue(cid(1)));
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_take_pair_needs_two() {
        let mut lobby = Lobby::new();
        assert_eq!(lobby.take_pair(), None);

        lobby.enqueue(cid(1));
        assert_eq!(lobby.take_pair(), None);
        // The lone waiter keeps its place.
        assert!(lobby.contains(cid(1)));
    }

    #[test]
    fn test_take_pair_shrinks_queue_by_exactly_two() {
        let mut lobby = Lobby::new();
        for id in 1..=5 {
            lobby.enqueue(cid(id));
        }
        assert_eq!(lobby.take_pair(), Some((cid(1), cid(2))));
        assert_eq!(lobby.len(), 3);
        assert_eq!(lobby.take_pair(), Some((cid(3), cid(4))));
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_remove_from_middle() {
        let mut lobby = Lobby::new();
        lobby.enqueue(cid(1));
        lobby.enqueue(cid(2));
        lobby.enqueue(cid(3));

        assert!(lobby.remove(cid(2)));
        // Pairing skips the removed handle entirely.
        assert_eq!(lobby.take_pair(), Some((cid(1), cid(3))));
    }

    #[test]
    fn test_remove_absent_handle_is_noop() {
        let mut lobby = Lobby::new();
        lobby.enqueue(cid(1));
        assert!(!lobby.remove(cid(99)));
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_requeued_handle_joins_at_tail() {
        let mut lobby = Lobby::new();
        lobby.enqueue(cid(1));
        lobby.enqueue(cid(2));
        lobby.enqueue(cid(3));
        let _ = lobby.take_pair();

        // 1 comes back (opponent quit) — behind 3, who waited longer.
        lobby.enqueue(cid(1));
        assert_eq!(lobby.take_pair(), Some((cid(3), cid(1))));
    }
}
