//! The session store: owns every live session, seat attachment, and
//! pending replay handshake.
//!
//! # Concurrency note
//!
//! Like the lobby, the store is NOT thread-safe by itself — it is owned
//! by the orchestrator task and every mutation goes through that single
//! serialized event boundary. Plain `HashMap`s, no interior locking.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use matchpoint_protocol::{Color, ConnId, SessionId};
use tracing::{debug, info};

use crate::{GameSession, Participants, RulesEngine, Seat, SessionError, SessionPhase};

/// Counter for allocating session ids. Ids are structured identity, not
/// encoding — nothing is ever recovered by parsing one.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Outcome of a replay request.
///
/// The replay handshake is per-session: `NoRequests → OneRequested →
/// Restarted`, with set semantics per handle (the same participant
/// asking twice stays at `OneRequested`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// The handle is not seated in any session — nothing recorded.
    Ignored,
    /// Recorded; still waiting for the other participant.
    Pending,
    /// Both participants agreed. The board has been reset to the initial
    /// position and the session is `Active` again.
    Restarted,
}

/// Owns all [`GameSession`]s, the seat attachments pointing into them,
/// and the pending replay request sets.
///
/// Destroying a session through [`destroy`](SessionStore::destroy) is the
/// only teardown path and discards all three together — no session ever
/// outlives its seats, and no replay set ever outlives its session.
pub struct SessionStore<R: RulesEngine> {
    /// Live sessions, keyed by session id.
    sessions: HashMap<SessionId, GameSession<R::Board>>,

    /// Which session (and color) each connection is seated in.
    /// A connection holds at most one seat (key invariant).
    seats: HashMap<ConnId, Seat>,

    /// Participants who asked for a rematch, per session. Created lazily
    /// on the first request, discarded on restart or teardown.
    replay_requests: HashMap<SessionId, HashSet<ConnId>>,
}

impl<R: RulesEngine> SessionStore<R> {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            seats: HashMap::new(),
            replay_requests: HashMap::new(),
        }
    }

    /// Creates a session seating `white` and `black`, in that order, with
    /// the board at the initial position.
    ///
    /// This is the only path that creates sessions. The caller (the
    /// orchestrator's pairing step) passes the two oldest queued handles
    /// in dequeue order — first dequeued plays white.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadySeated`] if either handle already
    /// holds a seat; the store is left unchanged.
    pub fn create(
        &mut self,
        white: ConnId,
        black: ConnId,
    ) -> Result<SessionId, SessionError> {
        for conn in [white, black] {
            if self.seats.contains_key(&conn) {
                return Err(SessionError::AlreadySeated(conn));
            }
        }

        let session_id =
            SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));

        self.sessions.insert(
            session_id,
            GameSession {
                session_id,
                participants: Participants { white, black },
                board: R::initial(),
                phase: SessionPhase::Active,
            },
        );
        self.seats.insert(
            white,
            Seat {
                session_id,
                color: Color::White,
            },
        );
        self.seats.insert(
            black,
            Seat {
                session_id,
                color: Color::Black,
            },
        );

        info!(%session_id, %white, %black, "session created");
        Ok(session_id)
    }

    /// The seat held by `conn`, if any.
    pub fn seat(&self, conn: ConnId) -> Option<Seat> {
        self.seats.get(&conn).copied()
    }

    /// Looks up a session by id.
    pub fn session(
        &self,
        session_id: SessionId,
    ) -> Option<&GameSession<R::Board>> {
        self.sessions.get(&session_id)
    }

    /// Mutable session lookup, for move application.
    pub fn session_mut(
        &mut self,
        session_id: SessionId,
    ) -> Option<&mut GameSession<R::Board>> {
        self.sessions.get_mut(&session_id)
    }

    /// The session `conn` is seated in, if any.
    pub fn session_of(
        &self,
        conn: ConnId,
    ) -> Option<&GameSession<R::Board>> {
        let seat = self.seats.get(&conn)?;
        self.sessions.get(&seat.session_id)
    }

    /// Records a replay request from `conn`.
    ///
    /// Set semantics: a repeated request from the same handle changes
    /// nothing. When the set reaches both participants, the board resets
    /// to the initial position, the session returns to `Active`, and the
    /// set is discarded — the next handshake starts from scratch.
    pub fn request_replay(&mut self, conn: ConnId) -> ReplayOutcome {
        let Some(seat) = self.seats.get(&conn) else {
            return ReplayOutcome::Ignored;
        };
        let session_id = seat.session_id;
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return ReplayOutcome::Ignored;
        };

        let requests =
            self.replay_requests.entry(session_id).or_default();
        requests.insert(conn);
        debug!(%conn, %session_id, requested = requests.len(), "replay requested");

        let both_agreed = session
            .participants
            .pair()
            .iter()
            .all(|p| requests.contains(p));
        if !both_agreed {
            return ReplayOutcome::Pending;
        }

        session.board = R::initial();
        session.phase = SessionPhase::Active;
        self.replay_requests.remove(&session_id);
        info!(%session_id, "both sides agreed, session restarted");
        ReplayOutcome::Restarted
    }

    /// Destroys a session: removes it, its pending replay set, and both
    /// participants' seats.
    ///
    /// Returns the removed session so the caller can notify its
    /// participants. Returns `None` if the session is already gone —
    /// teardown is idempotent by construction.
    pub fn destroy(
        &mut self,
        session_id: SessionId,
    ) -> Option<GameSession<R::Board>> {
        let session = self.sessions.remove(&session_id)?;
        self.replay_requests.remove(&session_id);
        for conn in session.participants.pair() {
            self.seats.remove(&conn);
        }
        info!(%session_id, "session destroyed");
        Some(session)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of seated connections.
    pub fn seated_count(&self) -> usize {
        self.seats.len()
    }
}

impl<R: RulesEngine> Default for SessionStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchpoint_protocol::MoveRequest;

    /// Mock rules: any move with `from != to` is legal; the game is won
    /// by white after three accepted moves.
    struct Countdown;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct CountBoard {
        moves: u32,
    }

    impl RulesEngine for Countdown {
        type Board = CountBoard;

        fn initial() -> CountBoard {
            CountBoard { moves: 0 }
        }

        fn apply(
            board: &mut CountBoard,
            mv: &MoveRequest,
        ) -> Result<(), String> {
            if mv.from == mv.to {
                return Err("null move".into());
            }
            board.moves += 1;
            Ok(())
        }

        fn verdict(board: &CountBoard) -> Option<String> {
            (board.moves >= 3).then(|| "1-0".to_string())
        }

        fn encode(board: &CountBoard) -> String {
            format!("moves:{}", board.moves)
        }
    }

    fn cid(id: u64) -> ConnId {
        ConnId(id)
    }

    fn store_with_session() -> (SessionStore<Countdown>, SessionId) {
        let mut store = SessionStore::new();
        let sid = store.create(cid(1), cid(2)).unwrap();
        (store, sid)
    }

    #[test]
    fn test_create_seats_first_handle_as_white() {
        let (store, sid) = store_with_session();

        let seat1 = store.seat(cid(1)).unwrap();
        let seat2 = store.seat(cid(2)).unwrap();
        assert_eq!(seat1.color, Color::White);
        assert_eq!(seat2.color, Color::Black);
        assert_eq!(seat1.session_id, sid);
        assert_eq!(seat2.session_id, sid);

        let session = store.session(sid).unwrap();
        assert_eq!(session.participants.white, cid(1));
        assert_eq!(session.participants.black, cid(2));
        assert!(session.phase.is_active());
        assert_eq!(session.board, CountBoard { moves: 0 });
    }

    #[test]
    fn test_create_rejects_seated_handle() {
        let (mut store, _) = store_with_session();
        let result = store.create(cid(2), cid(3));
        assert!(matches!(
            result,
            Err(SessionError::AlreadySeated(c)) if c == cid(2)
        ));
        // Nothing half-created.
        assert_eq!(store.session_count(), 1);
        assert!(store.seat(cid(3)).is_none());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let mut store = SessionStore::<Countdown>::new();
        let a = store.create(cid(1), cid(2)).unwrap();
        let b = store.create(cid(3), cid(4)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_of_resolves_through_seat() {
        let (store, sid) = store_with_session();
        assert_eq!(store.session_of(cid(2)).unwrap().session_id, sid);
        assert!(store.session_of(cid(9)).is_none());
    }

    #[test]
    fn test_replay_unseated_is_ignored() {
        let (mut store, _) = store_with_session();
        assert_eq!(store.request_replay(cid(9)), ReplayOutcome::Ignored);
    }

    #[test]
    fn test_replay_single_request_is_pending() {
        let (mut store, _) = store_with_session();
        assert_eq!(store.request_replay(cid(1)), ReplayOutcome::Pending);
    }

    #[test]
    fn test_replay_same_handle_twice_never_restarts() {
        let (mut store, _) = store_with_session();
        assert_eq!(store.request_replay(cid(1)), ReplayOutcome::Pending);
        assert_eq!(store.request_replay(cid(1)), ReplayOutcome::Pending);
    }

    #[test]
    fn test_replay_both_handles_restart() {
        let (mut store, sid) = store_with_session();

        // Play a move and finish the game first.
        {
            let session = store.session_mut(sid).unwrap();
            session.board.moves = 3;
            session.phase = SessionPhase::Over;
        }

        assert_eq!(store.request_replay(cid(1)), ReplayOutcome::Pending);
        assert_eq!(store.request_replay(cid(2)), ReplayOutcome::Restarted);

        let session = store.session(sid).unwrap();
        assert_eq!(session.board, CountBoard { moves: 0 });
        assert!(session.phase.is_active());
    }

    #[test]
    fn test_replay_handshake_resets_after_restart() {
        let (mut store, _) = store_with_session();
        store.request_replay(cid(1));
        store.request_replay(cid(2));

        // Fresh handshake: one request is pending again, not restarting.
        assert_eq!(store.request_replay(cid(1)), ReplayOutcome::Pending);
    }

    #[test]
    fn test_destroy_clears_seats_and_replay_set() {
        let (mut store, sid) = store_with_session();
        store.request_replay(cid(1));

        let session = store.destroy(sid).unwrap();
        assert_eq!(session.participants.pair(), [cid(1), cid(2)]);

        assert_eq!(store.session_count(), 0);
        assert!(store.seat(cid(1)).is_none());
        assert!(store.seat(cid(2)).is_none());
        // The pending request died with the session.
        assert_eq!(store.request_replay(cid(1)), ReplayOutcome::Ignored);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (mut store, sid) = store_with_session();
        assert!(store.destroy(sid).is_some());
        assert!(store.destroy(sid).is_none());
    }
}
