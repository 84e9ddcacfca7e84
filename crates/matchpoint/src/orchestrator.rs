//! The session orchestrator: one serialized event loop that owns all
//! mutable server state.
//!
//! Every connection funnels its events into a single mpsc channel; one
//! task drains it and applies them to the lobby, the session store, and
//! the channel registry in arrival order. Pairing, move application,
//! replay agreement, and teardown each read-then-write that shared
//! state, so serializing the whole event stream is what makes every
//! transition atomic — a quit racing a disconnect resolves in whichever
//! order the events landed, never by corrupting the store.
//!
//! [`Orchestrator::handle`] is deliberately synchronous: outbound sends
//! are fire-and-forget pushes into per-connection unbounded channels, so
//! no event ever blocks on a slow client, and the whole state machine is
//! testable without a socket in sight.

use matchpoint_lobby::Lobby;
use matchpoint_protocol::{Color, ConnId, MoveRequest, ServerMessage};
use matchpoint_session::{
    ReplayOutcome, RulesEngine, Seat, SessionPhase, SessionStore,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::registry::{ChannelRegistry, OutboundSender};

/// One event from a connection's stream.
///
/// `Connected`/`Disconnected` come from the transport lifecycle; the
/// rest are decoded client messages. The per-connection handler does no
/// interpretation beyond decoding — all semantics live here.
#[derive(Debug)]
pub enum Event {
    /// A connection was accepted; its outbound channel is ready.
    Connected {
        conn: ConnId,
        outbound: OutboundSender,
    },

    /// The connection is gone. Invalidates the handle immediately:
    /// any later event carrying it becomes a no-op.
    Disconnected { conn: ConnId },

    /// The client wants a game.
    Join { conn: ConnId },

    /// A move attempt.
    Move { conn: ConnId, mv: MoveRequest },

    /// A rematch request.
    Replay { conn: ConnId },

    /// Voluntary exit from the current session.
    Quit { conn: ConnId },
}

/// The orchestrator: matchmaking, session lifecycle, move relay, replay
/// handshake, and disconnect recovery — all behind one event boundary.
///
/// All state is owned here, passed nowhere, and mutated only inside
/// [`handle`](Orchestrator::handle). There are no process-wide
/// registries; constructing a second orchestrator gives a fully
/// independent server.
pub struct Orchestrator<R: RulesEngine> {
    registry: ChannelRegistry,
    lobby: Lobby,
    store: SessionStore<R>,
}

impl<R: RulesEngine> Orchestrator<R> {
    /// Creates an orchestrator with no connections, an empty lobby, and
    /// no sessions.
    pub fn new() -> Self {
        Self {
            registry: ChannelRegistry::new(),
            lobby: Lobby::new(),
            store: SessionStore::new(),
        }
    }

    /// Applies one event. Never blocks, never panics on stale input.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Connected { conn, outbound } => {
                self.registry.register(conn, outbound);
            }
            Event::Disconnected { conn } => self.on_disconnected(conn),
            Event::Join { conn } => self.on_join(conn),
            Event::Move { conn, mv } => self.on_move(conn, mv),
            Event::Replay { conn } => self.on_replay(conn),
            Event::Quit { conn } => self.on_quit(conn),
        }
    }

    // -- join / pairing ---------------------------------------------------

    fn on_join(&mut self, conn: ConnId) {
        if !self.registry.contains(conn) {
            debug!(%conn, "join from unknown connection, ignoring");
            return;
        }
        self.enqueue_and_pair(conn);
    }

    /// Appends `conn` to the lobby tail, then runs the pairing check.
    ///
    /// Shared by `join` and quit-recovery — pairing runs after *every*
    /// enqueue, so a re-queued opponent pairs immediately with a third
    /// client that was already waiting.
    fn enqueue_and_pair(&mut self, conn: ConnId) {
        if self.store.seat(conn).is_some() {
            debug!(%conn, "already seated, enqueue ignored");
            return;
        }
        if !self.lobby.enqueue(conn) {
            return;
        }
        if let Some((white, black)) = self.lobby.take_pair() {
            self.start_session(white, black);
        }
    }

    /// The only session-creation path: first-dequeued plays white.
    fn start_session(&mut self, white: ConnId, black: ConnId) {
        let session_id = match self.store.create(white, black) {
            Ok(id) => id,
            Err(e) => {
                // Store refused the pair. Affects this pairing only;
                // the orchestrator keeps running.
                error!(error = %e, %white, %black, "session creation failed");
                return;
            }
        };

        let session =
            self.store.session(session_id).expect("just created");
        let state = R::encode(&session.board);

        // `start` goes out individually — each side learns its own color.
        self.registry.send(
            white,
            ServerMessage::Start {
                state: state.clone(),
                color: Color::White,
            },
        );
        self.registry.send(
            black,
            ServerMessage::Start {
                state,
                color: Color::Black,
            },
        );
    }

    // -- moves ------------------------------------------------------------

    fn on_move(&mut self, conn: ConnId, mv: MoveRequest) {
        let Some(seat) = self.store.seat(conn) else {
            debug!(%conn, "move without a seat, ignoring");
            return;
        };
        let Some(session) = self.store.session_mut(seat.session_id) else {
            warn!(%conn, session_id = %seat.session_id, "seat points at missing session");
            return;
        };
        if !session.phase.is_active() {
            debug!(%conn, session_id = %seat.session_id, "move while game over, ignoring");
            return;
        }

        let uci = mv.uci();
        if let Err(reason) = R::apply(&mut session.board, &mv) {
            debug!(%conn, %uci, %reason, "illegal move");
            // Only the requester hears about it; state is unchanged.
            self.registry.send(conn, ServerMessage::Invalid { uci });
            return;
        }

        let state = R::encode(&session.board);
        let room = session.participants.pair();
        let verdict = R::verdict(&session.board);
        if verdict.is_some() {
            session.phase = SessionPhase::Over;
        }

        self.registry
            .send_room(&room, ServerMessage::Move { uci, state });

        if let Some(result) = verdict {
            info!(session_id = %seat.session_id, %result, "game over");
            self.registry
                .send_room(&room, ServerMessage::GameOver { result });
        }
    }

    // -- replay -----------------------------------------------------------

    fn on_replay(&mut self, conn: ConnId) {
        match self.store.request_replay(conn) {
            ReplayOutcome::Ignored => {
                debug!(%conn, "replay without a seat, ignoring");
            }
            ReplayOutcome::Pending => {}
            ReplayOutcome::Restarted => {
                if let Some(session) = self.store.session_of(conn) {
                    let state = R::encode(&session.board);
                    let room = session.participants.pair();
                    self.registry.send_room(
                        &room,
                        ServerMessage::ReplayStart { state },
                    );
                }
            }
        }
    }

    // -- quit / disconnect ------------------------------------------------

    fn on_quit(&mut self, conn: ConnId) {
        let Some(seat) = self.store.seat(conn) else {
            // Also covers quit-after-teardown: the seat died with the
            // session, so the second quit falls through here.
            debug!(%conn, "quit without a seat, ignoring");
            return;
        };
        let Some(session) = self.store.destroy(seat.session_id) else {
            warn!(%conn, session_id = %seat.session_id, "seat points at missing session");
            return;
        };
        let Some(opponent) = session.participants.opponent_of(conn)
        else {
            warn!(%conn, session_id = %seat.session_id, "quitter not among participants");
            return;
        };

        info!(%conn, session_id = %seat.session_id, %opponent, "participant quit");
        self.registry
            .send_room(&session.participants.pair(), ServerMessage::OpponentLeft);

        // The opponent goes back in line for a fresh pairing; the
        // quitter does not (they can join again explicitly).
        self.enqueue_and_pair(opponent);
    }

    fn on_disconnected(&mut self, conn: ConnId) {
        self.registry.deregister(conn);

        if self.lobby.remove(conn) {
            debug!(%conn, "removed from lobby on disconnect");
        }

        let Some(seat) = self.store.seat(conn) else {
            return;
        };
        let Some(session) = self.store.destroy(seat.session_id) else {
            return;
        };

        info!(%conn, session_id = %seat.session_id, "participant disconnected, session torn down");

        // The dead handle is already deregistered, so this reaches only
        // the survivor. Unlike quit, the survivor is NOT re-queued —
        // their seat is cleared and they are free to join again.
        self.registry
            .send_room(&session.participants.pair(), ServerMessage::OpponentLeft);
    }

    // -- introspection (used by tests and admin surfaces) ------------------

    /// Number of connections waiting in the lobby.
    pub fn waiting_count(&self) -> usize {
        self.lobby.len()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.store.session_count()
    }

    /// The seat held by a connection, if any.
    pub fn seat_of(&self, conn: ConnId) -> Option<Seat> {
        self.store.seat(conn)
    }

    /// Returns `true` if the connection's outbound channel is live.
    pub fn is_connected(&self, conn: ConnId) -> bool {
        self.registry.contains(conn)
    }
}

impl<R: RulesEngine> Default for Orchestrator<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the orchestrator task and returns the event sender that every
/// connection handler feeds.
///
/// The task runs until the last sender is dropped (server shutdown).
pub(crate) fn spawn<R: RulesEngine>() -> mpsc::UnboundedSender<Event> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut orchestrator = Orchestrator::<R>::new();
        info!("orchestrator started");
        while let Some(event) = rx.recv().await {
            orchestrator.handle(event);
        }
        info!("orchestrator stopped");
    });

    tx
}
