//! Game session state for Matchpoint.
//!
//! This crate owns everything between "two clients were paired" and
//! "the session was torn down":
//!
//! - [`RulesEngine`] — the trait a game implements; the orchestrator
//!   trusts its legality and terminal verdicts completely
//! - [`GameSession`] / [`Participants`] / [`SessionPhase`] — one paired
//!   match, its two fixed seats, and its Active/Over lifecycle
//! - [`Seat`] — a connection's weak back-reference to its session
//! - [`SessionStore`] — the single owner of all sessions, seats, and
//!   pending replay handshakes
//!
//! # How it fits in the stack
//!
//! ```text
//! Orchestrator (above)  ← pairs, relays, tears down; owns the store
//!     ↕
//! Session Layer (this crate)  ← sessions, seats, replay handshakes
//!     ↕
//! Protocol Layer (below)  ← ConnId, SessionId, Color, MoveRequest
//! ```

mod error;
mod rules;
mod session;
mod store;

pub use error::SessionError;
pub use rules::RulesEngine;
pub use session::{GameSession, Participants, Seat, SessionPhase};
pub use store::{ReplayOutcome, SessionStore};
