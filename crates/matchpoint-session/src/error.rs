//! Error types for the session layer.

use matchpoint_protocol::{ConnId, SessionId};

/// Errors that can occur during session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection already holds a seat in a session.
    #[error("connection {0} is already seated in a session")]
    AlreadySeated(ConnId),

    /// The session does not exist (already torn down).
    #[error("session {0} not found")]
    NotFound(SessionId),
}
