//! Unified error type for the Matchpoint server.

use matchpoint_protocol::ProtocolError;
use matchpoint_session::SessionError;
use matchpoint_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `matchpoint` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate. The
/// `#[from]` attributes auto-generate `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MatchpointError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (seating conflicts, missing sessions).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The orchestrator task stopped; no more events can be delivered.
    #[error("orchestrator task stopped")]
    OrchestratorGone,
}
