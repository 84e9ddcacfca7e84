//! Wire protocol for Matchpoint.
//!
//! This crate defines the "language" clients and the pairing server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`MoveRequest`],
//!   [`Color`], the [`ConnId`]/[`SessionId`] newtypes) — the structures
//!   that travel on the wire and the identities shared by every layer.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! The protocol layer sits between transport (raw frames) and the
//! orchestrator (game lifecycle). It knows nothing about queues, sessions,
//! or rules — only message shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Color, ConnId, MoveRequest, ServerMessage, SessionId,
};
