//! # Matchpoint
//!
//! A server that pairs anonymous clients into two-party turn-based game
//! sessions and relays rules-validated moves between them.
//!
//! Game developers implement a single [`RulesEngine`] trait; the server
//! handles matchmaking (strict FIFO), session lifecycle, the replay
//! handshake, and disconnect recovery. All mutable state lives behind
//! one serialized event loop — see [`Orchestrator`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matchpoint::prelude::*;
//!
//! // Implement RulesEngine for your game, then:
//! // let server = ServerBuilder::new()
//! //     .bind("0.0.0.0:8080")
//! //     .build::<MyRules>()
//! //     .await?;
//! // server.run().await
//! ```

mod error;
mod handler;
mod orchestrator;
mod registry;
mod server;

pub use error::MatchpointError;
pub use orchestrator::{Event, Orchestrator};
pub use registry::{ChannelRegistry, OutboundSender};
pub use server::{Server, ServerBuilder};

/// The commonly needed imports for building a game server.
pub mod prelude {
    pub use crate::{
        Event, MatchpointError, Orchestrator, Server, ServerBuilder,
    };
    pub use matchpoint_protocol::{
        ClientMessage, Codec, Color, ConnId, JsonCodec, MoveRequest,
        ServerMessage, SessionId,
    };
    pub use matchpoint_session::{
        GameSession, Participants, ReplayOutcome, RulesEngine, Seat,
        SessionPhase, SessionStore,
    };
}
