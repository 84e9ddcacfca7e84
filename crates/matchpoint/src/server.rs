//! `Server` builder and accept loop.
//!
//! This is the entry point for running a Matchpoint server. It ties the
//! layers together: transport → protocol → orchestrator.

use matchpoint_protocol::{Codec, JsonCodec};
use matchpoint_session::RulesEngine;
use matchpoint_transport::{Transport, WebSocketTransport};
use tokio::sync::mpsc;

use crate::handler::handle_connection;
use crate::orchestrator::{self, Event};
use crate::MatchpointError;

/// Builder for configuring and starting a Matchpoint server.
///
/// # Example
///
/// ```rust,ignore
/// use matchpoint::prelude::*;
///
/// let server = ServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build::<MyRules>()
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the transport, spawns the orchestrator task for the given
    /// rules engine, and returns the server ready to run.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` as the wire stack.
    pub async fn build<R: RulesEngine>(
        self,
    ) -> Result<Server<JsonCodec>, MatchpointError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let events = orchestrator::spawn::<R>();

        Ok(Server {
            transport,
            events,
            codec: JsonCodec,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Matchpoint server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server<C: Codec + Clone> {
    transport: WebSocketTransport,
    events: mpsc::UnboundedSender<Event>,
    codec: C,
}

impl<C: Codec + Clone> Server<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), MatchpointError> {
        tracing::info!("Matchpoint server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let events = self.events.clone();
                    let codec = self.codec.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, events, codec).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
