//! Per-connection handler: frame decoding and event forwarding.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler plus a small drain task for outbound messages. The handler
//! holds no game state — it decodes frames into [`Event`]s and forwards
//! them to the orchestrator, which is the only place state lives.
//!
//! The flow is:
//!   1. Register the connection (send `Event::Connected` with the
//!      outbound channel)
//!   2. Spawn the drain task: outbound channel → socket
//!   3. Loop: receive frames → decode `ClientMessage` → send events
//!   4. On close/error, the drop guard fires `Event::Disconnected`

use matchpoint_protocol::{ClientMessage, Codec, ConnId, ServerMessage};
use matchpoint_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::orchestrator::Event;
use crate::MatchpointError;

/// Drop guard that reports the disconnect when the handler exits.
///
/// This ensures teardown happens on every exit path, including panics.
/// The event channel is unbounded, so the send is synchronous and safe
/// from `Drop`.
struct DisconnectGuard {
    conn: ConnId,
    events: mpsc::UnboundedSender<Event>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let _ = self.events.send(Event::Disconnected { conn: self.conn });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    events: mpsc::UnboundedSender<Event>,
    codec: C,
) -> Result<(), MatchpointError>
where
    C: Codec + Clone,
{
    let conn_id = conn.id();
    tracing::debug!(conn = %conn_id, "handling new connection");

    // --- Step 1: register with the orchestrator ---
    let (outbound_tx, mut outbound_rx) =
        mpsc::unbounded_channel::<ServerMessage>();
    events
        .send(Event::Connected {
            conn: conn_id,
            outbound: outbound_tx,
        })
        .map_err(|_| MatchpointError::OrchestratorGone)?;

    // Guard is active from this point: whatever happens below, the
    // orchestrator hears exactly one Disconnected for this handle.
    let _guard = DisconnectGuard {
        conn: conn_id,
        events: events.clone(),
    };

    // --- Step 2: outbound drain task ---
    // Runs until the registry drops the sender (deregistration) and the
    // queue empties, or the socket dies. Send and recv lock
    // independently, so this never contends with the read loop below.
    let drain_conn = conn.clone();
    let drain_codec = codec.clone();
    tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let bytes = match drain_codec.encode(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(conn = %conn_id, error = %e, "failed to encode outbound message");
                    continue;
                }
            };
            if let Err(e) = drain_conn.send(&bytes).await {
                tracing::debug!(conn = %conn_id, error = %e, "outbound send failed, stopping drain");
                break;
            }
        }
    });

    // --- Step 3: read loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(conn = %conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(conn = %conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                // Malformed input is the client's problem, not ours —
                // skip the frame and keep the connection.
                tracing::debug!(conn = %conn_id, error = %e, "failed to decode frame");
                continue;
            }
        };

        let event = match msg {
            ClientMessage::Join => Event::Join { conn: conn_id },
            ClientMessage::Move(mv) => Event::Move { conn: conn_id, mv },
            ClientMessage::Replay => Event::Replay { conn: conn_id },
            ClientMessage::Quit => Event::Quit { conn: conn_id },
        };

        if events.send(event).is_err() {
            // Orchestrator is gone; nothing left to serve.
            break;
        }
    }

    // _guard drops here → Disconnected fires → the registry drops our
    // outbound sender → the drain task winds down on its own.
    Ok(())
}
