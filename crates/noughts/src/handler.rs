//! Per-connection handler: greeting, inbound intents, outbound delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbox with the hub and send `Welcome`
//!   2. Loop: either deliver a queued outbound message, or decode the next
//!      inbound envelope and dispatch it
//!   3. Any inbound frame, keepalive pings included, resets the idle timer
//!   4. On exit (close, error, idle timeout) the drop guard removes the
//!      player from its room

use std::sync::Arc;
use std::time::Instant;

use noughts_protocol::{
    ClientEnvelope, Codec, Envelope, PROTOCOL_VERSION, PlayerId, RejectReason, ServerEnvelope,
    ServerMessage,
};
use noughts_transport::{Connection, Frame, WebSocketConnection};
use tokio::sync::mpsc;

use crate::NoughtsError;
use crate::dispatch::Dispatcher;
use crate::server::ServerState;

/// Drop guard that removes a player from the hub and its room when the
/// handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async locks.
struct ConnectionGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut rooms = state.rooms.lock().await;
            let mut hub = state.hub.lock().await;
            Dispatcher {
                rooms: &mut rooms,
                hub: &mut hub,
                player: player_id,
            }
            .disconnect();
            tracing::debug!(%player_id, "connection cleaned up");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), NoughtsError> {
    let conn_id = conn.id();
    let player_id = PlayerId::from(conn_id);
    tracing::info!(%conn_id, %player_id, "connection opened");

    let (outbox, mut inbox) = mpsc::unbounded_channel();
    state.hub.lock().await.register(player_id, outbox);
    let _guard = ConnectionGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let mut seq: u64 = 1;
    let start = Instant::now();

    send(
        &conn,
        &state.codec,
        ServerMessage::Welcome {
            player_id,
            version: PROTOCOL_VERSION,
        },
        &mut seq,
        &start,
    )
    .await?;

    let idle = tokio::time::sleep(state.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            outbound = inbox.recv() => {
                // The hub holds our sender until the guard runs, so `None`
                // only happens if something unregistered us early.
                let Some(message) = outbound else { break };
                send(&conn, &state.codec, message, &mut seq, &start).await?;
            }
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(Frame::Data(data))) => data,
                    Ok(Some(Frame::Keepalive)) => {
                        idle.as_mut().reset(tokio::time::Instant::now() + state.idle_timeout);
                        continue;
                    }
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                idle.as_mut().reset(tokio::time::Instant::now() + state.idle_timeout);

                let envelope: ClientEnvelope = match state.codec.decode(&data) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "failed to decode envelope");
                        let message = ServerMessage::Rejected {
                            reason: RejectReason::BadRequest,
                            message: e.to_string(),
                        };
                        send(&conn, &state.codec, message, &mut seq, &start).await?;
                        continue;
                    }
                };

                let server_time = start.elapsed().as_millis() as u64;
                let mut rooms = state.rooms.lock().await;
                let mut hub = state.hub.lock().await;
                Dispatcher {
                    rooms: &mut rooms,
                    hub: &mut hub,
                    player: player_id,
                }
                .handle(envelope.message, server_time);
            }
            () = &mut idle => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }
        }
    }

    // _guard drops here → room leave fires.
    let _ = conn.close().await;
    Ok(())
}

/// Wraps a message in an envelope and writes it to the connection.
async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    message: ServerMessage,
    seq: &mut u64,
    start: &Instant,
) -> Result<(), NoughtsError> {
    let envelope: ServerEnvelope = Envelope {
        seq: next_seq(seq),
        timestamp: start.elapsed().as_millis() as u64,
        message,
    };
    let bytes = codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
