//! Per-connection WebSocket state machine.
//!
//! Each upgraded socket gets one task running [`run_connection`]: it
//! registers the connection, then multiplexes the outbound event queue,
//! inbound control frames, and the keep-alive timer until the peer goes
//! away. Slow peers only ever stall their own queue drain — the router
//! pushes into the unbounded sink without awaiting this task.

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::messages::ClientCommand;
use crate::app_state::AppState;
use crate::domain::{ConnectionId, Envelope, RoomKey};
use crate::error::RealtimeError;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Drains the registry-owned outbound queue onto the socket.
/// - Dispatches incoming control frames to the registry/router.
/// - Pings on the heartbeat interval and drops the connection once the
///   idle timeout elapses without any inbound frame.
///
/// The connection is unregistered exactly once, whatever path ends the
/// loop; membership cleanup cascades from there.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let conn_id = ConnectionId::new();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    state.registry.register(conn_id, out_tx).await;
    tracing::debug!(%conn_id, "ws connection established");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut heartbeat = tokio::time::interval(state.heartbeat.interval);
    let mut last_inbound = Instant::now();

    loop {
        tokio::select! {
            // Event queued by the router for this connection
            queued = out_rx.recv() => {
                let Some(event) = queued else { break };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::error!(%conn_id, %error, "failed to serialize outbound event");
                    }
                }
            }

            // Frame from the client
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        last_inbound = Instant::now();
                        state.registry.touch(conn_id).await;
                        handle_text_frame(text.as_str(), conn_id, &state).await;
                    }
                    Some(Ok(Message::Pong(_) | Message::Ping(_))) => {
                        last_inbound = Instant::now();
                        state.registry.touch(conn_id).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(error)) => {
                        tracing::debug!(
                            %conn_id,
                            error = %RealtimeError::Transport(error.to_string()),
                            "ws read failed"
                        );
                        break;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        // Binary frames are not part of the protocol.
                        last_inbound = Instant::now();
                    }
                }
            }

            // Keep-alive: ping, and reap the connection once idle
            _ = heartbeat.tick() => {
                if last_inbound.elapsed() >= state.heartbeat.idle_timeout {
                    tracing::info!(%conn_id, "idle timeout, dropping connection");
                    break;
                }
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.registry.unregister(conn_id).await;
    tracing::debug!(%conn_id, "ws connection closed");
}

/// Parses and dispatches one inbound control frame.
///
/// Malformed frames are logged and dropped — the server event set is
/// closed, so no error frame is synthesized in reply.
async fn handle_text_frame(text: &str, conn_id: ConnectionId, state: &AppState) {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(error) => {
            tracing::warn!(%conn_id, %error, "ignoring malformed control frame");
            return;
        }
    };

    match command {
        ClientCommand::JoinUser { user_id } => {
            join(state, conn_id, RoomKey::User(user_id)).await;
        }
        ClientCommand::JoinAgent { agent_id } => {
            join(state, conn_id, RoomKey::Agent(agent_id)).await;
        }
        ClientCommand::JoinParcel { parcel_id } => {
            join(state, conn_id, RoomKey::Parcel(parcel_id)).await;
        }
        ClientCommand::LeaveParcel { parcel_id } => {
            if let Err(error) = state
                .registry
                .leave(conn_id, &RoomKey::Parcel(parcel_id))
                .await
            {
                tracing::debug!(%conn_id, %error, "leave raced disconnect");
            }
        }
        ClientCommand::AgentLocationUpdate(ping) => {
            match Envelope::location_updated(
                ping.agent_id,
                ping.parcel_id,
                ping.latitude,
                ping.longitude,
                Some(ping.timestamp),
            ) {
                Ok(envelope) => {
                    state.router.emit(envelope).await;
                }
                Err(error) => {
                    tracing::warn!(%conn_id, %error, "rejected location ping");
                }
            }
        }
    }
}

/// Joins a room, swallowing the disconnect race.
async fn join(state: &AppState, conn_id: ConnectionId, room: RoomKey) {
    tracing::debug!(%conn_id, room = %room, "join");
    if let Err(error) = state.registry.join(conn_id, room).await {
        tracing::debug!(%conn_id, %error, "join raced disconnect");
    }
}
