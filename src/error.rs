//! Error taxonomy of the realtime core.
//!
//! [`RealtimeError`] is the central error type. Only `Validation` ever
//! reaches a collaborator (at envelope construction, before the router is
//! involved); the remaining variants are logged where they occur and
//! swallowed — emit is fire-and-forget, and a realtime delivery failure
//! must never surface to the caller whose state mutation already
//! succeeded.

use crate::domain::ConnectionId;

/// Errors raised inside the realtime core.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// An envelope failed construction-time validation (missing required
    /// identifier, out-of-range coordinates). The emitting collaborator
    /// must not retry with the same data.
    #[error("invalid envelope: {0}")]
    Validation(String),

    /// A join/leave/send referenced a connection id that is no longer
    /// tracked — a benign race between a disconnect and a queued
    /// operation. Logged and swallowed, never surfaced to other clients.
    #[error("connection {0} is not registered")]
    UnregisteredConnection(ConnectionId),

    /// A push to one member connection failed (its outbound queue is
    /// gone). Fan-out to the remaining members continues; there is no
    /// retry and no dead-letter queue.
    #[error("delivery to connection {0} failed")]
    Delivery(ConnectionId),

    /// Transport-level connection failure. Client side this collapses
    /// into the boolean connectivity flag; server side it ends the
    /// affected connection's read loop.
    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_connection_id() {
        let id = ConnectionId::new();
        let err = RealtimeError::UnregisteredConnection(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn validation_carries_reason() {
        let err = RealtimeError::Validation("latitude 95 out of range".to_string());
        assert!(err.to_string().contains("latitude 95"));
    }
}
