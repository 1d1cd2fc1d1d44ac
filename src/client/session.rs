//! Client-side subscription state machine.
//!
//! [`RealtimeSession`] is sans-IO: it never touches a socket. The
//! embedding transport (which owns dialing, backoff, and the actual
//! frames) reports lifecycle changes in, and the session answers with
//! the [`ClientCommand`]s to transmit. That keeps the join/leave logic
//! — the part that must be exactly right across reconnects — fully
//! testable without a network.

use crate::domain::{AgentId, ParcelId, UserId};
use crate::ws::messages::ClientCommand;

/// Authenticated identity driving room membership.
///
/// Supplied by the session/token layer; the realtime core trusts it
/// without re-verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    /// A customer; joins their `user:<id>` private channel.
    Customer(UserId),
    /// A delivery agent; joins their `agent:<id>` private channel.
    Agent(AgentId),
    /// An admin; holds no private room — the broadcast feed reaches
    /// every connection.
    Admin,
}

impl ClientIdentity {
    /// Returns the join command for this identity's private room, if it
    /// has one.
    fn private_join(&self) -> Option<ClientCommand> {
        match self {
            Self::Customer(user_id) => Some(ClientCommand::JoinUser {
                user_id: user_id.clone(),
            }),
            Self::Agent(agent_id) => Some(ClientCommand::JoinAgent {
                agent_id: agent_id.clone(),
            }),
            Self::Admin => None,
        }
    }
}

/// Transport lifecycle phase of one client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No transport; the initial state, and the state after loss/logout.
    Disconnected,
    /// The transport is dialing.
    Connecting,
    /// Handshake succeeded; room joins have been issued.
    Connected,
}

/// Per-client subscription manager.
///
/// Tracks the desired memberships (the identity's private room plus an
/// optionally watched parcel room) separately from the transport phase.
/// Because the server assigns a fresh connection id on every physical
/// connect, nothing survives server-side across a reconnect — so every
/// successful handshake re-issues the full join set.
#[derive(Debug)]
pub struct RealtimeSession {
    identity: ClientIdentity,
    phase: SessionPhase,
    watched_parcel: Option<ParcelId>,
}

impl RealtimeSession {
    /// Creates a session for an authenticated identity, initially
    /// disconnected.
    #[must_use]
    pub fn new(identity: ClientIdentity) -> Self {
        Self {
            identity,
            phase: SessionPhase::Disconnected,
            watched_parcel: None,
        }
    }

    /// The transport started dialing.
    pub fn begin_connect(&mut self) {
        self.phase = SessionPhase::Connecting;
    }

    /// The transport handshake succeeded. Returns every join to
    /// transmit: the identity's private room plus the watched parcel
    /// room, if any.
    pub fn handshake_complete(&mut self) -> Vec<ClientCommand> {
        self.phase = SessionPhase::Connected;
        let mut joins = Vec::new();
        if let Some(join) = self.identity.private_join() {
            joins.push(join);
        }
        if let Some(parcel_id) = &self.watched_parcel {
            joins.push(ClientCommand::JoinParcel {
                parcel_id: parcel_id.clone(),
            });
        }
        joins
    }

    /// The transport dropped (network loss or logout). Desired
    /// memberships are retained for the next handshake.
    pub fn connection_lost(&mut self) {
        self.phase = SessionPhase::Disconnected;
    }

    /// Starts viewing one parcel's tracking context. Returns the
    /// commands to transmit now: leaving a previously watched parcel
    /// first, then joining the new room — nothing while disconnected
    /// (the desire is recorded and restored by the next handshake).
    pub fn watch_parcel(&mut self, parcel_id: ParcelId) -> Vec<ClientCommand> {
        let previous = self.watched_parcel.replace(parcel_id.clone());
        if self.phase != SessionPhase::Connected {
            return Vec::new();
        }
        let mut commands = Vec::new();
        if let Some(previous) = previous
            && previous != parcel_id
        {
            commands.push(ClientCommand::LeaveParcel {
                parcel_id: previous,
            });
        }
        commands.push(ClientCommand::JoinParcel { parcel_id });
        commands
    }

    /// Stops viewing the tracking context. Returns the leave to
    /// transmit, when connected and actually watching.
    pub fn unwatch_parcel(&mut self) -> Option<ClientCommand> {
        let parcel_id = self.watched_parcel.take()?;
        if self.phase != SessionPhase::Connected {
            return None;
        }
        Some(ClientCommand::LeaveParcel { parcel_id })
    }

    /// Connectivity flag for presence indicators.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase == SessionPhase::Connected
    }

    /// Returns `true` while connected and inside a tracking context.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.is_connected() && self.watched_parcel.is_some()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The parcel room this session wants to be in, if any.
    #[must_use]
    pub fn watched_parcel(&self) -> Option<&ParcelId> {
        self.watched_parcel.as_ref()
    }

    /// The identity the session was built for.
    #[must_use]
    pub const fn identity(&self) -> &ClientIdentity {
        &self.identity
    }
}
