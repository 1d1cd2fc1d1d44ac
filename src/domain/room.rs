//! Typed room keys for broadcast groups.
//!
//! A room is identified by its kind plus a subject id. Keys compare
//! structurally — two joins for `parcel:<id>` built at different call
//! sites resolve to the same logical room, which rules out the key-format
//! drift that string-concatenated room names invite.

use std::fmt;

use serde::Serialize;

use super::{AgentId, ParcelId, UserId};

/// Key of one logical broadcast group.
///
/// Three kinds exist: a customer's private channel, an agent's private
/// channel (an agent may hold several simultaneous connections), and an
/// ephemeral per-parcel tracking channel. The admin feed is deliberately
/// *not* a room kind — broadcasting to every connection is a router
/// transmission policy, never a joinable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum RoomKey {
    /// One customer's private channel.
    User(UserId),
    /// One agent's private channel.
    Agent(AgentId),
    /// Per-tracking-session channel for one parcel.
    Parcel(ParcelId),
}

impl RoomKey {
    /// Builds the private room key for a customer.
    #[must_use]
    pub fn user(id: impl Into<UserId>) -> Self {
        Self::User(id.into())
    }

    /// Builds the private room key for an agent.
    #[must_use]
    pub fn agent(id: impl Into<AgentId>) -> Self {
        Self::Agent(id.into())
    }

    /// Builds the tracking room key for a parcel.
    #[must_use]
    pub fn parcel(id: impl Into<ParcelId>) -> Self {
        Self::Parcel(id.into())
    }

    /// Returns the room kind discriminant.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Agent(_) => "agent",
            Self::Parcel(_) => "parcel",
        }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Agent(id) => write!(f, "agent:{id}"),
            Self::Parcel(id) => write!(f, "parcel:{id}"),
        }
    }
}

impl From<RoomKey> for String {
    fn from(key: RoomKey) -> Self {
        key.to_string()
    }
}
