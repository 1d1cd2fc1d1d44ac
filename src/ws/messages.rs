//! Wire protocol: control commands and server events.
//!
//! Frames are JSON text, adjacently tagged as
//! `{"event": "<name>", "data": {...}}` with kebab-case event names and
//! camelCase payload fields — the shape the JavaScript dashboards already
//! speak. Both directions are closed unions: an unknown event name fails
//! deserialization instead of leaking through as an untyped object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AgentId, ParcelId, ParcelSnapshot, ParcelStatus, UserId};

/// Client → server control events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    /// Join `user:<userId>` (customer private channel).
    JoinUser {
        /// Customer to subscribe as.
        user_id: UserId,
    },
    /// Join `agent:<agentId>` (agent private channel).
    JoinAgent {
        /// Agent to subscribe as.
        agent_id: AgentId,
    },
    /// Join `parcel:<parcelId>` for the duration of a tracking view.
    JoinParcel {
        /// Parcel being tracked.
        parcel_id: ParcelId,
    },
    /// Leave `parcel:<parcelId>` when the tracking view closes.
    LeaveParcel {
        /// Parcel no longer tracked.
        parcel_id: ParcelId,
    },
    /// Client-originated live location ping, relayed by the server.
    AgentLocationUpdate(LocationPing),
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// New booking (customer private channel).
    ParcelUpdate(ParcelSnapshot),
    /// Status transition (parcel room + customer + agent + broadcast).
    ParcelStatusUpdated(StatusChange),
    /// Broadcast feed for admin dashboards.
    AdminParcelUpdate(AdminNotice),
    /// Assignment notice (agent private channel only).
    ParcelAssigned(AssignmentNotice),
    /// Parcel-room-scoped location push.
    LocationUpdate(LocationPing),
    /// Relay of an agent's ping to its other devices.
    AgentLocationUpdate(LocationPing),
}

impl ServerEvent {
    /// Returns the wire event name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ParcelUpdate(_) => "parcel-update",
            Self::ParcelStatusUpdated(_) => "parcel-status-updated",
            Self::AdminParcelUpdate(_) => "admin-parcel-update",
            Self::ParcelAssigned(_) => "parcel-assigned",
            Self::LocationUpdate(_) => "location-update",
            Self::AgentLocationUpdate(_) => "agent-location-update",
        }
    }
}

/// One status transition as pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Subject parcel.
    pub parcel_id: ParcelId,
    /// Status after the transition.
    pub status: ParcelStatus,
    /// Optional operator note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
}

/// Assignment notice pushed to the assigned agent's channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentNotice {
    /// Subject parcel.
    pub parcel_id: ParcelId,
    /// Agent the parcel was assigned to.
    pub agent_id: AgentId,
    /// Snapshot of the parcel handed over.
    pub parcel: ParcelSnapshot,
    /// When the assignment happened.
    pub timestamp: DateTime<Utc>,
}

/// A live location sample, both as received from agents and as relayed.
///
/// Coordinates stay raw `f64` on the wire; range validation happens when
/// the relay builds a [`crate::domain::Envelope`] from the ping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPing {
    /// Reporting agent.
    pub agent_id: AgentId,
    /// Parcel the ping is tied to, absent for pure agent pings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcel_id: Option<ParcelId>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Client-side sample time.
    pub timestamp: DateTime<Utc>,
}

/// Payload of the admin broadcast feed, tagged by the originating kind.
///
/// Admin dashboards consume one firehose instead of per-admin rooms; the
/// `origin` tag tells them whether a row is a fresh booking or a status
/// move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "origin",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum AdminNotice {
    /// A customer booked a new parcel.
    ParcelBooked {
        /// Snapshot of the new parcel.
        parcel: ParcelSnapshot,
        /// When the booking happened.
        timestamp: DateTime<Utc>,
    },
    /// A parcel changed status.
    StatusUpdated {
        /// Subject parcel.
        parcel_id: ParcelId,
        /// Status after the transition.
        status: ParcelStatus,
        /// When the transition happened.
        timestamp: DateTime<Utc>,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn join_user_parses_wire_shape() {
        let frame = r#"{"event":"join-user","data":{"userId":"u-1"}}"#;
        let parsed: Result<ClientCommand, _> = serde_json::from_str(frame);
        assert_eq!(
            parsed.ok(),
            Some(ClientCommand::JoinUser {
                user_id: UserId::new("u-1")
            })
        );
    }

    #[test]
    fn location_ping_parses_wire_shape() {
        let frame = r#"{
            "event": "agent-location-update",
            "data": {
                "agentId": "a-1",
                "parcelId": "p-9",
                "latitude": 23.81,
                "longitude": 90.41,
                "timestamp": "2026-08-01T10:00:00Z"
            }
        }"#;
        let Ok(ClientCommand::AgentLocationUpdate(ping)) = serde_json::from_str(frame) else {
            panic!("expected a location ping");
        };
        assert_eq!(ping.agent_id, AgentId::new("a-1"));
        assert_eq!(ping.parcel_id, Some(ParcelId::new("p-9")));
        assert_eq!(ping.latitude, 23.81);
    }

    #[test]
    fn ping_without_parcel_parses() {
        let frame = r#"{
            "event": "agent-location-update",
            "data": {
                "agentId": "a-1",
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": "2026-08-01T10:00:00Z"
            }
        }"#;
        let Ok(ClientCommand::AgentLocationUpdate(ping)) = serde_json::from_str(frame) else {
            panic!("expected a location ping");
        };
        assert_eq!(ping.parcel_id, None);
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let frame = r#"{"event":"join-admin","data":{}}"#;
        let parsed: Result<ClientCommand, _> = serde_json::from_str(frame);
        assert!(parsed.is_err());
    }

    #[test]
    fn server_event_names_match_wire_tags() {
        let change = StatusChange {
            parcel_id: ParcelId::new("p-1"),
            status: ParcelStatus::InTransit,
            note: None,
            timestamp: Utc::now(),
        };
        let event = ServerEvent::ParcelStatusUpdated(change);
        assert_eq!(event.event_name(), "parcel-status-updated");
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event\":\"parcel-status-updated\""));
        assert!(json.contains("\"parcelId\":\"p-1\""));
    }

    #[test]
    fn admin_notice_is_origin_tagged() {
        let notice = AdminNotice::StatusUpdated {
            parcel_id: ParcelId::new("p-2"),
            status: ParcelStatus::Delivered,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&ServerEvent::AdminParcelUpdate(notice))
            .unwrap_or_default();
        assert!(json.contains("\"event\":\"admin-parcel-update\""));
        assert!(json.contains("\"origin\":\"status-updated\""));
    }
}
