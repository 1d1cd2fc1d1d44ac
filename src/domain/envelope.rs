//! Event envelopes describing parcel lifecycle transitions.
//!
//! An [`Envelope`] is constructed by whichever collaborator performed the
//! underlying mutation, validated here (fail fast, before it can reach
//! the router), and consumed exactly once by
//! [`crate::relay::RoomRouter::emit`]. The router never stores envelopes:
//! delivery is fire-and-forget with no replay log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AgentId, GeoPoint, ParcelId, ParcelSnapshot, ParcelStatus, UserId};
use crate::error::RealtimeError;

/// One immutable record of a parcel/agent state transition.
///
/// A closed union over the four event kinds; each variant carries exactly
/// the identifiers the routing table needs plus its kind-specific
/// payload. There is no mutating API — once built, an envelope's fields
/// (timestamp included) are fixed for its lifetime.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Envelope {
    /// A customer booked a new parcel.
    ParcelBooked {
        /// Snapshot of the freshly created parcel.
        parcel: ParcelSnapshot,
        /// Booking customer, targeted on their private channel.
        customer_id: Option<UserId>,
        /// Event creation time.
        timestamp: DateTime<Utc>,
    },

    /// A parcel moved to a new lifecycle status.
    StatusUpdated {
        /// Subject parcel (always present for this kind).
        parcel_id: ParcelId,
        /// The status after the transition.
        status: ParcelStatus,
        /// Optional operator note attached to the transition.
        note: Option<String>,
        /// Owning customer, when known.
        customer_id: Option<UserId>,
        /// Assigned agent, when one exists.
        agent_id: Option<AgentId>,
        /// Event creation time.
        timestamp: DateTime<Utc>,
    },

    /// A parcel was assigned to a delivery agent.
    AgentAssigned {
        /// Subject parcel (always present for this kind).
        parcel_id: ParcelId,
        /// The agent receiving the assignment.
        agent_id: AgentId,
        /// Snapshot of the parcel handed to the agent.
        parcel: ParcelSnapshot,
        /// Event creation time.
        timestamp: DateTime<Utc>,
    },

    /// An agent reported its live position.
    LocationUpdated {
        /// Reporting agent.
        agent_id: AgentId,
        /// Parcel the ping is tied to, absent for pure agent pings.
        parcel_id: Option<ParcelId>,
        /// Validated coordinates.
        position: GeoPoint,
        /// When the position was sampled.
        timestamp: DateTime<Utc>,
    },
}

impl Envelope {
    /// Builds a `parcel-booked` envelope. Infallible: the snapshot
    /// already carries a store-assigned id.
    #[must_use]
    pub fn parcel_booked(parcel: ParcelSnapshot, customer_id: Option<UserId>) -> Self {
        Self::ParcelBooked {
            parcel,
            customer_id,
            timestamp: Utc::now(),
        }
    }

    /// Builds a `status-updated` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Validation`] if `parcel_id` is empty.
    pub fn status_updated(
        parcel_id: ParcelId,
        status: ParcelStatus,
        note: Option<String>,
        customer_id: Option<UserId>,
        agent_id: Option<AgentId>,
    ) -> Result<Self, RealtimeError> {
        require_parcel_id("status-updated", &parcel_id)?;
        Ok(Self::StatusUpdated {
            parcel_id,
            status,
            note,
            customer_id,
            agent_id,
            timestamp: Utc::now(),
        })
    }

    /// Builds an `agent-assigned` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Validation`] if `parcel_id` is empty.
    pub fn agent_assigned(
        parcel_id: ParcelId,
        agent_id: AgentId,
        parcel: ParcelSnapshot,
    ) -> Result<Self, RealtimeError> {
        require_parcel_id("agent-assigned", &parcel_id)?;
        Ok(Self::AgentAssigned {
            parcel_id,
            agent_id,
            parcel,
            timestamp: Utc::now(),
        })
    }

    /// Builds a `location-updated` envelope from raw coordinates.
    ///
    /// `timestamp` is the client's sample time when supplied; it defaults
    /// to construction time otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Validation`] for out-of-range
    /// coordinates (never clamped).
    pub fn location_updated(
        agent_id: AgentId,
        parcel_id: Option<ParcelId>,
        latitude: f64,
        longitude: f64,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Self, RealtimeError> {
        let position = GeoPoint::new(latitude, longitude)?;
        Ok(Self::LocationUpdated {
            agent_id,
            parcel_id,
            position,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        })
    }

    /// Returns the event kind as its wire discriminant.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::ParcelBooked { .. } => "parcel-booked",
            Self::StatusUpdated { .. } => "status-updated",
            Self::AgentAssigned { .. } => "agent-assigned",
            Self::LocationUpdated { .. } => "location-updated",
        }
    }

    /// Returns the subject parcel id, when the kind carries one.
    #[must_use]
    pub fn parcel_id(&self) -> Option<&ParcelId> {
        match self {
            Self::ParcelBooked { parcel, .. } => Some(&parcel.id),
            Self::StatusUpdated { parcel_id, .. } | Self::AgentAssigned { parcel_id, .. } => {
                Some(parcel_id)
            }
            Self::LocationUpdated { parcel_id, .. } => parcel_id.as_ref(),
        }
    }

    /// Returns the customer targeted on their private channel, if any.
    #[must_use]
    pub fn customer_id(&self) -> Option<&UserId> {
        match self {
            Self::ParcelBooked { customer_id, .. } | Self::StatusUpdated { customer_id, .. } => {
                customer_id.as_ref()
            }
            Self::AgentAssigned { .. } | Self::LocationUpdated { .. } => None,
        }
    }

    /// Returns the agent targeted on their private channel, if any.
    #[must_use]
    pub fn agent_id(&self) -> Option<&AgentId> {
        match self {
            Self::ParcelBooked { .. } => None,
            Self::StatusUpdated { agent_id, .. } => agent_id.as_ref(),
            Self::AgentAssigned { agent_id, .. } | Self::LocationUpdated { agent_id, .. } => {
                Some(agent_id)
            }
        }
    }

    /// Returns the event creation time.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ParcelBooked { timestamp, .. }
            | Self::StatusUpdated { timestamp, .. }
            | Self::AgentAssigned { timestamp, .. }
            | Self::LocationUpdated { timestamp, .. } => *timestamp,
        }
    }
}

fn require_parcel_id(kind: &str, parcel_id: &ParcelId) -> Result<(), RealtimeError> {
    if parcel_id.is_empty() {
        return Err(RealtimeError::Validation(format!(
            "{kind} envelope requires a non-empty parcelId"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn snapshot(id: &str) -> ParcelSnapshot {
        ParcelSnapshot {
            id: ParcelId::new(id),
            tracking_code: format!("TRK-{id}"),
            status: ParcelStatus::Pending,
            customer_id: Some(UserId::new("u-1")),
            agent_id: None,
            pickup_address: "12 Mirpur Rd".to_string(),
            delivery_address: "7 Lake View".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_updated_rejects_empty_parcel_id() {
        let result = Envelope::status_updated(
            ParcelId::new(""),
            ParcelStatus::InTransit,
            None,
            Some(UserId::new("u-1")),
            None,
        );
        assert!(matches!(result, Err(RealtimeError::Validation(_))));
    }

    #[test]
    fn agent_assigned_rejects_empty_parcel_id() {
        let result =
            Envelope::agent_assigned(ParcelId::new(""), AgentId::new("a-1"), snapshot("p-1"));
        assert!(matches!(result, Err(RealtimeError::Validation(_))));
    }

    #[test]
    fn location_updated_rejects_latitude_95() {
        let result =
            Envelope::location_updated(AgentId::new("a-1"), None, 95.0, 10.0, None);
        assert!(matches!(result, Err(RealtimeError::Validation(_))));
    }

    #[test]
    fn location_timestamp_defaults_to_now() {
        let before = Utc::now();
        let Ok(envelope) =
            Envelope::location_updated(AgentId::new("a-1"), None, 23.8, 90.4, None)
        else {
            panic!("valid envelope");
        };
        assert!(envelope.timestamp() >= before);
    }

    #[test]
    fn supplied_timestamp_is_preserved() {
        let sampled = Utc::now() - chrono::Duration::minutes(5);
        let Ok(envelope) = Envelope::location_updated(
            AgentId::new("a-1"),
            Some(ParcelId::new("p-1")),
            23.8,
            90.4,
            Some(sampled),
        ) else {
            panic!("valid envelope");
        };
        assert_eq!(envelope.timestamp(), sampled);
    }

    #[test]
    fn kind_str_matches_wire_discriminants() {
        let booked = Envelope::parcel_booked(snapshot("p-1"), Some(UserId::new("u-1")));
        assert_eq!(booked.kind_str(), "parcel-booked");

        let Ok(status) = Envelope::status_updated(
            ParcelId::new("p-1"),
            ParcelStatus::Delivered,
            None,
            None,
            None,
        ) else {
            panic!("valid envelope");
        };
        assert_eq!(status.kind_str(), "status-updated");
    }

    #[test]
    fn accessors_expose_routing_identifiers() {
        let Ok(envelope) = Envelope::status_updated(
            ParcelId::new("p-9"),
            ParcelStatus::PickedUp,
            Some("left at gate".to_string()),
            Some(UserId::new("u-2")),
            Some(AgentId::new("a-3")),
        ) else {
            panic!("valid envelope");
        };
        assert_eq!(envelope.parcel_id(), Some(&ParcelId::new("p-9")));
        assert_eq!(envelope.customer_id(), Some(&UserId::new("u-2")));
        assert_eq!(envelope.agent_id(), Some(&AgentId::new("a-3")));
    }

    #[test]
    fn serialized_form_is_kind_tagged() {
        let booked = Envelope::parcel_booked(snapshot("p-7"), None);
        let json = serde_json::to_string(&booked).unwrap_or_default();
        assert!(json.contains("\"kind\":\"parcel-booked\""));
        assert!(json.contains("\"_id\":\"p-7\""));
    }
}
