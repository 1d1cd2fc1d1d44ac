//! Parcel payload model carried in realtime events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgentId, ParcelId, UserId};

/// Lifecycle status of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParcelStatus {
    /// Booked, waiting for an agent.
    Pending,
    /// Assigned to a delivery agent.
    Assigned,
    /// Collected from the sender.
    PickedUp,
    /// Moving between hubs or out for delivery.
    InTransit,
    /// Handed over to the recipient.
    Delivered,
    /// Delivery attempt failed.
    Failed,
    /// Cancelled by the customer or an admin.
    Cancelled,
}

impl ParcelStatus {
    /// Returns the wire representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::PickedUp => "picked-up",
            Self::InTransit => "in-transit",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full parcel view as carried in realtime payloads.
///
/// Mirrors the document the dashboards render: the store's `_id` key is
/// preserved on the wire so existing clients keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelSnapshot {
    /// Document id of the parcel.
    #[serde(rename = "_id")]
    pub id: ParcelId,

    /// Human-facing tracking code printed on the label / QR slip.
    pub tracking_code: String,

    /// Current lifecycle status.
    pub status: ParcelStatus,

    /// Owning customer, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<UserId>,

    /// Assigned delivery agent, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,

    /// Pickup address line.
    pub pickup_address: String,

    /// Delivery address line.
    pub delivery_address: String,

    /// Timestamp of the last mutation in the store.
    pub updated_at: DateTime<Utc>,
}
