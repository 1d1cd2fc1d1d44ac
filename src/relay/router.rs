//! Room router: envelope → fan-out targets → member sinks.
//!
//! [`RoomRouter::emit`] consumes one validated [`Envelope`], resolves the
//! room-targeted and broadcast emissions for its kind, and pushes the
//! wire events to every resolved sink. Delivery is at-most-once and
//! best-effort: a connection that is not registered at emit time simply
//! misses the event, and the dashboards converge on their next
//! authoritative refetch.

use std::sync::Arc;

use crate::domain::{Envelope, RoomKey};
use crate::error::RealtimeError;
use crate::ws::messages::{AdminNotice, AssignmentNotice, LocationPing, ServerEvent, StatusChange};

use super::ConnectionRegistry;

/// Translates envelopes into targeted and broadcast deliveries.
///
/// Cheap to clone (shares the registry). Constructed once by the
/// composition root and handed to every collaborator that emits — there
/// is deliberately no process-global instance.
///
/// Routing table:
///
/// | Envelope kind     | Room-targeted                                   | Broadcast |
/// |-------------------|--------------------------------------------------|-----------|
/// | `parcel-booked`   | `parcel-update` → customer room                  | `admin-parcel-update` |
/// | `status-updated`  | `parcel-status-updated` → parcel, customer, agent | `parcel-status-updated` + `admin-parcel-update` |
/// | `agent-assigned`  | `parcel-assigned` → agent room                   | — |
/// | `location-updated`| `location-update` → parcel room; `agent-location-update` → agent room | — |
#[derive(Debug, Clone)]
pub struct RoomRouter {
    registry: Arc<ConnectionRegistry>,
}

impl RoomRouter {
    /// Creates a router over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the shared registry handle.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Fans the envelope out to its resolved targets.
    ///
    /// Returns the number of sink pushes that succeeded (a connection in
    /// several targets is counted once per copy — duplicates are fine,
    /// the client feed upserts by id). Errors never propagate to the
    /// caller: per-member failures are logged and fan-out continues.
    pub async fn emit(&self, envelope: Envelope) -> usize {
        let kind = envelope.kind_str();
        let delivered = match envelope {
            Envelope::ParcelBooked {
                parcel,
                customer_id,
                timestamp,
            } => {
                let notice = ServerEvent::AdminParcelUpdate(AdminNotice::ParcelBooked {
                    parcel: parcel.clone(),
                    timestamp,
                });
                let mut delivered = 0;
                if let Some(customer) = customer_id {
                    delivered += self
                        .deliver(&RoomKey::User(customer), &ServerEvent::ParcelUpdate(parcel))
                        .await;
                }
                delivered + self.broadcast(&notice).await
            }

            Envelope::StatusUpdated {
                parcel_id,
                status,
                note,
                customer_id,
                agent_id,
                timestamp,
            } => {
                let event = ServerEvent::ParcelStatusUpdated(StatusChange {
                    parcel_id: parcel_id.clone(),
                    status,
                    note,
                    timestamp,
                });
                let mut delivered = self
                    .deliver(&RoomKey::Parcel(parcel_id.clone()), &event)
                    .await;
                if let Some(customer) = customer_id {
                    delivered += self.deliver(&RoomKey::User(customer), &event).await;
                }
                if let Some(agent) = agent_id {
                    delivered += self.deliver(&RoomKey::Agent(agent), &event).await;
                }
                delivered += self.broadcast(&event).await;
                let notice = ServerEvent::AdminParcelUpdate(AdminNotice::StatusUpdated {
                    parcel_id,
                    status,
                    timestamp,
                });
                delivered + self.broadcast(&notice).await
            }

            Envelope::AgentAssigned {
                parcel_id,
                agent_id,
                parcel,
                timestamp,
            } => {
                let event = ServerEvent::ParcelAssigned(AssignmentNotice {
                    parcel_id,
                    agent_id: agent_id.clone(),
                    parcel,
                    timestamp,
                });
                self.deliver(&RoomKey::Agent(agent_id), &event).await
            }

            Envelope::LocationUpdated {
                agent_id,
                parcel_id,
                position,
                timestamp,
            } => {
                let ping = LocationPing {
                    agent_id: agent_id.clone(),
                    parcel_id: parcel_id.clone(),
                    latitude: position.latitude(),
                    longitude: position.longitude(),
                    timestamp,
                };
                let mut delivered = 0;
                if let Some(parcel) = parcel_id {
                    delivered += self
                        .deliver(
                            &RoomKey::Parcel(parcel),
                            &ServerEvent::LocationUpdate(ping.clone()),
                        )
                        .await;
                }
                delivered
                    + self
                        .deliver(
                            &RoomKey::Agent(agent_id),
                            &ServerEvent::AgentLocationUpdate(ping),
                        )
                        .await
            }
        };

        tracing::debug!(kind, delivered, "envelope routed");
        delivered
    }

    /// Pushes one event to every member of a room, isolating per-member
    /// failures.
    async fn deliver(&self, room: &RoomKey, event: &ServerEvent) -> usize {
        let members = self.registry.members_of(room).await;
        let mut delivered = 0;
        for (id, sink) in members {
            if sink.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::warn!(
                    error = %RealtimeError::Delivery(id),
                    room = %room,
                    event = event.event_name(),
                    "dropping member from fan-out"
                );
            }
        }
        delivered
    }

    /// Pushes one event to every registered connection, room memberships
    /// notwithstanding.
    async fn broadcast(&self, event: &ServerEvent) -> usize {
        let connections = self.registry.connections().await;
        let mut delivered = 0;
        for (id, sink) in connections {
            if sink.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::warn!(
                    error = %RealtimeError::Delivery(id),
                    event = event.event_name(),
                    "dropping connection from broadcast"
                );
            }
        }
        delivered
    }
}
