//! Local parcel list reconciled against incoming events.

use crate::domain::{ParcelId, ParcelSnapshot};
use crate::ws::messages::{AdminNotice, ServerEvent};

/// Client-side view of "my parcels", kept current by upsert semantics.
///
/// Events carrying a full snapshot are merged in place when the id is
/// already known and prepended when it is new. Status-only events update
/// a known row and are otherwise ignored — there is no snapshot to
/// materialize, and every list view refetches on mount and on manual
/// refresh, so a miss self-heals. Duplicate deliveries (a connection in
/// several targeted rooms receives one copy per room) are idempotent.
#[derive(Debug, Default)]
pub struct ParcelFeed {
    parcels: Vec<ParcelSnapshot>,
}

impl ParcelFeed {
    /// Creates an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole list with an authoritative fetch result.
    pub fn seed(&mut self, parcels: Vec<ParcelSnapshot>) {
        self.parcels = parcels;
    }

    /// Applies one incoming event to the local list.
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::ParcelUpdate(snapshot) => self.upsert(snapshot.clone()),
            ServerEvent::ParcelAssigned(notice) => self.upsert(notice.parcel.clone()),
            ServerEvent::ParcelStatusUpdated(change) => {
                if let Some(existing) = self.get_mut(&change.parcel_id) {
                    existing.status = change.status;
                    existing.updated_at = change.timestamp;
                }
            }
            ServerEvent::AdminParcelUpdate(notice) => match notice {
                AdminNotice::ParcelBooked { parcel, .. } => self.upsert(parcel.clone()),
                AdminNotice::StatusUpdated {
                    parcel_id,
                    status,
                    timestamp,
                } => {
                    if let Some(existing) = self.get_mut(parcel_id) {
                        existing.status = *status;
                        existing.updated_at = *timestamp;
                    }
                }
            },
            // Position pushes belong to the map layer, not the list.
            ServerEvent::LocationUpdate(_) | ServerEvent::AgentLocationUpdate(_) => {}
        }
    }

    /// Returns the current list, newest-first for fresh arrivals.
    #[must_use]
    pub fn parcels(&self) -> &[ParcelSnapshot] {
        &self.parcels
    }

    /// Looks up one parcel by id.
    #[must_use]
    pub fn get(&self, id: &ParcelId) -> Option<&ParcelSnapshot> {
        self.parcels.iter().find(|p| &p.id == id)
    }

    /// Number of parcels held locally.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    /// Returns `true` when no parcels are held locally.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    fn get_mut(&mut self, id: &ParcelId) -> Option<&mut ParcelSnapshot> {
        self.parcels.iter_mut().find(|p| &p.id == id)
    }

    fn upsert(&mut self, snapshot: ParcelSnapshot) {
        if let Some(existing) = self.get_mut(&snapshot.id) {
            *existing = snapshot;
        } else {
            self.parcels.insert(0, snapshot);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ParcelStatus, UserId};
    use crate::ws::messages::StatusChange;
    use chrono::Utc;

    fn snapshot(id: &str, status: ParcelStatus) -> ParcelSnapshot {
        ParcelSnapshot {
            id: ParcelId::new(id),
            tracking_code: format!("TRK-{id}"),
            status,
            customer_id: Some(UserId::new("u-1")),
            agent_id: None,
            pickup_address: "12 Mirpur Rd".to_string(),
            delivery_address: "7 Lake View".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_parcel_is_prepended() {
        let mut feed = ParcelFeed::new();
        feed.seed(vec![snapshot("p-1", ParcelStatus::Pending)]);

        feed.apply(&ServerEvent::ParcelUpdate(snapshot(
            "p-2",
            ParcelStatus::Pending,
        )));

        assert_eq!(feed.len(), 2);
        let first = feed.parcels().first().map(|p| p.id.clone());
        assert_eq!(first, Some(ParcelId::new("p-2")));
    }

    #[test]
    fn known_parcel_is_merged_in_place() {
        let mut feed = ParcelFeed::new();
        feed.seed(vec![
            snapshot("p-1", ParcelStatus::Pending),
            snapshot("p-2", ParcelStatus::Pending),
        ]);

        feed.apply(&ServerEvent::ParcelUpdate(snapshot(
            "p-2",
            ParcelStatus::PickedUp,
        )));

        assert_eq!(feed.len(), 2);
        let status = feed.get(&ParcelId::new("p-2")).map(|p| p.status);
        assert_eq!(status, Some(ParcelStatus::PickedUp));
        // position unchanged on merge
        let last = feed.parcels().last().map(|p| p.id.clone());
        assert_eq!(last, Some(ParcelId::new("p-2")));
    }

    #[test]
    fn duplicate_delivery_is_idempotent() {
        let mut feed = ParcelFeed::new();
        let event = ServerEvent::ParcelUpdate(snapshot("p-1", ParcelStatus::Pending));
        feed.apply(&event);
        feed.apply(&event);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn status_change_updates_known_row() {
        let mut feed = ParcelFeed::new();
        feed.seed(vec![snapshot("p-1", ParcelStatus::Pending)]);

        let stamped = Utc::now();
        feed.apply(&ServerEvent::ParcelStatusUpdated(StatusChange {
            parcel_id: ParcelId::new("p-1"),
            status: ParcelStatus::InTransit,
            note: None,
            timestamp: stamped,
        }));

        let Some(parcel) = feed.get(&ParcelId::new("p-1")) else {
            panic!("parcel should still be present");
        };
        assert_eq!(parcel.status, ParcelStatus::InTransit);
        assert_eq!(parcel.updated_at, stamped);
    }

    #[test]
    fn status_change_for_unknown_parcel_is_ignored() {
        let mut feed = ParcelFeed::new();
        feed.apply(&ServerEvent::ParcelStatusUpdated(StatusChange {
            parcel_id: ParcelId::new("p-404"),
            status: ParcelStatus::Delivered,
            note: None,
            timestamp: Utc::now(),
        }));
        assert!(feed.is_empty());
    }

    #[test]
    fn admin_booking_notice_upserts() {
        let mut feed = ParcelFeed::new();
        feed.apply(&ServerEvent::AdminParcelUpdate(AdminNotice::ParcelBooked {
            parcel: snapshot("p-9", ParcelStatus::Pending),
            timestamp: Utc::now(),
        }));
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn location_events_leave_the_list_alone() {
        let mut feed = ParcelFeed::new();
        feed.seed(vec![snapshot("p-1", ParcelStatus::InTransit)]);

        feed.apply(&ServerEvent::LocationUpdate(
            crate::ws::messages::LocationPing {
                agent_id: crate::domain::AgentId::new("a-1"),
                parcel_id: Some(ParcelId::new("p-1")),
                latitude: 23.8,
                longitude: 90.4,
                timestamp: Utc::now(),
            },
        ));

        assert_eq!(feed.len(), 1);
        let status = feed.get(&ParcelId::new("p-1")).map(|p| p.status);
        assert_eq!(status, Some(ParcelStatus::InTransit));
    }
}
