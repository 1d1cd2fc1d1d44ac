//! Domain layer: identifiers, room keys, and the event envelope model.
//!
//! Everything here is plain data with construction-time validation —
//! no I/O, no shared state. The relay layer consumes these types to
//! route events; the ws layer serializes them onto the wire.

pub mod envelope;
pub mod geo;
pub mod ids;
pub mod parcel;
pub mod room;

pub use envelope::Envelope;
pub use geo::GeoPoint;
pub use ids::{AgentId, ConnectionId, ParcelId, UserId};
pub use parcel::{ParcelSnapshot, ParcelStatus};
pub use room::RoomKey;
