//! # courier-gateway
//!
//! Real-time WebSocket event gateway for a courier parcel-management
//! platform.
//!
//! Parcel lifecycle events — bookings, status transitions, agent
//! assignments, live locations — are fanned out to exactly the right set
//! of connected clients: the originating customer, the assigned agent,
//! anyone watching that parcel's tracking page, and the admin broadcast
//! feed. Delivery is best-effort and at-most-once: dashboards converge
//! through their own authoritative refetch, so the gateway never queues,
//! retries, or persists an event.
//!
//! ## Architecture
//!
//! ```text
//! Clients (dashboards, agent apps)
//!     │
//!     ├── WS Handler (ws/)           /ws upgrade + per-connection loop
//!     ├── System Handlers (api/)     /health
//!     │
//!     ├── RoomRouter (relay/)        envelope → room/broadcast fan-out
//!     ├── ConnectionRegistry (relay/) connections ↔ room memberships
//!     │
//!     ├── Envelope model (domain/)   validated event records
//!     └── Subscription client (client/)  join/leave + local reconcile
//! ```
//!
//! The CRUD service that mutates parcels constructs an
//! [`domain::Envelope`] after each successful write and hands it to
//! [`relay::RoomRouter::emit`] — fire-and-forget; the gateway does not
//! watch the data store itself.

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod relay;
pub mod ws;
