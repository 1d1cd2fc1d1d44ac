//! Relay layer: connection registry and room router.
//!
//! The only mutable shared state in the realtime core lives in
//! [`ConnectionRegistry`]; [`RoomRouter`] reads it to fan envelopes out
//! to member sinks. Both are constructed once by the composition root —
//! never reached through a process global.

pub mod registry;
pub mod router;

pub use registry::{ConnectionRegistry, EventSink};
pub use router::RoomRouter;
