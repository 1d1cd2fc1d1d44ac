//! WebSocket transport: upgrade handling, the per-connection loop, and
//! the wire protocol.
//!
//! The endpoint at `/ws` carries both directions of the realtime
//! contract: control events from clients (room joins/leaves, location
//! pings) and routed events from the server.

pub mod connection;
pub mod handler;
pub mod messages;
