//! Client-side subscription management.
//!
//! Everything a connected dashboard or agent app needs between the
//! transport and its UI: the room-membership state machine
//! ([`RealtimeSession`]), local list reconciliation ([`ParcelFeed`]),
//! and the scoped handles ([`ParcelWatch`], [`LocationShare`]) that tie
//! subscriptions and ping timers to a UI context's lifetime.
//!
//! The transport itself (dialing, reconnection backoff) is not owned
//! here: the session is sans-IO and only answers *what to send* — which
//! is what makes the reconnect/re-join behavior testable without a
//! network.

pub mod feed;
pub mod session;
pub mod watch;

pub use feed::ParcelFeed;
pub use session::{ClientIdentity, RealtimeSession, SessionPhase};
pub use watch::{CommandSink, LocationShare, ParcelWatch};
