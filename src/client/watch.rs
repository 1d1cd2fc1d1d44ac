//! Scoped subscription and location-sharing handles.
//!
//! Instead of paired add/remove listener calls, acquiring a subscription
//! returns a capability that cleans up after itself: [`ParcelWatch`]
//! leaves its parcel room exactly once when released or dropped, and
//! [`LocationShare`] aborts its ping timer outright on drop so no
//! further tick can fire.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::session::RealtimeSession;
use crate::domain::{AgentId, GeoPoint, ParcelId};
use crate::ws::messages::{ClientCommand, LocationPing};

/// Command pipe from client components to whatever drives the transport.
pub type CommandSink = mpsc::UnboundedSender<ClientCommand>;

/// Capability held while one tracking view is open.
///
/// Opening the watch joins `parcel:<id>` (through the session, so a
/// reconnect restores the membership); dropping or explicitly releasing
/// it leaves the room exactly once. A torn-down UI context can therefore
/// never leak a parcel subscription.
#[derive(Debug)]
pub struct ParcelWatch {
    session: Arc<Mutex<RealtimeSession>>,
    outbound: CommandSink,
    parcel_id: ParcelId,
    released: bool,
}

impl ParcelWatch {
    /// Joins the parcel room and returns the guard that owns the
    /// membership.
    #[must_use]
    pub fn open(
        session: &Arc<Mutex<RealtimeSession>>,
        outbound: &CommandSink,
        parcel_id: ParcelId,
    ) -> Self {
        if let Ok(mut locked) = session.lock() {
            for command in locked.watch_parcel(parcel_id.clone()) {
                // A closed transport just means nothing to send; the
                // session still records the desired membership.
                let _ = outbound.send(command);
            }
        }
        Self {
            session: Arc::clone(session),
            outbound: outbound.clone(),
            parcel_id,
            released: false,
        }
    }

    /// The parcel this watch is scoped to.
    #[must_use]
    pub const fn parcel_id(&self) -> &ParcelId {
        &self.parcel_id
    }

    /// Leaves the parcel room now instead of at drop time.
    pub fn release(mut self) {
        self.end();
    }

    fn end(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Ok(mut locked) = self.session.lock()
            && let Some(command) = locked.unwatch_parcel()
        {
            let _ = self.outbound.send(command);
        }
    }
}

impl Drop for ParcelWatch {
    fn drop(&mut self) {
        self.end();
    }
}

/// Periodic agent location pings while a delivery run is live.
///
/// The timer runs on its own task; [`LocationShare::stop`] (or dropping
/// the handle) aborts that task, invalidating the timer outright rather
/// than leaving a no-op callback ticking.
#[derive(Debug)]
pub struct LocationShare {
    task: JoinHandle<()>,
}

impl LocationShare {
    /// Starts pinging every `period`. `position` samples the current
    /// coordinates; returning `None` skips that tick (no GPS fix yet).
    #[must_use]
    pub fn start<F>(
        outbound: CommandSink,
        agent_id: AgentId,
        parcel_id: Option<ParcelId>,
        period: Duration,
        mut position: F,
    ) -> Self
    where
        F: FnMut() -> Option<GeoPoint> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(point) = position() else { continue };
                let ping = LocationPing {
                    agent_id: agent_id.clone(),
                    parcel_id: parcel_id.clone(),
                    latitude: point.latitude(),
                    longitude: point.longitude(),
                    timestamp: Utc::now(),
                };
                if outbound
                    .send(ClientCommand::AgentLocationUpdate(ping))
                    .is_err()
                {
                    // Transport-side receiver is gone; stop ticking.
                    break;
                }
            }
        });
        Self { task }
    }

    /// Returns `true` while the ping timer is still alive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops sharing immediately.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for LocationShare {
    fn drop(&mut self) {
        self.task.abort();
    }
}
