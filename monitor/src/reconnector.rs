//! Non-blocking reconnect attempts with duplicate suppression.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;

use clusterbot_types::PeerId;

use crate::monitor::MonitorEvent;
use crate::transport::Transport;

/// Issues connection attempts for disconnected peers.
///
/// Owned by the monitor loop. Each attempt runs as its own tokio task
/// and reports back through the loop's event channel; the loop calls
/// [`Reconnector::complete`] when it applies the result. At most one
/// attempt per peer is ever in flight.
pub struct Reconnector {
    transport: Arc<dyn Transport>,
    events: mpsc::Sender<MonitorEvent>,
    in_flight: HashSet<PeerId>,
}

impl Reconnector {
    pub fn new(transport: Arc<dyn Transport>, events: mpsc::Sender<MonitorEvent>) -> Self {
        Self {
            transport,
            events,
            in_flight: HashSet::new(),
        }
    }

    /// Start an attempt for `peer`. Returns `false` (and does nothing)
    /// when an attempt for this peer is already outstanding.
    pub fn attempt(&mut self, peer: PeerId) -> bool {
        if !self.in_flight.insert(peer.clone()) {
            tracing::debug!(%peer, "reconnect attempt already in flight, skipping");
            return false;
        }

        let connect = self.transport.connect(&peer);
        let events = self.events.clone();
        tokio::spawn(async move {
            let connected = connect.await;
            // A closed channel means the monitor is shutting down; the
            // in-flight attempt is simply abandoned.
            let _ = events
                .send(MonitorEvent::AttemptFinished { peer, connected })
                .await;
        });
        true
    }

    /// Clear the in-flight mark for `peer` once its result was applied.
    pub fn complete(&mut self, peer: &PeerId) -> bool {
        self.in_flight.remove(peer)
    }

    pub fn is_in_flight(&self, peer: &PeerId) -> bool {
        self.in_flight.contains(peer)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
