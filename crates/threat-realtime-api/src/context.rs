//! # Gateway Context
//!
//! Shared state handed to every connection handler.

use threat_domain::ThreatUpdatePayload;
use threat_simulator::SharedEngine;
use tokio::sync::broadcast;

/// Broadcast channel capacity; observers that fall further behind skip ahead
const CHANNEL_CAPACITY: usize = 64;

/// Application state shared across all connections
#[derive(Clone)]
pub struct AppState {
    /// Simulation engine, written by the tick loop and by reference updates
    pub engine: SharedEngine,

    /// Snapshot broadcaster feeding every observer
    pub updates_tx: broadcast::Sender<ThreatUpdatePayload>,
}

impl AppState {
    pub fn new(engine: SharedEngine) -> Self {
        let (updates_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { engine, updates_tx }
    }

    /// Attach a new observer
    pub fn subscribe(&self) -> broadcast::Receiver<ThreatUpdatePayload> {
        self.updates_tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.updates_tx.receiver_count()
    }
}
