//! Broadcast publisher bridging the tick scheduler to WebSocket observers.

use std::sync::OnceLock;

use threat_domain::ThreatUpdatePayload;
use threat_simulator::{PublishError, SnapshotSink};
use tokio::sync::broadcast;

/// Snapshot sink backed by a broadcast channel attached once the listener
/// is bound.
#[derive(Debug, Default)]
pub struct GatewayPublisher {
    channel: OnceLock<broadcast::Sender<ThreatUpdatePayload>>,
}

impl GatewayPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the observer channel. Returns `false` if one was already attached.
    pub fn attach(&self, tx: broadcast::Sender<ThreatUpdatePayload>) -> bool {
        let attached = self.channel.set(tx).is_ok();
        if attached {
            tracing::info!("Snapshot publisher attached to gateway");
        }
        attached
    }

    pub fn is_ready(&self) -> bool {
        self.channel.get().is_some()
    }
}

impl SnapshotSink for GatewayPublisher {
    fn publish(&self, snapshot: &ThreatUpdatePayload) -> Result<(), PublishError> {
        let tx = self.channel.get().ok_or(PublishError::TransportUnavailable)?;

        match tx.send(snapshot.clone()) {
            Ok(observers) => tracing::trace!(observers, "Snapshot published"),
            Err(_) => tracing::trace!("No observers attached, snapshot dropped"),
        }
        Ok(())
    }
}
