//! Tick scheduling and snapshot publishing.
//!
//! A [`TickScheduler`] owns two timers: a repeating tick timer that drives
//! [`SimulationEngine::tick`] and hands each snapshot to a [`SnapshotSink`],
//! and a one-shot warm-up timer that opens the engine's [`WarmupGate`].
//! Both are cancelled on [`TickScheduler::shutdown`] and on drop.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;
use threat_domain::ThreatUpdatePayload;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::engine::{SimulationEngine, WarmupGate};
use crate::error::PublishError;

/// Engine handle shared between the tick loop and inbound updates
pub type SharedEngine<R = StdRng> = Arc<Mutex<SimulationEngine<R>>>;

/// Outbound publish capability.
///
/// Delivery is fire-and-forget: implementations must not block and must
/// treat "no observers" as success.
pub trait SnapshotSink: Send + Sync {
    /// Hand a snapshot to the transport
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] when the transport cannot accept it.
    fn publish(&self, snapshot: &ThreatUpdatePayload) -> Result<(), PublishError>;
}

impl<F> SnapshotSink for F
where
    F: Fn(&ThreatUpdatePayload) -> Result<(), PublishError> + Send + Sync,
{
    fn publish(&self, snapshot: &ThreatUpdatePayload) -> Result<(), PublishError> {
        self(snapshot)
    }
}

/// Fixed-cadence driver for a [`SimulationEngine`].
pub struct TickScheduler<R = StdRng> {
    engine: SharedEngine<R>,
    sink: Arc<dyn SnapshotSink>,
    clock: Arc<dyn Clock>,
    warmup: WarmupGate,
    tick_interval: Duration,
    warmup_delay: Duration,
    tick_task: Option<JoinHandle<()>>,
    warmup_task: Option<JoinHandle<()>>,
    warmup_armed: bool,
}

impl<R: Rng + Send + 'static> TickScheduler<R> {
    pub fn new(
        engine: SimulationEngine<R>,
        sink: Arc<dyn SnapshotSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tick_interval = engine.config().tick_interval();
        let warmup_delay = engine.config().warmup_delay();
        let warmup = engine.warmup_gate();

        Self {
            engine: Arc::new(Mutex::new(engine)),
            sink,
            clock,
            warmup,
            tick_interval,
            warmup_delay,
            tick_task: None,
            warmup_task: None,
            warmup_armed: false,
        }
    }

    /// Shared handle for applying reference-position updates
    pub fn engine(&self) -> SharedEngine<R> {
        Arc::clone(&self.engine)
    }

    /// Start (or restart) the tick timer.
    ///
    /// Any previous tick timer is cancelled first. The warm-up timer is armed
    /// only on the first start.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        if let Some(previous) = self.tick_task.take() {
            previous.abort();
            tracing::debug!("Replaced running tick timer");
        }

        if !self.warmup_armed {
            self.warmup_armed = true;
            self.warmup_task = Some(self.arm_warmup());
        }

        tracing::info!(
            interval_ms = u64::try_from(self.tick_interval.as_millis()).unwrap_or(u64::MAX),
            "Simulation tick timer started"
        );

        self.tick_task = Some(tokio::spawn(run_ticks(
            Arc::clone(&self.engine),
            Arc::clone(&self.sink),
            Arc::clone(&self.clock),
            self.tick_interval,
        )));
    }

    fn arm_warmup(&self) -> JoinHandle<()> {
        let gate = self.warmup.clone();
        let delay = self.warmup_delay;

        tracing::info!(
            delay_secs = delay.as_secs_f64(),
            "Radar warm-up phase initiated, threat spawning will begin after the delay"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            gate.open();
        })
    }
}

impl<R> TickScheduler<R> {
    pub fn is_running(&self) -> bool {
        self.tick_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel both timers.
    pub fn shutdown(&mut self) {
        let had_ticks = self.tick_task.is_some();
        self.cancel_timers();
        if had_ticks {
            tracing::info!("Simulation stopped");
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
        if let Some(task) = self.warmup_task.take() {
            task.abort();
        }
    }
}

impl<R> Drop for TickScheduler<R> {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

async fn run_ticks<R: Rng + Send>(
    engine: SharedEngine<R>,
    sink: Arc<dyn SnapshotSink>,
    clock: Arc<dyn Clock>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately; the engine's first tick is one period out
    interval.tick().await;

    loop {
        interval.tick().await;

        let snapshot = engine.lock().await.tick(clock.now_ms());

        if let Err(err) = sink.publish(&snapshot) {
            tracing::warn!(error = %err, "Snapshot not published, skipping tick");
        }
    }
}
