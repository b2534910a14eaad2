//! Simulation engine: reference position, warm-up gate and track slot.
//!
//! The engine is the single writer of simulation state. Every mutation goes
//! through [`SimulationEngine::tick`] or [`SimulationEngine::update_reference`];
//! observers only ever see the [`ThreatUpdatePayload`] produced after a tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use threat_domain::{GeoPosition, ThreatTrack, ThreatUpdatePayload};

use crate::config::SimulationConfig;
use crate::track::{SpawnParams, TrackLifecycle};

/// One-way flag that enables spawning once the radar has warmed up.
#[derive(Debug, Clone, Default)]
pub struct WarmupGate {
    open: Arc<AtomicBool>,
}

impl WarmupGate {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn open(&self) {
        if !self.open.swap(true, Ordering::AcqRel) {
            tracing::info!("Radar warm-up complete, threat spawning enabled");
        }
    }
}

/// Single-track simulation engine
pub struct SimulationEngine<R = StdRng> {
    config: SimulationConfig,
    reference: GeoPosition,
    lifecycle: TrackLifecycle<R>,
    warmup: WarmupGate,
}

impl SimulationEngine<StdRng> {
    /// Create an engine seeded from `config.seed`, or from OS entropy.
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> SimulationEngine<R> {
    /// Create an engine drawing all randomness from `rng`.
    pub fn with_rng(config: SimulationConfig, rng: R) -> Self {
        let lifecycle = TrackLifecycle::new(&config, rng);
        Self {
            reference: config.default_reference,
            lifecycle,
            warmup: WarmupGate::default(),
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Handle to the warm-up gate, shared with the scheduler's one-shot timer
    pub fn warmup_gate(&self) -> WarmupGate {
        self.warmup.clone()
    }

    pub fn reference(&self) -> GeoPosition {
        self.reference
    }

    pub fn track(&self) -> Option<&ThreatTrack> {
        self.lifecycle.track()
    }

    /// Overwrite the reference position; takes effect on the next tick.
    pub fn update_reference(&mut self, position: GeoPosition) {
        tracing::debug!(
            lat = position.latitude,
            lng = position.longitude,
            "Reference position updated"
        );
        self.reference = position;
    }

    /// Place a track explicitly relative to the current reference position.
    pub fn force_spawn(&mut self, params: SpawnParams, now_ms: i64) -> u64 {
        let reference = self.reference;
        self.lifecycle.spawn(&reference, params, now_ms)
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self, now_ms: i64) -> ThreatUpdatePayload {
        let reference = self.reference;
        let outcome = self.lifecycle.tick(now_ms, &reference, self.warmup.is_open());
        tracing::trace!(?outcome, now_ms, "Tick complete");
        self.snapshot()
    }

    /// Current `{reference, track}` state
    pub fn snapshot(&self) -> ThreatUpdatePayload {
        ThreatUpdatePayload {
            system_position: self.reference,
            threat_track: self.lifecycle.track().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(seed: u64) -> SimulationEngine {
        SimulationEngine::new(SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        })
    }

    #[test]
    fn test_warmup_gating() {
        let mut engine = engine(1);
        for tick in 0..1_000 {
            let snapshot = engine.tick(tick * 200);
            assert!(snapshot.threat_track.is_none());
            assert_eq!(snapshot.system_position, GeoPosition::default());
        }
    }

    #[test]
    fn test_spawn_after_warmup() {
        let mut engine = engine(2);
        engine.tick(0);
        engine.warmup_gate().open();

        let snapshot = engine.tick(200);
        let track = snapshot.threat_track.expect("track after warm-up");
        let config = engine.config();
        assert_eq!(track.track_id, 1);
        assert!(track.distance >= config.min_spawn_offset_m - 1e-6);
        assert!(track.distance <= config.max_spawn_distance_m() + 1e-6);
    }

    #[test]
    fn test_warmup_gate_is_shared() {
        let engine = engine(3);
        let gate = engine.warmup_gate();
        assert!(!engine.warmup_gate().is_open());
        gate.open();
        gate.open();
        assert!(engine.warmup_gate().is_open());
    }

    #[test]
    fn test_reference_update_applies_on_next_tick() {
        let mut engine = engine(4);
        let origin = GeoPosition::new(0.0, 0.0).unwrap();
        engine.update_reference(origin);
        engine.force_spawn(
            SpawnParams {
                bearing_from_reference_deg: 0.0,
                distance_m: 2000.0,
                travel_heading_deg: 90.0,
                confidence: 90,
            },
            0,
        );
        let before = engine.tick(0).threat_track.unwrap();

        let moved = GeoPosition::new(0.009, 0.0).unwrap();
        engine.update_reference(moved);
        // Stored track untouched until the next tick runs
        assert_eq!(engine.track().unwrap().position, before.position);
        assert!((engine.track().unwrap().distance - before.distance).abs() < 1e-9);

        let after = engine.tick(0);
        assert_eq!(after.system_position, moved);
        let track = after.threat_track.unwrap();
        assert_eq!(track.position, before.position);
        assert!(track.distance < before.distance - 500.0);
    }

    #[test]
    fn test_seeded_engines_are_deterministic() {
        let mut a = engine(99);
        let mut b = engine(99);
        a.warmup_gate().open();
        b.warmup_gate().open();

        for tick in 0..2_000 {
            assert_eq!(a.tick(tick * 200), b.tick(tick * 200));
        }
    }
}
