//! # Simulation Configuration
//!
//! Environment-based configuration for the simulation engine. Values are read
//! once at startup and never revalidated.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use threat_domain::GeoPosition;

/// Simulation tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Track speed in m/s (1 km/min)
    pub drone_speed_mps: f64,

    /// Tick interval in milliseconds (5 updates per second)
    pub tick_interval_ms: u64,

    /// Maximum detection range in meters
    pub max_detection_range_m: f64,

    /// Spawn range in meters
    pub spawn_range_m: f64,

    /// Closest distance a track may spawn at
    pub min_spawn_offset_m: f64,

    /// Delay before the first track may spawn
    pub warmup_delay_ms: u64,

    /// Reference position used until a client reports one
    pub default_reference: GeoPosition,

    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Fraction of the spawn range scaled by the random draw
    pub const SPAWN_RANGE_FRACTION: f64 = 0.8;

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Missing or unparseable values fall back to [`SimulationConfig::default`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());
        let parsed_u64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let latitude = parsed("SYSTEM_DEFAULT_LATITUDE")
            .unwrap_or(defaults.default_reference.latitude);
        let longitude = parsed("SYSTEM_DEFAULT_LONGITUDE")
            .unwrap_or(defaults.default_reference.longitude);
        let default_reference = GeoPosition::new(latitude, longitude).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Invalid default reference position, using fallback");
            defaults.default_reference
        });

        Self {
            drone_speed_mps: parsed("DRONE_SPEED_MPS").unwrap_or(defaults.drone_speed_mps),
            tick_interval_ms: parsed_u64("UPDATE_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.tick_interval_ms),
            max_detection_range_m: parsed("MAX_DETECTION_RANGE_M")
                .unwrap_or(defaults.max_detection_range_m),
            spawn_range_m: parsed("THREAT_SPAWN_RANGE_M").unwrap_or(defaults.spawn_range_m),
            min_spawn_offset_m: parsed("MIN_SPAWN_OFFSET_M")
                .unwrap_or(defaults.min_spawn_offset_m),
            warmup_delay_ms: parsed_u64("WARMUP_DELAY_MS").unwrap_or(defaults.warmup_delay_ms),
            default_reference,
            seed: parsed_u64("SIMULATION_SEED"),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn warmup_delay(&self) -> Duration {
        Duration::from_millis(self.warmup_delay_ms)
    }

    /// Largest distance a freshly spawned track can be placed at
    pub fn max_spawn_distance_m(&self) -> f64 {
        self.spawn_range_m * Self::SPAWN_RANGE_FRACTION + self.min_spawn_offset_m
    }

    /// Distance beyond which confidence starts to decay
    pub fn confidence_decay_range_m(&self) -> f64 {
        self.max_detection_range_m * 0.9
    }

    /// Distance beyond which a track is retired
    pub fn retirement_range_m(&self) -> f64 {
        self.max_detection_range_m * 1.5
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            drone_speed_mps: 16.67,
            tick_interval_ms: 200,
            max_detection_range_m: 5000.0,
            spawn_range_m: 4500.0,
            min_spawn_offset_m: 500.0,
            warmup_delay_ms: 20_000,
            default_reference: GeoPosition::default(),
            seed: None,
        }
    }
}
