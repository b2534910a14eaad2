//! Track lifecycle management for the single simulated threat.
//!
//! The slot is either empty or holds one [`ActiveTrack`]. Each tick runs the
//! same pipeline: spawn (if allowed), advance along the travel heading,
//! re-measure against the reference position, drift confidence, retire, and
//! occasionally steer.

use rand::Rng;
use threat_domain::geodesy::{self, normalize_degrees};
use threat_domain::{Classification, GeoPosition, ThreatTrack};

use crate::config::SimulationConfig;

/// Chance per tick that the travel heading is perturbed
pub const STEERING_PROBABILITY: f64 = 0.02;

/// Largest heading change applied by one steering event
pub const MAX_STEERING_DEG: f64 = 45.0;

/// Tracks below this confidence are retired
pub const MIN_CONFIDENCE: u8 = 10;

/// Confidence ceiling
pub const MAX_CONFIDENCE: u8 = 100;

/// A live track plus the heading it is flying.
///
/// The travel heading is kept apart from `ThreatTrack::bearing`, which is
/// overwritten every tick with the look angle from the reference position.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrack {
    track: ThreatTrack,
    travel_heading_deg: f64,
}

impl ActiveTrack {
    pub fn track(&self) -> &ThreatTrack {
        &self.track
    }

    pub fn travel_heading_deg(&self) -> f64 {
        self.travel_heading_deg
    }
}

/// Explicit placement of a new track relative to the reference position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    /// Direction from the reference position to the spawn point
    pub bearing_from_reference_deg: f64,
    /// Distance from the reference position to the spawn point
    pub distance_m: f64,
    pub travel_heading_deg: f64,
    pub confidence: u8,
}

/// Why a track left the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetirementReason {
    OutOfRange,
    LowConfidence,
}

impl RetirementReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::LowConfidence => "LOW_CONFIDENCE",
        }
    }
}

/// Result of one lifecycle tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Slot empty before and after the tick
    Idle,
    Spawned { track_id: u64 },
    Updated { track_id: u64 },
    Retired { track_id: u64, reason: RetirementReason },
}

/// Owner of the single track slot.
pub struct TrackLifecycle<R> {
    speed_mps: f64,
    spawn_range_m: f64,
    min_spawn_offset_m: f64,
    confidence_decay_range_m: f64,
    retirement_range_m: f64,
    next_track_id: u64,
    slot: Option<ActiveTrack>,
    rng: R,
}

impl<R: Rng> TrackLifecycle<R> {
    pub fn new(config: &SimulationConfig, rng: R) -> Self {
        Self {
            speed_mps: config.drone_speed_mps,
            spawn_range_m: config.spawn_range_m,
            min_spawn_offset_m: config.min_spawn_offset_m,
            confidence_decay_range_m: config.confidence_decay_range_m(),
            retirement_range_m: config.retirement_range_m(),
            next_track_id: 1,
            slot: None,
            rng,
        }
    }

    /// Current track, if any
    pub fn track(&self) -> Option<&ThreatTrack> {
        self.slot.as_ref().map(ActiveTrack::track)
    }

    pub fn active(&self) -> Option<&ActiveTrack> {
        self.slot.as_ref()
    }

    /// Run one tick of the lifecycle at `now_ms` against `reference`.
    pub fn tick(
        &mut self,
        now_ms: i64,
        reference: &GeoPosition,
        spawn_enabled: bool,
    ) -> TickOutcome {
        let mut spawned = false;
        if self.slot.is_none() && spawn_enabled {
            let params = self.random_spawn_params();
            self.spawn(reference, params, now_ms);
            spawned = true;
        }

        let speed_mps = self.speed_mps;
        let decay_range_m = self.confidence_decay_range_m;
        let retirement_range_m = self.retirement_range_m;

        let Some(active) = self.slot.as_mut() else {
            return TickOutcome::Idle;
        };
        let track_id = active.track.track_id;

        advance(active, speed_mps, now_ms);
        measure(active, reference);
        drift_confidence(&mut active.track, decay_range_m);

        let retirement = if active.track.distance > retirement_range_m {
            Some(RetirementReason::OutOfRange)
        } else if active.track.confidence < MIN_CONFIDENCE {
            Some(RetirementReason::LowConfidence)
        } else {
            None
        };

        if let Some(reason) = retirement {
            tracing::info!(
                track_id,
                reason = reason.as_str(),
                distance_m = active.track.distance,
                confidence = active.track.confidence,
                "Track expired or out of range, cleaning up"
            );
            self.slot = None;
            return TickOutcome::Retired { track_id, reason };
        }

        if self.rng.gen_bool(STEERING_PROBABILITY) {
            let offset = self.rng.gen_range(-MAX_STEERING_DEG..=MAX_STEERING_DEG);
            active.travel_heading_deg = normalize_degrees(active.travel_heading_deg + offset);
            tracing::debug!(
                track_id,
                heading_deg = active.travel_heading_deg,
                "Track changed heading"
            );
        }

        if spawned {
            TickOutcome::Spawned { track_id }
        } else {
            TickOutcome::Updated { track_id }
        }
    }

    /// Place a new track, replacing any current one, and return its id.
    pub fn spawn(&mut self, reference: &GeoPosition, params: SpawnParams, now_ms: i64) -> u64 {
        let track_id = self.next_track_id;
        self.next_track_id += 1;

        let position = geodesy::destination_point(
            reference,
            params.bearing_from_reference_deg,
            params.distance_m,
        );

        tracing::info!(
            track_id,
            distance_m = params.distance_m.round(),
            bearing_deg = params.bearing_from_reference_deg,
            classification = Classification::RotaryWing.as_str(),
            "Spawning new drone track"
        );

        self.slot = Some(ActiveTrack {
            track: ThreatTrack {
                track_id,
                position,
                bearing: geodesy::initial_bearing_degrees(reference, &position),
                distance: geodesy::distance_meters(reference, &position),
                classification: Classification::RotaryWing,
                confidence: params.confidence.min(MAX_CONFIDENCE),
                last_update_time: now_ms,
            },
            travel_heading_deg: normalize_degrees(params.travel_heading_deg),
        });

        track_id
    }

    /// Random placement: uniform bearing, distance offset from the
    /// reference, initially flying directly away from it.
    fn random_spawn_params(&mut self) -> SpawnParams {
        let bearing: f64 = self.rng.gen_range(0.0..360.0);
        let scaled_range = self.spawn_range_m * SimulationConfig::SPAWN_RANGE_FRACTION;
        let distance = self.rng.r#gen::<f64>() * scaled_range + self.min_spawn_offset_m;
        let confidence = self.rng.gen_range(80..=MAX_CONFIDENCE);

        SpawnParams {
            bearing_from_reference_deg: bearing,
            distance_m: distance,
            travel_heading_deg: normalize_degrees(bearing + 180.0),
            confidence,
        }
    }
}

/// Move the track along its travel heading for the time elapsed since the
/// last advance.
fn advance(active: &mut ActiveTrack, speed_mps: f64, now_ms: i64) {
    let elapsed_ms = now_ms - active.track.last_update_time;
    if elapsed_ms <= 0 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let delta_secs = elapsed_ms as f64 / 1000.0;

    active.track.position = geodesy::destination_point(
        &active.track.position,
        active.travel_heading_deg,
        speed_mps * delta_secs,
    );
    active.track.last_update_time = now_ms;
}

/// Recompute distance and look angle from the reference position.
fn measure(active: &mut ActiveTrack, reference: &GeoPosition) {
    active.track.distance = geodesy::distance_meters(reference, &active.track.position);
    active.track.bearing = geodesy::initial_bearing_degrees(reference, &active.track.position);
}

fn drift_confidence(track: &mut ThreatTrack, decay_range_m: f64) {
    if track.distance > decay_range_m {
        track.confidence = track.confidence.saturating_sub(1);
    } else if track.confidence < MAX_CONFIDENCE {
        track.confidence += 1;
    }
}
