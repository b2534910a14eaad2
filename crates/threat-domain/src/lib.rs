//! # C-UAS Threat Tracker - Domain Model
//!
//! Core value objects and wire payloads shared by the simulation engine and
//! the real-time gateway. Field names follow the JSON contract consumed by
//! the radar display (`lat`/`lng`, camelCase).

pub mod geodesy;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CHANNELS
// =============================================================================

/// Outbound channel carrying one snapshot per tick
pub const THREAT_UPDATE_CHANNEL: &str = "threatUpdate";

/// Inbound channel carrying reference-position updates
pub const SYSTEM_UPDATE_CHANNEL: &str = "systemUpdate";

/// One-time notification sent to a newly attached observer
pub const WELCOME_CHANNEL: &str = "welcome";

/// Acknowledgement of an inbound update
pub const ACK_CHANNEL: &str = "ack";

// =============================================================================
// ERRORS
// =============================================================================

/// Domain validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Coordinate is not a finite number")]
    NonFinite,
}

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
}

impl GeoPosition {
    /// Validate and build a position.
    ///
    /// Longitude `180` is accepted and folded to `-180`.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] for non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(DomainError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude: if longitude >= 180.0 { -180.0 } else { longitude },
        })
    }

    /// Great-circle distance to another point in meters
    #[must_use]
    pub fn distance_to_m(&self, other: &Self) -> f64 {
        geodesy::distance_meters(self, other)
    }

    /// Initial bearing towards another point in degrees
    #[must_use]
    pub fn bearing_to_deg(&self, other: &Self) -> f64 {
        geodesy::initial_bearing_degrees(self, other)
    }

    /// Project this point along a bearing
    #[must_use]
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> Self {
        geodesy::destination_point(self, bearing_deg, distance_m)
    }
}

impl Default for GeoPosition {
    fn default() -> Self {
        // Berlin
        Self {
            latitude: 52.5200,
            longitude: 13.4050,
        }
    }
}

/// Raw reference-position update as received from a client.
///
/// Unvalidated; convert with `GeoPosition::try_from`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
}

impl TryFrom<PositionUpdate> for GeoPosition {
    type Error = DomainError;

    fn try_from(update: PositionUpdate) -> Result<Self, Self::Error> {
        Self::new(update.lat, update.lng)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Track classification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Classification {
    #[default]
    #[serde(rename = "Rotary-Wing")]
    RotaryWing,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RotaryWing => "Rotary-Wing",
        }
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// The single simulated aerial threat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatTrack {
    pub track_id: u64,
    pub position: GeoPosition,
    /// Look angle from the reference position to the track, `[0, 360)`
    pub bearing: f64,
    /// Distance from the reference position in meters
    pub distance: f64,
    pub classification: Classification,
    /// 0-100%
    pub confidence: u8,
    /// Unix timestamp in milliseconds of the last position advance
    pub last_update_time: i64,
}

/// Snapshot published after every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatUpdatePayload {
    pub system_position: GeoPosition,
    pub threat_track: Option<ThreatTrack>,
}
