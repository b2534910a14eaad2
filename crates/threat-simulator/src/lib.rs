//! # Threat Simulator
//!
//! Simulation engine for the C-UAS threat tracker.
//!
//! ## Features
//!
//! - Single-track lifecycle: spawn, advance, re-measure, retire
//! - Spherical-earth movement via [`threat_domain::geodesy`]
//! - Seedable randomness for reproducible runs
//! - Fixed-cadence scheduler with a one-shot radar warm-up gate

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod track;

pub use clock::{Clock, SimulatedClock, SystemClock};
pub use config::SimulationConfig;
pub use engine::{SimulationEngine, WarmupGate};
pub use error::PublishError;
pub use scheduler::{SharedEngine, SnapshotSink, TickScheduler};
pub use track::{RetirementReason, SpawnParams, TickOutcome, TrackLifecycle};
