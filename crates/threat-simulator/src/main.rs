//! Threat Simulator CLI
//!
//! Runs the engine headless against a simulated clock and prints one JSON
//! snapshot per tick to stdout.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use threat_domain::GeoPosition;
use threat_simulator::{Clock, SimulatedClock, SimulationConfig, SimulationEngine};
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "threat-simulator")]
#[command(about = "Run the single-track threat simulation without a transport")]
struct Args {
    /// Number of ticks to simulate
    #[arg(short, long, default_value = "600")]
    ticks: u32,

    /// Tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Warm-up delay in milliseconds
    #[arg(long)]
    warmup_ms: Option<u64>,

    /// Track speed in m/s
    #[arg(long)]
    speed: Option<f64>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Reference latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Reference longitude
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Pace ticks in wall-clock time instead of running flat out
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, snapshots to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("threat_simulator=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    info!(
        ticks = args.ticks,
        tick_ms = config.tick_interval_ms,
        warmup_ms = config.warmup_delay_ms,
        seed = ?config.seed,
        "Starting headless threat simulation"
    );

    let tick_ms = i64::try_from(config.tick_interval_ms)?;
    let warmup_ms = i64::try_from(config.warmup_delay_ms)?;
    let clock = SimulatedClock::starting_at(chrono::Utc::now().timestamp_millis());
    let started_at = clock.now_ms();
    let mut engine = SimulationEngine::new(config);
    let gate = engine.warmup_gate();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut last_track_id = None;
    let mut tracks_seen = 0_u32;

    for _ in 0..args.ticks {
        let now = clock.advance_ms(tick_ms);
        if now - started_at >= warmup_ms {
            gate.open();
        }

        let snapshot = engine.tick(now);
        let track_id = snapshot.threat_track.as_ref().map(|t| t.track_id);
        if track_id.is_some() && track_id != last_track_id {
            tracks_seen += 1;
        }
        last_track_id = track_id;

        serde_json::to_writer(&mut out, &snapshot)?;
        out.write_all(b"\n")?;

        if args.realtime {
            sleep(Duration::from_millis(engine.config().tick_interval_ms)).await;
        }
    }
    out.flush()?;

    info!(tracks = tracks_seen, "Simulation complete");
    Ok(())
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = SimulationConfig::from_env();

    if let Some(tick_ms) = args.tick_ms.filter(|ms| *ms > 0) {
        config.tick_interval_ms = tick_ms;
    }
    if let Some(warmup_ms) = args.warmup_ms {
        config.warmup_delay_ms = warmup_ms;
    }
    if let Some(speed) = args.speed {
        config.drone_speed_mps = speed;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.lat.is_some() || args.lng.is_some() {
        let lat = args.lat.unwrap_or(config.default_reference.latitude);
        let lng = args.lng.unwrap_or(config.default_reference.longitude);
        config.default_reference = GeoPosition::new(lat, lng)?;
    }

    Ok(config)
}
