//! ORBIT-LATCH Simulation Driver
//!
//! Runs the constellation for a fixed number of ticks and streams telemetry.
//!
//! Usage:
//!   orbit-latch                      # console table, one frame per second
//!   orbit-latch json                 # one JSON snapshot per line on stdout
//!   orbit-latch json --seed 7 --interval-ms 0 --ticks 60
//!
//! Logs go to stderr; `RUST_LOG` overrides the default filter.

use anyhow::Result;
use clap::Parser;
use orbit_latch::alerts::DEFAULT_LOG_FILE;
use orbit_latch::{
    AlertSink, FileSink, JsonLinesSink, NullSink, OrbitModel, RandomSource, SeededRandom,
    SimConfig, Simulation, TableSink, TelemetrySink, MAX_SATS, SIM_DURATION,
};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{self, Interval};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "orbit-latch",
    about = "Simulate LEO satellite handover for a single ground terminal"
)]
struct Args {
    /// Output mode: `json` streams snapshots, anything else renders a table
    mode: Option<String>,

    /// Ticks to simulate
    #[arg(long, default_value_t = SIM_DURATION)]
    ticks: u64,

    /// Wall-clock delay between ticks in milliseconds (0 = unpaced)
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Constellation size
    #[arg(long, default_value_t = MAX_SATS)]
    satellites: usize,

    /// Alert log file
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Keep alerts in memory only
    #[arg(long)]
    no_log_file: bool,

    /// Draw each satellite's orbit radius once instead of per query
    #[arg(long)]
    fixed_orbits: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn mode(&self) -> Mode {
        match self.mode.as_deref() {
            Some("json") => Mode::Json,
            _ => Mode::Table,
        }
    }

    fn sim_config(&self) -> SimConfig {
        SimConfig {
            satellites: self.satellites,
            duration_ticks: self.ticks,
            orbit_model: if self.fixed_orbits {
                OrbitModel::FixedPerSatellite
            } else {
                OrbitModel::ResampledPerQuery
            },
            ..SimConfig::default()
        }
    }
}

fn init_tracing(mode: Mode, verbose: bool) {
    let default_filter = match (verbose, mode) {
        (true, _) => "orbit_latch=debug",
        (false, Mode::Json) => "orbit_latch=info",
        // Keep the redrawn table readable
        (false, Mode::Table) => "orbit_latch=warn",
    };

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()))
        .with_writer(io::stderr)
        .init();
}

/// Why the tick loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Finished,
    Interrupted,
    OutputClosed,
}

/// Step until the run ends, waiting on `pacing` between ticks.
///
/// `shutdown` is pinned once and only polled during the wait, so a signal
/// that lands while a tick is being stepped or emitted is seen at the next
/// wait.
async fn drive<F: Future>(
    sim: &mut Simulation,
    telemetry: &mut dyn TelemetrySink,
    mut pacing: Option<Interval>,
    shutdown: F,
) -> Stop {
    tokio::pin!(shutdown);

    while !sim.is_finished() {
        let snapshot = sim.step();

        if let Err(e) = telemetry.emit(&snapshot) {
            warn!("Telemetry output closed at tick {}: {}", snapshot.tick, e);
            return Stop::OutputClosed;
        }

        if let Some(interval) = pacing.as_mut() {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Interrupted at tick {}", sim.tick());
                    return Stop::Interrupted;
                }
                _ = interval.tick() => {}
            }
        }
    }

    Stop::Finished
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mode = args.mode();
    init_tracing(mode, args.verbose);

    let rng: Box<dyn RandomSource> = match args.seed {
        Some(seed) => {
            info!("Seeded run: {}", seed);
            Box::new(SeededRandom::new(seed))
        }
        None => Box::new(SeededRandom::from_entropy()),
    };

    let sink: Box<dyn AlertSink> = if args.no_log_file {
        Box::new(NullSink)
    } else {
        info!("Mirroring alerts to {:?}", args.log_file);
        Box::new(FileSink::new(&args.log_file))
    };

    let mut sim = Simulation::new(args.sim_config(), rng, sink)?;

    let mut telemetry: Box<dyn TelemetrySink> = match mode {
        Mode::Json => Box::new(JsonLinesSink::new(io::stdout())),
        Mode::Table => {
            println!("Starting ORBIT-LATCH v4.0 Simulation...");
            Box::new(TableSink::new(io::stdout(), true))
        }
    };

    let mut pacing = (args.interval_ms > 0)
        .then(|| time::interval(Duration::from_millis(args.interval_ms)));
    if let Some(interval) = pacing.as_mut() {
        // First tick of a tokio interval completes immediately
        interval.tick().await;
        if mode == Mode::Table {
            interval.tick().await;
        }
    }

    let stop = drive(&mut sim, telemetry.as_mut(), pacing, tokio::signal::ctrl_c()).await;

    telemetry.finish()?;

    // Summary
    let failed = sim.satellites().iter().filter(|s| !s.healthy).count();
    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Ticks run: {}/{} ({:?})", sim.tick(), sim.config().duration_ticks, stop);
    info!("Alerts raised: {}", sim.alerts().len());
    info!("Failed satellites: {}/{}", failed, sim.satellites().len());
    match sim.active_satellite() {
        Some(sat) => info!("Serving satellite: SAT-{} (uptime {})", sat.id, sat.uptime),
        None => info!("Serving satellite: none"),
    }

    Ok(())
}
