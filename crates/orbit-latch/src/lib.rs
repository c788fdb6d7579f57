//! ORBIT-LATCH Constellation Simulator
//!
//! Simulates a small LEO constellation serving one ground terminal and
//! keeps the terminal latched to the best available satellite.
//!
//! # Tick Model
//!
//! ```text
//! weather → satellites (physics, thermal, failure) → connection manager → snapshot
//! ```
//!
//! # Selection Score
//!
//! ```text
//! Score(s) = RSSI_pred · R / (1 + L)
//! ```
//!
//! | Term      | Description |
//! |-----------|-------------|
//! | RSSI_pred | Mean of the oldest and newest signal history samples |
//! | R         | Reliability, 0.1 - 1.0, degraded by each failure |
//! | L         | Load, users / max_users |

use thiserror::Error;

pub mod alerts;
pub mod config;
pub mod connection;
pub mod engine;
pub mod failure;
pub mod physics;
pub mod random;
pub mod satellite;
pub mod selection;
pub mod telemetry;

pub use alerts::{Alert, AlertLevel, AlertLog, AlertSink, FileSink, MemorySink, NullSink};
pub use config::{OrbitModel, SimConfig};
pub use connection::{ConnectionManager, LinkEvent, LinkState};
pub use engine::Simulation;
pub use random::{FixedRandom, RandomSource, SeededRandom};
pub use satellite::{Satellite, SignalHistory};
pub use telemetry::{JsonLinesSink, Snapshot, TableSink, TelemetrySink};

/// Satellites in the default constellation
pub const MAX_SATS: usize = 20;

/// Terminal capacity per satellite
pub const MAX_USERS: u32 = 200;

/// Alert log capacity
pub const MAX_ALERTS: usize = 1000;

/// Ticks in a default run
pub const SIM_DURATION: u64 = 180;

/// Random failure probability per satellite per tick (percent)
pub const FAILURE_PROB: u32 = 5;

/// Signal history window length
pub const RSSI_HISTORY: usize = 5;

/// Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Orbit height band (km)
pub const ORBIT_HEIGHT_MIN_KM: f64 = 400.0;
pub const ORBIT_HEIGHT_MAX_KM: f64 = 2000.0;

/// First satellite id; satellite `i` is `SAT_ID_BASE + i`
pub const SAT_ID_BASE: u32 = 700;

#[derive(Error, Debug)]
pub enum OrbitLatchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OrbitLatchError>;
