//! Satellite state model
//!
//! One mutable record per constellation slot, advanced once per tick from
//! the physical model. Unhealthy satellites are frozen: failures are
//! permanent within a run.

use crate::alerts::{AlertLevel, AlertLog};
use crate::config::{OrbitModel, SimConfig};
use crate::physics;
use crate::random::RandomSource;
use crate::{RSSI_HISTORY, SAT_ID_BASE};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::debug;

/// Reliability never drops below this
pub const RELIABILITY_FLOOR: f64 = 0.1;

/// Reliability lost per random failure
pub const RELIABILITY_PENALTY: f64 = 0.1;

/// Starting temperature before the per-satellite spread (°C)
const BASE_TEMPERATURE_C: f64 = 25.0;

/// Fixed-length RSSI window, oldest sample first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalHistory {
    samples: [f64; RSSI_HISTORY],
}

impl SignalHistory {
    /// Window with every slot set to `rssi`
    pub fn filled(rssi: f64) -> Self {
        Self {
            samples: [rssi; RSSI_HISTORY],
        }
    }

    pub fn from_samples(samples: [f64; RSSI_HISTORY]) -> Self {
        Self { samples }
    }

    /// Shift left by one and append `rssi` as the newest sample
    pub fn push(&mut self, rssi: f64) {
        self.samples.copy_within(1.., 0);
        self.samples[RSSI_HISTORY - 1] = rssi;
    }

    pub fn oldest(&self) -> f64 {
        self.samples[0]
    }

    pub fn newest(&self) -> f64 {
        self.samples[RSSI_HISTORY - 1]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        RSSI_HISTORY
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Smoothed estimate used for handover decisions
    pub fn predicted(&self) -> f64 {
        physics::predicted_rssi(&self.samples)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: u32,
    /// Orbital position (rad), in [0, 2π)
    pub angle: f64,
    /// Radius drawn at creation; only used by `OrbitModel::FixedPerSatellite`
    pub orbit_radius_km: f64,
    pub distance_km: f64,
    pub rssi: f64,
    pub snr: f64,
    pub temperature_c: f64,
    pub signal_history: SignalHistory,
    /// 0.1 - 1.0, only ever decreases
    pub reliability: f64,
    /// Last selection score (advisory)
    pub score: f64,
    pub users: u32,
    pub max_users: u32,
    /// Ticks since this satellite last became the active link
    pub uptime: u64,
    pub fail_count: u32,
    pub healthy: bool,
}

impl Satellite {
    /// Create the satellite for constellation slot `index`
    pub fn spawn(index: usize, config: &SimConfig, rng: &mut dyn RandomSource) -> Self {
        let angle = rng.unit() * TAU;
        let temperature_c = BASE_TEMPERATURE_C + (rng.unit() * 10.0).floor();
        let orbit_radius_km = physics::sample_orbit_radius(rng);

        let mut sat = Self {
            id: SAT_ID_BASE + index as u32,
            angle,
            orbit_radius_km,
            distance_km: 0.0,
            rssi: 0.0,
            snr: 0.0,
            temperature_c,
            signal_history: SignalHistory::filled(0.0),
            reliability: 1.0,
            score: 0.0,
            users: 0,
            max_users: config.max_users,
            uptime: 0,
            fail_count: 0,
            healthy: true,
        };

        sat.distance_km = sat.measure_distance(config.orbit_model, rng);
        sat.rssi = physics::rssi(sat.distance_km, physics::WEATHER_CLEAR);
        sat.signal_history = SignalHistory::filled(sat.rssi);
        sat.score = sat.rssi;
        sat
    }

    fn measure_distance(&self, model: OrbitModel, rng: &mut dyn RandomSource) -> f64 {
        match model {
            OrbitModel::ResampledPerQuery => physics::distance(self.angle, rng),
            OrbitModel::FixedPerSatellite => {
                physics::projected_distance(self.orbit_radius_km, self.angle)
            }
        }
    }

    /// Advance one tick: move, re-measure, heat up, check thermal limit.
    ///
    /// No-op for an unhealthy satellite.
    pub fn advance(
        &mut self,
        tick: u64,
        weather_factor: f64,
        config: &SimConfig,
        rng: &mut dyn RandomSource,
        alerts: &mut AlertLog,
    ) {
        if !self.healthy {
            return;
        }

        self.angle = (self.angle + config.angle_step_rad).rem_euclid(TAU);

        self.distance_km = self.measure_distance(config.orbit_model, rng);
        self.rssi = physics::rssi(self.distance_km, weather_factor);
        self.snr = physics::snr(self.rssi);

        self.signal_history.push(self.rssi);

        self.temperature_c += self.rssi * config.heating_per_rssi;

        if self.temperature_c > config.thermal_limit_c {
            debug!(
                "SAT-{} thermal overload at {:.2}°C (tick {})",
                self.id, self.temperature_c, tick
            );
            self.shut_down();
            alerts.raise(tick, AlertLevel::Critical, "Thermal overload detected");
        }
    }

    /// Mark unhealthy and release every user
    pub fn shut_down(&mut self) {
        self.healthy = false;
        self.users = 0;
    }

    /// Apply one failure's reliability penalty, floored at 0.1
    pub fn degrade_reliability(&mut self) {
        self.reliability = (self.reliability - RELIABILITY_PENALTY).max(RELIABILITY_FLOOR);
    }

    pub fn predicted_rssi(&self) -> f64 {
        self.signal_history.predicted()
    }

    /// Fraction of capacity in use
    pub fn load(&self) -> f64 {
        if self.max_users == 0 {
            return 1.0;
        }
        self.users as f64 / self.max_users as f64
    }

    /// Integer load percentage, as reported in telemetry
    pub fn load_pct(&self) -> u32 {
        if self.max_users == 0 {
            return 100;
        }
        self.users * 100 / self.max_users
    }

    pub fn has_capacity(&self) -> bool {
        self.users < self.max_users
    }

    /// Healthy with a free capacity slot
    pub fn is_eligible(&self) -> bool {
        self.healthy && self.has_capacity()
    }

    /// Take one capacity slot for the terminal and restart uptime
    pub fn attach(&mut self) {
        self.users = (self.users + 1).min(self.max_users);
        self.uptime = 0;
    }

    /// Release one capacity slot, floored at zero
    pub fn detach(&mut self) {
        self.users = self.users.saturating_sub(1);
    }
}
