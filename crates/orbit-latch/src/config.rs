//! Simulation startup constants

use crate::{OrbitLatchError, Result, FAILURE_PROB, MAX_ALERTS, MAX_SATS, MAX_USERS, SIM_DURATION};
use serde::{Deserialize, Serialize};

/// Predicted RSSI below which the active link is handed over
pub const HANDOVER_THRESHOLD: f64 = 35.0;

/// Temperature above which a satellite shuts down (°C)
pub const THERMAL_LIMIT_C: f64 = 80.0;

/// Heating per unit of received signal per tick (°C)
pub const HEATING_PER_RSSI: f64 = 0.005;

/// Orbital advance per tick (rad)
pub const ANGLE_STEP_RAD: f64 = 0.05;

/// How a satellite's orbit radius is chosen for distance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitModel {
    /// Fresh radius on every distance query (legacy behavior)
    #[default]
    ResampledPerQuery,
    /// Radius drawn once when the satellite is created
    FixedPerSatellite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Constellation size
    pub satellites: usize,
    /// Terminal capacity per satellite
    pub max_users: u32,
    /// Alert log capacity
    pub alert_capacity: usize,
    /// Ticks per run
    pub duration_ticks: u64,
    /// Random failure chance per satellite per tick (percent)
    pub failure_prob_pct: u32,
    /// Predictive handover threshold on smoothed RSSI
    pub handover_threshold: f64,
    /// Thermal shutdown limit (°C)
    pub thermal_limit_c: f64,
    /// Heating per unit RSSI per tick (°C)
    pub heating_per_rssi: f64,
    /// Orbital advance per tick (rad)
    pub angle_step_rad: f64,
    pub orbit_model: OrbitModel,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            satellites: MAX_SATS,
            max_users: MAX_USERS,
            alert_capacity: MAX_ALERTS,
            duration_ticks: SIM_DURATION,
            failure_prob_pct: FAILURE_PROB,
            handover_threshold: HANDOVER_THRESHOLD,
            thermal_limit_c: THERMAL_LIMIT_C,
            heating_per_rssi: HEATING_PER_RSSI,
            angle_step_rad: ANGLE_STEP_RAD,
            orbit_model: OrbitModel::default(),
        }
    }
}

impl SimConfig {
    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<()> {
        if self.satellites == 0 {
            return Err(OrbitLatchError::InvalidConfig(
                "constellation needs at least one satellite".to_string(),
            ));
        }
        if self.max_users == 0 {
            return Err(OrbitLatchError::InvalidConfig(
                "max_users must be positive".to_string(),
            ));
        }
        if self.failure_prob_pct > 100 {
            return Err(OrbitLatchError::InvalidConfig(format!(
                "failure_prob_pct {} exceeds 100",
                self.failure_prob_pct
            )));
        }
        for (name, value) in [
            ("handover_threshold", self.handover_threshold),
            ("thermal_limit_c", self.thermal_limit_c),
            ("heating_per_rssi", self.heating_per_rssi),
            ("angle_step_rad", self.angle_step_rad),
        ] {
            if !value.is_finite() {
                return Err(OrbitLatchError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
