//! Physical model
//!
//! Simplified link geometry: a satellite's orbital angle is projected onto
//! the ground terminal's line of sight, and received signal falls off with
//! the inverse of that distance.
//!
//! ```text
//! d    = r · |cos θ|                     r ∈ [R⊕ + 400, R⊕ + 2000) km
//! RSSI = min(100, 1200 / max(d, 1) · W)  W ∈ {0.8, 1.0}
//! ```

use crate::random::RandomSource;
use crate::{EARTH_RADIUS_KM, ORBIT_HEIGHT_MAX_KM, ORBIT_HEIGHT_MIN_KM};

/// Path-loss numerator of the inverse-distance model
const PATH_LOSS_CONSTANT: f64 = 1200.0;

/// Signal saturation ceiling
pub const RSSI_CEILING: f64 = 100.0;

/// Distance floor guarding the 1/d singularity (km)
pub const MIN_DISTANCE_KM: f64 = 1.0;

/// Space weather factor on a degraded tick
pub const WEATHER_DEGRADED: f64 = 0.8;

/// Space weather factor on a clear tick
pub const WEATHER_CLEAR: f64 = 1.0;

/// Chance of degraded weather per tick (percent)
pub const WEATHER_DEGRADED_PROB: u32 = 20;

/// Draw an orbit radius uniformly from the LEO band (km)
pub fn sample_orbit_radius(rng: &mut dyn RandomSource) -> f64 {
    EARTH_RADIUS_KM
        + ORBIT_HEIGHT_MIN_KM
        + rng.unit() * (ORBIT_HEIGHT_MAX_KM - ORBIT_HEIGHT_MIN_KM)
}

/// Line-of-sight distance for a known orbit radius (km)
pub fn projected_distance(radius_km: f64, angle: f64) -> f64 {
    radius_km * angle.cos().abs()
}

/// Distance to the terminal with a freshly drawn orbit radius (km)
///
/// The radius is resampled on every call, so two queries at the same angle
/// generally disagree.
pub fn distance(angle: f64, rng: &mut dyn RandomSource) -> f64 {
    projected_distance(sample_orbit_radius(rng), angle)
}

/// Received signal strength for a distance under the given weather
pub fn rssi(distance_km: f64, weather_factor: f64) -> f64 {
    let d = distance_km.max(MIN_DISTANCE_KM);
    (PATH_LOSS_CONSTANT / d * weather_factor).min(RSSI_CEILING)
}

pub fn snr(rssi: f64) -> f64 {
    rssi / 3.0
}

/// Resample the global space weather factor
pub fn weather_tick(rng: &mut dyn RandomSource) -> f64 {
    if rng.percent() < WEATHER_DEGRADED_PROB {
        WEATHER_DEGRADED
    } else {
        WEATHER_CLEAR
    }
}

/// Two-point smoothed signal estimate: mean of oldest and newest samples
pub fn predicted_rssi(history: &[f64]) -> f64 {
    match (history.first(), history.last()) {
        (Some(oldest), Some(newest)) => (oldest + newest) / 2.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;
    use std::f64::consts::PI;

    #[test]
    fn test_distance_band() {
        let mut low = FixedRandom::new(50, 0.0);
        let d = distance(0.0, &mut low);
        assert!((d - 6771.0).abs() < 1e-9);

        let mut high = FixedRandom::new(50, 0.999_999);
        let d = distance(PI, &mut high);
        assert!(d < 8371.0 && d > 8370.0);
    }

    #[test]
    fn test_distance_near_quadrature_is_small() {
        let mut rng = FixedRandom::calm();
        assert!(distance(PI / 2.0, &mut rng) < 1e-6);
    }

    #[test]
    fn test_rssi_saturates() {
        assert_eq!(rssi(1.0, 1.0), RSSI_CEILING);
        assert_eq!(rssi(0.0, 1.0), RSSI_CEILING);
        assert_eq!(rssi(-5.0, 0.8), RSSI_CEILING);
    }

    #[test]
    fn test_rssi_inverse_distance() {
        assert!((rssi(24.0, 1.0) - 50.0).abs() < 1e-9);
        assert!((rssi(24.0, 0.8) - 40.0).abs() < 1e-9);
        assert!((rssi(6771.0, 1.0) - 1200.0 / 6771.0).abs() < 1e-9);
    }

    #[test]
    fn test_weather_tick() {
        assert_eq!(weather_tick(&mut FixedRandom::new(19, 0.5)), WEATHER_DEGRADED);
        assert_eq!(weather_tick(&mut FixedRandom::new(20, 0.5)), WEATHER_CLEAR);
    }

    #[test]
    fn test_predicted_rssi_uses_endpoints() {
        assert_eq!(predicted_rssi(&[10.0, 99.0, 99.0, 99.0, 30.0]), 20.0);
        assert_eq!(predicted_rssi(&[]), 0.0);
    }
}
