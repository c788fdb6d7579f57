//! Satellite scoring and selection
//!
//! Score(s) = RSSI_pred · R / (1 + L)
//!
//! The `1 + L` divisor is a soft capacity penalty; full satellites are
//! excluded outright by the eligibility gate.

use crate::satellite::Satellite;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scoring breakdown for one eligible satellite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredSatellite {
    /// Constellation index
    pub index: usize,
    pub id: u32,
    pub score: f64,
    pub predicted_rssi: f64,
    pub reliability: f64,
    pub load: f64,
}

/// Selection score for a satellite, regardless of eligibility
pub fn score(sat: &Satellite) -> f64 {
    sat.predicted_rssi() * sat.reliability / (1.0 + sat.load())
}

/// Pick the best eligible satellite.
///
/// Records the score on every eligible satellite. A later candidate must
/// strictly beat the best so far, so ties go to the lowest index.
pub fn select_best(satellites: &mut [Satellite]) -> Option<usize> {
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;

    for (index, sat) in satellites.iter_mut().enumerate() {
        if !sat.is_eligible() {
            continue;
        }

        sat.score = score(sat);

        if sat.score > best_score {
            best_score = sat.score;
            best = Some(index);
        }
    }

    if let Some(index) = best {
        debug!(
            "Best satellite SAT-{} (score={:.3})",
            satellites[index].id, best_score
        );
    }

    best
}

/// Eligible satellites by descending score; ties keep constellation order
pub fn rank(satellites: &[Satellite]) -> Vec<ScoredSatellite> {
    let mut ranked: Vec<ScoredSatellite> = satellites
        .iter()
        .enumerate()
        .filter(|(_, sat)| sat.is_eligible())
        .map(|(index, sat)| ScoredSatellite {
            index,
            id: sat.id,
            score: score(sat),
            predicted_rssi: sat.predicted_rssi(),
            reliability: sat.reliability,
            load: sat.load(),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

/// Compact `SAT-<id>=<score>` list of the first `limit` ranked entries
pub fn summarize(ranked: &[ScoredSatellite], limit: usize) -> String {
    if ranked.is_empty() {
        return "none".to_string();
    }

    ranked
        .iter()
        .take(limit)
        .map(|r| format!("SAT-{}={:.2}", r.id, r.score))
        .collect::<Vec<_>>()
        .join(", ")
}
