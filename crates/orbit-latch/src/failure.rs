//! Random failure injection
//!
//! Rolled once per tick for every satellite that entered the tick healthy,
//! after its physical update. A satellite that overheated earlier in the
//! same tick still rolls.

use crate::alerts::{AlertLevel, AlertLog};
use crate::config::SimConfig;
use crate::connection::ConnectionManager;
use crate::random::RandomSource;
use crate::satellite::Satellite;
use tracing::{debug, warn};

/// Roll for a random failure on satellite `index`.
///
/// Returns true if the satellite failed. Losing the active link this way
/// escalates to an EMERGENCY alert.
pub fn roll(
    index: usize,
    sat: &mut Satellite,
    tick: u64,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
    alerts: &mut AlertLog,
    link: &mut ConnectionManager,
) -> bool {
    if rng.percent() >= config.failure_prob_pct {
        return false;
    }

    sat.shut_down();
    sat.fail_count += 1;
    sat.degrade_reliability();
    debug!(
        "SAT-{} failed (count={}, reliability={:.2})",
        sat.id, sat.fail_count, sat.reliability
    );
    alerts.raise(tick, AlertLevel::Critical, "Satellite failure occurred");

    if link.lose(index) {
        warn!("Active satellite SAT-{} lost at tick {}", sat.id, tick);
        alerts.raise(tick, AlertLevel::Emergency, "Active satellite lost");
    }

    true
}
