//! Connection manager
//!
//! Owns which satellite, if any, serves the terminal. Evaluated once per
//! tick after all satellites have been updated:
//!
//! ```text
//! Connected(s) ──[!healthy || RSSI_pred < 35]──▶ Disconnected
//! Connected(s) ──[otherwise]──▶ Connected(s), uptime += 1
//! Disconnected ──[select_best = s']──▶ Connected(s')
//! Disconnected ──[nothing eligible]──▶ Disconnected
//! ```
//!
//! A disconnect and the following reacquisition happen in the same
//! evaluation, so there is no idle tick between them.

use crate::alerts::{AlertLevel, AlertLog};
use crate::config::HANDOVER_THRESHOLD;
use crate::satellite::Satellite;
use crate::selection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Terminal link state; the index refers to the constellation slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected(usize),
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkEvent {
    /// Active link kept
    Held(usize),
    /// Link acquired from the disconnected state
    Acquired(usize),
    /// Link dropped and a satellite acquired in the same evaluation
    HandedOver { from: usize, to: usize },
    /// Link dropped with nothing to take over
    Dropped(usize),
    /// Still disconnected, nothing eligible
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct ConnectionManager {
    state: LinkState,
    handover_threshold: f64,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::with_threshold(HANDOVER_THRESHOLD)
    }

    pub fn with_threshold(handover_threshold: f64) -> Self {
        Self {
            state: LinkState::Disconnected,
            handover_threshold,
        }
    }

    /// Manager already latched to `index`; the satellite's user count is
    /// expected to include the terminal.
    pub fn connected_to(index: usize) -> Self {
        Self {
            state: LinkState::Connected(index),
            ..Self::new()
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn active(&self) -> Option<usize> {
        match self.state {
            LinkState::Connected(index) => Some(index),
            LinkState::Disconnected => None,
        }
    }

    pub fn handover_threshold(&self) -> f64 {
        self.handover_threshold
    }

    /// Clear the link if `index` is active. Returns whether it was.
    ///
    /// The satellite's users are not touched; the caller has already
    /// released them.
    pub fn lose(&mut self, index: usize) -> bool {
        if self.state == LinkState::Connected(index) {
            self.state = LinkState::Disconnected;
            true
        } else {
            false
        }
    }

    /// Run the disconnect-then-reconnect evaluation once
    pub fn evaluate(
        &mut self,
        tick: u64,
        satellites: &mut [Satellite],
        alerts: &mut AlertLog,
    ) -> LinkEvent {
        let mut dropped = None;

        if let LinkState::Connected(index) = self.state {
            match satellites.get_mut(index) {
                Some(sat) if sat.healthy && sat.predicted_rssi() >= self.handover_threshold => {
                    sat.uptime += 1;
                    return LinkEvent::Held(index);
                }
                Some(sat) => {
                    debug!(
                        "SAT-{} below handover threshold (healthy={}, predicted={:.2})",
                        sat.id,
                        sat.healthy,
                        sat.predicted_rssi()
                    );
                    sat.detach();
                    alerts.raise(tick, AlertLevel::Info, "Predictive handover triggered");
                }
                None => {
                    alerts.raise(tick, AlertLevel::Info, "Predictive handover triggered");
                }
            }
            self.state = LinkState::Disconnected;
            dropped = Some(index);

            debug!(
                "Handover candidates: {}",
                selection::summarize(&selection::rank(satellites), 3)
            );
        }

        match selection::select_best(satellites) {
            Some(next) => {
                let sat = &mut satellites[next];
                sat.attach();
                self.state = LinkState::Connected(next);
                info!("Terminal latched to SAT-{} at tick {}", sat.id, tick);
                alerts.raise(tick, AlertLevel::Info, "User connected to satellite");

                match dropped {
                    Some(from) => LinkEvent::HandedOver { from, to: next },
                    None => LinkEvent::Acquired(next),
                }
            }
            None => {
                alerts.raise(tick, AlertLevel::Warning, "No satellite available");
                match dropped {
                    Some(from) => LinkEvent::Dropped(from),
                    None => LinkEvent::Unavailable,
                }
            }
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
