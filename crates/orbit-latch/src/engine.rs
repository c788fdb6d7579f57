//! Tick driver
//!
//! Owns the whole simulation state and advances it in a fixed phase order:
//!
//! 1. resample space weather
//! 2. update satellites by ascending index (physics, thermal, failure)
//! 3. connection manager disconnect-then-reconnect evaluation
//! 4. snapshot

use crate::alerts::{AlertLog, AlertSink};
use crate::config::SimConfig;
use crate::connection::{ConnectionManager, LinkEvent};
use crate::failure;
use crate::physics;
use crate::random::RandomSource;
use crate::satellite::Satellite;
use crate::telemetry::{Snapshot, TelemetrySink};
use crate::{OrbitLatchError, Result};
use tracing::{debug, info};

pub struct Simulation {
    config: SimConfig,
    tick: u64,
    weather_factor: f64,
    satellites: Vec<Satellite>,
    alerts: AlertLog,
    link: ConnectionManager,
    last_event: Option<LinkEvent>,
    rng: Box<dyn RandomSource>,
}

impl Simulation {
    /// Build a fresh constellation from `config`
    pub fn new(
        config: SimConfig,
        mut rng: Box<dyn RandomSource>,
        sink: Box<dyn AlertSink>,
    ) -> Result<Self> {
        config.validate()?;

        let satellites = (0..config.satellites)
            .map(|index| Satellite::spawn(index, &config, rng.as_mut()))
            .collect();

        Self::with_satellites(config, satellites, rng, sink)
    }

    /// Start from a prepared constellation
    ///
    /// `config.satellites` is overwritten with the constellation size.
    pub fn with_satellites(
        mut config: SimConfig,
        satellites: Vec<Satellite>,
        rng: Box<dyn RandomSource>,
        sink: Box<dyn AlertSink>,
    ) -> Result<Self> {
        if satellites.is_empty() {
            return Err(OrbitLatchError::InvalidConfig(
                "constellation needs at least one satellite".to_string(),
            ));
        }
        config.satellites = satellites.len();
        config.validate()?;

        info!(
            "Constellation ready: {} satellites, {} ticks",
            satellites.len(),
            config.duration_ticks
        );

        Ok(Self {
            link: ConnectionManager::with_threshold(config.handover_threshold),
            alerts: AlertLog::new(config.alert_capacity, sink),
            config,
            tick: 0,
            weather_factor: physics::WEATHER_CLEAR,
            satellites,
            last_event: None,
            rng,
        })
    }

    /// Advance one tick and return the resulting snapshot
    pub fn step(&mut self) -> Snapshot {
        self.tick += 1;
        let tick = self.tick;

        self.weather_factor = physics::weather_tick(self.rng.as_mut());

        for (index, sat) in self.satellites.iter_mut().enumerate() {
            let was_healthy = sat.healthy;
            sat.advance(
                tick,
                self.weather_factor,
                &self.config,
                self.rng.as_mut(),
                &mut self.alerts,
            );
            if was_healthy {
                failure::roll(
                    index,
                    sat,
                    tick,
                    &self.config,
                    self.rng.as_mut(),
                    &mut self.alerts,
                    &mut self.link,
                );
            }
        }

        let event = self.link.evaluate(tick, &mut self.satellites, &mut self.alerts);
        self.last_event = Some(event);

        debug!(
            "Tick {} weather={:.1} event={:?} alerts={}",
            tick,
            self.weather_factor,
            event,
            self.alerts.len()
        );

        self.snapshot()
    }

    /// Step until the configured duration, emitting every snapshot
    pub fn run(&mut self, telemetry: &mut dyn TelemetrySink) -> Result<()> {
        while !self.is_finished() {
            let snapshot = self.step();
            telemetry.emit(&snapshot)?;
        }
        telemetry.finish()
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.config.duration_ticks
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> Snapshot {
        let active_id = self.link.active().map(|index| self.satellites[index].id);
        Snapshot::capture(
            self.tick,
            self.weather_factor,
            active_id,
            &self.satellites,
            self.alerts.entries(),
        )
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn weather_factor(&self) -> f64 {
        self.weather_factor
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn link(&self) -> &ConnectionManager {
        &self.link
    }

    /// Outcome of the most recent connection evaluation
    pub fn last_event(&self) -> Option<LinkEvent> {
        self.last_event
    }

    /// Currently serving satellite
    pub fn active_satellite(&self) -> Option<&Satellite> {
        self.link.active().map(|index| &self.satellites[index])
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertLevel, NullSink};
    use crate::random::{FixedRandom, SeededRandom};
    use std::f64::consts::FRAC_PI_2;

    fn seeded(seed: u64) -> Simulation {
        Simulation::new(
            SimConfig::default(),
            Box::new(SeededRandom::new(seed)),
            Box::new(NullSink),
        )
        .unwrap()
    }

    #[test]
    fn test_new_builds_constellation() {
        let sim = seeded(1);
        assert_eq!(sim.satellites().len(), 20);
        assert_eq!(sim.satellites()[0].id, 700);
        assert_eq!(sim.satellites()[19].id, 719);
        assert_eq!(sim.tick(), 0);
        assert!(sim.alerts().is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimConfig {
            max_users: 0,
            ..SimConfig::default()
        };
        let result = Simulation::new(config, Box::new(FixedRandom::calm()), Box::new(NullSink));
        assert!(result.is_err());
    }

    #[test]
    fn test_step_advances_tick() {
        let mut sim = seeded(2);
        let snapshot = sim.step();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(sim.tick(), 1);
        assert_eq!(snapshot.satellites.len(), 20);
        assert!(sim.last_event().is_some());
    }

    #[test]
    fn test_run_stops_at_duration() {
        struct Counter(u64);
        impl TelemetrySink for Counter {
            fn emit(&mut self, _snapshot: &Snapshot) -> Result<()> {
                self.0 += 1;
                Ok(())
            }
        }

        let mut sim = seeded(3);
        let mut counter = Counter(0);
        sim.run(&mut counter).unwrap();

        assert_eq!(counter.0, 180);
        assert!(sim.is_finished());
    }

    #[test]
    fn test_hostile_tick_fails_everything() {
        let mut sim = Simulation::new(
            SimConfig {
                satellites: 3,
                ..SimConfig::default()
            },
            Box::new(FixedRandom::hostile()),
            Box::new(NullSink),
        )
        .unwrap();

        let snapshot = sim.step();

        assert_eq!(snapshot.weather_factor, physics::WEATHER_DEGRADED);
        assert!(sim.satellites().iter().all(|s| !s.healthy && s.fail_count == 1));
        assert_eq!(snapshot.active_sat, None);
        let levels: Vec<_> = sim.alerts().entries().iter().map(|a| a.level()).collect();
        assert_eq!(
            levels,
            vec![
                AlertLevel::Critical,
                AlertLevel::Critical,
                AlertLevel::Critical,
                AlertLevel::Warning,
            ]
        );
    }

    #[test]
    fn test_config_tracks_prepared_constellation() {
        let config = SimConfig::default();
        let sats: Vec<Satellite> = (0..3)
            .map(|i| Satellite::spawn(i, &config, &mut FixedRandom::calm()))
            .collect();

        let sim = Simulation::with_satellites(
            config,
            sats,
            Box::new(FixedRandom::calm()),
            Box::new(NullSink),
        )
        .unwrap();

        assert_eq!(sim.config().satellites, 3);
        assert_eq!(sim.satellites().len(), 3);
    }

    #[test]
    fn test_rejects_empty_constellation() {
        let result = Simulation::with_satellites(
            SimConfig::default(),
            Vec::new(),
            Box::new(FixedRandom::calm()),
            Box::new(NullSink),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_overheated_satellite_still_rolls_same_tick() {
        let config = SimConfig::default();
        let mut sat = Satellite::spawn(0, &config, &mut FixedRandom::calm());
        sat.angle = FRAC_PI_2 - config.angle_step_rad;
        sat.temperature_c = 80.6;

        let mut sim = Simulation::with_satellites(
            config,
            vec![sat],
            Box::new(FixedRandom::new(0, 0.5)),
            Box::new(NullSink),
        )
        .unwrap();

        sim.step();

        let messages: Vec<_> = sim
            .alerts()
            .entries()
            .iter()
            .map(|a| (a.level(), a.message()))
            .collect();
        assert_eq!(
            messages,
            vec![
                (AlertLevel::Critical, "Thermal overload detected"),
                (AlertLevel::Critical, "Satellite failure occurred"),
                (AlertLevel::Warning, "No satellite available"),
            ]
        );
        let sat = &sim.satellites()[0];
        assert!(!sat.healthy);
        assert_eq!(sat.fail_count, 1);
        assert!((sat.reliability - 0.9).abs() < 1e-12);

        // Failed satellites are frozen and never roll again
        sim.step();
        assert_eq!(sim.satellites()[0].fail_count, 1);
        assert_eq!(sim.alerts().len(), 4);
    }
}
