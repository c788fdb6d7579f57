//! Telemetry snapshots and sinks
//!
//! A [`Snapshot`] is an owned copy of the state after a tick's connection
//! evaluation; sinks never see live simulation state.
//!
//! JSON wire shape (one object per line in streaming mode):
//!
//! ```text
//! {"time":1,"weather":1.0,"active_sat":704,
//!  "sats":[{"id":700,"health":1,"dist":6771.0,"rssi":0.18,"load":0,"snr":0.06,
//!           "temp":30.0,"rel":1.0,"up":0,"fail":0,"score":0.18}, ...],
//!  "alerts":[{"time":1,"level":"INFO","msg":"User connected to satellite"}]}
//! ```

use crate::alerts::{Alert, AlertLevel};
use crate::satellite::Satellite;
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::Write;

/// Console banner for human-readable frames
pub const BANNER: &str = "ORBIT-LATCH v4.0 :: SATELLITE HANDOVER SIMULATION";

/// ANSI clear-screen and cursor-home
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

fn round2<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

/// `None` travels as `-1`
mod sentinel_id {
    use super::*;

    pub fn serialize<S: Serializer>(
        id: &Option<u32>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_i64(*id as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<u32>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(u32::try_from(raw).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteRecord {
    pub id: u32,
    /// 1 = healthy, 0 = failed
    pub health: u8,
    #[serde(rename = "dist", serialize_with = "round2")]
    pub distance_km: f64,
    #[serde(serialize_with = "round2")]
    pub rssi: f64,
    /// users * 100 / max_users
    #[serde(rename = "load")]
    pub load_pct: u32,
    #[serde(serialize_with = "round2")]
    pub snr: f64,
    #[serde(rename = "temp", serialize_with = "round2")]
    pub temperature_c: f64,
    #[serde(rename = "rel", serialize_with = "round2")]
    pub reliability: f64,
    #[serde(rename = "up")]
    pub uptime: u64,
    #[serde(rename = "fail")]
    pub fail_count: u32,
    #[serde(serialize_with = "round2")]
    pub score: f64,
}

impl From<&Satellite> for SatelliteRecord {
    fn from(sat: &Satellite) -> Self {
        Self {
            id: sat.id,
            health: u8::from(sat.healthy),
            distance_km: sat.distance_km,
            rssi: sat.rssi,
            load_pct: sat.load_pct(),
            snr: sat.snr,
            temperature_c: sat.temperature_c,
            reliability: sat.reliability,
            uptime: sat.uptime,
            fail_count: sat.fail_count,
            score: sat.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "time")]
    pub tick: u64,
    pub level: AlertLevel,
    #[serde(rename = "msg")]
    pub message: String,
}

impl From<&Alert> for AlertRecord {
    fn from(alert: &Alert) -> Self {
        Self {
            tick: alert.tick(),
            level: alert.level(),
            message: alert.message().to_string(),
        }
    }
}

/// Post-tick state handed to telemetry consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "time")]
    pub tick: u64,
    #[serde(rename = "weather", serialize_with = "round2")]
    pub weather_factor: f64,
    /// Id of the serving satellite
    #[serde(with = "sentinel_id")]
    pub active_sat: Option<u32>,
    #[serde(rename = "sats")]
    pub satellites: Vec<SatelliteRecord>,
    /// Every alert raised so far, oldest first
    pub alerts: Vec<AlertRecord>,
}

impl Snapshot {
    pub fn capture(
        tick: u64,
        weather_factor: f64,
        active_sat: Option<u32>,
        satellites: &[Satellite],
        alerts: &[Alert],
    ) -> Self {
        Self {
            tick,
            weather_factor,
            active_sat,
            satellites: satellites.iter().map(SatelliteRecord::from).collect(),
            alerts: alerts.iter().map(AlertRecord::from).collect(),
        }
    }

    /// Display state for a satellite row
    pub fn state_label(&self, record: &SatelliteRecord) -> &'static str {
        if self.active_sat == Some(record.id) {
            "CONNECTED"
        } else if record.health == 0 {
            "FAILED"
        } else {
            "STANDBY"
        }
    }

    /// Human-readable console frame
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        out.push_str(BANNER);
        out.push('\n');
        out.push_str(&format!(
            "TIME {:02}:{:02} | SPACE WEATHER {:.1}x\n\n",
            self.tick / 60,
            self.tick % 60,
            self.weather_factor
        ));
        out.push_str(&format!(
            "{:<5} {:<10} {:>9} {:>6} {:>5} {:>6} {:>6} {:>5} {:>5} {:>4} {:>6}\n",
            "ID", "STATE", "DIST(km)", "RSSI", "LOAD", "SNR", "TEMP", "REL", "UP", "FAIL", "SCORE"
        ));
        out.push_str(&"-".repeat(78));
        out.push('\n');

        for sat in &self.satellites {
            out.push_str(&format!(
                "{:<5} {:<10} {:>9.1} {:>6.1} {:>4}% {:>6.1} {:>6.1} {:>5.2} {:>5} {:>4} {:>6.1}\n",
                sat.id,
                self.state_label(sat),
                sat.distance_km,
                sat.rssi,
                sat.load_pct,
                sat.snr,
                sat.temperature_c,
                sat.reliability,
                sat.uptime,
                sat.fail_count,
                sat.score
            ));
        }

        out.push_str("\nALERT HISTORY (All):\n");
        out.push_str(&"-".repeat(27));
        out.push('\n');
        if self.alerts.is_empty() {
            out.push_str("NO ACTIVE ALERTS\n");
        }
        for alert in &self.alerts {
            out.push_str(&format!(
                "[{:04}s] {:<10} {}\n",
                alert.tick, alert.level, alert.message
            ));
        }

        out
    }
}

/// Consumer of per-tick snapshots
pub trait TelemetrySink {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Called once after the last tick
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One JSON object per line, flushed per tick
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TelemetrySink for JsonLinesSink<W> {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Redrawn console table
pub struct TableSink<W: Write> {
    writer: W,
    clear_screen: bool,
}

impl<W: Write> TableSink<W> {
    pub fn new(writer: W, clear_screen: bool) -> Self {
        Self {
            writer,
            clear_screen,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TelemetrySink for TableSink<W> {
    fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        if self.clear_screen {
            self.writer.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.writer.write_all(snapshot.render_table().as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
