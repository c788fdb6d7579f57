//! Alert log
//!
//! Bounded, append-only record of domain events. Each accepted alert is
//! kept in memory and mirrored, best effort, to an [`AlertSink`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Longest alert message kept; longer text is truncated
pub const MAX_MESSAGE_LEN: usize = 139;

/// Default persistent log file
pub const DEFAULT_LOG_FILE: &str = "orbit_latch.log";

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A raised alert. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    level: AlertLevel,
    message: String,
    tick: u64,
}

impl Alert {
    pub fn new(level: AlertLevel, message: &str, tick: u64) -> Self {
        Self {
            level,
            message: message.chars().take(MAX_MESSAGE_LEN).collect(),
            tick,
        }
    }

    pub fn level(&self) -> AlertLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Persistent log line: `[0042s] CRITICAL   Satellite failure occurred`
    pub fn log_line(&self) -> String {
        format!("[{:04}s] {:<10} {}", self.tick, self.level, self.message)
    }
}

/// Persistence target for alert lines
pub trait AlertSink: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Appends to a text file, reopening it for every line
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlertSink for FileSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

/// Collects lines in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl AlertSink for MemorySink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink poisoned"))?
            .push(line.to_string());
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AlertSink for NullSink {
    fn write_line(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Bounded alert log
pub struct AlertLog {
    entries: Vec<Alert>,
    capacity: usize,
    sink: Box<dyn AlertSink>,
}

impl AlertLog {
    pub fn new(capacity: usize, sink: Box<dyn AlertSink>) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.min(crate::MAX_ALERTS)),
            capacity,
            sink,
        }
    }

    /// In-memory only log
    pub fn unpersisted(capacity: usize) -> Self {
        Self::new(capacity, Box::new(NullSink))
    }

    /// Record an alert at `tick`.
    ///
    /// Dropped without notice once the log is full. Sink failures are
    /// logged and swallowed; the in-memory entry is kept regardless.
    pub fn raise(&mut self, tick: u64, level: AlertLevel, message: &str) {
        if self.is_full() {
            return;
        }

        let alert = Alert::new(level, message, tick);
        if let Err(e) = self.sink.write_line(&alert.log_line()) {
            warn!("Alert sink write failed: {}", e);
        }
        self.entries.push(alert);
    }

    pub fn entries(&self) -> &[Alert] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Alerts raised at a given tick
    pub fn at_tick(&self, tick: u64) -> impl Iterator<Item = &Alert> {
        self.entries.iter().filter(move |a| a.tick == tick)
    }
}

impl fmt::Debug for AlertLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertLog")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl AlertSink for BrokenSink {
        fn write_line(&mut self, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn test_log_line_format() {
        let alert = Alert::new(AlertLevel::Critical, "Satellite failure occurred", 42);
        assert_eq!(alert.log_line(), "[0042s] CRITICAL   Satellite failure occurred");

        let alert = Alert::new(AlertLevel::Emergency, "Active satellite lost", 12345);
        assert_eq!(alert.log_line(), "[12345s] EMERGENCY  Active satellite lost");
    }

    #[test]
    fn test_message_truncated() {
        let long = "x".repeat(500);
        let alert = Alert::new(AlertLevel::Info, &long, 1);
        assert_eq!(alert.message().len(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_capacity_drops_overflow() {
        let sink = MemorySink::new();
        let mut log = AlertLog::new(3, Box::new(sink.clone()));

        for tick in 0..5 {
            log.raise(tick, AlertLevel::Warning, "No satellite available");
        }

        assert_eq!(log.len(), 3);
        assert!(log.is_full());
        assert_eq!(log.entries()[2].tick(), 2);
        assert_eq!(sink.lines().len(), 3);
    }

    #[test]
    fn test_sink_failure_still_records() {
        let mut log = AlertLog::new(10, Box::new(BrokenSink));
        log.raise(7, AlertLevel::Info, "User connected to satellite");

        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].message(), "User connected to satellite");
    }

    #[test]
    fn test_level_serializes_uppercase() {
        let json = serde_json::to_string(&AlertLevel::Emergency).unwrap();
        assert_eq!(json, "\"EMERGENCY\"");
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orbit_latch.log");
        let mut log = AlertLog::new(10, Box::new(FileSink::new(&path)));

        log.raise(1, AlertLevel::Info, "User connected to satellite");
        log.raise(2, AlertLevel::Info, "Predictive handover triggered");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[0001s] INFO       User connected to satellite",
                "[0002s] INFO       Predictive handover triggered",
            ]
        );
    }

    #[test]
    fn test_file_sink_missing_directory_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("orbit_latch.log");
        let mut log = AlertLog::new(10, Box::new(FileSink::new(path)));

        log.raise(3, AlertLevel::Critical, "Thermal overload detected");
        assert_eq!(log.len(), 1);
    }
}
