use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Daemon health and collection counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorHealth {
    /// Daemon uptime in seconds
    pub uptime_secs: u64,
    /// Collection cycles attempted
    pub cycles: u64,
    /// Cycles that ended in an error
    pub errors: u64,
    /// Last error message (if any)
    pub last_error: Option<String>,
    /// Points emitted across all successful cycles
    pub points_emitted: u64,
}

/// Health tracker for the collection loop
pub struct HealthTracker {
    start_time: Instant,
    cycles: u64,
    errors: u64,
    last_error: Option<String>,
    points_emitted: u64,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            errors: 0,
            last_error: None,
            points_emitted: 0,
        }
    }

    pub fn record_success(&mut self, points: usize) {
        self.cycles += 1;
        self.points_emitted += points as u64;
    }

    pub fn record_error(&mut self, error: String) {
        self.cycles += 1;
        self.errors += 1;
        self.last_error = Some(error);
    }

    pub fn get_health(&self) -> CollectorHealth {
        CollectorHealth {
            uptime_secs: self.start_time.elapsed().as_secs(),
            cycles: self.cycles,
            errors: self.errors,
            last_error: self.last_error.clone(),
            points_emitted: self.points_emitted,
        }
    }
}
