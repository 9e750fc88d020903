use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const GPINS_ENV: &str = "RPI_PINOUT_GPINS";
pub const INTERVAL_ENV: &str = "RPI_PINOUT_INTERVAL";

const DEFAULT_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinoutConfig {
    /// Pins to query. Empty means every pin.
    #[serde(default)]
    pub gpins: Vec<u32>,
    /// Seconds between collection cycles in the daemon.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl Default for PinoutConfig {
    fn default() -> Self {
        Self {
            gpins: Vec::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl PinoutConfig {
    pub fn with_pins(gpins: Vec<u32>) -> Self {
        Self {
            gpins,
            ..Default::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Reads `RPI_PINOUT_GPINS` (comma separated) and `RPI_PINOUT_INTERVAL`.
    pub fn from_env() -> Result<Self> {
        let mut cfg = PinoutConfig::default();
        if let Ok(raw) = env::var(GPINS_ENV) {
            cfg.gpins = parse_pin_list(&raw).with_context(|| format!("invalid {GPINS_ENV}"))?;
        }
        if let Ok(raw) = env::var(INTERVAL_ENV) {
            cfg.interval_secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid {INTERVAL_ENV}: {raw:?}"))?;
        }
        Ok(cfg)
    }
}

pub fn parse_pin_list(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().with_context(|| format!("bad pin number {s:?}")))
        .collect()
}
