use crate::config::PinoutConfig;
use crate::metric::{Accumulator, FieldValue, Fields, Tags};
use crate::parser::{parse_output, ParseError};
use crate::runner::{CommandRunner, HostCommand, RunError};
use log::{debug, error};
use thiserror::Error;

pub const BINARY: &str = "raspi-gpio";
pub const MEASUREMENT: &str = "rpi_pinout";

pub const DESCRIPTION: &str = "Get pinout status on raspberry pi";

pub const SAMPLE_CONFIG: &str = r#"{
  "gpins": [0, 1, 2, 3],
  "interval_secs": 10
}"#;

#[derive(Debug, Error)]
pub enum GatherError {
    #[error(transparent)]
    Command(#[from] RunError),
    #[error("unparseable raspi-gpio output: {0}")]
    Parse(#[from] ParseError),
}

/// Reads pin states through `raspi-gpio get` and turns them into `rpi_pinout` points.
pub struct PinoutCollector<H: HostCommand = CommandRunner> {
    config: PinoutConfig,
    host: H,
}

impl PinoutCollector<CommandRunner> {
    pub fn new(config: PinoutConfig) -> Self {
        Self::with_host(config, CommandRunner::default())
    }
}

impl<H: HostCommand> PinoutCollector<H> {
    /// Constructor for tests/injection with a custom command runner.
    pub fn with_host(config: PinoutConfig, host: H) -> Self {
        Self { config, host }
    }

    /// `["get"]`, plus the configured pins joined by commas when there are any.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["get".to_string()];
        if !self.config.gpins.is_empty() {
            let pins: Vec<String> = self.config.gpins.iter().map(u32::to_string).collect();
            args.push(pins.join(","));
        }
        args
    }

    /// Runs one collection cycle and returns the number of points emitted.
    ///
    /// Nothing is emitted unless the tool ran and its whole output parsed.
    pub fn gather(&self, acc: &mut dyn Accumulator) -> Result<usize, GatherError> {
        let output = self.host.run(BINARY, &self.args()).map_err(|err| {
            error!("{BINARY} failed: {err}");
            err
        })?;

        let banks = parse_output(&output)?;

        let mut emitted = 0;
        for (bank, pins) in &banks {
            for pin in pins {
                let mut tags = Tags::new();
                tags.insert("gpio".to_string(), pin.gpio.to_string());
                if let Some(bank) = bank {
                    tags.insert("bank".to_string(), bank.to_string());
                }

                let mut fields = Fields::new();
                fields.insert("level".to_string(), FieldValue::from(pin.level));
                fields.insert("fsel".to_string(), FieldValue::from(pin.fsel));
                fields.insert("func".to_string(), FieldValue::from(pin.function.as_str()));
                fields.insert("pull".to_string(), FieldValue::from(pin.pull.as_str()));

                acc.add_fields(MEASUREMENT, fields, tags);
                emitted += 1;
            }
        }
        debug!("emitted {emitted} {MEASUREMENT} points from {} bank group(s)", banks.len());
        Ok(emitted)
    }
}
