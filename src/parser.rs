use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::ParseIntError;
use thiserror::Error;

/// State of a single pin as reported by one `raspi-gpio get` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinStatus {
    pub gpio: u32,
    pub level: u32,
    pub fsel: u32,
    pub function: String,
    /// Usually `UP`, `DOWN` or `NONE`; passed through verbatim.
    pub pull: String,
}

/// Pins grouped by bank. `None` collects pins seen before any `BANK` header.
pub type BankGrouping = BTreeMap<Option<u32>, Vec<PinStatus>>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid bank number in {line:?}: {source}")]
    Bank {
        line: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid {field} in {line:?}: {source}")]
    Field {
        field: &'static str,
        line: String,
        #[source]
        source: ParseIntError,
    },
}

static BANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^BANK(\d+)").unwrap());
static GPIO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^GPIO (\d+): level=(\d+) fsel=(\d+).*func=([0-9A-Za-z_]+) pull=([0-9A-Za-z]+)")
        .unwrap()
});

/// Parses the full output of `raspi-gpio get`.
///
/// Lines matching neither the bank header nor the pin pattern are skipped.
/// Numeric text that matches the pattern but does not fit a `u32` is an error.
pub fn parse_output(input: &str) -> Result<BankGrouping, ParseError> {
    let mut grouping = BankGrouping::new();
    let mut bank = None;

    for line in input.split('\n') {
        if let Some(caps) = BANK_RE.captures(line) {
            let id = caps[1].parse::<u32>().map_err(|source| ParseError::Bank {
                line: line.to_string(),
                source,
            })?;
            bank = Some(id);
        } else if let Some(caps) = GPIO_RE.captures(line) {
            let status = PinStatus {
                gpio: parse_field(line, "gpio", &caps[1])?,
                level: parse_field(line, "level", &caps[2])?,
                fsel: parse_field(line, "fsel", &caps[3])?,
                function: caps[4].to_string(),
                pull: caps[5].to_string(),
            };
            grouping.entry(bank).or_default().push(status);
        }
    }

    Ok(grouping)
}

fn parse_field(line: &str, field: &'static str, raw: &str) -> Result<u32, ParseError> {
    raw.parse::<u32>().map_err(|source| ParseError::Field {
        field,
        line: line.to_string(),
        source,
    })
}
