use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Str(String),
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

pub type Fields = BTreeMap<String, FieldValue>;
pub type Tags = BTreeMap<String, String>;

/// A single timestamped point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub tags: Tags,
    pub fields: Fields,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn new(name: &str, fields: Fields, tags: Tags) -> Self {
        Self {
            name: name.to_string(),
            tags,
            fields,
            timestamp: Utc::now(),
        }
    }
}

/// Receiver of emitted points; implemented by whatever backend stores them.
pub trait Accumulator {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags);
}

/// Keeps every point in memory.
#[derive(Debug, Default)]
pub struct MetricBuffer {
    pub metrics: Vec<Metric>,
}

impl MetricBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// True if some point with this name carries exactly these tags and fields.
    pub fn contains_tagged_fields(&self, name: &str, fields: &Fields, tags: &Tags) -> bool {
        self.metrics
            .iter()
            .any(|m| m.name == name && &m.fields == fields && &m.tags == tags)
    }
}

impl Accumulator for MetricBuffer {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.metrics.push(Metric::new(measurement, fields, tags));
    }
}

/// Writes each point as one JSON object per line.
pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Accumulator for JsonLinesWriter<W> {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        let metric = Metric::new(measurement, fields, tags);
        let written = serde_json::to_string(&metric)
            .map_err(std::io::Error::from)
            .and_then(|json| writeln!(self.out, "{json}"));
        if let Err(err) = written {
            error!("failed to write {measurement} point: {err}");
        }
    }
}
