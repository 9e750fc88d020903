pub mod collector;
pub mod config;
pub mod health;
pub mod metric;
pub mod parser;
pub mod runner;

pub use collector::{GatherError, PinoutCollector};
pub use config::PinoutConfig;
pub use metric::{Accumulator, MetricBuffer};
pub use parser::{parse_output, BankGrouping, PinStatus};
pub use runner::{CommandRunner, HostCommand, RunError};
