use std::io;
use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context};
use log::{debug, info, warn};
use rpipinout::collector::{PinoutCollector, DESCRIPTION, SAMPLE_CONFIG};
use rpipinout::config::PinoutConfig;
use rpipinout::health::HealthTracker;
use rpipinout::metric::JsonLinesWriter;

struct Options {
    config: Option<PathBuf>,
    once: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(opts) = parse_args()? else {
        return Ok(());
    };

    let config = match &opts.config {
        Some(path) => PinoutConfig::from_json_file(path)?,
        None => PinoutConfig::from_env()?,
    };
    let interval = config.interval();
    let collector = PinoutCollector::new(config);
    let mut health = HealthTracker::new();

    info!("collecting {:?} every {interval:?}", collector.args());

    loop {
        let stdout = io::stdout();
        let mut sink = JsonLinesWriter::new(stdout.lock());
        match collector.gather(&mut sink) {
            Ok(points) => health.record_success(points),
            Err(err) => {
                warn!("collection cycle failed: {err}");
                health.record_error(err.to_string());
                if opts.once {
                    return Err(err).context("collection failed");
                }
            }
        }
        drop(sink);

        if let Ok(json) = serde_json::to_string(&health.get_health()) {
            debug!("health {json}");
        }
        if opts.once {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

fn parse_args() -> anyhow::Result<Option<Options>> {
    let mut opts = Options {
        config: None,
        once: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                opts.config = Some(PathBuf::from(path));
            }
            "--once" => opts.once = true,
            "--sample-config" => {
                println!("{SAMPLE_CONFIG}");
                return Ok(None);
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            other => bail!("unknown argument {other:?} (see --help)"),
        }
    }
    Ok(Some(opts))
}

fn print_usage() {
    println!("rpi-pinoutd: {DESCRIPTION}");
    println!("  --config <path>     # JSON config (default: RPI_PINOUT_GPINS / RPI_PINOUT_INTERVAL env)");
    println!("  --once              # run a single collection cycle and exit");
    println!("  --sample-config     # print an example config");
}
