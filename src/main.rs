use std::env;
use std::error::Error;
use std::path::Path;
use std::thread;
use std::time::Duration;

use clap::Parser;

use ffjoy::config::SessionConfig;
use ffjoy::input::state::DeviceState;
use ffjoy::input::translator::EventSink;
use ffjoy::session::DeviceSession;

/// How often the control loop ticks.
const POLL_RATE: Duration = Duration::from_millis(4);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the event device, e.g. /dev/input/event0. Overrides the
    /// config file.
    device: Option<String>,

    /// Path to a YAML session config file
    #[arg(short, long)]
    config: Option<String>,

    /// Effect files to register on startup, as name=path pairs
    #[arg(short, long = "effect")]
    effects: Vec<String>,
}

/// Sink that logs everything the device reports.
#[derive(Default)]
struct LoggingSink;

impl EventSink for LoggingSink {
    fn button_event(&mut self, index: u16, value: i32) {
        log::info!("Button {index} -> {value}");
    }

    fn status_event(&mut self, effect_id: i16, playing: bool) {
        log::info!(
            "Effect {effect_id} {}",
            if playing { "playing" } else { "stopped" }
        );
    }

    fn axis_dispatch(&mut self, state: &DeviceState) {
        log::trace!("Device state: {state:?}");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting ffjoy v{}", VERSION);

    let args = Args::parse();
    let mut config = match args.config.as_deref() {
        Some(path) => SessionConfig::from_yaml_file(path)?,
        None => match args.device.as_deref() {
            Some(device) => SessionConfig::new(device),
            None => return Err("No device path given; pass one or use --config".into()),
        },
    };
    if let Some(device) = args.device {
        config.device_path = device;
    }

    let mut session = DeviceSession::open_path(&config)?;
    log::info!("Opened force feedback device {}", config.device_path);

    for pair in &args.effects {
        let Some((name, path)) = pair.split_once('=') else {
            return Err(format!("Invalid effect spec '{pair}', expected name=path").into());
        };
        session.add_effect(name, Path::new(path))?;
        log::info!("Registered effect '{name}' from {path}");
    }

    let mut sink = LoggingSink;
    loop {
        session.tick(&mut sink);
        thread::sleep(POLL_RATE);
    }
}
