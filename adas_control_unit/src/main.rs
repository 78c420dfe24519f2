//! # ADAS Control Unit
//!
//! Replay harness for the per-tick motion control core.
//!
//! Loads the TOML configuration, then feeds JSON-lines [`TickInput`]s from
//! a file (or stdin) through the control loop and prints one JSON line per
//! resulting command on stdout. Logs go to stderr.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use adas_common::consts::DEFAULT_CONFIG_PATH;
use adas_common::drive::command::{ControlCommand, TickInput};
use adas_common::drive::state::Tick;
use adas_common::drive::telemetry::{PublishGate, VehicleParameters};
use adas_common::config::LogLevel;
use adas_control_unit::config::{ControlUnitConfig, load_config};
use adas_control_unit::cycle::ControlLoop;
use adas_control_unit::replay::ReplayReader;
use adas_control_unit::telemetry::TracingSink;
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// ADAS Control Unit: replay tick inputs through the control core
#[derive(Parser, Debug)]
#[command(name = "adas_control_unit")]
#[command(version)]
#[command(about = "Per-tick vehicle motion control core (replay harness)")]
struct Args {
    /// Path to the control unit configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// JSON-lines file of tick inputs (stdin when omitted).
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Also print gated vehicle-parameter payloads.
    #[arg(long)]
    publish: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

/// One output line.
#[derive(Serialize)]
#[serde(untagged)]
enum OutputLine<'a> {
    Command {
        tick: Tick,
        command: &'a ControlCommand,
    },
    Status {
        tick: Tick,
        status: &'a VehicleParameters,
    },
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args.config);
    setup_tracing(&args, config.as_ref().ok().map(|c| c.shared.log_level));

    info!("ADAS Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(Box::<dyn std::error::Error>::from)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("ADAS Control Unit shutdown complete");
}

fn run(args: &Args, config: &ControlUnitConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: service={}, tick={}s",
        config.shared.service_name, config.tick_seconds
    );

    let input: Box<dyn BufRead> = match &args.replay {
        Some(path) => {
            info!("Replaying {}", path.display());
            Box::new(BufReader::new(File::open(path)?))
        }
        None => {
            info!("Reading tick inputs from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut control = ControlLoop::with_sink(config, TracingSink);
    let mut gate = PublishGate::default();
    let mut out = BufWriter::new(io::stdout().lock());

    for item in ReplayReader::new(input) {
        if !running.load(Ordering::SeqCst) {
            warn!("Received shutdown signal, stopping replay");
            break;
        }
        let tick_input: TickInput = item?;
        let tick = control.tick_count();
        let command = control.tick(&tick_input);

        serde_json::to_writer(&mut out, &OutputLine::Command { tick, command: &command })?;
        out.write_all(b"\n")?;

        if args.publish {
            let status = control.vehicle_parameters();
            if gate.should_publish(&status) {
                serde_json::to_writer(&mut out, &OutputLine::Status { tick, status: &status })?;
                out.write_all(b"\n")?;
            }
        }
    }
    out.flush()?;

    let stats = control.stats();
    info!(
        ticks = stats.ticks,
        emergency_ticks = stats.emergency_ticks,
        emergency_activations = stats.emergency_activations,
        driver_ticks = stats.driver_ticks,
        fallback_ticks = stats.fallback_ticks,
        mode_changes = stats.mode_changes,
        gear_rejections = stats.gear_rejections,
        max_brake = stats.max_brake,
        "Replay complete"
    );

    Ok(())
}

/// Setup tracing subscriber on stderr; stdout carries command lines.
///
/// `--verbose` wins over the configured level. `RUST_LOG`, when set,
/// replaces both.
fn setup_tracing(args: &Args, configured: Option<LogLevel>) {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        configured.unwrap_or_default()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}
