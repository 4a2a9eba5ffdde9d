//! # KERF Control Unit
//!
//! Demo runner for the adaptive control core. Loads the TOML
//! configuration, wires the core to simulated collaborators (motion
//! executor, wire feeds, power supply), and cuts a square path with
//! feedrate scaling and tension control enabled until interrupted.
//!
//! On a machine this binary is replaced by the host integration that
//! registers the real sensor drivers and motion executor; everything it
//! calls on [`ControlCore`] is the same either way.

use clap::Parser;
use kerf_common::config::KerfConfig;
use kerf_common::consts::DEFAULT_CONFIG_PATH;
use kerf_control_unit::core::ControlCore;
use kerf_control_unit::sim::{SimExecutor, SimPowerSupply, SimWireFeed};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// KERF Control Unit — adaptive feed and wire tension control
#[derive(Parser, Debug)]
#[command(name = "kerf_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Adaptive feedrate scaling and wire tension control core")]
struct Args {
    /// Path to the configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Side length of the demo square path [mm].
    #[arg(long, default_value_t = 20.0)]
    square: f64,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("KERF Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("KERF Control Unit shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = KerfConfig::load(&args.config)?;
    info!(
        "Config OK: feed band {}..{} mm/min, target duty cycle {}, primary actuator {}",
        config.feed.min_feedrate,
        config.feed.max_feedrate,
        config.feed.target_duty_cycle,
        config.tension.primary,
    );

    let sample_interval = config.feed.sample_interval;
    let target_tension = config.tension.target;

    let core = ControlCore::new(
        &config,
        SimExecutor::new(),
        SimWireFeed::new("sender"),
        SimWireFeed::new("receiver"),
    )?;
    core.set_command_error_hook(Box::new(|msg| {
        error!("machine command error: {msg}");
    }))?;

    let duty_handle = core.duty_cycle_handle();
    let load_cell_handle = core.load_cell_handle();

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    core.enable_scaling()?;
    core.enable_tension()?;

    let s = args.square;
    let corners = [
        [s, 0.0, 0.0, 0.0],
        [s, s, 0.0, 0.0],
        [0.0, s, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
    ];

    let mut supply = SimPowerSupply::new(0.0, 2.0);
    let mut now = 0.0;
    let mut lap = 0u64;

    info!("Entering demo loop ({s}×{s} mm square), Ctrl-C to stop");
    while running.load(Ordering::SeqCst) {
        for corner in corners {
            if !running.load(Ordering::SeqCst) {
                break;
            }

            // Synthesize one sensor period: the supply responds to the
            // feedrate the scaling loop chose last time around.
            let (min, max) = core.feed_range()?;
            let feed_speed = (min + (max - min) * 0.5) / 60.0;
            let duty = supply.step(feed_speed, sample_interval);
            duty_handle.on_sample(duty, now);
            load_cell_handle.on_batch(&[target_tension], now);
            now += sample_interval;

            core.move_to(corner, 50.0)?;
            std::thread::sleep(std::time::Duration::from_millis(
                (sample_interval * 1000.0) as u64,
            ));
        }
        lap += 1;
        if lap % 10 == 0 {
            info!(
                lap,
                duty_cycle = ?core.current_duty_cycle()?,
                "demo progress"
            );
        }
    }

    core.disable_scaling()?;
    core.disable_tension()?;
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
