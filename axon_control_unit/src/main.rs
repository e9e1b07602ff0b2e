//! # AXON Control Unit
//!
//! Runs the control cycle at `timing.cycle_ms` against the loopback board,
//! with records persisted under `store_dir`. Stops on Ctrl-C, or after
//! `--cycles` iterations when given.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use axon_common::config::LogLevel;
use axon_common::control_unit::config::ControlUnitConfig;
use axon_common::persist::FileStore;
use axon_control_unit::config::{render_config, resolve_config};
use axon_control_unit::cycle::{Controller, CycleStats, StatusEvent};
use axon_control_unit::error::StartupError;
use axon_control_unit::hal::LoopbackBoard;

/// AXON Control Unit: calibration, arbitration and actuator output loop
#[derive(Parser, Debug)]
#[command(name = "axon_control_unit")]
#[command(version)]
#[command(about = "Control loop for the AXON multi-axis actuator box")]
struct Args {
    /// Path to the configuration TOML. Defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Record store directory (overrides `store_dir` from the file).
    #[arg(long, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Stop after N cycles (0 = run until Ctrl-C).
    #[arg(long, default_value_t = 0)]
    cycles: u64,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    dump_config: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let cfg = resolve_config(args.config.as_deref(), args.store_dir.as_deref());
    let level = cfg
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("AXON Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = cfg.map_err(StartupError::from).and_then(|cfg| run(&args, cfg));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("AXON Control Unit shutdown complete");
}

fn run(args: &Args, cfg: ControlUnitConfig) -> Result<(), StartupError> {
    if args.dump_config {
        println!("{}", render_config(&cfg)?);
        return Ok(());
    }

    info!(
        cycle_ms = cfg.timing.cycle_ms,
        presence_poll_ms = cfg.timing.presence_poll_ms,
        store_dir = %cfg.store_dir,
        "Config OK"
    );

    std::fs::create_dir_all(&cfg.store_dir)?;
    let store = FileStore::new(&cfg.store_dir);
    let mut board = LoopbackBoard::new();
    let period = Duration::from_millis(cfg.timing.cycle_ms);
    let mut controller = Controller::new(cfg, store, board.wired);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    info!("Entering control loop");
    let start = Instant::now();
    let mut deadline = start;
    let mut stats = CycleStats::new();
    let period_us = u64::try_from(period.as_micros()).unwrap_or(u64::MAX);

    while running.load(Ordering::SeqCst) {
        let t0 = Instant::now();
        let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        for event in controller.service(now_ms, &mut board) {
            log_event(&event);
        }

        let took = u64::try_from(t0.elapsed().as_micros()).unwrap_or(u64::MAX);
        stats.record(took, period_us);
        if args.cycles > 0 && stats.cycle_count >= args.cycles {
            break;
        }

        deadline += period;
        std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
    }

    info!(
        cycles = stats.cycle_count,
        avg_us = stats.avg_cycle_us(),
        max_us = stats.max_cycle_us,
        overruns = stats.overruns,
        "Control loop stopped"
    );
    match controller.snapshot_json() {
        Ok(json) => info!(status = %json, "Final status"),
        Err(e) => warn!("Status snapshot failed: {e}"),
    }
    Ok(())
}

fn log_event(event: &StatusEvent) {
    match event {
        StatusEvent::PersistFailed(kind) => warn!(%kind, "Record not persisted"),
        StatusEvent::Persisted(kind) => debug!(%kind, "Record persisted"),
        other => info!(event = ?other, "Status"),
    }
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.as_directive()))
    };

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
