pub mod button;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod driver;
pub mod gpio;
pub mod mapping;

use crate::config::{resolve_config_path, ProcessOptions, SnesDevConfig};
use crate::daemon::PidLock;
use crate::driver::{run_poll_loop, spawn_signal_listener, DriverContext};
use crate::gpio::rppal_driver::RppalDriver;
use crate::mapping::uinput::UinputBackend;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Expose SNES/NES pads and push-buttons on GPIO as virtual input devices
#[derive(Parser, Debug)]
#[command(name = "snesdev", version, about)]
struct Args {
    /// Detach from the terminal and run in the background
    #[arg(short, long)]
    daemon: bool,

    /// PID file to create and lock in daemon mode
    #[arg(short, long = "pidfile", value_name = "FILE")]
    pidfile: Option<PathBuf>,

    /// Verbose logging; keeps the process in the foreground
    #[arg(long)]
    debug: bool,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup(args.debug)?;

    let options = ProcessOptions {
        daemon: args.daemon,
        debug: args.debug,
        pid_file: args.pidfile,
    };

    let config_path = resolve_config_path(args.config);
    let config = SnesDevConfig::load(&config_path)?;
    config.validate(&options)?;
    config.log_summary(&options);

    // Held until the process exits
    let mut _pid_file = None;
    if options.detaches() {
        let pid_path = options
            .pid_file
            .as_deref()
            .ok_or_else(|| eyre!("Daemon mode requires a PID file"))?;
        daemon::detach()?;
        match daemon::lock_pid_file(pid_path)? {
            PidLock::Acquired(file) => _pid_file = Some(file),
            PidLock::HeldElsewhere => {
                info!("Another instance is already running");
                return Ok(());
            }
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

async fn run(config: SnesDevConfig) -> Result<()> {
    let token = CancellationToken::new();
    let _signals = spawn_signal_listener(token.clone())?;

    let lines = RppalDriver::new()?;
    let mut backend = UinputBackend::new();
    let mut ctx = DriverContext::build(&config, lines, &mut backend, token)?;

    let stats = run_poll_loop(&mut ctx).await;
    info!(
        "Shut down after {} cycles ({} frames, {} button edges)",
        stats.cycles, stats.frames, stats.edges
    );
    Ok(())
}

fn setup(debug: bool) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env(if debug { Level::DEBUG } else { Level::INFO });
    Ok(())
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
