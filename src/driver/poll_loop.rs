//! The tick-driven poll loop and its shutdown trigger

use super::{DriverContext, DriverError};
use crate::gpio::LineDriver;
use crate::mapping::VirtualDevice;
use chrono::Local;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Totals over the whole run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    pub cycles: u64,
    pub frames: u64,
    pub edges: u64,
}

/// Run cycles until the context's token is cancelled, then close all devices
///
/// The token is checked before every cycle and raced against the wait for
/// the next tick; a cycle that already started always completes.
pub async fn run_poll_loop<L, D>(ctx: &mut DriverContext<L, D>) -> PollStats
where
    L: LineDriver,
    D: VirtualDevice,
{
    let token = ctx.token().clone();
    let period = ctx.tick_period();
    let mut interval_timer = tokio::time::interval_at(Instant::now() + period, period);
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut total = PollStats::default();
    let mut window = PollStats::default();
    let mut last_stats_time = Local::now();
    let stats_interval = chrono::Duration::seconds(30);

    info!("Entering poll loop with {:?} tick", period);
    loop {
        if token.is_cancelled() {
            break;
        }

        let report = ctx.run_cycle();
        window.cycles += 1;
        window.frames += report.frames;
        window.edges += report.edges;

        let now = Local::now();
        if now - last_stats_time > stats_interval {
            let elapsed_seconds = (now - last_stats_time).num_seconds().max(1);
            info!(
                "Poll stats: {} cycles, {} frames, {} button edges in {} seconds ({:.1} cycles/sec)",
                window.cycles,
                window.frames,
                window.edges,
                elapsed_seconds,
                window.cycles as f64 / elapsed_seconds as f64
            );
            accumulate(&mut total, &window);
            window = PollStats::default();
            last_stats_time = now;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval_timer.tick() => {}
        }
    }
    accumulate(&mut total, &window);

    info!("Poll loop stopped after {} cycles", total.cycles);
    ctx.shutdown();
    total
}

fn accumulate(total: &mut PollStats, window: &PollStats) {
    total.cycles += window.cycles;
    total.frames += window.frames;
    total.edges += window.edges;
}

/// Cancel `token` on SIGINT or SIGTERM; SIGHUP is swallowed
pub fn spawn_signal_listener(token: CancellationToken) -> Result<JoinHandle<()>, DriverError> {
    let install = |kind: SignalKind| signal(kind).map_err(|e| DriverError::SignalError(e.to_string()));
    let mut sigint = install(SignalKind::interrupt())?;
    let mut sigterm = install(SignalKind::terminate())?;
    let mut sighup = install(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    info!("SIGINT received, shutting down");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM received, shutting down");
                    break;
                }
                _ = sighup.recv() => debug!("SIGHUP ignored"),
                _ = token.cancelled() => return,
            }
        }
        token.cancel();
    }))
}
