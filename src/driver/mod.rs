//! Orchestration of pads, buttons and virtual devices
//!
//! ```text
//!                     DriverContext
//!   ┌──────────────────────────────────────────────────┐
//!   │  ShiftRegisterPoller ──► GamepadChannel[] ──► pad devices
//!   │  ButtonChannel[] ─────────────────────────► keyboard
//!   │  CancellationToken ◄── signal listener (SIGINT/SIGTERM)
//!   └──────────────────────────────────────────────────┘
//!                          ▲
//!                   run_poll_loop (one cycle per tick)
//! ```
//!
//! Everything runs on one thread. The loop only yields between ticks, so a
//! cycle (latch, clock pulses, decode, emit) always runs to completion before
//! a shutdown request is looked at.

pub mod context;
pub mod poll_loop;

pub use context::{CycleReport, DriverContext};
pub use poll_loop::{run_poll_loop, spawn_signal_listener, PollStats};

use crate::config::ConfigError;
use crate::gpio::GpioError;
use crate::mapping::MappingError;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Gpio(#[from] GpioError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to install signal handler: {0}")]
    SignalError(String),
}
