//! GPIO line access for the shift-register poller and the push-buttons
//!
//! Everything that touches a pin goes through [`LineDriver`]. The production
//! implementation is [`rppal_driver::RppalDriver`]; tests swap in an in-memory
//! simulator so the protocol code can be exercised without hardware.
//!
//! # Timing
//!
//! The 4021 shift registers inside SNES/NES pads need minimum pulse widths on
//! the latch and clock lines. [`LineDriver::pulse_high`] and
//! [`LineDriver::pulse_low`] hold each level for at least the requested
//! number of microseconds; delays may run long but never short.

pub mod rppal_driver;

#[cfg(test)]
pub mod mock;

pub use rppal::gpio::Level;

use std::time::{Duration, Instant};

/// Pull resistor applied to an input line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pull {
    #[default]
    Down,
    Up,
    None,
}

/// Pin direction requested when opening a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Output,
    Input(Pull),
}

#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    #[error("Failed to initialize GPIO peripheral: {0}")]
    InitializationError(String),

    #[error("GPIO {pin} could not be configured: {reason}")]
    PinUnavailable { pin: u8, reason: String },

    #[error("GPIO {pin} is not open as {expected}")]
    NotOpened { pin: u8, expected: &'static str },
}

/// Blocking access to individual GPIO lines
///
/// Implementors own every pin they open. Reads and writes address pins by
/// their BCM number; using a pin that was never opened in the matching
/// direction is an error, not a panic.
pub trait LineDriver {
    /// Configure `pin` for input (with the given pull) or output
    fn open(&mut self, pin: u8, direction: Direction) -> Result<(), GpioError>;

    fn read(&mut self, pin: u8) -> Result<Level, GpioError>;

    fn write(&mut self, pin: u8, level: Level) -> Result<(), GpioError>;

    /// Wait at least `micros` microseconds
    fn delay_us(&mut self, micros: u64) {
        spin_wait(Duration::from_micros(micros));
    }

    /// Drive `pin` HIGH for `high_us`, then LOW for `low_us`
    fn pulse_high(&mut self, pin: u8, high_us: u64, low_us: u64) -> Result<(), GpioError> {
        self.write(pin, Level::High)?;
        self.delay_us(high_us);
        self.write(pin, Level::Low)?;
        self.delay_us(low_us);
        Ok(())
    }

    /// Drive `pin` LOW for `low_us`, then HIGH for `high_us`
    fn pulse_low(&mut self, pin: u8, low_us: u64, high_us: u64) -> Result<(), GpioError> {
        self.write(pin, Level::Low)?;
        self.delay_us(low_us);
        self.write(pin, Level::High)?;
        self.delay_us(high_us);
        Ok(())
    }
}

// Busy-wait: thread::sleep granularity is far coarser than the pulse widths.
pub fn spin_wait(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
