//! Latch/clock/data poller for pads sharing one latch and one clock line
//!
//! The poller is a small typestate machine: it is created from the control
//! line description, and only after [`ShiftRegisterPoller::open`] configured
//! the pins can it [`poll`](ShiftRegisterPoller::poll) frames.
//!
//! Every channel is read between the same pair of clock pulses, so all pads
//! on the bus shift in lock-step and bit `i` of each channel's state always
//! belongs to pulse `i`.

use super::decoder::GamepadChannel;
use super::protocol::{ControllerType, Protocol};
use crate::gpio::{Direction, Level, LineDriver, Pull};
use statum::{machine, state};
use tracing::{debug, error, info, trace};

// Minimum pulse widths for the 4021 register, in microseconds
pub const LATCH_HIGH_US: u64 = 12;
pub const LATCH_LOW_US: u64 = 6;
pub const CLOCK_LOW_US: u64 = 6;
pub const CLOCK_HIGH_US: u64 = 6;

/// Shared lines driving every pad on the bus
#[derive(Clone, Debug)]
pub struct GamepadControlLines {
    pub clock_pin: u8,
    pub latch_pin: u8,
    pub controller_type: ControllerType,
    /// Pull applied to each pad's data line
    pub data_pull: Pull,
}

#[state]
#[derive(Debug, Clone)]
pub enum PollerState {
    Configured,
    Ready,
}

#[machine]
#[derive(Debug)]
pub struct ShiftRegisterPoller<S: PollerState> {
    control: GamepadControlLines,

    // Pins that could not be configured during open
    failed_pins: Vec<u8>,
}

impl<S: PollerState> ShiftRegisterPoller<S> {
    pub fn protocol(&self) -> &'static Protocol {
        self.control.controller_type.protocol()
    }
}

impl ShiftRegisterPoller<Configured> {
    pub fn create(control: GamepadControlLines) -> Self {
        debug!("Creating shift register poller for {:?}", control);
        Self::new(control, Vec::new())
    }

    /// Configure latch/clock as outputs and every data line as input
    ///
    /// A pin that cannot be configured is logged and remembered, but does not
    /// stop the poller: the remaining pads keep working and an unreadable
    /// data line simply reads as "nothing pressed".
    pub fn open<L: LineDriver>(
        mut self,
        lines: &mut L,
        channels: &[GamepadChannel],
    ) -> ShiftRegisterPoller<Ready> {
        let clock = self.control.clock_pin;
        let latch = self.control.latch_pin;

        for pin in [latch, clock] {
            if let Err(e) = lines.open(pin, Direction::Output) {
                error!("Failed to open control line: {}", e);
                self.failed_pins.push(pin);
            }
        }

        // Clock idles high; the register shifts on the rising edge
        if let Err(e) = lines.write(clock, Level::High) {
            error!("Failed to idle clock line: {}", e);
        }
        if let Err(e) = lines.write(latch, Level::Low) {
            error!("Failed to idle latch line: {}", e);
        }

        for channel in channels {
            if let Err(e) = lines.open(channel.data_pin, Direction::Input(self.control.data_pull)) {
                error!("Failed to open data line of gamepad {}: {}", channel.id, e);
                self.failed_pins.push(channel.data_pin);
            }
        }

        info!(
            "Shift register poller ready: {} pads, {} clock pulses (clock={}, latch={})",
            channels.len(),
            self.protocol().clock_pulses,
            clock,
            latch
        );
        self.transition()
    }
}

impl ShiftRegisterPoller<Ready> {
    pub fn failed_pins(&self) -> &[u8] {
        &self.failed_pins
    }

    /// Read one frame from every channel
    pub fn poll<L: LineDriver>(&self, lines: &mut L, channels: &mut [GamepadChannel]) {
        for channel in channels.iter_mut() {
            channel.begin_frame();
        }

        // Freeze the parallel button state into the registers
        if let Err(e) = lines.pulse_high(self.control.latch_pin, LATCH_HIGH_US, LATCH_LOW_US) {
            debug!("Latch pulse failed: {}", e);
        }

        for bit in 0..self.protocol().clock_pulses {
            for channel in channels.iter_mut() {
                match lines.read(channel.data_pin) {
                    // Active low
                    Ok(Level::Low) => channel.record_pressed(bit),
                    Ok(Level::High) => {}
                    Err(e) => trace!("Gamepad {} read failed: {}", channel.id, e),
                }
            }

            if let Err(e) = lines.pulse_low(self.control.clock_pin, CLOCK_LOW_US, CLOCK_HIGH_US) {
                debug!("Clock pulse failed: {}", e);
            }
        }
    }
}
