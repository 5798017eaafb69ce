//! Shift-register gamepad input
//!
//! Turns the serial latch/clock/data protocol of SNES/NES pads into logical
//! gamepad state:
//!
//! 1. [`protocol`] - per-controller-type pulse count and bit table
//! 2. [`shift_register`] - latches and clocks every pad on the bus in lock-step
//! 3. [`decoder`] - raw bits to buttons and digital axes, with noise suppression
//!
//! # Architecture
//!
//! ```text
//! Pads ──► ShiftRegisterPoller ──► GamepadChannel.state ──► check_state() ──► GamepadState
//!          (latch + N clocks)       (raw bitmask)            (edge-triggered)
//! ```

pub mod decoder;
pub mod protocol;
pub mod shift_register;

pub use decoder::{AxisLevel, GamepadChannel, GamepadState, NoiseFilter};
pub use protocol::{ControllerType, PadButton, Protocol};
pub use shift_register::{GamepadControlLines, Ready, ShiftRegisterPoller};
