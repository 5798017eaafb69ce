//! Emission of decoded input through OS-level virtual devices
//!
//! Decoded gamepad frames and button edges are written to virtual devices
//! through two small seams:
//!
//! - [`DeviceBackend`] creates a device for a [`DeviceProfile`]
//! - [`VirtualDevice`] accepts key, axis and sync writes
//!
//! [`uinput::UinputBackend`] implements both on Linux `/dev/uinput`. A logical
//! frame is only visible to consumers after [`VirtualDevice::write_sync`].

pub mod error;
pub mod keyboard;
pub mod uinput;

#[cfg(test)]
pub mod recording;

pub use error::MappingError;
pub use keyboard::InputKey;

use crate::button::ButtonEdge;
use crate::controller::protocol::{AxisRange, PadButton};
use crate::controller::GamepadState;
use tracing::{debug, info};

/// Key written to a virtual device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Pad(PadButton),
    Key(InputKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisCode {
    X,
    Y,
}

/// Capabilities declared when a device is created
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceProfile {
    /// Eight buttons and two bounded absolute axes
    Gamepad { axis: AxisRange },
    /// The full [`InputKey`] set
    Keyboard,
}

pub trait VirtualDevice {
    fn name(&self) -> &str;

    fn write_key(&mut self, code: KeyCode, pressed: bool) -> Result<(), MappingError>;

    fn write_axis(&mut self, axis: AxisCode, value: i32) -> Result<(), MappingError>;

    /// Commit all writes since the previous sync as one frame
    fn write_sync(&mut self) -> Result<(), MappingError>;

    /// Deactivate and release the device
    fn close(self) -> Result<(), MappingError>;
}

pub trait DeviceBackend {
    type Device: VirtualDevice;

    /// Register and activate a device with the given capabilities
    fn open(&mut self, profile: DeviceProfile, name: &str) -> Result<Self::Device, MappingError>;
}

pub fn gamepad_name(id: u8) -> String {
    format!("SNESDev Gamepad {}", id)
}

pub const KEYBOARD_NAME: &str = "SNESDev Keyboard";

/// Open a gamepad device and park both axes at center
pub fn open_gamepad<B: DeviceBackend>(
    backend: &mut B,
    id: u8,
    axis: AxisRange,
) -> Result<B::Device, MappingError> {
    let name = gamepad_name(id);
    let mut device = backend.open(DeviceProfile::Gamepad { axis }, &name)?;

    device.write_axis(AxisCode::X, axis.center)?;
    device.write_axis(AxisCode::Y, axis.center)?;
    device.write_sync()?;

    info!("Virtual gamepad '{}' created", name);
    Ok(device)
}

pub fn open_keyboard<B: DeviceBackend>(backend: &mut B) -> Result<B::Device, MappingError> {
    let device = backend.open(DeviceProfile::Keyboard, KEYBOARD_NAME)?;
    info!("Virtual keyboard '{}' created", KEYBOARD_NAME);
    Ok(device)
}

/// Write a complete gamepad frame: all buttons, both axes, then sync
pub fn emit_gamepad_state<D: VirtualDevice>(
    device: &mut D,
    state: &GamepadState,
    axis: &AxisRange,
) -> Result<(), MappingError> {
    for button in PadButton::ALL {
        device.write_key(KeyCode::Pad(button), state.pressed(button))?;
    }
    device.write_axis(AxisCode::X, state.x_axis.value(axis))?;
    device.write_axis(AxisCode::Y, state.y_axis.value(axis))?;
    device.write_sync()?;

    debug!("Frame written to '{}': {:?}", device.name(), state);
    Ok(())
}

pub fn emit_button_edge<D: VirtualDevice>(
    device: &mut D,
    key: InputKey,
    edge: ButtonEdge,
) -> Result<(), MappingError> {
    device.write_key(KeyCode::Key(key), edge.is_pressed())?;
    device.write_sync()
}
