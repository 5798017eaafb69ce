//! Virtual devices on Linux `/dev/uinput` through `evdev-rs`
//!
//! Devices identify as a USB device with vendor 1, product 1, version 4.
//! Dropping the underlying `UInputDevice` destroys the kernel device, which
//! is what [`VirtualDevice::close`] relies on.

use super::{AxisCode, DeviceBackend, DeviceProfile, InputKey, KeyCode, MappingError, VirtualDevice};
use crate::controller::protocol::{AxisRange, PadButton};
use evdev_rs::enums::{EventCode, EV_ABS, EV_KEY, EV_SYN};
use evdev_rs::{DeviceWrapper as _, InputEvent, TimeVal, UInputDevice, UninitDevice};
use tracing::debug;

const BUS_USB: u16 = 0x03;
const VENDOR_ID: u16 = 1;
const PRODUCT_ID: u16 = 1;
const VERSION: u16 = 4;

fn pad_key(button: PadButton) -> EV_KEY {
    match button {
        PadButton::A => EV_KEY::BTN_SOUTH,
        PadButton::B => EV_KEY::BTN_EAST,
        PadButton::X => EV_KEY::BTN_NORTH,
        PadButton::Y => EV_KEY::BTN_WEST,
        PadButton::L => EV_KEY::BTN_TL,
        PadButton::R => EV_KEY::BTN_TR,
        PadButton::Select => EV_KEY::BTN_SELECT,
        PadButton::Start => EV_KEY::BTN_START,
    }
}

fn key_event_code(code: KeyCode) -> EventCode {
    match code {
        KeyCode::Pad(button) => EventCode::EV_KEY(pad_key(button)),
        KeyCode::Key(key) => EventCode::EV_KEY(key.ev_key()),
    }
}

fn axis_event_code(axis: AxisCode) -> EventCode {
    match axis {
        AxisCode::X => EventCode::EV_ABS(EV_ABS::ABS_X),
        AxisCode::Y => EventCode::EV_ABS(EV_ABS::ABS_Y),
    }
}

fn abs_info(axis: &AxisRange) -> libc::input_absinfo {
    libc::input_absinfo {
        value: axis.center,
        minimum: axis.min,
        maximum: axis.max,
        fuzz: 0,
        flat: 0,
        resolution: 0,
    }
}

#[derive(Debug, Default)]
pub struct UinputBackend;

impl UinputBackend {
    pub fn new() -> Self {
        Self
    }
}

pub struct UinputDevice {
    name: String,
    device: UInputDevice,
}

impl UinputDevice {
    fn write(&self, what: &'static str, event_code: EventCode, value: i32) -> Result<(), MappingError> {
        let event = InputEvent {
            event_code,
            value,
            time: TimeVal {
                tv_sec: 0,
                tv_usec: 0,
            },
        };
        self.device
            .write_event(&event)
            .map_err(|e| MappingError::WriteError {
                device: self.name.clone(),
                what,
                reason: e.to_string(),
            })
    }
}

impl DeviceBackend for UinputBackend {
    type Device = UinputDevice;

    fn open(&mut self, profile: DeviceProfile, name: &str) -> Result<UinputDevice, MappingError> {
        let open_error = |reason: String| MappingError::OpenError {
            device: name.to_string(),
            reason,
        };

        let uninit = UninitDevice::new().ok_or_else(|| open_error("libevdev allocation failed".to_string()))?;
        uninit.set_name(name);
        uninit.set_bustype(BUS_USB);
        uninit.set_vendor_id(VENDOR_ID);
        uninit.set_product_id(PRODUCT_ID);
        uninit.set_version(VERSION);

        match profile {
            DeviceProfile::Gamepad { axis } => {
                for button in PadButton::ALL {
                    uninit
                        .enable_event_code(&EventCode::EV_KEY(pad_key(button)), None)
                        .map_err(|e| open_error(e.to_string()))?;
                }
                let info = abs_info(&axis);
                for code in [AxisCode::X, AxisCode::Y] {
                    uninit
                        .enable_event_code(&axis_event_code(code), Some(&info))
                        .map_err(|e| open_error(e.to_string()))?;
                }
            }
            DeviceProfile::Keyboard => {
                for key in InputKey::ALL {
                    uninit
                        .enable_event_code(&EventCode::EV_KEY(key.ev_key()), None)
                        .map_err(|e| open_error(e.to_string()))?;
                }
            }
        }

        let device = UInputDevice::create_from_device(&uninit).map_err(|e| open_error(e.to_string()))?;
        debug!("uinput device '{}' created for {:?}", name, profile);

        Ok(UinputDevice {
            name: name.to_string(),
            device,
        })
    }
}

impl VirtualDevice for UinputDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_key(&mut self, code: KeyCode, pressed: bool) -> Result<(), MappingError> {
        self.write("key", key_event_code(code), i32::from(pressed))
    }

    fn write_axis(&mut self, axis: AxisCode, value: i32) -> Result<(), MappingError> {
        self.write("axis", axis_event_code(axis), value)
    }

    fn write_sync(&mut self) -> Result<(), MappingError> {
        self.write("sync", EventCode::EV_SYN(EV_SYN::SYN_REPORT), 0)
    }

    fn close(self) -> Result<(), MappingError> {
        debug!("Destroying uinput device '{}'", self.name);
        drop(self.device);
        Ok(())
    }
}
