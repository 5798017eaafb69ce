//! Everything one poll cycle needs, owned in one place

use super::DriverError;
use crate::button::ButtonChannel;
use crate::config::SnesDevConfig;
use crate::controller::{GamepadChannel, NoiseFilter, Ready, ShiftRegisterPoller};
use crate::gpio::LineDriver;
use crate::mapping::{self, DeviceBackend, VirtualDevice};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Output of a single cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub frames: u64,
    pub edges: u64,
}

pub struct DriverContext<L: LineDriver, D: VirtualDevice> {
    token: CancellationToken,
    lines: L,
    poller: ShiftRegisterPoller<Ready>,
    noise_filter: NoiseFilter,

    // gamepad_devices[i] belongs to gamepads[i]
    gamepads: Vec<GamepadChannel>,
    gamepad_devices: Vec<D>,

    buttons: Vec<ButtonChannel>,
    keyboard: Option<D>,

    tick_period: Duration,
    button_divisor: u64,
    tick: u64,
}

/// Gamepad ticks between two button samples
///
/// Both arguments are rates in Hz, so the ratio is gamepad over button rate.
pub fn button_divisor(gamepad_hz: u32, button_hz: u32) -> u64 {
    if button_hz == 0 {
        return 1;
    }
    u64::from(gamepad_hz).div_ceil(u64::from(button_hz)).max(1)
}

fn close_devices<D: VirtualDevice>(devices: impl IntoIterator<Item = D>) -> usize {
    let mut closed = 0;
    for device in devices {
        let name = device.name().to_string();
        match device.close() {
            Ok(()) => debug!("Closed '{}'", name),
            Err(e) => warn!("{}", e),
        }
        closed += 1;
    }
    closed
}

impl<L: LineDriver, D: VirtualDevice> DriverContext<L, D> {
    /// Open every enabled channel and its virtual device
    ///
    /// Pins that cannot be configured are logged and skipped. A device that
    /// cannot be created is fatal; devices created before it are closed again.
    pub fn build<B>(
        config: &SnesDevConfig,
        mut lines: L,
        backend: &mut B,
        token: CancellationToken,
    ) -> Result<Self, DriverError>
    where
        B: DeviceBackend<Device = D>,
    {
        let control = config.control_lines()?;

        let gamepads: Vec<GamepadChannel> = config
            .enabled_gamepads()
            .filter_map(|g| g.gpio.map(|pin| GamepadChannel::new(g.id, pin)))
            .collect();

        let poller = ShiftRegisterPoller::create(control).open(&mut lines, &gamepads);
        if !poller.failed_pins().is_empty() {
            warn!("Unusable gamepad pins: {:?}", poller.failed_pins());
        }

        let mut buttons = Vec::new();
        for button in config.enabled_buttons() {
            let Some(pin) = button.gpio else { continue };
            let mut channel = ButtonChannel::new(button.id, pin, button.key);
            match channel.open(&mut lines) {
                Ok(()) => buttons.push(channel),
                Err(e) => error!("Button {} disabled: {}", button.id, e),
            }
        }

        let axis = poller.protocol().axis;
        let mut gamepad_devices = Vec::with_capacity(gamepads.len());
        for channel in &gamepads {
            match mapping::open_gamepad(backend, channel.id, axis) {
                Ok(device) => gamepad_devices.push(device),
                Err(e) => {
                    close_devices(gamepad_devices);
                    return Err(e.into());
                }
            }
        }

        let keyboard = if buttons.is_empty() {
            None
        } else {
            match mapping::open_keyboard(backend) {
                Ok(device) => Some(device),
                Err(e) => {
                    close_devices(gamepad_devices);
                    return Err(e.into());
                }
            }
        };

        let gamepad_hz = config.gamepads.poll_frequency.max(1);
        let tick_period = Duration::from_nanos(1_000_000_000 / u64::from(gamepad_hz));
        let button_divisor = button_divisor(gamepad_hz, config.buttons.poll_frequency);

        info!(
            "Driver ready: {} gamepads, {} buttons, tick {:?}, buttons every {} ticks",
            gamepads.len(),
            buttons.len(),
            tick_period,
            button_divisor
        );

        Ok(Self {
            token,
            lines,
            poller,
            noise_filter: config.gamepads.noise_filter,
            gamepads,
            gamepad_devices,
            buttons,
            keyboard,
            tick_period,
            button_divisor,
            tick: 0,
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    #[cfg(test)]
    pub fn button_divisor(&self) -> u64 {
        self.button_divisor
    }

    #[cfg(test)]
    pub fn lines(&self) -> &L {
        &self.lines
    }

    #[cfg(test)]
    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    #[cfg(test)]
    pub fn gamepads(&self) -> &[GamepadChannel] {
        &self.gamepads
    }

    #[cfg(test)]
    pub fn buttons(&self) -> &[ButtonChannel] {
        &self.buttons
    }

    /// Number of devices that are still open
    #[cfg(test)]
    pub fn open_devices(&self) -> usize {
        self.gamepad_devices.len() + usize::from(self.keyboard.is_some())
    }

    /// Poll every pad, emit changed frames, and sample buttons on their ticks
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let protocol = self.poller.protocol();

        self.poller.poll(&mut self.lines, &mut self.gamepads);

        for (channel, device) in self.gamepads.iter_mut().zip(self.gamepad_devices.iter_mut()) {
            let Some(state) = channel.check_state(protocol, self.noise_filter) else {
                continue;
            };
            match mapping::emit_gamepad_state(device, &state, &protocol.axis) {
                Ok(()) => report.frames += 1,
                Err(e) => warn!("Gamepad {}: {}", channel.id, e),
            }
        }

        if self.tick % self.button_divisor == 0 {
            for button in &mut self.buttons {
                let edge = match button.sample(&mut self.lines) {
                    Ok(Some(edge)) => edge,
                    Ok(None) => continue,
                    Err(e) => {
                        debug!("Button {}: {}", button.id, e);
                        continue;
                    }
                };
                report.edges += 1;
                if let Some(keyboard) = self.keyboard.as_mut() {
                    if let Err(e) = mapping::emit_button_edge(keyboard, button.key, edge) {
                        warn!("Button {}: {}", button.id, e);
                    }
                }
            }
        }

        self.tick = self.tick.wrapping_add(1);
        report
    }

    /// Close every open device; returns how many were closed
    ///
    /// Devices leave the context as they are closed, so calling this again
    /// closes nothing.
    pub fn shutdown(&mut self) -> usize {
        let mut closed = close_devices(self.gamepad_devices.drain(..));
        closed += close_devices(self.keyboard.take());
        if closed > 0 {
            info!("Closed {} virtual devices", closed);
        }
        closed
    }
}
