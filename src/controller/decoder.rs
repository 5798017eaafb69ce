//! Raw shift-register bits to logical gamepad state
//!
//! A channel only reports when its decoded state changes. Readings with both
//! directions of an axis pressed cannot come from a real pad (the d-pad rocks
//! on a pivot) and almost always mean the pad is unplugged or the data line
//! floats, so those frames are suppressed instead of decoded.

use super::protocol::{AxisRange, PadButton, Protocol};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// What to clear when an impossible direction combination is read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseFilter {
    /// Zero the whole raw state, face buttons included
    #[default]
    WholeState,
    /// Zero only the four direction bits
    Directional,
}

/// Position of a digital axis built from two opposing direction buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AxisLevel {
    Low,
    #[default]
    Center,
    High,
}

impl AxisLevel {
    fn from_directions(low: bool, high: bool) -> Self {
        match (low, high) {
            (true, false) => AxisLevel::Low,
            (false, true) => AxisLevel::High,
            _ => AxisLevel::Center,
        }
    }

    pub fn value(self, range: &AxisRange) -> i32 {
        match self {
            AxisLevel::Low => range.min,
            AxisLevel::Center => range.center,
            AxisLevel::High => range.max,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GamepadState {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub l: bool,
    pub r: bool,
    pub select: bool,
    pub start: bool,
    /// LEFT is low, RIGHT is high
    pub x_axis: AxisLevel,
    /// UP is low, DOWN is high
    pub y_axis: AxisLevel,
}

impl GamepadState {
    pub fn decode(raw: u16, protocol: &Protocol) -> Self {
        let mut state = GamepadState {
            x_axis: AxisLevel::from_directions(raw & protocol.left != 0, raw & protocol.right != 0),
            y_axis: AxisLevel::from_directions(raw & protocol.up != 0, raw & protocol.down != 0),
            ..Default::default()
        };
        for (button, mask) in protocol.buttons {
            *state.button_mut(*button) = raw & mask != 0;
        }
        state
    }

    pub fn pressed(&self, button: PadButton) -> bool {
        match button {
            PadButton::A => self.a,
            PadButton::B => self.b,
            PadButton::X => self.x,
            PadButton::Y => self.y,
            PadButton::L => self.l,
            PadButton::R => self.r,
            PadButton::Select => self.select,
            PadButton::Start => self.start,
        }
    }

    fn button_mut(&mut self, button: PadButton) -> &mut bool {
        match button {
            PadButton::A => &mut self.a,
            PadButton::B => &mut self.b,
            PadButton::X => &mut self.x,
            PadButton::Y => &mut self.y,
            PadButton::L => &mut self.l,
            PadButton::R => &mut self.r,
            PadButton::Select => &mut self.select,
            PadButton::Start => &mut self.start,
        }
    }
}

pub fn is_noisy(raw: u16, protocol: &Protocol) -> bool {
    let vertical = protocol.up | protocol.down;
    let horizontal = protocol.left | protocol.right;
    raw & vertical == vertical || raw & horizontal == horizontal
}

/// One pad on its own data line
#[derive(Clone, Debug)]
pub struct GamepadChannel {
    pub id: u8,
    pub data_pin: u8,
    /// Bits pressed during the current frame
    pub state: u16,
    /// Bits pressed during the previous frame
    pub last_state: u16,
    reported: GamepadState,
    // set after a suppressed frame so the next clean frame is always decoded
    resync: bool,
}

impl GamepadChannel {
    pub fn new(id: u8, data_pin: u8) -> Self {
        Self {
            id,
            data_pin,
            state: 0,
            last_state: 0,
            reported: GamepadState::default(),
            resync: false,
        }
    }

    pub fn begin_frame(&mut self) {
        self.last_state = self.state;
        self.state = 0;
    }

    pub fn record_pressed(&mut self, bit: u8) {
        self.state |= 1 << bit;
    }

    /// Last state handed out by [`GamepadChannel::check_state`]
    #[cfg(test)]
    pub fn reported(&self) -> &GamepadState {
        &self.reported
    }

    /// Decode the current frame; `Some` only when the logical state changed
    pub fn check_state(&mut self, protocol: &Protocol, filter: NoiseFilter) -> Option<GamepadState> {
        if self.state == self.last_state && !self.resync {
            return None;
        }

        if is_noisy(self.state, protocol) {
            debug!(
                "Gamepad {}: opposing directions in {:#06x}, discarding frame",
                self.id, self.state
            );
            self.state = match filter {
                NoiseFilter::WholeState => 0,
                NoiseFilter::Directional => self.state & !protocol.direction_mask(),
            };
            self.resync = true;
            return None;
        }
        self.resync = false;

        let decoded = GamepadState::decode(self.state, protocol);
        if decoded == self.reported {
            return None;
        }

        trace!("Gamepad {}: {:#06x} -> {:?}", self.id, self.state, decoded);
        self.reported = decoded;
        Some(decoded)
    }
}
