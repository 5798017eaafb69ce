//! Discrete push-buttons mapped to keyboard keys
//!
//! Buttons are active high and sampled on their own cadence, independent of
//! the gamepad frame rate. Each sample advances the channel's
//! [`debounce::DebounceState`]; only press and release edges leave this module.

pub mod debounce;

pub use debounce::{ButtonEdge, DebounceState};

use crate::gpio::{Direction, GpioError, LineDriver, Pull};
use crate::mapping::InputKey;
use tracing::{debug, trace};

#[derive(Clone, Debug)]
pub struct ButtonChannel {
    pub id: u8,
    pub data_pin: u8,
    pub key: InputKey,
    state: DebounceState,
}

impl ButtonChannel {
    pub fn new(id: u8, data_pin: u8, key: InputKey) -> Self {
        Self {
            id,
            data_pin,
            key,
            state: DebounceState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn open<L: LineDriver>(&mut self, lines: &mut L) -> Result<(), GpioError> {
        self.state = DebounceState::Idle;
        lines.open(self.data_pin, Direction::Input(Pull::Down))
    }

    /// Take one sample and advance the debounce state
    pub fn sample<L: LineDriver>(&mut self, lines: &mut L) -> Result<Option<ButtonEdge>, GpioError> {
        let level = lines.read(self.data_pin)?;
        let next = debounce::transition(self.state, level);
        let edge = debounce::edge(self.state, next);

        if next != self.state {
            trace!("Button {}: {:?} -> {:?}", self.id, self.state, next);
        }
        if let Some(edge) = edge {
            debug!("Button {} ({:?}): {:?}", self.id, self.key, edge);
        }

        self.state = next;
        Ok(edge)
    }
}
