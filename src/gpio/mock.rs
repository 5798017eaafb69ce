//! In-memory [`LineDriver`] that simulates pads wired to shared latch/clock lines
//!
//! Each simulated pad behaves like the 4021 register inside an SNES pad:
//! a HIGH latch loads the button state, every rising clock edge shifts the
//! next bit onto the data line, and a pressed button reads LOW.

use super::{Direction, GpioError, Level, LineDriver};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug)]
struct SimulatedPad {
    data_pin: u8,
    latch_pin: u8,
    clock_pin: u8,
    pressed: u32,
    register: u32,
}

#[derive(Debug, Default)]
pub struct SimulatedLines {
    opened: HashMap<u8, Direction>,
    levels: HashMap<u8, Level>,
    writes: Vec<(u8, Level)>,
    reads: Vec<u8>,
    delays: Vec<u64>,
    pads: Vec<SimulatedPad>,
    queued_inputs: HashMap<u8, VecDeque<Level>>,
    steady_inputs: HashMap<u8, Level>,
    unavailable: HashSet<u8>,
}

impl SimulatedLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire a pad to `data_pin`; bit i of `pressed` is the button on pulse i
    pub fn attach_pad(&mut self, data_pin: u8, latch_pin: u8, clock_pin: u8, pressed: u32) {
        self.pads.push(SimulatedPad {
            data_pin,
            latch_pin,
            clock_pin,
            pressed,
            register: 0,
        });
    }

    pub fn set_pressed(&mut self, data_pin: u8, pressed: u32) {
        if let Some(pad) = self.pads.iter_mut().find(|p| p.data_pin == data_pin) {
            pad.pressed = pressed;
        }
    }

    /// Levels returned by successive reads of `pin`
    pub fn queue_inputs(&mut self, pin: u8, levels: &[Level]) {
        self.queued_inputs
            .entry(pin)
            .or_default()
            .extend(levels.iter().copied());
    }

    pub fn make_unavailable(&mut self, pin: u8) {
        self.unavailable.insert(pin);
    }

    pub fn direction_of(&self, pin: u8) -> Option<Direction> {
        self.opened.get(&pin).copied()
    }

    pub fn level_of(&self, pin: u8) -> Option<Level> {
        self.levels.get(&pin).copied()
    }

    pub fn writes_to(&self, pin: u8) -> Vec<Level> {
        self.writes
            .iter()
            .filter(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
            .collect()
    }

    pub fn reads_of(&self, pin: u8) -> usize {
        self.reads.iter().filter(|p| **p == pin).count()
    }

    pub fn delays(&self) -> Vec<u64> {
        self.delays.clone()
    }

    /// Total number of reads and writes issued so far
    pub fn io_count(&self) -> usize {
        self.reads.len() + self.writes.len()
    }
}

impl LineDriver for SimulatedLines {
    fn open(&mut self, pin: u8, direction: Direction) -> Result<(), GpioError> {
        if self.unavailable.contains(&pin) {
            return Err(GpioError::PinUnavailable {
                pin,
                reason: "simulated failure".to_string(),
            });
        }
        self.opened.insert(pin, direction);
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level, GpioError> {
        if !matches!(self.opened.get(&pin), Some(Direction::Input(_))) {
            return Err(GpioError::NotOpened {
                pin,
                expected: "input",
            });
        }
        self.reads.push(pin);

        if let Some(pad) = self.pads.iter().find(|p| p.data_pin == pin) {
            return Ok(if pad.register & 1 == 1 {
                Level::Low
            } else {
                Level::High
            });
        }

        if let Some(level) = self.queued_inputs.get_mut(&pin).and_then(VecDeque::pop_front) {
            self.steady_inputs.insert(pin, level);
            return Ok(level);
        }
        Ok(self.steady_inputs.get(&pin).copied().unwrap_or(Level::Low))
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), GpioError> {
        if self.opened.get(&pin) != Some(&Direction::Output) {
            return Err(GpioError::NotOpened {
                pin,
                expected: "output",
            });
        }
        let previous = self.levels.insert(pin, level);
        self.writes.push((pin, level));

        for pad in &mut self.pads {
            if pad.latch_pin == pin && level == Level::High {
                pad.register = pad.pressed;
            }
            if pad.clock_pin == pin && previous == Some(Level::Low) && level == Level::High {
                pad.register >>= 1;
            }
        }
        Ok(())
    }

    fn delay_us(&mut self, micros: u64) {
        self.delays.push(micros);
    }
}
