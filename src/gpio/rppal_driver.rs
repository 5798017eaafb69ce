//! [`LineDriver`] on top of `rppal`'s memory-mapped GPIO access
//!
//! Pins are claimed from [`Gpio`] when opened and released when the driver
//! is dropped, which `rppal` also uses to restore the original pin mode.

use super::{Direction, GpioError, Level, LineDriver, Pull};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use std::collections::HashMap;
use tracing::{debug, info};

pub struct RppalDriver {
    gpio: Gpio,
    inputs: HashMap<u8, InputPin>,
    outputs: HashMap<u8, OutputPin>,
}

impl RppalDriver {
    pub fn new() -> Result<Self, GpioError> {
        let gpio = Gpio::new().map_err(|e| GpioError::InitializationError(e.to_string()))?;
        info!("GPIO peripheral opened");

        Ok(Self {
            gpio,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        })
    }
}

impl LineDriver for RppalDriver {
    fn open(&mut self, pin: u8, direction: Direction) -> Result<(), GpioError> {
        // rppal refuses to hand out a pin that is still held
        self.inputs.remove(&pin);
        self.outputs.remove(&pin);

        let raw = self.gpio.get(pin).map_err(|e| GpioError::PinUnavailable {
            pin,
            reason: e.to_string(),
        })?;

        match direction {
            Direction::Output => {
                self.outputs.insert(pin, raw.into_output());
            }
            Direction::Input(pull) => {
                let input = match pull {
                    Pull::Down => raw.into_input_pulldown(),
                    Pull::Up => raw.into_input_pullup(),
                    Pull::None => raw.into_input(),
                };
                self.inputs.insert(pin, input);
            }
        }

        debug!("GPIO {} opened as {:?}", pin, direction);
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level, GpioError> {
        self.inputs
            .get(&pin)
            .map(InputPin::read)
            .ok_or(GpioError::NotOpened {
                pin,
                expected: "input",
            })
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), GpioError> {
        let output = self.outputs.get_mut(&pin).ok_or(GpioError::NotOpened {
            pin,
            expected: "output",
        })?;
        output.write(level);
        Ok(())
    }
}
