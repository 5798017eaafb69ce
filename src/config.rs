//! Configuration file model and startup validation
//!
//! The file is TOML with a `[gamepads]` section (shared clock/latch pins,
//! controller type, poll frequency and one `[[gamepads.gamepad]]` table per
//! port) and an optional `[buttons]` section with `[[buttons.button]]`
//! tables. Channels keep the order they have in the file.
//!
//! Everything is checked once, before any pin or device is touched; a bad
//! file stops the process with a message naming the offending field.

use crate::controller::{ControllerType, GamepadControlLines, NoiseFilter};
use crate::gpio::Pull;
use crate::mapping::InputKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SYSTEM_CONFIG_FILE: &str = "/etc/gpio/snesdev.toml";
const USER_CONFIG_DIR: &str = "snesdev";
const USER_CONFIG_FILE: &str = "snesdev.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file {0} does not exist")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Process-level switches that come from the command line
#[derive(Clone, Debug, Default)]
pub struct ProcessOptions {
    pub daemon: bool,
    pub debug: bool,
    pub pid_file: Option<PathBuf>,
}

impl ProcessOptions {
    /// `--debug` keeps the process in the foreground even with `--daemon`
    pub fn detaches(&self) -> bool {
        self.daemon && !self.debug
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct GamepadConfig {
    pub id: u8,
    #[serde(default)]
    pub enabled: bool,
    pub gpio: Option<u8>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct GamepadsConfig {
    #[serde(rename = "type", default)]
    pub controller_type: ControllerType,
    pub clock_gpio: Option<u8>,
    pub latch_gpio: Option<u8>,
    /// Frames per second
    #[serde(default)]
    pub poll_frequency: u32,
    #[serde(default)]
    pub noise_filter: NoiseFilter,
    #[serde(default)]
    pub data_pull: Pull,
    #[serde(default, rename = "gamepad")]
    pub gamepads: Vec<GamepadConfig>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ButtonConfig {
    pub id: u8,
    #[serde(default)]
    pub enabled: bool,
    pub gpio: Option<u8>,
    pub key: InputKey,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ButtonsConfig {
    /// Samples per second
    #[serde(default)]
    pub poll_frequency: u32,
    #[serde(default, rename = "button")]
    pub buttons: Vec<ButtonConfig>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SnesDevConfig {
    pub gamepads: GamepadsConfig,
    #[serde(default)]
    pub buttons: ButtonsConfig,
}

/// `--config` if given, else the per-user file if present, else the system file
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    if let Some(mut user) = dirs::config_dir() {
        user.push(USER_CONFIG_DIR);
        user.push(USER_CONFIG_FILE);
        if user.exists() {
            debug!("Using per-user config {}", user.display());
            return user;
        }
    }

    PathBuf::from(SYSTEM_CONFIG_FILE)
}

impl SnesDevConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Loaded config file {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn enabled_gamepads(&self) -> impl Iterator<Item = &GamepadConfig> {
        self.gamepads.gamepads.iter().filter(|g| g.enabled)
    }

    pub fn enabled_buttons(&self) -> impl Iterator<Item = &ButtonConfig> {
        self.buttons.buttons.iter().filter(|b| b.enabled)
    }

    pub fn control_lines(&self) -> Result<GamepadControlLines, ConfigError> {
        let clock_pin = self
            .gamepads
            .clock_gpio
            .ok_or_else(|| ConfigError::Invalid("gamepads.clock_gpio is required".to_string()))?;
        let latch_pin = self
            .gamepads
            .latch_gpio
            .ok_or_else(|| ConfigError::Invalid("gamepads.latch_gpio is required".to_string()))?;

        Ok(GamepadControlLines {
            clock_pin,
            latch_pin,
            controller_type: self.gamepads.controller_type,
            data_pull: self.gamepads.data_pull,
        })
    }

    pub fn validate(&self, options: &ProcessOptions) -> Result<(), ConfigError> {
        if options.detaches() && options.pid_file.is_none() {
            return Err(invalid("a PID file is required when running as daemon"));
        }

        let gamepads = &self.gamepads;
        if gamepads.poll_frequency == 0 {
            return Err(invalid("gamepads.poll_frequency must be > 0"));
        }
        let control = self.control_lines()?;

        if gamepads.gamepads.is_empty() {
            return Err(invalid("no gamepads configured"));
        }

        let mut ids = HashSet::new();
        for gamepad in &gamepads.gamepads {
            if gamepad.id == 0 || !ids.insert(gamepad.id) {
                return Err(ConfigError::Invalid(format!(
                    "gamepad id {} must be > 0 and unique",
                    gamepad.id
                )));
            }
            if gamepad.gpio.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "gamepad {} has no gpio",
                    gamepad.id
                )));
            }
        }

        if self.enabled_gamepads().next().is_none() {
            return Err(invalid("no gamepads enabled"));
        }

        let mut ids = HashSet::new();
        for button in &self.buttons.buttons {
            if button.id == 0 || !ids.insert(button.id) {
                return Err(ConfigError::Invalid(format!(
                    "button id {} must be > 0 and unique",
                    button.id
                )));
            }
            if button.gpio.is_none() {
                return Err(ConfigError::Invalid(format!("button {} has no gpio", button.id)));
            }
        }

        if self.enabled_buttons().next().is_some() && self.buttons.poll_frequency == 0 {
            return Err(invalid("buttons.poll_frequency must be > 0"));
        }

        // One role per pin among the lines that will actually be opened
        let mut pins = HashSet::new();
        let roles = [
            ("clock", control.clock_pin),
            ("latch", control.latch_pin),
        ]
        .into_iter()
        .chain(self.enabled_gamepads().filter_map(|g| g.gpio.map(|pin| ("gamepad data", pin))))
        .chain(self.enabled_buttons().filter_map(|b| b.gpio.map(|pin| ("button", pin))));
        for (role, pin) in roles {
            if !pins.insert(pin) {
                return Err(ConfigError::Invalid(format!(
                    "gpio {} ({}) is already in use",
                    pin, role
                )));
            }
        }

        Ok(())
    }

    pub fn log_summary(&self, options: &ProcessOptions) {
        info!(
            "RunAsDaemon: {}, Debug: {}, PidFile: {:?}",
            options.daemon, options.debug, options.pid_file
        );
        info!(
            "Type: {}, ClockGpio: {:?}, LatchGpio: {:?}, PollFrequency: {} Hz, NoiseFilter: {:?}",
            self.gamepads.controller_type,
            self.gamepads.clock_gpio,
            self.gamepads.latch_gpio,
            self.gamepads.poll_frequency,
            self.gamepads.noise_filter
        );
        for gamepad in &self.gamepads.gamepads {
            info!(
                "Gamepad {}: enabled={}, gpio={:?}",
                gamepad.id, gamepad.enabled, gamepad.gpio
            );
        }
        info!("Button PollFrequency: {} Hz", self.buttons.poll_frequency);
        for button in &self.buttons.buttons {
            info!(
                "Button {}: enabled={}, gpio={:?}, key={}",
                button.id, button.enabled, button.gpio, button.key
            );
        }
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [gamepads]
        type = "snes"
        clock_gpio = 2
        latch_gpio = 3
        poll_frequency = 60

        [[gamepads.gamepad]]
        id = 1
        enabled = true
        gpio = 4

        [[gamepads.gamepad]]
        id = 2
        enabled = false
        gpio = 7

        [buttons]
        poll_frequency = 20

        [[buttons.button]]
        id = 1
        enabled = true
        gpio = 17
        key = "esc"
    "#;

    fn parse(content: &str) -> SnesDevConfig {
        SnesDevConfig::from_toml_str(content).unwrap()
    }

    fn assert_invalid(config: &SnesDevConfig, options: &ProcessOptions, needle: &str) {
        match config.validate(options) {
            Err(ConfigError::Invalid(message)) => {
                assert!(message.contains(needle), "'{}' lacks '{}'", message, needle)
            }
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn example_parses_and_validates() {
        let config = parse(EXAMPLE);
        config.validate(&ProcessOptions::default()).unwrap();

        assert_eq!(config.gamepads.controller_type, ControllerType::Snes);
        assert_eq!(config.gamepads.noise_filter, NoiseFilter::WholeState);
        assert_eq!(config.gamepads.data_pull, Pull::Down);
        assert_eq!(config.enabled_gamepads().map(|g| g.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(config.enabled_buttons().next().map(|b| b.key), Some(InputKey::Esc));

        let control = config.control_lines().unwrap();
        assert_eq!((control.clock_pin, control.latch_pin), (2, 3));
    }

    #[test]
    fn channel_order_is_file_order() {
        let config = parse(&EXAMPLE.replace("id = 1\n        enabled = true\n        gpio = 4", "id = 9\n        enabled = true\n        gpio = 4"));
        let ids: Vec<_> = config.gamepads.gamepads.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![9, 2]);
    }

    #[test]
    fn daemon_without_pid_file_is_rejected() {
        let config = parse(EXAMPLE);
        let options = ProcessOptions {
            daemon: true,
            ..Default::default()
        };
        assert_invalid(&config, &options, "PID file");
    }

    #[test]
    fn debug_daemon_needs_no_pid_file() {
        let config = parse(EXAMPLE);
        let options = ProcessOptions {
            daemon: true,
            debug: true,
            pid_file: None,
        };
        assert!(!options.detaches());
        config.validate(&options).unwrap();
    }

    #[test]
    fn missing_clock_pin_is_rejected() {
        let config = parse(&EXAMPLE.replace("clock_gpio = 2\n", ""));
        assert_invalid(&config, &ProcessOptions::default(), "clock_gpio");
    }

    #[test]
    fn zero_gamepad_frequency_is_rejected() {
        let config = parse(&EXAMPLE.replace("poll_frequency = 60", "poll_frequency = 0"));
        assert_invalid(&config, &ProcessOptions::default(), "gamepads.poll_frequency");
    }

    #[test]
    fn no_enabled_gamepad_is_rejected() {
        let config = parse(&EXAMPLE.replace("enabled = true\n        gpio = 4", "enabled = false\n        gpio = 4"));
        assert_invalid(&config, &ProcessOptions::default(), "no gamepads enabled");
    }

    #[test]
    fn enabled_button_needs_a_frequency() {
        let config = parse(&EXAMPLE.replace("poll_frequency = 20", "poll_frequency = 0"));
        assert_invalid(&config, &ProcessOptions::default(), "buttons.poll_frequency");
    }

    #[test]
    fn shared_pins_are_rejected() {
        let config = parse(&EXAMPLE.replace("gpio = 17", "gpio = 4"));
        assert_invalid(&config, &ProcessOptions::default(), "gpio 4");
    }

    #[test]
    fn unknown_key_fails_to_parse() {
        let result = SnesDevConfig::from_toml_str(&EXAMPLE.replace("\"esc\"", "\"hyper\""));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn buttons_section_is_optional() {
        let trimmed = EXAMPLE.split("[buttons]").next().unwrap();
        let config = parse(trimmed);
        config.validate(&ProcessOptions::default()).unwrap();
        assert!(config.buttons.buttons.is_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        let result = SnesDevConfig::load(Path::new("/nonexistent/snesdev.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/tmp/custom.toml")));
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }
}
