//! Per-controller-type protocol table
//!
//! Pads of the NES and SNES families differ in how many bits they shift out
//! and in which order the buttons appear. Bit `i` of a raw state is always
//! the level sampled before clock pulse `i`; the tables below name the button
//! that sits at each position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical buttons exposed on the virtual gamepad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadButton {
    A,
    B,
    X,
    Y,
    L,
    R,
    Select,
    Start,
}

impl PadButton {
    pub const ALL: [PadButton; 8] = [
        PadButton::A,
        PadButton::B,
        PadButton::X,
        PadButton::Y,
        PadButton::L,
        PadButton::R,
        PadButton::Select,
        PadButton::Start,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerType {
    Nes,
    #[default]
    Snes,
    /// SNES pads read with the full 16-pulse frame (bits 12-15 unmapped)
    Snes16,
}

impl ControllerType {
    pub fn protocol(self) -> &'static Protocol {
        match self {
            ControllerType::Nes => &NES_PROTOCOL,
            ControllerType::Snes => &SNES_PROTOCOL,
            ControllerType::Snes16 => &SNES16_PROTOCOL,
        }
    }

    #[cfg(test)]
    pub fn clock_pulses(self) -> u8 {
        self.protocol().clock_pulses
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol().name)
    }
}

/// Values reported for the low, centered and high position of a digital axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub center: i32,
    pub max: i32,
}

#[derive(Debug)]
pub struct Protocol {
    pub name: &'static str,
    pub clock_pulses: u8,
    /// Bit mask of every face/shoulder button this family has
    pub buttons: &'static [(PadButton, u16)],
    pub up: u16,
    pub down: u16,
    pub left: u16,
    pub right: u16,
    pub axis: AxisRange,
}

impl Protocol {
    #[cfg(test)]
    pub fn mask_of(&self, button: PadButton) -> Option<u16> {
        self.buttons
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, mask)| *mask)
    }

    pub fn direction_mask(&self) -> u16 {
        self.up | self.down | self.left | self.right
    }
}

const DIGITAL_AXIS: AxisRange = AxisRange {
    min: 0,
    center: 2,
    max: 4,
};

// 4021 order on the NES pad: A, B, Select, Start, Up, Down, Left, Right
pub static NES_PROTOCOL: Protocol = Protocol {
    name: "nes",
    clock_pulses: 8,
    buttons: &[
        (PadButton::A, 0x0001),
        (PadButton::B, 0x0002),
        (PadButton::Select, 0x0004),
        (PadButton::Start, 0x0008),
    ],
    up: 0x0010,
    down: 0x0020,
    left: 0x0040,
    right: 0x0080,
    axis: DIGITAL_AXIS,
};

const SNES_BUTTONS: &[(PadButton, u16)] = &[
    (PadButton::B, 0x0001),
    (PadButton::Y, 0x0002),
    (PadButton::Select, 0x0004),
    (PadButton::Start, 0x0008),
    (PadButton::A, 0x0100),
    (PadButton::X, 0x0200),
    (PadButton::L, 0x0400),
    (PadButton::R, 0x0800),
];

pub static SNES_PROTOCOL: Protocol = Protocol {
    name: "snes",
    clock_pulses: 12,
    buttons: SNES_BUTTONS,
    up: 0x0010,
    down: 0x0020,
    left: 0x0040,
    right: 0x0080,
    axis: DIGITAL_AXIS,
};

pub static SNES16_PROTOCOL: Protocol = Protocol {
    name: "snes16",
    clock_pulses: 16,
    buttons: SNES_BUTTONS,
    up: 0x0010,
    down: 0x0020,
    left: 0x0040,
    right: 0x0080,
    axis: DIGITAL_AXIS,
};
