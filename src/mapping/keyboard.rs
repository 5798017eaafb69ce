//! Keys a push-button can be mapped to
//!
//! The virtual keyboard always declares this whole set, so the device
//! capabilities do not change when the button configuration does.

use evdev_rs::enums::EV_KEY;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! input_keys {
    ($($variant:ident => $name:literal, $code:ident;)*) => {
        /// Keyboard key, named in configuration by its lowercase label
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum InputKey {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl InputKey {
            pub const ALL: &'static [InputKey] = &[$(InputKey::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(InputKey::$variant => $name,)*
                }
            }

            pub fn ev_key(self) -> EV_KEY {
                match self {
                    $(InputKey::$variant => EV_KEY::$code,)*
                }
            }
        }
    };
}

input_keys! {
    Digit1 => "1", KEY_1;
    Digit2 => "2", KEY_2;
    Digit3 => "3", KEY_3;
    Digit4 => "4", KEY_4;
    Digit5 => "5", KEY_5;
    Digit6 => "6", KEY_6;
    Digit7 => "7", KEY_7;
    Digit8 => "8", KEY_8;
    Digit9 => "9", KEY_9;
    Digit0 => "0", KEY_0;
    Minus => "minus", KEY_MINUS;
    Equal => "equal", KEY_EQUAL;
    Q => "q", KEY_Q;
    W => "w", KEY_W;
    E => "e", KEY_E;
    R => "r", KEY_R;
    T => "t", KEY_T;
    Y => "y", KEY_Y;
    U => "u", KEY_U;
    I => "i", KEY_I;
    O => "o", KEY_O;
    P => "p", KEY_P;
    A => "a", KEY_A;
    S => "s", KEY_S;
    D => "d", KEY_D;
    F => "f", KEY_F;
    G => "g", KEY_G;
    H => "h", KEY_H;
    J => "j", KEY_J;
    K => "k", KEY_K;
    L => "l", KEY_L;
    Semicolon => "semicolon", KEY_SEMICOLON;
    Apostrophe => "apostrophe", KEY_APOSTROPHE;
    Z => "z", KEY_Z;
    X => "x", KEY_X;
    C => "c", KEY_C;
    V => "v", KEY_V;
    B => "b", KEY_B;
    N => "n", KEY_N;
    M => "m", KEY_M;
    Comma => "comma", KEY_COMMA;
    Dot => "dot", KEY_DOT;
    Slash => "slash", KEY_SLASH;
    Space => "space", KEY_SPACE;
    Esc => "esc", KEY_ESC;
    Backspace => "backspace", KEY_BACKSPACE;
    Enter => "enter", KEY_ENTER;
    F1 => "f1", KEY_F1;
    F2 => "f2", KEY_F2;
    F3 => "f3", KEY_F3;
    F4 => "f4", KEY_F4;
    F5 => "f5", KEY_F5;
    F6 => "f6", KEY_F6;
    F7 => "f7", KEY_F7;
    F8 => "f8", KEY_F8;
    F9 => "f9", KEY_F9;
    F10 => "f10", KEY_F10;
    F11 => "f11", KEY_F11;
    F12 => "f12", KEY_F12;
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
