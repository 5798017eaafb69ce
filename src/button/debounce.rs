//! Three-state edge detector for a single push-button line
//!
//! ```text
//!            HIGH                 LOW
//!   Idle ─────────► Pressed ─────────► Released
//!    ▲                 ▲                  │
//!    │                 └────── HIGH ──────┤
//!    └──────────────── LOW ───────────────┘
//! ```
//!
//! The state a sample lands in is the event: entering `Pressed` is a key-down
//! edge, `Released` is the key-up edge, `Idle` reports nothing. Staying in
//! `Pressed` does not repeat the key-down.

use crate::gpio::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DebounceState {
    #[default]
    Idle,
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEdge {
    KeyDown,
    KeyUp,
}

impl ButtonEdge {
    pub fn is_pressed(self) -> bool {
        self == ButtonEdge::KeyDown
    }
}

pub fn transition(state: DebounceState, level: Level) -> DebounceState {
    match (state, level) {
        (DebounceState::Idle, Level::High) => DebounceState::Pressed,
        (DebounceState::Idle, Level::Low) => DebounceState::Idle,
        (DebounceState::Pressed, Level::High) => DebounceState::Pressed,
        (DebounceState::Pressed, Level::Low) => DebounceState::Released,
        (DebounceState::Released, Level::High) => DebounceState::Pressed,
        (DebounceState::Released, Level::Low) => DebounceState::Idle,
    }
}

/// Edge produced by moving from `previous` into `next`
pub fn edge(previous: DebounceState, next: DebounceState) -> Option<ButtonEdge> {
    match next {
        DebounceState::Pressed if previous != DebounceState::Pressed => Some(ButtonEdge::KeyDown),
        DebounceState::Released => Some(ButtonEdge::KeyUp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(samples: &[Level]) -> Vec<(DebounceState, Option<ButtonEdge>)> {
        let mut state = DebounceState::Idle;
        samples
            .iter()
            .map(|level| {
                let next = transition(state, *level);
                let out = (next, edge(state, next));
                state = next;
                out
            })
            .collect()
    }

    #[test]
    fn press_and_release_fire_once_each() {
        let events = run(&[Level::Low, Level::High, Level::High, Level::Low, Level::Low]);
        assert_eq!(
            events,
            vec![
                (DebounceState::Idle, None),
                (DebounceState::Pressed, Some(ButtonEdge::KeyDown)),
                (DebounceState::Pressed, None),
                (DebounceState::Released, Some(ButtonEdge::KeyUp)),
                (DebounceState::Idle, None),
            ]
        );
    }

    #[test]
    fn quick_repress_from_released_is_a_new_key_down() {
        let events = run(&[Level::High, Level::Low, Level::High]);
        let edges: Vec<_> = events.iter().filter_map(|(_, e)| *e).collect();
        assert_eq!(
            edges,
            vec![ButtonEdge::KeyDown, ButtonEdge::KeyUp, ButtonEdge::KeyDown]
        );
    }

    #[test]
    fn full_transition_table() {
        use DebounceState::*;
        let table = [
            (Idle, Level::High, Pressed),
            (Idle, Level::Low, Idle),
            (Pressed, Level::High, Pressed),
            (Pressed, Level::Low, Released),
            (Released, Level::High, Pressed),
            (Released, Level::Low, Idle),
        ];
        for (from, level, to) in table {
            assert_eq!(transition(from, level), to, "{:?} on {:?}", from, level);
        }
    }

    #[test]
    fn sustained_low_stays_silent() {
        let events = run(&[Level::Low; 4]);
        assert!(events.iter().all(|(state, e)| *state == DebounceState::Idle && e.is_none()));
    }
}
