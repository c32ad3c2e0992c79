//! Logical input actions
//!
//! The simulation only asks "is this action held"; where the answer comes
//! from (keyboard, gamepad, touch, an autopilot) is the host's business.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    TurnLeft,
    TurnRight,
    SpeedUp,
    SpeedDown,
    PauseToggle,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::TurnLeft,
        Action::TurnRight,
        Action::SpeedUp,
        Action::SpeedDown,
        Action::PauseToggle,
    ];
}

/// Anything that can report held actions
pub trait InputSource {
    fn is_held(&self, action: Action) -> bool;
}

impl<F> InputSource for F
where
    F: Fn(Action) -> bool,
{
    fn is_held(&self, action: Action) -> bool {
        self(action)
    }
}

/// Nothing is ever held
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_held(&self, _action: Action) -> bool {
        false
    }
}

/// Collapse held actions into one tick's controls
pub fn read_tick_input(source: &dyn InputSource) -> TickInput {
    let left = source.is_held(Action::TurnLeft);
    let right = source.is_held(Action::TurnRight);
    TickInput {
        turn: match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        },
        speed_up: source.is_held(Action::SpeedUp),
        speed_down: source.is_held(Action::SpeedDown),
    }
}

/// Key-to-action bindings plus the set of keys currently down.
/// Keys are `KeyboardEvent.key` values; single characters are case-folded.
#[derive(Debug, Clone)]
pub struct KeyboardState {
    bindings: HashMap<String, Action>,
    down: HashSet<String>,
}

impl Default for KeyboardState {
    fn default() -> Self {
        let mut state = Self {
            bindings: HashMap::new(),
            down: HashSet::new(),
        };
        // Arrows, WASD and ZQSD
        for key in ["ArrowLeft", "a", "q"] {
            state.bind(key, Action::TurnLeft);
        }
        for key in ["ArrowRight", "d"] {
            state.bind(key, Action::TurnRight);
        }
        for key in ["ArrowUp", "w", "z"] {
            state.bind(key, Action::SpeedUp);
        }
        for key in ["ArrowDown", "s"] {
            state.bind(key, Action::SpeedDown);
        }
        for key in [" ", "p", "Escape"] {
            state.bind(key, Action::PauseToggle);
        }
        state
    }
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(key: &str) -> String {
        if key.chars().count() == 1 {
            key.to_lowercase()
        } else {
            key.to_string()
        }
    }

    pub fn bind(&mut self, key: &str, action: Action) {
        self.bindings.insert(Self::normalize(key), action);
    }

    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.bindings.get(&Self::normalize(key)).copied()
    }

    /// Record a key press; returns the bound action, if any
    pub fn key_down(&mut self, key: &str) -> Option<Action> {
        let action = self.action_for(key)?;
        self.down.insert(Self::normalize(key));
        Some(action)
    }

    pub fn key_up(&mut self, key: &str) {
        self.down.remove(&Self::normalize(key));
    }

    /// Forget every held key (focus lost)
    pub fn release_all(&mut self) {
        self.down.clear();
    }
}

impl InputSource for KeyboardState {
    fn is_held(&self, action: Action) -> bool {
        self.down
            .iter()
            .any(|key| self.bindings.get(key) == Some(&action))
    }
}
