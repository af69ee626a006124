//! Keyboard state
//!
//! [`InputState`] is filled by the window collaborator once per frame and read
//! by behaviors. It answers "is this key held right now" and keeps the
//! discrete transitions that happened since the previous frame.

use std::collections::HashSet;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// S key
    S,
    /// W key
    W,
    /// Q key
    Q,
    /// E key
    E,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Left shift
    LeftShift,
    /// Left control
    LeftControl,
}

/// What happened to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Key went down
    Pressed,
    /// Key went up
    Released,
    /// Key is held and the platform emitted a repeat
    Repeated,
}

bitflags! {
    /// Modifier keys held during a key event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Either control key
        const CTRL = 1 << 0;
        /// Either shift key
        const SHIFT = 1 << 1;
        /// Either alt key
        const ALT = 1 << 2;
        /// Platform (windows/command) key
        const SUPER = 1 << 3;
    }
}

/// A single key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key involved
    pub key: KeyCode,
    /// Transition kind
    pub action: KeyAction,
    /// Modifiers held at the time
    pub modifiers: Modifiers,
}

/// Held keys plus this frame's key events
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    events: Vec<KeyEvent>,
    should_close: bool,
}

impl InputState {
    /// No keys held, no events
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop last frame's events; held keys persist
    pub fn begin_frame(&mut self) {
        self.events.clear();
    }

    /// Record a transition and update the held set
    pub fn push(&mut self, event: KeyEvent) {
        match event.action {
            KeyAction::Pressed | KeyAction::Repeated => {
                self.held.insert(event.key);
            }
            KeyAction::Released => {
                self.held.remove(&event.key);
            }
        }
        self.events.push(event);
    }

    /// Convenience for [`InputState::push`] without modifiers
    pub fn press(&mut self, key: KeyCode) {
        self.push(KeyEvent {
            key,
            action: KeyAction::Pressed,
            modifiers: Modifiers::empty(),
        });
    }

    /// Convenience for [`InputState::push`] without modifiers
    pub fn release(&mut self, key: KeyCode) {
        self.push(KeyEvent {
            key,
            action: KeyAction::Released,
            modifiers: Modifiers::empty(),
        });
    }

    /// Whether `key` is currently held
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Whether `key` went down this frame
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.events
            .iter()
            .any(|e| e.key == key && e.action == KeyAction::Pressed)
    }

    /// Transitions since the last [`InputState::begin_frame`]
    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    /// Whether the window asked to close
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Record a close request
    pub fn request_close(&mut self) {
        self.should_close = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_tracks_press_and_release() {
        let mut input = InputState::new();
        input.press(KeyCode::Space);
        assert!(input.is_held(KeyCode::Space));
        assert!(input.was_pressed(KeyCode::Space));

        input.begin_frame();
        assert!(input.is_held(KeyCode::Space));
        assert!(!input.was_pressed(KeyCode::Space));

        input.release(KeyCode::Space);
        assert!(!input.is_held(KeyCode::Space));
        assert_eq!(input.events().len(), 1);
    }

    #[test]
    fn test_modifiers_are_kept_on_events() {
        let mut input = InputState::new();
        input.push(KeyEvent {
            key: KeyCode::W,
            action: KeyAction::Repeated,
            modifiers: Modifiers::SHIFT | Modifiers::CTRL,
        });
        let event = input.events()[0];
        assert!(event.modifiers.contains(Modifiers::SHIFT));
        assert!(!event.modifiers.contains(Modifiers::ALT));
        assert!(input.is_held(KeyCode::W));
    }
}
