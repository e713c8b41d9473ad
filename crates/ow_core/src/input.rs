//! Keyboard state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   physically down. Movement reads this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true from the key
//!   event until the next `end_frame()`. The main loop calls `end_frame()` after
//!   every fixed simulation step, so each edge is seen by exactly one step and a
//!   press landing on a frame with zero steps waits for the next one.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Z,
    X,
    M,
    Enter,
    Escape,
    F1,
    F3,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.held.contains(key))
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Releases every held key, e.g. when the window loses focus and the
    /// matching key-up events will never arrive.
    pub fn release_all(&mut self) {
        let held: Vec<Key> = self.held.drain().collect();
        self.just_released.extend(held);
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        assert!(input.is_held(Key::A));
        assert!(input.is_just_pressed(Key::A));
    }

    #[test]
    fn test_key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_up(Key::Left);
        assert!(!input.is_held(Key::Left));
        assert!(input.is_just_released(Key::Left));
    }

    #[test]
    fn test_key_repeat_does_not_retrigger_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Z);
        input.end_frame();
        // OS key repeat delivers another press while the key is still held.
        input.key_down(Key::Z);
        assert!(input.is_held(Key::Z));
        assert!(!input.is_just_pressed(Key::Z));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::D);
        assert!(!input.is_just_released(Key::D));
        assert!(!input.is_held(Key::D));
    }

    #[test]
    fn test_end_frame_clears_transient_state_only() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        input.key_down(Key::Right);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::W));
        assert!(!input.is_just_pressed(Key::Right));
        assert!(input.is_held(Key::W));
        assert!(input.is_held(Key::Right));
    }

    #[test]
    fn test_is_any_held_matches_equivalent_pairs() {
        let mut input = InputState::new();
        assert!(!input.is_any_held(&[Key::Left, Key::A]));
        input.key_down(Key::A);
        assert!(input.is_any_held(&[Key::Left, Key::A]));
        assert!(!input.is_any_held(&[Key::Right, Key::D]));
    }

    #[test]
    fn test_release_all_reports_released_keys() {
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.key_down(Key::D);
        input.end_frame();
        input.release_all();
        assert!(!input.is_held(Key::Up));
        assert!(!input.is_held(Key::D));
        assert!(input.is_just_released(Key::Up));
        assert!(input.is_just_released(Key::D));
    }
}
