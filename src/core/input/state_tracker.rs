//=========================================================================
// State Tracker
//=========================================================================
//
// Key state tracking with per-frame deltas.
//
// Architecture:
//   InputEvent → process_events() → HashSet (keys held) → query
//
// Frame lifecycle: clear() → process_events() → query
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode};

//=== StateTracker ========================================================

/// Tracks persistent state (keys held) and per-frame deltas (keys pressed).
/// Frame lifecycle: clear() → process_events() → query.
#[derive(Debug)]
pub struct StateTracker {
    //--- Persistent State (survives frame boundary) ----------------------
    keys_down: HashSet<KeyCode>,

    //--- Frame Deltas (reset each frame via clear()) --------------------
    keys_pressed_this_frame: HashSet<KeyCode>,
    keys_released_this_frame: HashSet<KeyCode>,

    //--- Configuration ---------------------------------------------------
    back_keys: Vec<KeyCode>,
}

impl StateTracker {
    /// Creates a tracker that treats Escape and Back as "back".
    pub fn new() -> Self {
        Self::with_back_keys(vec![KeyCode::Escape, KeyCode::Back])
    }

    /// Creates a tracker with a custom set of back keys.
    pub fn with_back_keys(back_keys: Vec<KeyCode>) -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed_this_frame: HashSet::new(),
            keys_released_this_frame: HashSet::new(),
            back_keys,
        }
    }

    //--- Frame Processing -------------------------------------------------

    /// Clears frame-specific deltas.
    pub(crate) fn clear(&mut self) {
        self.keys_pressed_this_frame.clear();
        self.keys_released_this_frame.clear();
    }

    /// Processes input events, updating internal state.
    pub(crate) fn process_events(&mut self, events: &[InputEvent]) {
        for event in events {
            self.process_event(event);
        }
    }

    //--- Internal Helpers -------------------------------------------------
    fn process_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => {
                // Only mark as pressed if it wasn't already down
                if self.keys_down.insert(key) {
                    self.keys_pressed_this_frame.insert(key);
                }
            }
            InputEvent::KeyUp(key) => {
                if self.keys_down.remove(&key) {
                    self.keys_released_this_frame.insert(key);
                }
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Key went down this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed_this_frame.contains(&key)
    }

    /// Key is currently held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Key went up this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released_this_frame.contains(&key)
    }

    /// Any configured back key went down this frame.
    pub fn is_back_pressed(&self) -> bool {
        self.back_keys.iter().any(|key| self.is_key_pressed(*key))
    }

    pub fn back_keys(&self) -> &[KeyCode] {
        &self.back_keys
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown(key)
    }

    fn key_up(key: KeyCode) -> InputEvent {
        InputEvent::KeyUp(key)
    }

    #[test]
    fn key_pressed_only_on_transition_frame() {
        let mut tracker = StateTracker::new();

        tracker.clear();
        tracker.process_events(&[key_down(KeyCode::Enter)]);
        assert!(tracker.is_key_pressed(KeyCode::Enter));
        assert!(tracker.is_key_down(KeyCode::Enter));

        tracker.clear();
        tracker.process_events(&[]);
        assert!(!tracker.is_key_pressed(KeyCode::Enter));
        assert!(tracker.is_key_down(KeyCode::Enter));
    }

    #[test]
    fn duplicate_key_down_ignored() {
        let mut tracker = StateTracker::new();

        tracker.process_events(&[key_down(KeyCode::Space)]);
        tracker.clear();
        tracker.process_events(&[key_down(KeyCode::Space)]);

        assert!(!tracker.is_key_pressed(KeyCode::Space));
    }

    #[test]
    fn key_up_without_down_ignored() {
        let mut tracker = StateTracker::new();

        tracker.process_events(&[key_up(KeyCode::Up)]);

        assert!(!tracker.is_key_released(KeyCode::Up));
    }

    #[test]
    fn fast_tap_both_transitions_captured() {
        let mut tracker = StateTracker::new();

        tracker.process_events(&[key_down(KeyCode::Escape), key_up(KeyCode::Escape)]);

        assert!(tracker.is_key_pressed(KeyCode::Escape));
        assert!(tracker.is_key_released(KeyCode::Escape));
        assert!(!tracker.is_key_down(KeyCode::Escape));
    }

    #[test]
    fn back_pressed_uses_configured_keys() {
        let mut tracker = StateTracker::with_back_keys(vec![KeyCode::Other(27)]);

        tracker.process_events(&[key_down(KeyCode::Escape)]);
        assert!(!tracker.is_back_pressed());

        tracker.process_events(&[key_down(KeyCode::Other(27))]);
        assert!(tracker.is_back_pressed());
    }

    #[test]
    fn default_back_keys_cover_escape_and_back() {
        let mut tracker = StateTracker::default();

        tracker.process_events(&[key_down(KeyCode::Back)]);

        assert!(tracker.is_back_pressed());
        assert_eq!(tracker.back_keys(), &[KeyCode::Escape, KeyCode::Back]);
    }
}
