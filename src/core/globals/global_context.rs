//=========================================================================
// Global Context
//=========================================================================
//
// Shared data container for screens.
//
// Contains state data that screens read/write:
// - input_state: Low-level key state, including the back keys
// - commands: Queue of navigation and loading requests
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::CommandQueue;
use crate::core::input::{KeyCode, StateTracker};

//=== GlobalContext =======================================================

/// Shared context data accessible to screens during their hooks.
///
/// Screens reach it through [`ScreenContext`](crate::core::screen::ScreenContext).
/// This separates screen-accessible data from the systems that act on it.
pub struct GlobalContext {
    /// Key state for the current frame.
    pub input_state: StateTracker,

    /// Commands raised this frame, routed at the start of the next update.
    pub commands: CommandQueue,
}

impl GlobalContext {
    /// Creates a new context with empty state.
    pub(crate) fn new() -> Self {
        Self::with_back_keys(StateTracker::new().back_keys().to_vec())
    }

    pub(crate) fn with_back_keys(back_keys: Vec<KeyCode>) -> Self {
        Self {
            input_state: StateTracker::with_back_keys(back_keys),
            commands: CommandQueue::new(),
        }
    }
}
