//=========================================================================
// Input System
//=========================================================================
//
// Per-frame key state fed by the host bridge.
//
// Architecture:
//   HostEvent::Input(batch) → StateTracker::process_events() → queries
//
// The director reads only one thing from here: whether a back key went
// down this frame, which it routes to the topmost live screen.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
mod state_tracker;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode};
pub use state_tracker::StateTracker;
