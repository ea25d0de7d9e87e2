//=========================================================================
// Input Event Types
//
// Host-neutral representation of the key input the navigation layer
// consumes. The host maps its own key events (engine, terminal, test
// harness) onto these before handing them to the runtime.
//
// Event Flow:
// ```text
// Host input
//     ↓
// InputEvent (this module)
//     ↓
// StateTracker (per-frame deltas)
//     ↓
// ScreenDirector (back key → topmost live screen)
// ```
//
//=========================================================================

//=== KeyCode =============================================================

/// Logical key identifier.
///
/// Only the keys that screen navigation reacts to are named. Anything
/// else the host cares about can travel as `Other` with a host-defined
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Desktop escape key.
    Escape,

    /// Mobile / controller back button.
    Back,

    Enter,
    Space,
    Up,
    Down,
    Left,
    Right,

    /// Host-defined key code.
    Other(u32),
}

//=== InputEvent ==========================================================

/// A single key transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}
