//=========================================================================
// Task Primitives
//=========================================================================
//
// Cooperative suspension points for the frame-ticked runtime.
//
// Architecture:
//   collaborator ── Completion<T>::complete() ──► one-slot channel
//                                                     ↓
//   job / phase  ◄── Pending<T>::poll() once per tick ┘
//
//   WaitTask: anything polled each tick until it reports done
//
// Nothing here blocks. Every consumer polls at its own tick boundary,
// so a value delivered mid-frame is observed on the next poll.
//
//=========================================================================

//=== Module Declarations =================================================

mod completion;
mod wait;

//=== Public API ==========================================================

pub use completion::{completion, Completion, Pending, PollState};
pub use wait::{WaitFor, WaitFrames, WaitTask, WaitUntil};
