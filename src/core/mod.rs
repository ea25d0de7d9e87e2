//=========================================================================
// Core Systems
//
// Every subsystem driven by the runtime's tick.
//
// Layout:
// - bridge:    Host → runtime channel (input batches, shutdown)
// - input:     Key state and back-key detection
// - globals:   GlobalSystems (logic) and GlobalContext (shared data)
// - task:      One-shot completions and frame-polled waits
// - screen:    Layered screen stack and transition jobs
// - http:      Sequential request dispatchers with priority interrupts
// - resource:  Asset loading with a path-keyed cache
// - loading:   Phase sequencer behind the loading screen
//
// Notes:
// All systems are single-threaded and cooperative. Nothing blocks; every
// suspension point is polled once per tick.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod bridge;
pub mod globals;
pub mod http;
pub mod input;
pub mod loading;
pub mod resource;
pub mod screen;
pub mod task;

#[cfg(test)]
pub(crate) mod test_support;
