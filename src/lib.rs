//=========================================================================
// Screen Director Library Root
//
// Layered screen navigation, sequential request dispatch and a loading
// phase sequencer for frame-ticked clients.
//
// Responsibilities:
// - Expose the runtime entry point (`RuntimeBuilder` / `Runtime`)
// - Expose the subsystems under `core` for hosts that drive them directly
// - Re-export the common surface through `prelude`
//
// Typical usage:
// ```no_run
// use screen_director::prelude::*;
//
// fn main() {
//     RuntimeBuilder::new().build().run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains every subsystem (screens, http, resources, loading).
// `prelude` re-exports the types most hosts and screens need.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `runtime` defines the builder and the tick loop.
//
mod runtime;

//--- Public Exports ------------------------------------------------------

pub use runtime::{Runtime, RuntimeBuilder};
