//=========================================================================
// Global State
//=========================================================================
//
// Separates systems (logic components) from context (shared data).
//
// Architecture:
//   GlobalSystems: ScreenDirector + ResourceManager + Network
//                  + LoadingOrchestrator (owned by the runtime)
//   GlobalContext: StateTracker + CommandQueue (seen by screens)
//
//=========================================================================

//=== Module Declarations =================================================

mod command_queue;
mod global_context;
mod global_systems;

//=== Public API ==========================================================

pub use command_queue::{Command, CommandQueue};
pub use global_context::GlobalContext;
pub use global_systems::GlobalSystems;
