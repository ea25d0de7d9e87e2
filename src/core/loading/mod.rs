//=========================================================================
// Loading
//=========================================================================
//
// Phase sequencer behind the loading screen.
//
// Architecture:
//   LoadingScreen::on_start ──StartLoading──► LoadingOrchestrator
//                                                  │ one Sequencer per run
//                                                  ▼
//     pre-waits → resources → parallel groups → requests → post-waits
//                                                  │
//                         next screen / close ◄────┘ (CommandQueue)
//
//=========================================================================

//=== Module Declarations =================================================

mod data;
mod orchestrator;
mod screen;
mod sequencer;

//=== Public API ==========================================================

pub use data::{
    FailedCallback, ForceClose, LoadingData, ParallelGroup, RequestTask, ResourceTask,
    SharedLoadingData, SharedRequestTask, SharedResourceTask, SuccessCallback, TaskStatus,
};
pub use orchestrator::LoadingOrchestrator;
pub use screen::{LoadingScreen, LOADING_SCREEN};
