//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use screen_director::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime
pub use crate::runtime::{Runtime, RuntimeBuilder};
pub use crate::core::bridge::{HostEvent, RuntimeHandle, TickControl};

// Global systems and context
pub use crate::core::globals::{Command, CommandQueue, GlobalContext, GlobalSystems};

// Input
pub use crate::core::input::{InputEvent, KeyCode};

// Screens
pub use crate::core::screen::{
    Animation, Layer, Payload, SceneLoader, Screen, ScreenContext, ScreenDirector, ScreenFactory,
    ScreenHandle,
};

// Requests
pub use crate::core::http::{
    DispatchError, Dispatcher, DispatcherGroup, Method, PriorityRequest, Request, RequestSpec,
    Response, Transport,
};

// Resources
pub use crate::core::resource::{AssetSource, LoadTask, ResourceManager};

// Loading
pub use crate::core::loading::{
    ForceClose, LoadingData, LoadingScreen, ParallelGroup, RequestTask, ResourceTask,
    SharedLoadingData,
};

// Async primitives
pub use crate::core::task::{completion, WaitFor, WaitFrames, WaitTask, WaitUntil};
