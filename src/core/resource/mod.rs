//=========================================================================
// Resource Management
//=========================================================================
//
// Asset loading with a process-wide, path-keyed cache.
//
//   ResourceManager ── owns ──► AssetSource (host supplied)
//        │                           │
//        └── one running load ◄──────┘ AssetLoad, polled per tick
//
//=========================================================================

//=== Module Declarations =================================================

mod manager;
mod source;

//=== Public API ==========================================================

pub use manager::{LoadCallback, LoadTask, ResourceManager};
pub use source::{Asset, AssetLoad, AssetSource, EmptyAssetSource};
