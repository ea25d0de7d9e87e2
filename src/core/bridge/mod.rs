//=========================================================================
// Host Bridge
//=========================================================================
//
// Bridges the host frame loop with the navigation runtime.
//
// Components:
// - `interface`: HostEvent and the cloneable RuntimeHandle (the contract)
// - `inbox`: Runtime-side draining of host events into the key tracker
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod inbox;
pub(crate) mod interface;

//=== Public API ==========================================================

pub use inbox::TickControl;
pub use interface::{HostEvent, RuntimeHandle};

pub(crate) use inbox::HostInbox;
