//=========================================================================
// Host Bridge Interface
//=========================================================================
//
// Host-to-runtime interface types.
//
// Defines the contract between whatever drives the frame loop (a game
// engine, a test harness, a terminal) and the navigation runtime.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{SendError, Sender};

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== HostEvent ===========================================================

/// Events sent from the host to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Batched input events for a frame.
    Input(Vec<InputEvent>),

    /// Host is going away; the run loop exits on the next tick.
    Shutdown,
}

//=== RuntimeHandle =======================================================

/// Cloneable sending side of the host bridge.
///
/// Safe to hand to other threads; events are drained at the start of the
/// next tick.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    sender: Sender<HostEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(sender: Sender<HostEvent>) -> Self {
        Self { sender }
    }

    /// Queues a batch of input events. Empty batches are dropped.
    pub fn send_input(&self, events: Vec<InputEvent>) -> Result<(), SendError<HostEvent>> {
        if events.is_empty() {
            return Ok(());
        }
        self.sender.send(HostEvent::Input(events))
    }

    /// Asks the runtime to stop.
    pub fn shutdown(&self) -> Result<(), SendError<HostEvent>> {
        self.sender.send(HostEvent::Shutdown)
    }
}
