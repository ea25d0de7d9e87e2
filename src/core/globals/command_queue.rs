//=========================================================================
// Command Queue
//=========================================================================
//
// Requests raised by screens (or the host) during a frame.
//
// Screens never touch the director or the loading orchestrator directly.
// They push commands here and GlobalSystems routes them at the start of
// the next update, before any job advances.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use crate::core::loading::SharedLoadingData;
use crate::core::screen::{Payload, ScreenHandle};

//=== Command =============================================================

/// Deferred request for one of the global systems.
pub enum Command {
    /// Queue a load job on the screen director.
    Load {
        name: String,
        payload: Payload,
        cache: bool,
    },

    /// Close a live screen. `on_finish` runs once the close completed, or
    /// immediately when the target is not live.
    Close {
        target: ScreenHandle,
        quick: bool,
        on_finish: Option<Box<dyn FnOnce()>>,
    },

    /// Start a loading run owned by a (loading) screen.
    StartLoading {
        owner: Option<ScreenHandle>,
        data: SharedLoadingData,
    },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Load { name, payload, cache } => f
                .debug_struct("Load")
                .field("name", name)
                .field("payload", payload)
                .field("cache", cache)
                .finish(),
            Command::Close { target, quick, on_finish } => f
                .debug_struct("Close")
                .field("target", target)
                .field("quick", quick)
                .field("on_finish", &on_finish.is_some())
                .finish(),
            Command::StartLoading { owner, .. } => f
                .debug_struct("StartLoading")
                .field("owner", owner)
                .finish_non_exhaustive(),
        }
    }
}

//=== CommandQueue ========================================================

/// FIFO of commands, drained once per tick.
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: Vec<Command>,
}

impl CommandQueue {
    /// Creates a new empty command queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a command to be routed at the next tick boundary.
    pub fn push(&mut self, command: Command) {
        self.queue.push(command);
    }

    pub fn load_screen(&mut self, name: impl Into<String>, payload: Payload, cache: bool) {
        self.push(Command::Load {
            name: name.into(),
            payload,
            cache,
        });
    }

    pub fn close_screen(&mut self, target: ScreenHandle, quick: bool) {
        self.push(Command::Close {
            target,
            quick,
            on_finish: None,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Takes all commands from the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queue)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
