//=========================================================================
// Screen Context
//=========================================================================
//
// What a screen sees during a lifecycle hook: its own handle, the input
// state and the command queue.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{Payload, ScreenHandle};
use crate::core::globals::{Command, CommandQueue, GlobalContext};
use crate::core::input::StateTracker;
use crate::core::loading::SharedLoadingData;

//=== ScreenContext =======================================================

/// Per-call view of the global context handed to screen hooks.
pub struct ScreenContext<'a> {
    handle: ScreenHandle,
    global: &'a mut GlobalContext,
}

impl<'a> ScreenContext<'a> {
    pub(crate) fn new(handle: ScreenHandle, global: &'a mut GlobalContext) -> Self {
        Self { handle, global }
    }

    /// Handle of the screen receiving the hook.
    pub fn handle(&self) -> ScreenHandle {
        self.handle
    }

    pub fn input(&self) -> &StateTracker {
        &self.global.input_state
    }

    pub fn commands(&mut self) -> &mut CommandQueue {
        &mut self.global.commands
    }

    //--- Navigation -------------------------------------------------------

    /// Queues a transition to `name`.
    pub fn load_screen(&mut self, name: impl Into<String>, payload: Payload, cache: bool) {
        self.global.commands.load_screen(name, payload, cache);
    }

    pub fn close_screen(&mut self, target: ScreenHandle, quick: bool) {
        self.global.commands.close_screen(target, quick);
    }

    /// Closes `target` and runs `on_finish` afterwards (immediately if the
    /// target is no longer live).
    pub fn close_screen_then(
        &mut self,
        target: ScreenHandle,
        quick: bool,
        on_finish: impl FnOnce() + 'static,
    ) {
        self.global.commands.push(Command::Close {
            target,
            quick,
            on_finish: Some(Box::new(on_finish)),
        });
    }

    /// Closes the screen receiving the hook.
    pub fn close_self(&mut self, quick: bool) {
        let handle = self.handle;
        self.close_screen(handle, quick);
    }

    /// Starts a loading run owned by this screen.
    pub fn start_loading(&mut self, data: SharedLoadingData) {
        self.global.commands.push(Command::StartLoading {
            owner: Some(self.handle),
            data,
        });
    }
}
