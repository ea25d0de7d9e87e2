//=========================================================================
// Loading Screen
//=========================================================================
//
// Stock High-layer screen that runs the loading data it is opened with.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;

use log::warn;

//=== Internal Dependencies ===============================================

use super::data::{LoadingData, SharedLoadingData};
use crate::core::globals::CommandQueue;
use crate::core::screen::{Layer, Payload, Screen, ScreenContext, ScreenFactory};

//=== LoadingScreen =======================================================

/// Registry name the loading screen is opened under.
pub const LOADING_SCREEN: &str = "ScreenLoading";

/// High-layer screen that starts a loading run from `on_start`.
///
/// The run loads `LoadingData::next_screen` once every phase is done,
/// passing the same data as payload, or closes this screen when no next
/// screen is set or the run was force-closed.
///
/// # Example
///
/// ```rust
/// # use screen_director::prelude::*;
/// let mut factory = ScreenFactory::new();
/// LoadingScreen::register(&mut factory);
///
/// let mut commands = CommandQueue::new();
/// let data = LoadingData::new().with_next_screen("Play", false).into_shared();
/// LoadingScreen::open(&mut commands, data);
///
/// assert_eq!(commands.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoadingScreen;

impl LoadingScreen {
    /// Queues the loading screen with `data` as its payload.
    pub fn open(commands: &mut CommandQueue, data: SharedLoadingData) {
        let cached = data.borrow().is_loading_screen_cached();
        commands.load_screen(LOADING_SCREEN, Payload::from_rc(data), cached);
    }

    /// Registers the stock loading screen under [`LOADING_SCREEN`].
    pub fn register(factory: &mut ScreenFactory) {
        factory.register(LOADING_SCREEN, || Box::new(LoadingScreen));
    }
}

impl Screen for LoadingScreen {
    fn layer(&self) -> Layer {
        Layer::High
    }

    fn on_start(&mut self, payload: &Payload, ctx: &mut ScreenContext<'_>) {
        match payload.shared::<RefCell<LoadingData>>() {
            Some(data) => ctx.start_loading(data),
            None => {
                warn!("Loading screen opened without loading data");
                ctx.close_self(false);
            }
        }
    }
}
