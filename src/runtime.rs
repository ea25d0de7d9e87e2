//=========================================================================
// Screen Director Runtime
//
// Main entry point: owns the systems and ticks them once per frame.
//
// Architecture:
// ```text
//     RuntimeBuilder  ──build()──>  Runtime  ──run()──>  [tick loop @ TPS]
//         │                           │
//         ├─ with_tps()               ├─ tick(): host events → key state
//         ├─ with_scene_loader()      │          → GlobalSystems::update
//         ├─ with_transport()         └─ handle(): RuntimeHandle for the host
//         └─ with_asset_source()
// ```
//
// Everything runs on the calling thread. The host talks to the runtime
// only through the RuntimeHandle channel, or by driving `tick()` itself.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use log::info;

//=== Internal Dependencies ===============================================

use crate::core::bridge::{HostInbox, RuntimeHandle, TickControl};
use crate::core::globals::{GlobalContext, GlobalSystems};
use crate::core::http::{Network, PriorityRequest, Response, Transport};
use crate::core::input::{KeyCode, StateTracker};
use crate::core::resource::{AssetSource, ResourceManager};
use crate::core::screen::{SceneLoader, ScreenDirector};

//=== RuntimeBuilder ======================================================

/// Builder for configuring and constructing a [`Runtime`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (ticks per second in [`Runtime::run`])
/// - **Channel capacity**: 128 host events
/// - **Back keys**: Escape and Back
/// - **Scene loader**: empty `ScreenFactory`
/// - **Transport**: `OfflineTransport` (every request is a network error)
/// - **Asset source**: `EmptyAssetSource`
///
/// # Examples
///
/// ```no_run
/// use screen_director::prelude::*;
///
/// #[derive(Clone)]
/// struct MainMenu;
///
/// impl Screen for MainMenu {
///     fn layer(&self) -> Layer {
///         Layer::Low
///     }
/// }
///
/// let factory = ScreenFactory::new().with("Main", || Box::new(MainMenu));
///
/// RuntimeBuilder::new()
///     .with_tps(30.0)
///     .with_scene_loader(factory)
///     .build()
///     .init(|systems| systems.director.load_screen("Main", Payload::none(), true))
///     .run();
/// ```
pub struct RuntimeBuilder {
    tps: f64,
    channel_capacity: usize,
    back_keys: Vec<KeyCode>,
    director: ScreenDirector,
    resources: ResourceManager,
    network: Network,
}

impl RuntimeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            back_keys: StateTracker::new().back_keys().to_vec(),
            director: ScreenDirector::default(),
            resources: ResourceManager::default(),
            network: Network::default(),
        }
    }

    /// Sets the target ticks per second for [`Runtime::run`].
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the host → runtime channel. Each tick reads at
    /// most this many host events.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Keys that trigger `on_key_back_pressed` on the top screen.
    pub fn with_back_keys(mut self, keys: impl IntoIterator<Item = KeyCode>) -> Self {
        self.back_keys = keys.into_iter().collect();
        self
    }

    /// Collaborator instantiating screen templates by name.
    pub fn with_scene_loader(mut self, loader: impl SceneLoader + 'static) -> Self {
        self.director.set_loader(loader);
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.network.context_mut().set_transport(transport);
        self
    }

    pub fn with_asset_source(mut self, source: impl AssetSource + 'static) -> Self {
        self.resources.set_source(source);
        self
    }

    /// Rule mapping a response to a recovery request sent ahead of the
    /// queue of whichever dispatcher received it.
    pub fn with_priority_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&Response) -> Option<PriorityRequest> + 'static,
    {
        self.network.context_mut().set_priority_rule(rule);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> Runtime {
        info!(
            "Building runtime (TPS: {}, channel: {})",
            self.tps, self.channel_capacity
        );

        let (sender, receiver) = bounded(self.channel_capacity);

        Runtime {
            context: GlobalContext::with_back_keys(self.back_keys),
            systems: GlobalSystems::new(self.director, self.resources, self.network),
            inbox: HostInbox::new(receiver, self.channel_capacity),
            handle: RuntimeHandle::new(sender),
            tps: self.tps,
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Runtime =============================================================

/// Frame-ticked owner of every system.
///
/// Create via [`RuntimeBuilder`]. Either call [`Runtime::run`] to block
/// in a paced loop, or call [`Runtime::tick`] from the host's own frame
/// loop.
pub struct Runtime {
    context: GlobalContext,
    systems: GlobalSystems,
    inbox: HostInbox,
    handle: RuntimeHandle,
    tps: f64,
}

impl Runtime {
    //--- Initialization ---------------------------------------------------

    /// Gives mutable access to the systems before the first tick, e.g. to
    /// preload screens or queue the first one.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut GlobalSystems),
    {
        info!("Initializing runtime systems");
        init_fn(&mut self.systems);
        self
    }

    /// Sending side for host input and shutdown.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn systems(&self) -> &GlobalSystems {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut GlobalSystems {
        &mut self.systems
    }

    pub fn context(&self) -> &GlobalContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut GlobalContext {
        &mut self.context
    }

    //--- Execution --------------------------------------------------------

    /// Runs a single frame: folds host input into the key state, then
    /// updates every system.
    pub fn tick(&mut self) -> TickControl {
        if self.inbox.drain_into(&mut self.context.input_state) == TickControl::Exit {
            return TickControl::Exit;
        }

        self.systems.update(&mut self.context);

        TickControl::Continue
    }

    /// Ticks at the configured rate until a shutdown event arrives or every
    /// [`RuntimeHandle`] has been dropped.
    pub fn run(self) {
        let Runtime {
            mut context,
            mut systems,
            mut inbox,
            handle,
            tps,
        } = self;

        // Only host-held handles keep the channel open from here on
        drop(handle);

        info!("Starting runtime (TPS: {})", tps);
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        loop {
            let frame_start = Instant::now();

            //--- Step 1: Host input -------------------------------------
            if inbox.drain_into(&mut context.input_state) == TickControl::Exit {
                info!("Runtime exiting.");
                break;
            }

            //--- Step 2: Update systems -----------------------------------
            systems.update(&mut context);

            //--- Step 3: Maintain pacing ----------------------------------
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        info!("Runtime shutdown complete");
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("tps", &self.tps)
            .field("systems", &self.systems)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
