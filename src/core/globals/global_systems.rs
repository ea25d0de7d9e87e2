//=========================================================================
// Global Systems
//=========================================================================
//
// Container for the systems with logic.
//
// Contains the screen director, the resource manager, the network and the
// loading orchestrator. Systems operate on GlobalContext data.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::{Command, GlobalContext};
use crate::core::http::Network;
use crate::core::loading::LoadingOrchestrator;
use crate::core::resource::ResourceManager;
use crate::core::screen::ScreenDirector;

//=== GlobalSystems =======================================================

/// Container for the logic systems.
///
/// # Available Systems
///
/// - `director`: Layered screen stack and transition jobs
/// - `resources`: Asset loading and caching
/// - `network`: Transport, priority rule and fire-and-forget dispatchers
/// - `loading`: Loading runs started by loading screens
#[derive(Debug, Default)]
pub struct GlobalSystems {
    /// The screen director.
    ///
    /// Screens reach it indirectly through the command queue; the host
    /// may call it directly during `init`.
    pub director: ScreenDirector,

    pub resources: ResourceManager,

    pub network: Network,

    pub loading: LoadingOrchestrator,
}

impl GlobalSystems {
    pub(crate) fn new(
        director: ScreenDirector,
        resources: ResourceManager,
        network: Network,
    ) -> Self {
        Self {
            director,
            resources,
            network,
            loading: LoadingOrchestrator::new(),
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Updates all systems for the current frame.
    ///
    /// # Processing Pipeline
    ///
    /// The runtime has already folded this frame's host input into
    /// `context.input_state`.
    ///
    /// 1. **Routing**: Hands last frame's commands to their systems
    /// 2. **Resources**: Starts or polls the running asset load
    /// 3. **Network**: Advances fire-and-forget dispatchers
    /// 4. **Loading**: Steps every loading run
    /// 5. **Director**: Steps the active job, or updates the top screen
    pub(crate) fn update(&mut self, context: &mut GlobalContext) {
        // 1. Route commands raised since the last update
        self.route(context);

        // 2. Resources
        self.resources.update();

        // 3. Network
        self.network.update();

        // 4. Loading runs
        self.loading.update(
            self.network.context(),
            &mut self.resources,
            &self.director,
            &mut context.commands,
        );

        // 5. Screens
        self.director.update(context);
    }

    fn route(&mut self, context: &mut GlobalContext) {
        for command in context.commands.take() {
            debug!("Routing {:?}", command);
            match command {
                Command::Load { name, payload, cache } => {
                    self.director.load_screen(name, payload, cache)
                }
                Command::Close {
                    target,
                    quick,
                    on_finish,
                } => self.director.close_screen(target, quick, on_finish),
                Command::StartLoading { owner, data } => self.loading.start(owner, data),
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{RequestSpec, Response};
    use crate::core::input::{InputEvent, KeyCode};
    use crate::core::loading::{LoadingData, LoadingScreen, RequestTask, LOADING_SCREEN};
    use crate::core::screen::{Layer, Payload};
    use crate::core::task::WaitFrames;
    use crate::core::test_support::{event_log, probe_factory, EventLog, Probe, ScriptedTransport};

    struct World {
        systems: GlobalSystems,
        ctx: GlobalContext,
        transport: ScriptedTransport,
        _log: EventLog,
    }

    impl World {
        fn new() -> Self {
            let log = event_log();
            let mut factory = probe_factory(vec![
                Probe::new("Main", Layer::Low, &log).closing_on_back(),
                Probe::new("Play", Layer::Low, &log),
                Probe::new("Shop", Layer::Popup, &log),
            ]);
            LoadingScreen::register(&mut factory);

            let transport = ScriptedTransport::new();
            let mut network = Network::default();
            network.context_mut().set_transport(transport.clone());

            Self {
                systems: GlobalSystems::new(
                    ScreenDirector::new(factory),
                    ResourceManager::default(),
                    network,
                ),
                ctx: GlobalContext::new(),
                transport,
                _log: log,
            }
        }

        fn tick(&mut self) {
            self.systems.update(&mut self.ctx);
        }

        fn is_quiet(&self) -> bool {
            self.systems.director.is_idle()
                && self.systems.loading.is_empty()
                && self.ctx.commands.is_empty()
        }

        fn settle(&mut self) {
            for _ in 0..64 {
                self.tick();
                if self.is_quiet() {
                    return;
                }
            }
            panic!("systems did not settle");
        }

        fn live(&self) -> Vec<String> {
            self.systems
                .director
                .live_names()
                .into_iter()
                .map(str::to_string)
                .collect()
        }

        fn open_loading(&mut self, data: LoadingData) {
            LoadingScreen::open(&mut self.ctx.commands, data.into_shared());
        }
    }

    #[test]
    fn commands_are_routed_on_the_next_update() {
        let mut world = World::new();
        world.ctx.commands.load_screen("Main", Payload::none(), false);

        assert!(world.systems.director.is_idle());
        world.settle();

        assert_eq!(world.live(), vec!["Main"]);
    }

    #[test]
    fn back_key_reaches_the_top_screen() {
        let mut world = World::new();
        world.ctx.commands.load_screen("Main", Payload::none(), false);
        world.settle();

        world.ctx.input_state.process_events(&[
            InputEvent::KeyDown(KeyCode::Escape),
            InputEvent::KeyUp(KeyCode::Escape),
        ]);
        world.tick();
        world.ctx.input_state.clear();
        world.settle();

        assert!(world.live().is_empty(), "Main closes itself on back");
    }

    #[test]
    fn loading_screen_runs_requests_then_loads_next_screen() {
        let mut world = World::new();
        world.ctx.commands.load_screen("Main", Payload::none(), false);
        world.settle();

        world.open_loading(
            LoadingData::new()
                .with_request("profile", RequestTask::new(RequestSpec::get("/profile")))
                .with_next_screen("Play", false),
        );
        world.settle();

        assert_eq!(world.transport.sent(), vec!["/profile"]);
        assert_eq!(world.live(), vec!["Play"]);
        assert!(world.systems.director.is_registered(LOADING_SCREEN), "Loading screen is cached by default");
    }

    #[test]
    fn request_results_stay_readable_after_loading() {
        let mut world = World::new();
        world.transport.respond("/profile", Response::new(200).with_body("hero"));
        let data = LoadingData::new()
            .with_request("profile", RequestTask::new(RequestSpec::get("/profile")))
            .with_next_screen("Play", false)
            .into_shared();
        LoadingScreen::open(&mut world.ctx.commands, data.clone());
        world.settle();

        assert_eq!(world.live(), vec!["Play"]);
        let profile = data.borrow().request("profile").expect("task exists");
        assert_eq!(profile.borrow().text(), "hero");
        assert!(!data.borrow().has_http_error());
    }

    #[test]
    fn loading_without_next_screen_closes_itself() {
        let mut world = World::new();
        world.open_loading(LoadingData::new().with_pre_wait(WaitFrames::new(2)));
        world.settle();

        assert!(world.live().is_empty());
    }

    #[test]
    fn force_close_skips_the_next_screen() {
        let mut world = World::new();
        let data = LoadingData::new();
        let force = data.force_close();
        world.open_loading(
            data.with_request(
                "login",
                RequestTask::new(RequestSpec::post("/login")).on_failed(move |_| force.set()),
            )
            .with_request("profile", RequestTask::new(RequestSpec::get("/profile")))
            .with_next_screen("Play", false),
        );
        world.transport.respond("/login", Response::new(401));
        world.settle();

        assert_eq!(world.transport.sent(), vec!["/login"]);
        assert!(world.live().is_empty());
    }

    #[test]
    fn additive_next_screen_closes_the_loading_screen() {
        let mut world = World::new();
        world.open_loading(LoadingData::new().with_next_screen("Shop", false).additive(true));
        world.settle();

        assert_eq!(world.live(), vec!["Shop"]);
    }

    #[test]
    fn closing_the_loading_screen_aborts_its_run() {
        let mut world = World::new();
        world.transport = world.transport.clone().with_delay(100);
        world.open_loading(
            LoadingData::new()
                .with_request("slow", RequestTask::new(RequestSpec::get("/slow")))
                .with_next_screen("Play", false),
        );
        for _ in 0..10 {
            world.tick();
        }
        assert_eq!(world.transport.in_flight(), 1);

        let handle = world
            .systems
            .director
            .top()
            .map(|entry| entry.handle())
            .expect("loading screen is live");
        world.ctx.commands.close_screen(handle, true);
        world.settle();

        assert_eq!(world.transport.aborted(), vec!["/slow"]);
        assert_eq!(world.transport.in_flight(), 0);
        assert!(world.live().is_empty());
    }
}
