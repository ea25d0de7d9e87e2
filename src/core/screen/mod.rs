//=========================================================================
// Screen Navigation
//=========================================================================
//
// Layered screen stack with serialized transitions.
//
// Architecture:
//   ScreenDirector
//     ├─ instances: HashMap<ScreenHandle, Box<dyn Screen>>
//     ├─ registry:  name → template handle (+ cached flag)
//     ├─ live:      LiveStack (sorted by Layer)
//     └─ jobs:      VecDeque<Job> + one active job
//
// Flow:
//   CommandQueue → load_screen()/close_screen() → jobs
//   update() → step active job → (idle) top screen on_update / back key
//
//=========================================================================

//=== Module Declarations =================================================

mod context;
mod director;
mod flows;
mod job;
mod layer;
mod live_stack;
mod loader;
mod payload;
mod registry;
mod sweep;

//=== Public API ==========================================================

pub use context::ScreenContext;
pub use director::ScreenDirector;
pub use layer::Layer;
pub use live_stack::LiveEntry;
pub use loader::{LoadedScreen, SceneLoader, ScreenConstructor, ScreenFactory};
pub use payload::Payload;

//=== ScreenHandle ========================================================

/// Identifies one screen instance owned by the director.
///
/// Handles stay valid as identifiers after the instance is destroyed; the
/// director simply stops reporting it as live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenHandle(u64);

impl ScreenHandle {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

//=== Animation ===========================================================

/// Which transition animation a completion query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animation {
    In,
    Out,
}

//=== Screen Trait ========================================================

/// Capability interface every presentable screen implements.
///
/// Only `layer()` is required. Lifecycle hooks default to no-ops and the
/// animation hooks default to "no animation", which makes transitions of
/// such a screen complete within a single tick.
///
/// Presenting a screen fires, in order: `on_created`, `prepare_animate_in`,
/// `set_visible(true)`, `on_start`, `on_focus`, `animate_in`, then
/// `on_ready` once `is_animation_ended(Animation::In)` reports true.
/// Closing fires `on_lost_focus` (if focused), `prepare_animate_out`,
/// `animate_out`, waits for `Animation::Out`, then `set_visible(false)`
/// and, unless the template stays cached, `destroy`.
///
/// # Minimal Implementation
///
/// ```rust
/// # use screen_director::prelude::*;
/// #[derive(Clone)]
/// struct MainMenu;
///
/// impl Screen for MainMenu {
///     fn layer(&self) -> Layer {
///         Layer::Low
///     }
/// }
/// ```
pub trait Screen: ScreenClone {
    /// Layer this screen is presented in.
    fn layer(&self) -> Layer;

    //--- Lifecycle --------------------------------------------------------

    /// Called when the screen is newly stacked, before it becomes visible.
    fn on_created(&mut self, _payload: &Payload, _ctx: &mut ScreenContext<'_>) {}

    fn on_start(&mut self, _payload: &Payload, _ctx: &mut ScreenContext<'_>) {}

    fn on_focus(&mut self, _ctx: &mut ScreenContext<'_>) {}

    /// Called once the enter animation has finished.
    fn on_ready(&mut self, _ctx: &mut ScreenContext<'_>) {}

    /// Called every idle tick on the topmost live screen.
    fn on_update(&mut self, _ctx: &mut ScreenContext<'_>) {}

    /// Called on the topmost live screen when a back key went down.
    fn on_key_back_pressed(&mut self, _ctx: &mut ScreenContext<'_>) {}

    fn on_lost_focus(&mut self, _ctx: &mut ScreenContext<'_>) {}

    //--- Animation --------------------------------------------------------

    fn prepare_animate_in(&mut self) {}

    fn prepare_animate_out(&mut self) {}

    fn animate_in(&mut self) {}

    fn animate_out(&mut self) {}

    /// Polled every tick while the director waits on an animation.
    fn is_animation_ended(&self, _animation: Animation) -> bool {
        true
    }

    //--- Presence ---------------------------------------------------------

    fn set_visible(&mut self, _visible: bool) {}

    /// Called right before the director drops the instance.
    fn destroy(&mut self) {}
}

//=== ScreenClone =========================================================

/// Object-safe cloning for boxed screens.
///
/// Blanket-implemented for every `Screen + Clone`, so screens only need
/// `#[derive(Clone)]`.
pub trait ScreenClone {
    fn clone_box(&self) -> Box<dyn Screen>;
}

impl<T> ScreenClone for T
where
    T: Screen + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn Screen> {
        Box::new(self.clone())
    }
}
