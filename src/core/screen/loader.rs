//=========================================================================
// Scene Loader
//=========================================================================
//
// External collaborator that instantiates screen templates by name.
//
// The director asks for a template once per registry miss and polls the
// returned completion every tick. A loader that drops the completion
// without fulfilling it reports "unknown screen".
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::Screen;
use crate::core::task::Completion;

//=== Types ===============================================================

pub type LoadedScreen = Box<dyn Screen>;

pub type ScreenConstructor = Box<dyn Fn() -> Box<dyn Screen>>;

//=== SceneLoader Trait ===================================================

/// Asynchronously instantiates named screen templates.
pub trait SceneLoader {
    /// Starts loading `name`. `done` must be completed at most once; dropping
    /// it abandons the load.
    fn load(&mut self, name: &str, additive: bool, done: Completion<LoadedScreen>);

    /// Advances in-flight loads. Called once per tick before jobs step.
    fn update(&mut self) {}
}

//=== ScreenFactory =======================================================

/// In-process loader: name → constructor.
///
/// Loads complete on the tick after the request, or after the configured
/// number of extra frames.
pub struct ScreenFactory {
    constructors: HashMap<String, ScreenConstructor>,
    delay_frames: u32,
    pending: Vec<PendingScene>,
}

struct PendingScene {
    name: String,
    frames_left: u32,
    done: Completion<LoadedScreen>,
}

impl ScreenFactory {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
            delay_frames: 0,
            pending: Vec::new(),
        }
    }

    /// Extra frames every load takes before completing.
    pub fn with_delay(mut self, frames: u32) -> Self {
        self.delay_frames = frames;
        self
    }

    /// Registers a constructor, replacing any previous one for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Screen> + 'static,
    {
        let name = name.into();
        if self.constructors.insert(name.clone(), Box::new(constructor)).is_some() {
            warn!("Screen constructor {:?} was already registered and has been replaced", name);
        }
    }

    /// Builder-style `register`.
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn Screen> + 'static,
    {
        self.register(name, constructor);
        self
    }

    pub fn knows(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl Default for ScreenFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScreenFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenFactory")
            .field("screens", &self.constructors.len())
            .field("delay_frames", &self.delay_frames)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl SceneLoader for ScreenFactory {
    fn load(&mut self, name: &str, _additive: bool, done: Completion<LoadedScreen>) {
        if !self.knows(name) {
            warn!("No screen registered under {:?}", name);
            return;
        }
        debug!("Loading screen {:?}", name);
        self.pending.push(PendingScene {
            name: name.to_string(),
            frames_left: self.delay_frames,
            done,
        });
    }

    fn update(&mut self) {
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for mut scene in self.pending.drain(..) {
            if scene.frames_left > 0 {
                scene.frames_left -= 1;
                still_pending.push(scene);
                continue;
            }
            match self.constructors.get(&scene.name) {
                Some(constructor) => scene.done.complete(constructor()),
                None => warn!("Screen {:?} was unregistered while loading", scene.name),
            }
        }

        self.pending = still_pending;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::Layer;
    use crate::core::task::{completion, PollState};

    #[derive(Clone)]
    struct Blank;

    impl Screen for Blank {
        fn layer(&self) -> Layer {
            Layer::Popup
        }
    }

    #[test]
    fn completes_on_next_update() {
        let mut factory = ScreenFactory::new().with("Blank", || Box::new(Blank));
        let (done, mut pending) = completion();

        factory.load("Blank", true, done);
        assert!(matches!(pending.poll(), PollState::Waiting));

        factory.update();
        match pending.poll() {
            PollState::Ready(screen) => assert_eq!(screen.layer(), Layer::Popup),
            _ => panic!("expected a loaded screen"),
        }
    }

    #[test]
    fn delay_holds_completion() {
        let mut factory = ScreenFactory::new()
            .with_delay(2)
            .with("Blank", || Box::new(Blank));
        let (done, mut pending) = completion();

        factory.load("Blank", true, done);
        factory.update();
        factory.update();
        assert!(matches!(pending.poll(), PollState::Waiting));

        factory.update();
        assert!(matches!(pending.poll(), PollState::Ready(_)));
    }

    #[test]
    fn unknown_name_abandons() {
        let mut factory = ScreenFactory::new();
        let (done, mut pending) = completion::<LoadedScreen>();

        factory.load("Missing", true, done);

        assert!(matches!(pending.poll(), PollState::Abandoned));
    }
}
