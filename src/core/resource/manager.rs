//=========================================================================
// Resource Manager
//=========================================================================
//
// FIFO of asset loads with a path-keyed cache.
//
// Architecture:
//   load(task) ──cache hit──► on_complete (synchronously, type filtered)
//        │
//        └──miss──► queue ──update()──► AssetSource::begin ──poll──► cache?
//                                                                    ↓
//                                                             on_complete
//
// One load runs at a time. A queued task whose path was cached while it
// waited is answered from the cache when dequeued.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::source::{Asset, AssetLoad, AssetSource, EmptyAssetSource};

//=== LoadTask ============================================================

/// Callback receiving the assets of a finished load.
pub type LoadCallback = Box<dyn FnOnce(&[Asset])>;

/// One request for the assets at a path.
pub struct LoadTask {
    path: String,
    type_filter: Option<TypeId>,
    cache: bool,
    on_complete: Option<LoadCallback>,
}

impl LoadTask {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            type_filter: None,
            cache: false,
            on_complete: None,
        }
    }

    /// Restricts the load to assets of type `T`.
    pub fn of_type<T: 'static>(mut self) -> Self {
        self.type_filter = Some(TypeId::of::<T>());
        self
    }

    pub fn with_type_filter(mut self, type_filter: Option<TypeId>) -> Self {
        self.type_filter = type_filter;
        self
    }

    /// Keeps the loaded assets in the cache under the trimmed path.
    pub fn cached(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce(&[Asset]) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Cache key: the path without surrounding whitespace.
    pub fn key(&self) -> &str {
        self.path.trim()
    }

    fn complete(mut self, assets: &[Asset]) {
        if let Some(callback) = self.on_complete.take() {
            callback(assets);
        }
    }
}

impl fmt::Debug for LoadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTask")
            .field("path", &self.path)
            .field("type_filter", &self.type_filter)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

//=== ResourceManager =====================================================

struct RunningLoad {
    task: LoadTask,
    load: Box<dyn AssetLoad>,
}

/// Loads and caches assets from an [`AssetSource`].
pub struct ResourceManager {
    source: Box<dyn AssetSource>,
    cache: HashMap<String, Vec<Asset>>,
    queue: VecDeque<LoadTask>,
    running: Option<RunningLoad>,
}

impl ResourceManager {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: HashMap::new(),
            queue: VecDeque::new(),
            running: None,
        }
    }

    /// Replaces the asset source. Queued and cached assets are kept.
    pub fn set_source(&mut self, source: impl AssetSource + 'static) {
        self.source = Box::new(source);
    }

    //--- Requests ---------------------------------------------------------

    /// Requests assets. A cached path completes before this returns;
    /// anything else is queued for [`update`](Self::update).
    pub fn load(&mut self, task: LoadTask) {
        match self.cached_for(&task) {
            Some(assets) => task.complete(&assets),
            None => {
                debug!("Queued resource load '{}'", task.key());
                self.queue.push_back(task);
            }
        }
    }

    pub fn load_all(&mut self, tasks: impl IntoIterator<Item = LoadTask>) {
        for task in tasks {
            self.load(task);
        }
    }

    /// Drops the cached assets of `path`.
    pub fn unload(&mut self, path: &str) {
        if self.cache.remove(path.trim()).is_some() {
            debug!("Unloaded '{}'", path.trim());
        }
    }

    pub fn unload_all(&mut self) {
        debug!("Unloading {} cached path(s)", self.cache.len());
        self.cache.clear();
    }

    /// Clears the queue and cancels the running load. Their callbacks
    /// never fire.
    pub fn stop(&mut self) {
        let dropped = self.queue.len() + usize::from(self.running.is_some());
        if dropped > 0 {
            warn!("Stopping resource manager with {} unfinished load(s)", dropped);
        }

        self.queue.clear();
        if let Some(mut running) = self.running.take() {
            running.load.cancel();
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.contains_key(path.trim())
    }

    /// Cached assets of `path`, unfiltered.
    pub fn cached(&self, path: &str) -> Option<&[Asset]> {
        self.cache.get(path.trim()).map(Vec::as_slice)
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some() || !self.queue.is_empty()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    //--- Tick -------------------------------------------------------------

    /// Starts the next queued load when idle, then polls the running one.
    pub(crate) fn update(&mut self) {
        if self.running.is_none() {
            self.start_next();
        }

        let finished = match self.running.as_mut() {
            Some(running) => running.load.poll(),
            None => None,
        };

        if let Some(assets) = finished {
            if let Some(running) = self.running.take() {
                self.finish(running.task, assets);
            }
        }
    }

    fn start_next(&mut self) {
        while let Some(task) = self.queue.pop_front() {
            if let Some(assets) = self.cached_for(&task) {
                debug!("'{}' was cached while queued", task.key());
                task.complete(&assets);
                continue;
            }

            debug!("Loading '{}'", task.key());
            let load = self.source.begin(task.key(), task.type_filter);
            self.running = Some(RunningLoad { task, load });
            return;
        }
    }

    fn finish(&mut self, task: LoadTask, assets: Vec<Asset>) {
        debug!("Loaded '{}' ({} asset(s))", task.key(), assets.len());

        if task.cache && !assets.is_empty() {
            self.cache
                .entry(task.key().to_string())
                .or_default()
                .extend(assets.iter().cloned());
        }

        task.complete(&assets);
    }

    fn cached_for(&self, task: &LoadTask) -> Option<Vec<Asset>> {
        let assets = self.cache.get(task.key())?;
        Some(match task.type_filter {
            Some(wanted) => assets
                .iter()
                .filter(|asset| (***asset).type_id() == wanted)
                .cloned()
                .collect(),
            None => assets.clone(),
        })
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(EmptyAssetSource)
    }
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("cached_paths", &self.cache.len())
            .field("queued", &self.queue.len())
            .field("running", &self.running.as_ref().map(|r| r.task.key().to_string()))
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
