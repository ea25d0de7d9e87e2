//=========================================================================
// Screen Director
//=========================================================================
//
// Owns every screen instance, the template registry and the live stack,
// and serializes all transitions through a single active job.
//
// Architecture:
//   load_screen()/close_screen() → jobs (FIFO)
//   update():
//     1. loader.update()
//     2. step active job until it waits (next job starts the same tick)
//     3. idle → top screen: on_key_back_pressed (if back) + on_update
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::flows::Flow;
use super::job::{ActiveJob, CloseJob, CloseState, Job, LoadJob, LoadState, LoadWait, Progress};
use super::live_stack::{LiveEntry, LiveStack};
use super::loader::{SceneLoader, ScreenFactory};
use super::registry::Registry;
use super::{Animation, Layer, Payload, Screen, ScreenContext, ScreenHandle};
use crate::core::globals::GlobalContext;
use crate::core::task::{completion, PollState};

//=== ScreenDirector ======================================================

/// Layered screen stack with a serialized transition queue.
pub struct ScreenDirector {
    loader: Box<dyn SceneLoader>,
    instances: HashMap<ScreenHandle, Box<dyn Screen>>,
    next_handle: u64,
    registry: Registry,
    pub(super) live: LiveStack,
    jobs: VecDeque<Job>,
    active: Option<ActiveJob>,
    pinned: Option<String>,
}

impl ScreenDirector {
    //--- Construction -----------------------------------------------------

    pub fn new(loader: impl SceneLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            instances: HashMap::new(),
            next_handle: 1,
            registry: Registry::new(),
            live: LiveStack::new(),
            jobs: VecDeque::new(),
            active: None,
            pinned: None,
        }
    }

    /// Replaces the scene loader. Loads already in flight keep reporting to
    /// the job that started them.
    pub fn set_loader(&mut self, loader: impl SceneLoader + 'static) {
        self.loader = Box::new(loader);
    }

    /// Registers an already constructed template under `name`, hidden.
    ///
    /// Returns the existing template's handle if `name` is already
    /// registered.
    pub fn preload(&mut self, name: impl Into<String>, mut screen: Box<dyn Screen>, cache: bool) -> ScreenHandle {
        let name = name.into();
        if let Some(existing) = self.registry.get(&name) {
            warn!("Screen {:?} is already registered", name);
            return existing.handle;
        }
        screen.set_visible(false);
        let handle = self.spawn(screen);
        self.registry.insert(name, handle, cache);
        handle
    }

    //--- Navigation -------------------------------------------------------

    /// Queues a transition to `name`. Never blocks; the job runs once every
    /// job queued before it has finished.
    pub fn load_screen(&mut self, name: impl Into<String>, payload: Payload, cache: bool) {
        let name = name.into();
        debug!("Queued load of {:?} (cache: {})", name, cache);
        self.jobs.push_back(Job::Load(LoadJob { name, payload, cache }));
    }

    /// Queues closing `target`.
    ///
    /// A target that is not live is a no-op: `on_finish` runs right away
    /// and nothing is queued.
    pub fn close_screen(
        &mut self,
        target: ScreenHandle,
        quick: bool,
        on_finish: Option<Box<dyn FnOnce()>>,
    ) {
        let mut job = CloseJob {
            target,
            quick,
            on_finish,
        };
        if !self.live.contains(target) {
            debug!("Close of {:?} ignored: not live", target);
            job.finish();
            return;
        }
        self.jobs.push_back(Job::Close(job));
    }

    //--- Queries ----------------------------------------------------------

    /// Live screens, bottom first.
    pub fn live_screens(&self) -> &[LiveEntry] {
        self.live.entries()
    }

    /// Names of live screens, bottom first.
    pub fn live_names(&self) -> Vec<&str> {
        self.live.entries().iter().map(LiveEntry::name).collect()
    }

    pub fn top(&self) -> Option<&LiveEntry> {
        self.live.top()
    }

    pub fn is_live(&self, handle: ScreenHandle) -> bool {
        self.live.contains(handle)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// No job running or queued.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.jobs.is_empty()
    }

    pub fn screen(&self, handle: ScreenHandle) -> Option<&dyn Screen> {
        self.instances.get(&handle).map(|screen| screen.as_ref())
    }

    pub fn screen_mut(&mut self, handle: ScreenHandle) -> Option<&mut (dyn Screen + 'static)> {
        self.instances.get_mut(&handle).map(|screen| screen.as_mut())
    }

    //--- Update Loop ------------------------------------------------------

    pub(crate) fn update(&mut self, ctx: &mut GlobalContext) {
        self.loader.update();

        loop {
            let mut job = match self.active.take() {
                Some(job) => job,
                None => match self.jobs.pop_front() {
                    Some(job) => {
                        debug!("Starting job {:?}", job);
                        if let Job::Load(load) = &job {
                            self.pinned = Some(load.name.clone());
                        }
                        ActiveJob::start(job)
                    }
                    None => break,
                },
            };

            match self.step_job(&mut job, ctx) {
                Progress::Pending => {
                    self.active = Some(job);
                    return;
                }
                Progress::Done => {
                    self.pinned = None;
                    debug_assert!(self.live.is_sorted(), "live stack out of layer order");
                }
            }
        }

        self.update_top(ctx);
    }

    fn update_top(&mut self, ctx: &mut GlobalContext) {
        let Some(top) = self.live.top().map(LiveEntry::handle) else {
            return;
        };
        let back = ctx.input_state.is_back_pressed();
        self.call(top, ctx, |screen, screen_ctx| {
            if back {
                screen.on_key_back_pressed(screen_ctx);
            }
            screen.on_update(screen_ctx);
        });
    }

    //--- Job Stepping -----------------------------------------------------

    fn step_job(&mut self, job: &mut ActiveJob, ctx: &mut GlobalContext) -> Progress {
        match job {
            ActiveJob::Load { job, state } => self.step_load(job, state, ctx),
            ActiveJob::Close { job, state } => self.step_close(job, state, ctx),
        }
    }

    fn step_load(&mut self, job: &mut LoadJob, state: &mut LoadState, ctx: &mut GlobalContext) -> Progress {
        loop {
            match state {
                LoadState::Load => match self.registry.get(&job.name) {
                    Some(entry) => {
                        self.registry.set_cached(&job.name, job.cache);
                        *state = self.begin_flow(job, entry.handle);
                    }
                    None => {
                        let (done, pending) = completion();
                        self.loader.load(&job.name, true, done);
                        *state = LoadState::Waiting(LoadWait::Scene(pending));
                    }
                },
                LoadState::Waiting(LoadWait::Scene(pending)) => match pending.poll() {
                    PollState::Ready(mut screen) => {
                        screen.set_visible(false);
                        let handle = self.spawn(screen);
                        debug!("Loaded {:?} as {:?}", job.name, handle);
                        self.registry.insert(job.name.clone(), handle, job.cache);
                        *state = self.begin_flow(job, handle);
                    }
                    PollState::Waiting => return Progress::Pending,
                    PollState::Abandoned => {
                        warn!("Screen {:?} could not be loaded", job.name);
                        *state = LoadState::End;
                    }
                },
                LoadState::Waiting(LoadWait::Present(flow)) => {
                    if self.step_flow(flow, ctx) == Progress::Pending {
                        return Progress::Pending;
                    }
                    *state = LoadState::End;
                }
                LoadState::End => return Progress::Done,
            }
        }
    }

    fn begin_flow(&self, job: &LoadJob, template: ScreenHandle) -> LoadState {
        match self.layer_of(template) {
            Some(layer) => {
                let flow = Flow::new(job.name.clone(), template, layer, job.payload.clone());
                LoadState::Waiting(LoadWait::Present(flow))
            }
            None => {
                warn!("Template of {:?} is gone", job.name);
                LoadState::End
            }
        }
    }

    fn step_close(&mut self, job: &mut CloseJob, state: &mut CloseState, ctx: &mut GlobalContext) -> Progress {
        loop {
            match state {
                CloseState::Start => {
                    let target = job.target;
                    if !self.live.contains(target) {
                        debug!("Close of {:?} skipped: no longer live", target);
                        job.finish();
                        *state = CloseState::End;
                        continue;
                    }
                    let was_top = self.top_handle() == Some(target);
                    self.lose_focus(target, ctx);
                    if job.quick {
                        self.finish_close(target);
                        self.after_close(job, was_top, ctx);
                        *state = CloseState::End;
                    } else {
                        self.begin_exit(target);
                        *state = CloseState::Exiting { was_top };
                    }
                }
                CloseState::Exiting { was_top } => {
                    let was_top = *was_top;
                    if !self.animation_ended(job.target, Animation::Out) {
                        return Progress::Pending;
                    }
                    self.finish_close(job.target);
                    self.after_close(job, was_top, ctx);
                    *state = CloseState::End;
                }
                CloseState::End => return Progress::Done,
            }
        }
    }

    fn after_close(&mut self, job: &mut CloseJob, was_top: bool, ctx: &mut GlobalContext) {
        if was_top {
            if let Some(top) = self.top_handle() {
                self.focus(top, ctx);
            }
        }
        job.finish();
    }

    //--- Screen Primitives ------------------------------------------------

    pub(super) fn top_handle(&self) -> Option<ScreenHandle> {
        self.live.top().map(LiveEntry::handle)
    }

    pub(super) fn layer_of(&self, handle: ScreenHandle) -> Option<Layer> {
        self.instances.get(&handle).map(|screen| screen.layer())
    }

    pub(super) fn call<F>(&mut self, handle: ScreenHandle, ctx: &mut GlobalContext, f: F)
    where
        F: FnOnce(&mut dyn Screen, &mut ScreenContext<'_>),
    {
        if let Some(screen) = self.instances.get_mut(&handle) {
            let mut screen_ctx = ScreenContext::new(handle, ctx);
            f(screen.as_mut(), &mut screen_ctx);
        }
    }

    pub(super) fn with_screen<F>(&mut self, handle: ScreenHandle, f: F)
    where
        F: FnOnce(&mut dyn Screen),
    {
        if let Some(screen) = self.instances.get_mut(&handle) {
            f(screen.as_mut());
        }
    }

    pub(super) fn animation_ended(&self, handle: ScreenHandle, animation: Animation) -> bool {
        self.instances
            .get(&handle)
            .map_or(true, |screen| screen.is_animation_ended(animation))
    }

    fn spawn(&mut self, screen: Box<dyn Screen>) -> ScreenHandle {
        let handle = ScreenHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.instances.insert(handle, screen);
        handle
    }

    pub(super) fn spawn_copy(&mut self, template: ScreenHandle) -> Option<ScreenHandle> {
        let copy = self.instances.get(&template)?.clone_box();
        Some(self.spawn(copy))
    }

    pub(super) fn stack(&mut self, handle: ScreenHandle, name: &str, layer: Layer, id: u32, from_top: bool) {
        let entry = LiveEntry::new(id, name, layer, handle);
        if from_top {
            self.live.insert_from_top(entry);
        } else {
            self.live.insert_from_bottom(entry);
        }
    }

    /// `on_created` → `prepare_animate_in` → visible.
    pub(super) fn present(&mut self, handle: ScreenHandle, payload: &Payload, ctx: &mut GlobalContext) {
        self.call(handle, ctx, |screen, screen_ctx| screen.on_created(payload, screen_ctx));
        self.with_screen(handle, |screen| {
            screen.prepare_animate_in();
            screen.set_visible(true);
        });
    }

    /// `on_start` → `on_focus` → `animate_in`.
    pub(super) fn enter(&mut self, handle: ScreenHandle, payload: &Payload, ctx: &mut GlobalContext) {
        self.call(handle, ctx, |screen, screen_ctx| screen.on_start(payload, screen_ctx));
        self.focus(handle, ctx);
        self.with_screen(handle, |screen| screen.animate_in());
    }

    pub(super) fn ready(&mut self, handle: ScreenHandle, ctx: &mut GlobalContext) {
        self.call(handle, ctx, |screen, screen_ctx| screen.on_ready(screen_ctx));
    }

    pub(super) fn focus(&mut self, handle: ScreenHandle, ctx: &mut GlobalContext) {
        match self.live.get_mut(handle) {
            Some(entry) if !entry.is_focused() => entry.set_focused(true),
            _ => return,
        }
        self.call(handle, ctx, |screen, screen_ctx| screen.on_focus(screen_ctx));
    }

    pub(super) fn lose_focus(&mut self, handle: ScreenHandle, ctx: &mut GlobalContext) {
        match self.live.get_mut(handle) {
            Some(entry) if entry.is_focused() => entry.set_focused(false),
            _ => return,
        }
        self.call(handle, ctx, |screen, screen_ctx| screen.on_lost_focus(screen_ctx));
    }

    pub(super) fn begin_exit(&mut self, handle: ScreenHandle) {
        self.with_screen(handle, |screen| {
            screen.prepare_animate_out();
            screen.animate_out();
        });
    }

    /// Hides a live screen, then destroys or deactivates it and drops it
    /// from the live stack.
    pub(super) fn finish_close(&mut self, handle: ScreenHandle) {
        self.with_screen(handle, |screen| screen.set_visible(false));
        self.finalize(handle);
    }

    fn finalize(&mut self, handle: ScreenHandle) {
        let Some(entry) = self.live.get(handle).cloned() else {
            return;
        };

        if self.live.is_superseded(handle) {
            self.destroy_instance(handle);
        } else {
            match self.registry.get(entry.name()) {
                None => self.destroy_instance(handle),
                Some(template) => {
                    if template.handle != handle {
                        self.destroy_instance(handle);
                    }
                    let pinned = self.pinned.as_deref() == Some(entry.name());
                    if !template.cached && !pinned {
                        debug!("Evicting uncached template {:?}", entry.name());
                        self.registry.remove(entry.name());
                        self.destroy_instance(template.handle);
                    }
                }
            }
        }

        self.live.remove(handle);
    }

    fn destroy_instance(&mut self, handle: ScreenHandle) {
        if let Some(mut screen) = self.instances.remove(&handle) {
            screen.destroy();
        }
    }
}

impl Default for ScreenDirector {
    fn default() -> Self {
        Self::new(ScreenFactory::new())
    }
}

impl Drop for ScreenDirector {
    fn drop(&mut self) {
        if !self.instances.is_empty() {
            debug!("Destroying {} remaining screen instances", self.instances.len());
        }
        for (_, mut screen) in self.instances.drain() {
            screen.destroy();
        }
    }
}

impl fmt::Debug for ScreenDirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenDirector")
            .field("live", &self.live_names())
            .field("instances", &self.instances.len())
            .field("queued_jobs", &self.jobs.len())
            .field("active", &self.active.is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
