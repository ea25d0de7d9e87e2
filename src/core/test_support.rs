//=========================================================================
// Test Support
//=========================================================================
//
// Shared mocks for unit tests: recording screens, a scripted transport
// and a manually driven asset source.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::http::{RequestNode, RequestSpec, Response, Transport};
use crate::core::resource::{Asset, AssetLoad, AssetSource};
use crate::core::screen::{Animation, Layer, Payload, Screen, ScreenContext, ScreenFactory};

//=== Event Log ===========================================================

/// Shared, ordered record of "Name:event" strings.
pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

pub(crate) fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Events recorded for `name`, in order, without the name prefix.
pub(crate) fn events_of(log: &EventLog, name: &str) -> Vec<String> {
    let prefix = format!("{}:", name);
    log.borrow()
        .iter()
        .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

//=== Probe ===============================================================

/// Screen that records every hook into an [`EventLog`].
#[derive(Clone)]
pub(crate) struct Probe {
    name: &'static str,
    layer: Layer,
    log: EventLog,
    anim_frames: u32,
    countdown: Cell<u32>,
    close_on_back: bool,
}

impl Probe {
    pub(crate) fn new(name: &'static str, layer: Layer, log: &EventLog) -> Self {
        Self {
            name,
            layer,
            log: log.clone(),
            anim_frames: 0,
            countdown: Cell::new(0),
            close_on_back: false,
        }
    }

    /// Every animation takes `frames` extra polls to end.
    pub(crate) fn animated(mut self, frames: u32) -> Self {
        self.anim_frames = frames;
        self
    }

    pub(crate) fn closing_on_back(mut self) -> Self {
        self.close_on_back = true;
        self
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, event));
    }
}

impl Screen for Probe {
    fn layer(&self) -> Layer {
        self.layer
    }

    fn on_created(&mut self, payload: &Payload, _ctx: &mut ScreenContext<'_>) {
        match payload.get::<&'static str>() {
            Some(text) => self.record(&format!("created({})", text)),
            None => self.record("created"),
        }
    }

    fn on_start(&mut self, _payload: &Payload, _ctx: &mut ScreenContext<'_>) {
        self.record("start");
    }

    fn on_focus(&mut self, _ctx: &mut ScreenContext<'_>) {
        self.record("focus");
    }

    fn on_ready(&mut self, _ctx: &mut ScreenContext<'_>) {
        self.record("ready");
    }

    fn on_key_back_pressed(&mut self, ctx: &mut ScreenContext<'_>) {
        self.record("back");
        if self.close_on_back {
            ctx.close_self(false);
        }
    }

    fn on_lost_focus(&mut self, _ctx: &mut ScreenContext<'_>) {
        self.record("lost_focus");
    }

    fn prepare_animate_in(&mut self) {
        self.record("prepare_in");
    }

    fn prepare_animate_out(&mut self) {
        self.record("prepare_out");
    }

    fn animate_in(&mut self) {
        self.record("animate_in");
        self.countdown.set(self.anim_frames);
    }

    fn animate_out(&mut self) {
        self.record("animate_out");
        self.countdown.set(self.anim_frames);
    }

    fn is_animation_ended(&self, _animation: Animation) -> bool {
        match self.countdown.get() {
            0 => true,
            left => {
                self.countdown.set(left - 1);
                false
            }
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(if visible { "shown" } else { "hidden" });
    }

    fn destroy(&mut self) {
        self.record("destroy");
    }
}

/// Factory serving the given probes by name.
pub(crate) fn probe_factory(probes: Vec<Probe>) -> ScreenFactory {
    let mut factory = ScreenFactory::new();
    for probe in probes {
        let name = probe.name;
        factory.register(name, move || Box::new(probe.clone()));
    }
    factory
}

//=== ScriptedTransport ===================================================

#[derive(Default)]
struct Script {
    responses: HashMap<String, VecDeque<Response>>,
    delay: u32,
    sent: Vec<String>,
    aborted: Vec<String>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Transport answering from per-URL scripts (200 with an empty body when
/// a URL has nothing scripted). Clones share the same script and record.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every node resolves `frames` polls after it was sent.
    pub(crate) fn with_delay(self, frames: u32) -> Self {
        self.script.borrow_mut().delay = frames;
        self
    }

    /// Queues `response` for the next send to `url`.
    pub(crate) fn respond(&self, url: &str, response: Response) {
        self.script
            .borrow_mut()
            .responses
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.script.borrow().sent.clone()
    }

    pub(crate) fn aborted(&self) -> Vec<String> {
        self.script.borrow().aborted.clone()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.script.borrow().in_flight
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.script.borrow().max_in_flight
    }
}

impl Transport for ScriptedTransport {
    fn create_node(&self, spec: &RequestSpec) -> Box<dyn RequestNode> {
        Box::new(ScriptedNode {
            url: spec.url().to_string(),
            script: self.script.clone(),
            response: None,
            frames_left: 0,
            live: false,
        })
    }
}

struct ScriptedNode {
    url: String,
    script: Rc<RefCell<Script>>,
    response: Option<Response>,
    frames_left: u32,
    live: bool,
}

impl RequestNode for ScriptedNode {
    fn send(&mut self) {
        let mut script = self.script.borrow_mut();
        script.sent.push(self.url.clone());
        script.in_flight += 1;
        script.max_in_flight = script.max_in_flight.max(script.in_flight);
        self.frames_left = script.delay;
        self.response = Some(
            script
                .responses
                .get_mut(&self.url)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Response::new(200)),
        );
        self.live = true;
    }

    fn poll(&mut self) -> Option<Response> {
        if !self.live {
            return None;
        }
        if self.frames_left > 0 {
            self.frames_left -= 1;
            return None;
        }
        self.live = false;
        self.script.borrow_mut().in_flight -= 1;
        self.response.take()
    }

    fn abort(&mut self) {
        self.script.borrow_mut().aborted.push(self.url.clone());
    }
}

impl Drop for ScriptedNode {
    fn drop(&mut self) {
        if self.live {
            self.script.borrow_mut().in_flight -= 1;
        }
    }
}

//=== ManualAssetSource ===================================================

#[derive(Default)]
struct Shelf {
    ready: HashMap<String, Vec<Asset>>,
    begun: Vec<String>,
    cancelled: Vec<String>,
}

/// Asset source whose loads finish only once the test resolves their
/// path. A path may be resolved before or after its load begins.
#[derive(Clone, Default)]
pub(crate) struct ManualAssetSource {
    shelf: Rc<RefCell<Shelf>>,
}

impl ManualAssetSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn resolve(&self, path: &str, assets: Vec<Asset>) {
        self.shelf.borrow_mut().ready.insert(path.to_string(), assets);
    }

    pub(crate) fn begun(&self) -> Vec<String> {
        self.shelf.borrow().begun.clone()
    }

    pub(crate) fn cancelled(&self) -> Vec<String> {
        self.shelf.borrow().cancelled.clone()
    }
}

impl AssetSource for ManualAssetSource {
    fn begin(&mut self, path: &str, _type_filter: Option<TypeId>) -> Box<dyn AssetLoad> {
        self.shelf.borrow_mut().begun.push(path.to_string());
        Box::new(ManualLoad {
            path: path.to_string(),
            shelf: self.shelf.clone(),
        })
    }
}

struct ManualLoad {
    path: String,
    shelf: Rc<RefCell<Shelf>>,
}

impl AssetLoad for ManualLoad {
    fn poll(&mut self) -> Option<Vec<Asset>> {
        self.shelf.borrow_mut().ready.remove(&self.path)
    }

    fn cancel(&mut self) {
        self.shelf.borrow_mut().cancelled.push(self.path.clone());
    }
}
