//=========================================================================
// Loading Sequencer
//=========================================================================
//
// Runs the phases of one loading run, one tick at a time:
//
//   PreWaits ─► Resources ─► Groups ─► Requests ─► PostWaits ─► Done
//
// Each phase completes before the next begins. The force-close flag is
// checked before every step and after every finished wait, group or
// request; when set, the run unwinds and releases whatever dispatchers
// it still owns.
//
// Request and resource callbacks report back through a channel that the
// sequencer drains at the start of each step.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::fmt;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

//=== Internal Dependencies ===============================================

use super::data::{ForceClose, RequestTask, SharedLoadingData, SharedRequestTask};
use crate::core::http::{Dispatcher, DispatcherGroup, NetContext, Request};
use crate::core::resource::{LoadTask, ResourceManager};
use crate::core::task::WaitTask;

//=== PhaseEvent ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseEvent {
    ResourceReady,
    RequestFinished { failed: bool },
}

//=== Phase ===============================================================

enum Phase {
    PreWaits,
    Resources { expected: usize, ready: usize },
    Groups { index: usize, running: Option<Running<DispatcherGroup>> },
    Requests { index: usize, running: Option<Running<Dispatcher>> },
    PostWaits,
    Done,
}

struct Running<T> {
    inner: T,
    tasks: Vec<SharedRequestTask>,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::PreWaits => "pre-waits",
            Phase::Resources { .. } => "resources",
            Phase::Groups { .. } => "parallel groups",
            Phase::Requests { .. } => "requests",
            Phase::PostWaits => "post-waits",
            Phase::Done => "done",
        }
    }
}

//=== SequencerStep =======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SequencerStep {
    Running,
    Finished,
    ForceClosed,
}

//=== Sequencer ===========================================================

pub(crate) struct Sequencer {
    data: SharedLoadingData,
    force_close: ForceClose,
    pre_waits: VecDeque<Box<dyn WaitTask>>,
    post_waits: VecDeque<Box<dyn WaitTask>>,
    phase: Phase,
    sender: Sender<PhaseEvent>,
    events: Receiver<PhaseEvent>,
    last_request_failed: Option<bool>,
}

impl Sequencer {
    /// Takes the waits out of `data` so they can be polled without
    /// holding a borrow on it.
    pub(crate) fn new(data: SharedLoadingData) -> Self {
        let (sender, events) = unbounded();
        let (force_close, pre_waits, post_waits) = {
            let mut data = data.borrow_mut();
            (
                data.force_close(),
                std::mem::take(&mut data.pre_waits),
                std::mem::take(&mut data.post_waits),
            )
        };

        Self {
            data,
            force_close,
            pre_waits: pre_waits.into(),
            post_waits: post_waits.into(),
            phase: Phase::PreWaits,
            sender,
            events,
            last_request_failed: None,
        }
    }

    pub(crate) fn data(&self) -> &SharedLoadingData {
        &self.data
    }

    /// Advances as far as possible this tick.
    pub(crate) fn step(&mut self, net: &NetContext, resources: &mut ResourceManager) -> SequencerStep {
        self.drain_events();

        loop {
            if self.force_close.is_set() {
                debug!("Loading force-closed during {}", self.phase.name());
                self.release();
                return SequencerStep::ForceClosed;
            }

            let phase = std::mem::replace(&mut self.phase, Phase::Done);
            let before = std::mem::discriminant(&phase);
            let (next, waiting) = match phase {
                Phase::PreWaits => match Self::poll_waits(&mut self.pre_waits, &self.force_close) {
                    true if self.force_close.is_set() => (Phase::PreWaits, false),
                    true => (self.begin_resources(resources), false),
                    false => (Phase::PreWaits, true),
                },
                Phase::Resources { expected, ready } if ready < expected => {
                    (Phase::Resources { expected, ready }, true)
                }
                Phase::Resources { .. } => (Phase::Groups { index: 0, running: None }, false),
                Phase::Groups { index, running } => self.step_groups(index, running, net),
                Phase::Requests { index, running } => self.step_requests(index, running, net),
                Phase::PostWaits => match Self::poll_waits(&mut self.post_waits, &self.force_close) {
                    true => (Phase::Done, false),
                    false => (Phase::PostWaits, true),
                },
                Phase::Done => return SequencerStep::Finished,
            };

            if std::mem::discriminant(&next) != before {
                debug!("Loading phase: {}", next.name());
            }
            self.phase = next;

            if waiting {
                return SequencerStep::Running;
            }
        }
    }

    /// Destroys any dispatcher the run still owns.
    pub(crate) fn release(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Groups { running: Some(mut running), .. } => running.inner.destroy(),
            Phase::Requests { running: Some(mut running), .. } => running.inner.destroy(),
            _ => {}
        }
    }

    //--- Events -----------------------------------------------------------

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PhaseEvent::ResourceReady => {
                    if let Phase::Resources { ready, .. } = &mut self.phase {
                        *ready += 1;
                    }
                }
                PhaseEvent::RequestFinished { failed } => self.last_request_failed = Some(failed),
            }
        }
    }

    //--- Waits ------------------------------------------------------------

    /// Polls the front wait; returns `true` once the list is exhausted or
    /// a finished wait raised the force-close flag.
    fn poll_waits(waits: &mut VecDeque<Box<dyn WaitTask>>, force_close: &ForceClose) -> bool {
        while let Some(wait) = waits.front_mut() {
            if !wait.poll() {
                return false;
            }
            waits.pop_front();
            if force_close.is_set() {
                return true;
            }
        }
        true
    }

    //--- Resources --------------------------------------------------------

    fn begin_resources(&mut self, resources: &mut ResourceManager) -> Phase {
        let loads: Vec<LoadTask> = self
            .data
            .borrow()
            .resources
            .iter()
            .map(|(_, task)| {
                task.borrow_mut().set_pending();
                let (path, type_filter) = {
                    let task = task.borrow();
                    (task.full_path(), task.type_filter())
                };
                let task = task.clone();
                let sender = self.sender.clone();
                LoadTask::new(path)
                    .with_type_filter(type_filter)
                    .on_complete(move |assets| {
                        task.borrow_mut().complete(assets);
                        let _ = sender.send(PhaseEvent::ResourceReady);
                    })
            })
            .collect();

        let expected = loads.len();
        resources.load_all(loads);

        // Cache hits complete synchronously inside `load_all`
        let mut ready = 0;
        while let Ok(event) = self.events.try_recv() {
            if event == PhaseEvent::ResourceReady {
                ready += 1;
            }
        }

        Phase::Resources { expected, ready }
    }

    //--- Parallel Groups --------------------------------------------------

    fn step_groups(
        &mut self,
        index: usize,
        running: Option<Running<DispatcherGroup>>,
        net: &NetContext,
    ) -> (Phase, bool) {
        let Some(mut running) = running else {
            return match self.start_group(index) {
                Some(running) => (Phase::Groups { index, running: Some(running) }, false),
                None => (Phase::Requests { index: 0, running: None }, false),
            };
        };

        running.inner.update(net);
        if !running.inner.is_empty() {
            return (Phase::Groups { index, running: Some(running) }, true);
        }

        let aborted = running.tasks.iter().any(|task| {
            let task = task.borrow();
            task.is_abort_if_failed() && task.has_failed()
        });
        running.inner.destroy();

        if aborted {
            debug!("Parallel group {} failed; skipping remaining groups", index);
            (Phase::Requests { index: 0, running: None }, false)
        } else {
            (Phase::Groups { index: index + 1, running: None }, false)
        }
    }

    fn start_group(&self, index: usize) -> Option<Running<DispatcherGroup>> {
        let tasks: Vec<SharedRequestTask> = {
            let data = self.data.borrow();
            let (_, group) = data.groups.get(index)?;
            group.tasks().cloned().collect()
        };

        let mut group = DispatcherGroup::new();
        for task in &tasks {
            if let Some(request) = self.issue(task) {
                let mut dispatcher = Dispatcher::new();
                if dispatcher.add_request(request).is_ok() {
                    group.send(dispatcher);
                }
            }
        }

        Some(Running { inner: group, tasks })
    }

    //--- Sequential Requests ----------------------------------------------

    fn step_requests(
        &mut self,
        index: usize,
        running: Option<Running<Dispatcher>>,
        net: &NetContext,
    ) -> (Phase, bool) {
        let Some(mut running) = running else {
            return self.start_request(index);
        };

        if self.last_request_failed.is_none() {
            running.inner.update(net);
            self.drain_events();
        }

        match self.last_request_failed.take() {
            None => (Phase::Requests { index, running: Some(running) }, true),
            Some(failed) => {
                let abort = failed && running.tasks.iter().any(|task| task.borrow().is_abort_if_failed());
                if abort {
                    debug!("Request {} failed; skipping remaining requests", index);
                    (Phase::PostWaits, false)
                } else {
                    (Phase::Requests { index: index + 1, running: None }, false)
                }
            }
        }
    }

    fn start_request(&mut self, index: usize) -> (Phase, bool) {
        let task = match self.data.borrow().requests.get(index) {
            Some((_, task)) => task.clone(),
            None => return (Phase::PostWaits, false),
        };

        let Some(request) = self.issue(&task) else {
            return (Phase::Requests { index: index + 1, running: None }, false);
        };

        let mut dispatcher = Dispatcher::new();
        match dispatcher.add_request(request) {
            Ok(_) => {
                dispatcher.send();
                self.last_request_failed = None;
                let running = Running { inner: dispatcher, tasks: vec![task] };
                (Phase::Requests { index, running: Some(running) }, false)
            }
            Err(_) => (Phase::Requests { index: index + 1, running: None }, false),
        }
    }

    //--- Requests ---------------------------------------------------------

    /// Marks the task pending and wraps it in a request reporting back to
    /// this sequencer. Tasks without a request are ready immediately.
    fn issue(&self, task: &SharedRequestTask) -> Option<Request> {
        task.borrow_mut().set_pending();

        let spec = task.borrow().spec().cloned();
        let Some(spec) = spec else {
            task.borrow_mut().set_ready();
            return None;
        };

        let succeeded = task.clone();
        let failed = task.clone();
        let errored = task.clone();
        let finished = task.clone();
        let sender = self.sender.clone();

        Some(
            Request::new(spec)
                .on_success(move |response| RequestTask::record(&succeeded, response))
                .on_failure(move |response| RequestTask::record(&failed, response))
                .on_error(move |response| RequestTask::record(&errored, response))
                .on_finish(move |response| {
                    finished.borrow_mut().set_ready();
                    let _ = sender.send(PhaseEvent::RequestFinished {
                        failed: !response.is_success(),
                    });
                }),
        )
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("phase", &self.phase.name())
            .field("force_close", &self.force_close.is_set())
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{RequestSpec, Response};
    use crate::core::loading::{LoadingData, ParallelGroup, ResourceTask, TaskStatus};
    use crate::core::task::{WaitFrames, WaitUntil};
    use crate::core::test_support::{ManualAssetSource, ScriptedTransport};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Rig {
        transport: ScriptedTransport,
        net: NetContext,
        assets: ManualAssetSource,
        resources: ResourceManager,
    }

    impl Rig {
        fn new() -> Self {
            let transport = ScriptedTransport::new();
            let assets = ManualAssetSource::new();
            Self {
                net: NetContext::new(transport.clone()),
                resources: ResourceManager::new(assets.clone()),
                transport,
                assets,
            }
        }

        fn run(&mut self, sequencer: &mut Sequencer) -> SequencerStep {
            for _ in 0..64 {
                self.resources.update();
                match sequencer.step(&self.net, &mut self.resources) {
                    SequencerStep::Running => continue,
                    done => return done,
                }
            }
            panic!("sequencer did not finish");
        }
    }

    fn get(url: &str) -> RequestTask {
        RequestTask::new(RequestSpec::get(url))
    }

    #[test]
    fn empty_data_finishes_immediately() {
        let mut rig = Rig::new();
        let mut sequencer = Sequencer::new(LoadingData::new().into_shared());

        assert_eq!(sequencer.step(&rig.net, &mut rig.resources), SequencerStep::Finished);
    }

    #[test]
    fn phases_run_in_order() {
        let mut rig = Rig::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let pre = order.clone();
        let post = order.clone();
        let group = order.clone();
        let seq = order.clone();
        let data = LoadingData::new()
            .with_pre_wait(WaitUntil::new(move || {
                pre.borrow_mut().push("pre");
                true
            }))
            .with_group(
                "g",
                ParallelGroup::new().with_request(
                    "config",
                    get("/config").on_success(move |_| group.borrow_mut().push("group")),
                ),
            )
            .with_request("profile", get("/profile").on_success(move |_| seq.borrow_mut().push("request")))
            .with_post_wait(WaitUntil::new(move || {
                post.borrow_mut().push("post");
                true
            }))
            .into_shared();

        let mut sequencer = Sequencer::new(data);

        assert_eq!(rig.run(&mut sequencer), SequencerStep::Finished);
        assert_eq!(*order.borrow(), vec!["pre", "group", "request", "post"]);
        assert_eq!(rig.transport.sent(), vec!["/config", "/profile"]);
    }

    #[test]
    fn resources_phase_waits_for_every_load() {
        let mut rig = Rig::new();
        let data = LoadingData::new()
            .with_resource(ResourceTask::new("icon", "ui"))
            .with_resource(ResourceTask::new("font", "ui"))
            .with_request("after", get("/after"))
            .into_shared();
        let mut sequencer = Sequencer::new(data.clone());

        for _ in 0..3 {
            rig.resources.update();
            assert_eq!(sequencer.step(&rig.net, &mut rig.resources), SequencerStep::Running);
        }
        assert!(rig.transport.sent().is_empty(), "Requests wait for resources");

        rig.assets.resolve("ui/icon", vec![Rc::new(7u32)]);
        rig.assets.resolve("ui/font", vec![]);

        assert_eq!(rig.run(&mut sequencer), SequencerStep::Finished);
        let icon = data.borrow().resource("icon").unwrap();
        assert_eq!(icon.borrow().asset_as::<u32>().as_deref(), Some(&7));
        assert_eq!(icon.borrow().status(), TaskStatus::Ready);
        assert_eq!(rig.transport.sent(), vec!["/after"]);
    }

    #[test]
    fn failed_abort_if_failed_request_skips_the_rest() {
        let mut rig = Rig::new();
        rig.transport.respond("/a", Response::new(500).with_body("down"));
        let data = LoadingData::new()
            .with_request("a", get("/a").abort_if_failed(true))
            .with_request("b", get("/b"))
            .into_shared();
        let mut sequencer = Sequencer::new(data.clone());

        assert_eq!(rig.run(&mut sequencer), SequencerStep::Finished);

        assert_eq!(rig.transport.sent(), vec!["/a"]);
        assert_eq!(data.borrow().request("b").unwrap().borrow().status(), TaskStatus::Waiting);
        assert_eq!(data.borrow().http_errors(), vec!["down"]);
    }

    #[test]
    fn failed_request_without_flag_continues() {
        let mut rig = Rig::new();
        rig.transport.respond("/a", Response::network_error("offline"));
        let data = LoadingData::new()
            .with_request("a", get("/a"))
            .with_request("b", get("/b"))
            .into_shared();
        let mut sequencer = Sequencer::new(data);

        assert_eq!(rig.run(&mut sequencer), SequencerStep::Finished);
        assert_eq!(rig.transport.sent(), vec!["/a", "/b"]);
    }

    #[test]
    fn failed_group_completes_but_skips_next_group() {
        let mut rig = Rig::new();
        rig.transport = rig.transport.clone().with_delay(2);
        rig.transport.respond("/a", Response::new(503));
        let data = LoadingData::new()
            .with_group(
                "first",
                ParallelGroup::new()
                    .with_request("a", get("/a").abort_if_failed(true))
                    .with_request("b", get("/b")),
            )
            .with_group("second", ParallelGroup::new().with_request("c", get("/c")))
            .with_request("d", get("/d"))
            .into_shared();
        let mut sequencer = Sequencer::new(data.clone());

        assert_eq!(rig.run(&mut sequencer), SequencerStep::Finished);

        assert_eq!(rig.transport.sent(), vec!["/a", "/b", "/d"]);
        assert_eq!(rig.transport.max_in_flight(), 2, "Group requests overlap");
        let b = data.borrow().group_request("first", "b").unwrap();
        assert_eq!(b.borrow().status(), TaskStatus::Ready);
    }

    #[test]
    fn force_close_from_callback_stops_the_run() {
        let mut rig = Rig::new();
        let data = LoadingData::new();
        let force = data.force_close();
        let post_ran = Rc::new(Cell::new(false));
        let post_flag = post_ran.clone();
        let data = data
            .with_request("a", get("/a").on_success(move |_| force.set()))
            .with_request("b", get("/b"))
            .with_post_wait(WaitUntil::new(move || {
                post_flag.set(true);
                true
            }))
            .into_shared();
        let mut sequencer = Sequencer::new(data);

        assert_eq!(rig.run(&mut sequencer), SequencerStep::ForceClosed);
        assert_eq!(rig.transport.sent(), vec!["/a"]);
        assert!(!post_ran.get());
    }

    #[test]
    fn force_close_during_group_releases_dispatchers() {
        let mut rig = Rig::new();
        rig.transport = rig.transport.clone().with_delay(10);
        let data = LoadingData::new()
            .with_group("g", ParallelGroup::new().with_request("a", get("/slow")))
            .into_shared();
        let force = data.borrow().force_close();
        let mut sequencer = Sequencer::new(data);

        sequencer.step(&rig.net, &mut rig.resources);
        sequencer.step(&rig.net, &mut rig.resources);
        assert_eq!(rig.transport.in_flight(), 1);

        force.set();

        assert_eq!(sequencer.step(&rig.net, &mut rig.resources), SequencerStep::ForceClosed);
        assert_eq!(rig.transport.aborted(), vec!["/slow"]);
        assert_eq!(rig.transport.in_flight(), 0);
    }

    #[test]
    fn pre_waits_gate_everything_else() {
        let mut rig = Rig::new();
        let data = LoadingData::new()
            .with_pre_wait(WaitFrames::new(3))
            .with_request("a", get("/a"))
            .into_shared();
        let mut sequencer = Sequencer::new(data);

        sequencer.step(&rig.net, &mut rig.resources);
        sequencer.step(&rig.net, &mut rig.resources);
        assert!(rig.transport.sent().is_empty());

        assert_eq!(rig.run(&mut sequencer), SequencerStep::Finished);
        assert_eq!(rig.transport.sent(), vec!["/a"]);
    }
}
