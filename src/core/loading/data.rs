//=========================================================================
// Loading Data
//=========================================================================
//
// Everything one loading run needs: waits, resource tasks, parallel
// request groups, sequential request tasks, and where to go afterwards.
//
// The data is shared (`Rc<RefCell<..>>`) between the caller, the loading
// screen and the orchestrator, and is handed on as the payload of the
// next screen so it can read the results.
//
// Tasks are individually shared so their callbacks may freely read the
// surrounding data while a run is in progress.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::http::{RequestSpec, Response};
use crate::core::resource::Asset;
use crate::core::screen::Payload;
use crate::core::task::WaitTask;

//=== Aliases =============================================================

pub type SharedLoadingData = Rc<RefCell<LoadingData>>;
pub type SharedRequestTask = Rc<RefCell<RequestTask>>;
pub type SharedResourceTask = Rc<RefCell<ResourceTask>>;

//=== TaskStatus ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    /// Not reached yet.
    #[default]
    Waiting,

    /// Issued and not finished.
    Pending,

    /// Finished, successfully or not.
    Ready,
}

//=== ForceClose ==========================================================

/// Shareable abort flag for a loading run.
///
/// Clones observe the same flag, so a request callback can hold one and
/// stop the run from inside its own outcome.
#[derive(Debug, Clone, Default)]
pub struct ForceClose(Rc<Cell<bool>>);

impl ForceClose {
    pub fn set(&self) {
        self.0.set(true);
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

//=== ResourceTask ========================================================

/// A named asset to load during the resource phase.
#[derive(Debug, Clone)]
pub struct ResourceTask {
    name: String,
    path: String,
    type_filter: Option<TypeId>,
    asset: Option<Asset>,
    status: TaskStatus,
}

impl ResourceTask {
    /// Loads `name` from the directory `path` (which may be empty).
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            type_filter: None,
            asset: None,
            status: TaskStatus::Waiting,
        }
    }

    pub fn of_type<T: 'static>(mut self) -> Self {
        self.type_filter = Some(TypeId::of::<T>());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory and name joined with a single `/`.
    pub fn full_path(&self) -> String {
        let dir = self.path.trim_end_matches('/');
        if dir.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", dir, self.name)
        }
    }

    pub fn type_filter(&self) -> Option<TypeId> {
        self.type_filter
    }

    /// First asset the load produced.
    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    pub fn asset_as<T: Any>(&self) -> Option<Rc<T>> {
        self.asset.clone()?.downcast::<T>().ok()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub(crate) fn set_pending(&mut self) {
        self.status = TaskStatus::Pending;
    }

    pub(crate) fn complete(&mut self, assets: &[Asset]) {
        self.asset = assets.first().cloned();
        self.status = TaskStatus::Ready;
    }
}

//=== RequestTask =========================================================

pub type SuccessCallback = Box<dyn FnMut(&RequestTask)>;
pub type FailedCallback = Box<dyn FnMut(&str)>;

/// A request issued during a loading run, with the recorded outcome.
pub struct RequestTask {
    spec: Option<RequestSpec>,
    abort_if_failed: bool,

    response: Option<Response>,
    text: String,
    failure: String,
    error: String,
    status_code: u16,
    status: TaskStatus,

    on_success: Option<SuccessCallback>,
    on_failed: Option<FailedCallback>,
}

impl RequestTask {
    pub fn new(spec: RequestSpec) -> Self {
        Self {
            spec: Some(spec),
            ..Self::empty()
        }
    }

    /// A task with no request. It is marked ready without sending.
    pub fn empty() -> Self {
        Self {
            spec: None,
            abort_if_failed: false,
            response: None,
            text: String::new(),
            failure: String::new(),
            error: String::new(),
            status_code: 200,
            status: TaskStatus::Waiting,
            on_success: None,
            on_failed: None,
        }
    }

    /// When this task fails or errors, the remaining tasks of its phase
    /// are skipped.
    pub fn abort_if_failed(mut self, enabled: bool) -> Self {
        self.abort_if_failed = enabled;
        self
    }

    pub fn on_success(mut self, callback: impl FnMut(&RequestTask) + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Receives the failure body or the transport error.
    pub fn on_failed(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_failed = Some(Box::new(callback));
        self
    }

    pub fn into_shared(self) -> SharedRequestTask {
        Rc::new(RefCell::new(self))
    }

    //--- Results ----------------------------------------------------------

    pub fn spec(&self) -> Option<&RequestSpec> {
        self.spec.as_ref()
    }

    pub fn is_abort_if_failed(&self) -> bool {
        self.abort_if_failed
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Body of a successful response.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bytes(&self) -> &[u8] {
        self.response.as_ref().map(Response::bytes).unwrap_or_default()
    }

    /// Body of a non-success response.
    pub fn failure(&self) -> &str {
        &self.failure
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    /// Failure text when present, otherwise the transport error.
    pub fn err(&self) -> &str {
        if self.failure.is_empty() {
            &self.error
        } else {
            &self.failure
        }
    }

    pub fn has_failed(&self) -> bool {
        !self.failure.is_empty() || !self.error.is_empty()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    //--- Recording --------------------------------------------------------

    pub(crate) fn set_pending(&mut self) {
        self.status = TaskStatus::Pending;
    }

    pub(crate) fn set_ready(&mut self) {
        self.status = TaskStatus::Ready;
    }

    /// Records `response` on the shared task, then runs the matching user
    /// callback with no borrow of the task held by the caller.
    pub(crate) fn record(task: &SharedRequestTask, response: &Response) {
        let failed_with = {
            let mut this = task.borrow_mut();
            this.status_code = response.status();
            this.response = Some(response.clone());

            if response.is_network_error() {
                this.error = response.error().unwrap_or("network error").to_string();
                Some(this.error.clone())
            } else if response.is_success() {
                this.text = response.text().into_owned();
                None
            } else {
                this.failure = response.text().into_owned();
                if this.failure.is_empty() {
                    this.failure = format!("HTTP {}", response.status());
                }
                Some(this.failure.clone())
            }
        };

        match failed_with {
            None => {
                let callback = task.borrow_mut().on_success.take();
                if let Some(mut callback) = callback {
                    callback(&task.borrow());
                    task.borrow_mut().on_success = Some(callback);
                }
            }
            Some(message) => {
                let callback = task.borrow_mut().on_failed.take();
                if let Some(mut callback) = callback {
                    callback(&message);
                    task.borrow_mut().on_failed = Some(callback);
                }
            }
        }
    }
}

impl fmt::Debug for RequestTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTask")
            .field("spec", &self.spec)
            .field("abort_if_failed", &self.abort_if_failed)
            .field("status_code", &self.status_code)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

//=== ParallelGroup =======================================================

/// Requests fired together. The next group starts once all of them are
/// done.
#[derive(Debug, Default)]
pub struct ParallelGroup {
    tasks: Vec<(String, SharedRequestTask)>,
}

impl ParallelGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, key: impl Into<String>, task: RequestTask) -> Self {
        self.tasks.push((key.into(), task.into_shared()));
        self
    }

    pub fn request(&self, key: &str) -> Option<SharedRequestTask> {
        find(&self.tasks, key).cloned()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &SharedRequestTask> {
        self.tasks.iter().map(|(_, task)| task)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn find<'a, T>(entries: &'a [(String, T)], key: &str) -> Option<&'a T> {
    entries.iter().find(|(name, _)| name == key).map(|(_, entry)| entry)
}

//=== LoadingData =========================================================

pub struct LoadingData {
    extra: HashMap<String, Payload>,

    pub(crate) pre_waits: Vec<Box<dyn WaitTask>>,
    pub(crate) post_waits: Vec<Box<dyn WaitTask>>,
    pub(crate) resources: Vec<(String, SharedResourceTask)>,
    pub(crate) groups: Vec<(String, ParallelGroup)>,
    pub(crate) requests: Vec<(String, SharedRequestTask)>,

    next_screen: Option<String>,
    next_cached: bool,
    additive: bool,
    loading_screen_cached: bool,
    force_close: ForceClose,
}

impl LoadingData {
    pub fn new() -> Self {
        Self {
            extra: HashMap::new(),
            pre_waits: Vec::new(),
            post_waits: Vec::new(),
            resources: Vec::new(),
            groups: Vec::new(),
            requests: Vec::new(),
            next_screen: None,
            next_cached: false,
            additive: false,
            loading_screen_cached: true,
            force_close: ForceClose::default(),
        }
    }

    pub fn into_shared(self) -> SharedLoadingData {
        Rc::new(RefCell::new(self))
    }

    //--- Building ---------------------------------------------------------

    pub fn with_extra<T: Any>(mut self, key: impl Into<String>, value: T) -> Self {
        self.extra.insert(key.into(), Payload::new(value));
        self
    }

    /// Wait run before anything else.
    pub fn with_pre_wait(mut self, wait: impl WaitTask + 'static) -> Self {
        self.pre_waits.push(Box::new(wait));
        self
    }

    /// Wait run after every other phase.
    pub fn with_post_wait(mut self, wait: impl WaitTask + 'static) -> Self {
        self.post_waits.push(Box::new(wait));
        self
    }

    pub fn with_resource(mut self, task: ResourceTask) -> Self {
        let name = task.name().to_string();
        self.resources.push((name, Rc::new(RefCell::new(task))));
        self
    }

    pub fn with_group(mut self, key: impl Into<String>, group: ParallelGroup) -> Self {
        self.groups.push((key.into(), group));
        self
    }

    /// Request sent after the parallel groups, one at a time in insertion
    /// order.
    pub fn with_request(mut self, key: impl Into<String>, task: RequestTask) -> Self {
        self.requests.push((key.into(), task.into_shared()));
        self
    }

    /// Screen loaded once the run completes, with this data as payload.
    pub fn with_next_screen(mut self, name: impl Into<String>, cached: bool) -> Self {
        self.next_screen = Some(name.into());
        self.next_cached = cached;
        self
    }

    /// The next screen stacks on top instead of replacing the loading
    /// screen, so the loading screen is closed explicitly.
    pub fn additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    pub fn loading_screen_cached(mut self, cached: bool) -> Self {
        self.loading_screen_cached = cached;
        self
    }

    pub fn set_extra<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.extra.insert(key.into(), Payload::new(value));
    }

    //--- Queries ----------------------------------------------------------

    pub fn extra<T: Any>(&self, key: &str) -> Option<&T> {
        self.extra.get(key)?.get::<T>()
    }

    pub fn resource(&self, name: &str) -> Option<SharedResourceTask> {
        find(&self.resources, name).cloned()
    }

    pub fn request(&self, key: &str) -> Option<SharedRequestTask> {
        find(&self.requests, key).cloned()
    }

    pub fn group(&self, key: &str) -> Option<&ParallelGroup> {
        find(&self.groups, key)
    }

    pub fn group_request(&self, group: &str, key: &str) -> Option<SharedRequestTask> {
        self.group(group)?.request(key)
    }

    /// Whether any sequential request failed or errored.
    pub fn has_http_error(&self) -> bool {
        self.requests.iter().any(|(_, task)| task.borrow().has_failed())
    }

    /// Error texts of the sequential requests, in order.
    pub fn http_errors(&self) -> Vec<String> {
        self.requests
            .iter()
            .filter_map(|(_, task)| {
                let task = task.borrow();
                task.has_failed().then(|| task.err().to_string())
            })
            .collect()
    }

    pub fn next_screen(&self) -> Option<&str> {
        self.next_screen.as_deref()
    }

    pub fn is_next_cached(&self) -> bool {
        self.next_cached
    }

    pub fn is_additive(&self) -> bool {
        self.additive
    }

    pub fn is_loading_screen_cached(&self) -> bool {
        self.loading_screen_cached
    }

    /// Handle to this run's abort flag.
    pub fn force_close(&self) -> ForceClose {
        self.force_close.clone()
    }
}

impl Default for LoadingData {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoadingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingData")
            .field("pre_waits", &self.pre_waits.len())
            .field("resources", &self.resources.len())
            .field("groups", &self.groups.len())
            .field("requests", &self.requests.len())
            .field("post_waits", &self.post_waits.len())
            .field("next_screen", &self.next_screen)
            .field("additive", &self.additive)
            .field("force_close", &self.force_close.is_set())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_joins_directory_and_name() {
        assert_eq!(ResourceTask::new("icon", "ui/").full_path(), "ui/icon");
        assert_eq!(ResourceTask::new("icon", "ui").full_path(), "ui/icon");
        assert_eq!(ResourceTask::new("icon", "").full_path(), "icon");
    }

    #[test]
    fn record_success_keeps_text_and_runs_callback() {
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = seen.clone();
        let task = RequestTask::new(RequestSpec::get("/profile"))
            .on_success(move |task| *sink.borrow_mut() = task.text().to_string())
            .into_shared();

        RequestTask::record(&task, &Response::new(200).with_body("{\"id\":1}"));

        assert_eq!(*seen.borrow(), "{\"id\":1}");
        assert!(!task.borrow().has_failed());
        assert!(task.borrow().is_success());
    }

    #[test]
    fn record_failure_and_error_report_through_on_failed() {
        let messages = Rc::new(RefCell::new(Vec::new()));
        let sink = messages.clone();
        let task = RequestTask::new(RequestSpec::get("/profile"))
            .on_failed(move |message| sink.borrow_mut().push(message.to_string()))
            .into_shared();

        RequestTask::record(&task, &Response::new(500).with_body("boom"));
        assert_eq!(task.borrow().err(), "boom");

        let task2 = RequestTask::new(RequestSpec::get("/x")).into_shared();
        RequestTask::record(&task2, &Response::network_error("timeout"));
        assert_eq!(task2.borrow().err(), "timeout");
        assert_eq!(task2.borrow().error(), "timeout");

        assert_eq!(*messages.borrow(), vec!["boom"]);
    }

    #[test]
    fn http_errors_lists_failed_sequential_tasks() {
        let data = LoadingData::new()
            .with_request("a", RequestTask::new(RequestSpec::get("/a")))
            .with_request("b", RequestTask::new(RequestSpec::get("/b")));

        assert!(!data.has_http_error());

        if let Some(task) = data.request("b") {
            RequestTask::record(&task, &Response::new(404).with_body("missing"));
        }

        assert!(data.has_http_error());
        assert_eq!(data.http_errors(), vec!["missing"]);
    }

    #[test]
    fn extra_data_is_typed() {
        let data = LoadingData::new().with_extra("level", 3u32);

        assert_eq!(data.extra::<u32>("level"), Some(&3));
        assert_eq!(data.extra::<i64>("level"), None);
        assert_eq!(data.extra::<u32>("missing"), None);
    }

    #[test]
    fn force_close_handles_share_the_flag() {
        let data = LoadingData::new();
        let handle = data.force_close();

        handle.set();

        assert!(data.force_close().is_set());
    }
}
