//=========================================================================
// Dispatcher
//=========================================================================
//
// Sequential request pipeline with priority interrupts.
//
// Architecture:
//   queue:    VecDeque<Queued>        (FIFO, drained from the front)
//   priority: Vec<PriorityRequest>    (LIFO, only during an interrupt)
//   in_flight: Option<InFlight>       (at most one node)
//
// Per tick (update):
//   poll in-flight node → resolve or interrupt → start next node
//
// Interrupt:
//   response matches rule → original request back to the queue front,
//   recovery pushed on the stack; the stack drains before the queue
//   resumes. A recovery that itself triggers the rule is pushed back with
//   the new recovery above it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::fmt;

use log::{debug, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::priority::{PriorityRequest, ResponseCallback};
use super::transport::RequestNode;
use super::{NetContext, RequestSpec, Response};

//=== Errors ==============================================================

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatcher is busy sending; requests can only be added while idle")]
    Busy,

    #[error("dispatcher has been destroyed")]
    Destroyed,
}

//=== RequestId ===========================================================

/// Identifies a request within its dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

//=== Request =============================================================

/// Queued request with optional per-request callbacks.
pub struct Request {
    spec: RequestSpec,
    on_success: Option<ResponseCallback>,
    on_failure: Option<ResponseCallback>,
    on_error: Option<ResponseCallback>,
    on_finish: Option<ResponseCallback>,
}

impl Request {
    pub fn new(spec: RequestSpec) -> Self {
        Self {
            spec,
            on_success: None,
            on_failure: None,
            on_error: None,
            on_finish: None,
        }
    }

    pub fn on_success(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_failure(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_failure = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Runs after the outcome callback, whatever the outcome.
    pub fn on_finish(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }
}

impl From<RequestSpec> for Request {
    fn from(spec: RequestSpec) -> Self {
        Request::new(spec)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

//=== Internal Types ======================================================

struct Queued {
    id: RequestId,
    request: Request,
}

enum Source {
    Queue(Queued),
    Priority(PriorityRequest),
}

struct InFlight {
    node: Box<dyn RequestNode>,
    source: Source,
}

/// Lifecycle of a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Accepting requests.
    Idle,
    Sending,
    /// Draining the priority stack.
    Interrupting,
    /// Queue drained; self-destroys once the grace frames run out.
    Closing { frames_left: u32 },
    Destroyed,
}

//=== Dispatcher ==========================================================

pub struct Dispatcher {
    state: DispatcherState,
    next_id: u64,
    queue: VecDeque<Queued>,
    priority: Vec<PriorityRequest>,
    in_flight: Option<InFlight>,

    //--- Options ----------------------------------------------------------
    self_destroy: bool,
    grace_frames: u32,

    //--- Per-dispatcher callbacks -----------------------------------------
    on_success: Option<ResponseCallback>,
    on_failure: Option<ResponseCallback>,
    on_error: Option<ResponseCallback>,
    on_finish_each: Option<ResponseCallback>,
    on_finish: Option<Box<dyn FnMut()>>,
}

impl Dispatcher {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            state: DispatcherState::Idle,
            next_id: 1,
            queue: VecDeque::new(),
            priority: Vec::new(),
            in_flight: None,
            self_destroy: false,
            grace_frames: 1,
            on_success: None,
            on_failure: None,
            on_error: None,
            on_finish_each: None,
            on_finish: None,
        }
    }

    /// Tear down after the queue drains instead of returning to idle.
    pub fn self_destroy(mut self, enabled: bool) -> Self {
        self.self_destroy = enabled;
        self
    }

    /// Frames to wait between the finish callback and self-destruction.
    pub fn grace_frames(mut self, frames: u32) -> Self {
        self.grace_frames = frames;
        self
    }

    pub fn on_success(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_failure(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_failure = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn on_finish_each(mut self, callback: impl FnMut(&Response) + 'static) -> Self {
        self.on_finish_each = Some(Box::new(callback));
        self
    }

    /// Runs every time the queue drains.
    pub fn on_finish(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    //--- Queue ------------------------------------------------------------

    /// Appends a request to the queue tail.
    ///
    /// Rejected while sending or after destruction.
    pub fn add_request(&mut self, request: impl Into<Request>) -> Result<RequestId, DispatchError> {
        match self.state {
            DispatcherState::Idle => {}
            DispatcherState::Sending | DispatcherState::Interrupting => {
                warn!("Request rejected: dispatcher is sending");
                return Err(DispatchError::Busy);
            }
            DispatcherState::Closing { .. } | DispatcherState::Destroyed => {
                warn!("Request rejected: dispatcher is being destroyed");
                return Err(DispatchError::Destroyed);
            }
        }
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.queue.push_back(Queued {
            id,
            request: request.into(),
        });
        Ok(id)
    }

    /// Appends several requests; stops at the first rejection.
    pub fn add_requests<I, R>(&mut self, requests: I) -> Result<Vec<RequestId>, DispatchError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Request>,
    {
        requests
            .into_iter()
            .map(|request| self.add_request(request))
            .collect()
    }

    /// Starts draining the queue. The first node is sent on the next update.
    /// No-op unless idle.
    pub fn send(&mut self) {
        match self.state {
            DispatcherState::Idle => {
                debug!("Dispatcher sending {} queued requests", self.queue.len());
                self.state = DispatcherState::Sending;
            }
            phase => debug!("Send ignored in {:?}", phase),
        }
    }

    /// Cancels the in-flight node and clears the queue and priority stack.
    /// The dispatcher stays reusable.
    pub fn abort(&mut self) {
        if matches!(self.state, DispatcherState::Closing { .. } | DispatcherState::Destroyed) {
            return;
        }
        self.cancel();
        self.state = DispatcherState::Idle;
    }

    /// Aborts and permanently disposes the dispatcher.
    pub fn destroy(&mut self) {
        if self.state == DispatcherState::Destroyed {
            return;
        }
        self.cancel();
        self.on_success = None;
        self.on_failure = None;
        self.on_error = None;
        self.on_finish_each = None;
        self.on_finish = None;
        self.state = DispatcherState::Destroyed;
        debug!("Dispatcher destroyed");
    }

    fn cancel(&mut self) {
        if let Some(mut in_flight) = self.in_flight.take() {
            in_flight.node.abort();
        }
        self.queue.clear();
        self.priority.clear();
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == DispatcherState::Destroyed
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, DispatcherState::Sending | DispatcherState::Interrupting)
    }

    /// Requests waiting in the queue, excluding the in-flight one.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn priority_depth(&self) -> usize {
        self.priority.len()
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    //--- Update Loop ------------------------------------------------------

    pub fn update(&mut self, net: &NetContext) {
        match self.state {
            DispatcherState::Idle | DispatcherState::Destroyed => return,
            DispatcherState::Closing { frames_left } => {
                match frames_left.saturating_sub(1) {
                    0 => self.destroy(),
                    left => self.state = DispatcherState::Closing { frames_left: left },
                }
                return;
            }
            DispatcherState::Sending | DispatcherState::Interrupting => {}
        }

        let Some(mut in_flight) = self.in_flight.take() else {
            self.start_next(net);
            return;
        };

        match in_flight.node.poll() {
            None => self.in_flight = Some(in_flight),
            Some(response) => {
                drop(in_flight.node);
                self.settle(in_flight.source, response, net);
                if !matches!(self.state, DispatcherState::Idle | DispatcherState::Destroyed) {
                    self.start_next(net);
                }
            }
        }
    }

    /// Sends the next node: priority stack first, then the queue head.
    fn start_next(&mut self, net: &NetContext) {
        let source = match self.priority.pop() {
            Some(recovery) => {
                self.state = DispatcherState::Interrupting;
                Source::Priority(recovery)
            }
            None => match self.queue.pop_front() {
                Some(queued) => {
                    self.state = DispatcherState::Sending;
                    Source::Queue(queued)
                }
                None => {
                    self.finish_all();
                    return;
                }
            },
        };

        let spec = match &source {
            Source::Queue(queued) => &queued.request.spec,
            Source::Priority(recovery) => &recovery.spec,
        };
        debug!("Sending {} {}", spec.method().as_str(), spec.url());
        let mut node = net.create_node(spec);
        node.send();
        self.in_flight = Some(InFlight { node, source });
    }

    fn settle(&mut self, source: Source, response: Response, net: &NetContext) {
        match (source, net.recovery_for(&response)) {
            (Source::Queue(queued), Some(recovery)) => {
                debug!(
                    "Request {:?} interrupted by {} {}",
                    queued.id,
                    recovery.spec.method().as_str(),
                    recovery.spec.url()
                );
                self.queue.push_front(queued);
                self.priority.push(recovery);
            }
            (Source::Priority(original), Some(recovery)) => {
                debug!("Recovery {} chained another recovery", original.spec.url());
                self.priority.push(original);
                self.priority.push(recovery);
            }
            (Source::Queue(mut queued), None) => self.resolve(&mut queued.request, &response),
            (Source::Priority(mut recovery), None) => recovery.resolve(&response),
        }
    }

    /// Fires exactly one outcome path (request first, then dispatcher),
    /// followed by the finish callbacks.
    fn resolve(&mut self, request: &mut Request, response: &Response) {
        let (own, shared) = if response.is_network_error() {
            (&mut request.on_error, &mut self.on_error)
        } else if response.is_success() {
            (&mut request.on_success, &mut self.on_success)
        } else {
            (&mut request.on_failure, &mut self.on_failure)
        };
        if let Some(callback) = own {
            callback(response);
        }
        if let Some(callback) = shared {
            callback(response);
        }
        if let Some(callback) = &mut request.on_finish {
            callback(response);
        }
        if let Some(callback) = &mut self.on_finish_each {
            callback(response);
        }
    }

    fn finish_all(&mut self) {
        debug!("Dispatcher queue drained");
        if let Some(callback) = &mut self.on_finish {
            callback();
        }
        match (self.self_destroy, self.grace_frames) {
            (false, _) => self.state = DispatcherState::Idle,
            (true, 0) => self.destroy(),
            (true, frames) => self.state = DispatcherState::Closing { frames_left: frames },
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state())
            .field("queued", &self.queue.len())
            .field("priority", &self.priority.len())
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
