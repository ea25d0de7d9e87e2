//=========================================================================
// Network
//=========================================================================
//
// Process-wide networking state: the transport, the single priority rule
// and a group of fire-and-forget dispatchers submitted by the host.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::debug;

//=== Internal Dependencies ===============================================

use super::priority::PriorityRule;
use super::transport::{OfflineTransport, RequestNode, Transport};
use super::{Dispatcher, DispatcherGroup, PriorityRequest, RequestSpec, Response};

//=== NetContext ==========================================================

/// What dispatchers need from the outside world each tick.
pub struct NetContext {
    transport: Box<dyn Transport>,
    priority_rule: Option<PriorityRule>,
}

impl NetContext {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            priority_rule: None,
        }
    }

    pub fn set_transport(&mut self, transport: impl Transport + 'static) {
        self.transport = Box::new(transport);
    }

    /// Installs the rule mapping a response to a recovery request.
    /// Replaces any previous rule.
    pub fn set_priority_rule<F>(&mut self, rule: F)
    where
        F: Fn(&Response) -> Option<PriorityRequest> + 'static,
    {
        debug!("Priority rule installed");
        self.priority_rule = Some(Box::new(rule));
    }

    pub fn clear_priority_rule(&mut self) {
        self.priority_rule = None;
    }

    pub(crate) fn create_node(&self, spec: &RequestSpec) -> Box<dyn RequestNode> {
        self.transport.create_node(spec)
    }

    pub(crate) fn recovery_for(&self, response: &Response) -> Option<PriorityRequest> {
        self.priority_rule.as_ref().and_then(|rule| rule(response))
    }
}

impl Default for NetContext {
    fn default() -> Self {
        Self::new(OfflineTransport)
    }
}

impl fmt::Debug for NetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetContext")
            .field("priority_rule", &self.priority_rule.is_some())
            .finish_non_exhaustive()
    }
}

//=== Network =============================================================

#[derive(Debug, Default)]
pub struct Network {
    net: NetContext,
    running: DispatcherGroup,
}

impl Network {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            net: NetContext::new(transport),
            running: DispatcherGroup::new(),
        }
    }

    pub fn context(&self) -> &NetContext {
        &self.net
    }

    pub fn context_mut(&mut self) -> &mut NetContext {
        &mut self.net
    }

    /// Sends `dispatcher` and keeps it running until it self-destroys.
    pub fn send(&mut self, dispatcher: Dispatcher) {
        self.running.send(dispatcher);
    }

    pub fn running(&self) -> &DispatcherGroup {
        &self.running
    }

    pub fn abort_all(&mut self) {
        self.running.abort_all();
    }

    pub(crate) fn update(&mut self) {
        self.running.update(&self.net);
    }
}
