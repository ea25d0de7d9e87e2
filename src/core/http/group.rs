//=========================================================================
// Dispatcher Group
//=========================================================================
//
// Runs a set of dispatchers side by side and forgets each one once it has
// destroyed itself. "Empty" means every dispatcher sent through the group
// has finished.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;

//=== Internal Dependencies ===============================================

use super::{Dispatcher, NetContext};

//=== DispatcherGroup =====================================================

#[derive(Debug, Default)]
pub struct DispatcherGroup {
    dispatchers: Vec<Dispatcher>,
    destroyed: bool,
}

impl DispatcherGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `dispatcher`, forcing it to self-destroy once drained.
    pub fn send(&mut self, dispatcher: Dispatcher) {
        let mut dispatcher = dispatcher.self_destroy(true);
        if self.destroyed {
            warn!("Dispatcher dropped: group already destroyed");
            dispatcher.destroy();
            return;
        }
        dispatcher.send();
        self.dispatchers.push(dispatcher);
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Destroys every running dispatcher. The group stays usable.
    pub fn abort_all(&mut self) {
        for dispatcher in &mut self.dispatchers {
            dispatcher.destroy();
        }
        self.dispatchers.clear();
    }

    pub fn destroy(&mut self) {
        self.abort_all();
        self.destroyed = true;
    }

    pub fn update(&mut self, net: &NetContext) {
        for dispatcher in &mut self.dispatchers {
            dispatcher.update(net);
        }
        self.dispatchers.retain(|dispatcher| !dispatcher.is_destroyed());
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{Request, RequestSpec};
    use crate::core::test_support::ScriptedTransport;

    fn dispatcher(url: &str) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add_request(Request::new(RequestSpec::get(url))).unwrap();
        dispatcher
    }

    #[test]
    fn group_fires_concurrently_and_empties() {
        let transport = ScriptedTransport::new();
        let net = NetContext::new(transport.clone());
        let mut group = DispatcherGroup::new();

        group.send(dispatcher("/a"));
        group.send(dispatcher("/b"));

        group.update(&net);
        assert_eq!(transport.max_in_flight(), 2);
        assert_eq!(group.len(), 2);

        group.update(&net);
        group.update(&net);

        assert!(group.is_empty());
        assert_eq!(transport.sent(), vec!["/a", "/b"]);
    }

    #[test]
    fn abort_all_cancels_in_flight() {
        let transport = ScriptedTransport::new().with_delay(5);
        let net = NetContext::new(transport.clone());
        let mut group = DispatcherGroup::new();

        group.send(dispatcher("/slow"));
        group.update(&net);
        group.abort_all();

        assert!(group.is_empty());
        assert_eq!(transport.aborted(), vec!["/slow"]);
        assert_eq!(transport.in_flight(), 0);
    }

    #[test]
    fn destroyed_group_rejects_new_dispatchers() {
        let transport = ScriptedTransport::new();
        let net = NetContext::new(transport.clone());
        let mut group = DispatcherGroup::new();

        group.destroy();
        group.send(dispatcher("/late"));
        group.update(&net);

        assert!(group.is_empty());
        assert!(transport.sent().is_empty());
    }
}
