//=========================================================================
// Transport
//=========================================================================
//
// External collaborator that turns a RequestSpec into an in-flight node.
//
// A node is sent once, polled every tick until it yields its terminal
// Response, and destroyed by dropping it. `abort` asks the underlying
// operation to stop; the node must still be dropped afterwards.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{RequestSpec, Response};

//=== Traits ==============================================================

pub trait RequestNode {
    fn send(&mut self);

    /// Terminal response, once available. Called at most once per tick.
    fn poll(&mut self) -> Option<Response>;

    fn abort(&mut self) {}
}

pub trait Transport {
    fn create_node(&self, spec: &RequestSpec) -> Box<dyn RequestNode>;
}

//=== OfflineTransport ====================================================

/// Default transport: every request resolves to a network error on the
/// tick after it was sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineTransport;

struct OfflineNode {
    url: String,
    sent: bool,
}

impl RequestNode for OfflineNode {
    fn send(&mut self) {
        self.sent = true;
    }

    fn poll(&mut self) -> Option<Response> {
        self.sent
            .then(|| Response::network_error(format!("no transport configured for {}", self.url)))
    }
}

impl Transport for OfflineTransport {
    fn create_node(&self, spec: &RequestSpec) -> Box<dyn RequestNode> {
        Box::new(OfflineNode {
            url: spec.url().to_string(),
            sent: false,
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
