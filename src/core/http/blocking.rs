//=========================================================================
// Blocking Transport (feature "blocking-transport")
//=========================================================================
//
// reqwest-backed transport. Each sent node runs its request on a worker
// thread and hands the Response back over a one-slot channel that the
// tick loop polls.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::transport::{RequestNode, Transport};
use super::{Method, RequestSpec, Response};

//=== BlockingTransport ===================================================

#[derive(Debug, Clone)]
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
}

impl BlockingTransport {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }
}

impl Transport for BlockingTransport {
    fn create_node(&self, spec: &RequestSpec) -> Box<dyn RequestNode> {
        Box::new(BlockingNode {
            client: self.client.clone(),
            spec: Some(spec.clone()),
            receiver: None,
        })
    }
}

//=== BlockingNode ========================================================

struct BlockingNode {
    client: reqwest::blocking::Client,
    spec: Option<RequestSpec>,
    receiver: Option<Receiver<Response>>,
}

impl RequestNode for BlockingNode {
    fn send(&mut self) {
        let Some(spec) = self.spec.take() else {
            return;
        };
        let (sender, receiver) = bounded(1);
        let client = self.client.clone();
        self.receiver = Some(receiver);

        thread::spawn(move || {
            let response = execute(&client, &spec);
            if sender.send(response).is_err() {
                debug!("Response for {} dropped: node was aborted", spec.url());
            }
        });
    }

    fn poll(&mut self) -> Option<Response> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(response) => {
                self.receiver = None;
                Some(response)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                warn!("Transport worker exited without a response");
                Some(Response::network_error("transport worker exited"))
            }
        }
    }

    fn abort(&mut self) {
        // The worker cannot be interrupted; detaching makes it drop its result.
        self.receiver = None;
    }
}

fn execute(client: &reqwest::blocking::Client, spec: &RequestSpec) -> Response {
    let method = match spec.method() {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
    };

    let mut builder = client.request(method, spec.url());
    for (name, value) in spec.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = spec.body() {
        builder = builder.body(body.to_vec());
    }

    let reply = match builder.send() {
        Ok(reply) => reply,
        Err(error) => return Response::network_error(error.to_string()),
    };

    let mut response = Response::new(reply.status().as_u16());
    for (name, value) in reply.headers() {
        if let Ok(value) = value.to_str() {
            response = response.with_header(name.as_str(), value);
        }
    }
    match reply.bytes() {
        Ok(bytes) => response.with_body(bytes.to_vec()),
        Err(error) => Response::network_error(error.to_string()),
    }
}
