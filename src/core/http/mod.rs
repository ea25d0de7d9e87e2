//=========================================================================
// HTTP Request Pipeline
//=========================================================================
//
// Queued request dispatchers with priority-interrupt recovery.
//
// Architecture:
//   Network
//     ├─ NetContext (transport + priority rule)
//     └─ DispatcherGroup (fire-and-forget dispatchers)
//
//   Dispatcher: FIFO queue + LIFO priority stack, one node in flight
//
// Transports are external collaborators. `OfflineTransport` is the
// default; the `blocking-transport` feature adds a reqwest-backed one.
//
//=========================================================================

//=== Module Declarations =================================================

mod dispatcher;
mod group;
mod network;
mod priority;
mod request;
mod response;
mod transport;

#[cfg(feature = "blocking-transport")]
mod blocking;

//=== Public API ==========================================================

pub use dispatcher::{DispatchError, Dispatcher, DispatcherState, Request, RequestId};
pub use group::DispatcherGroup;
pub use network::{NetContext, Network};
pub use priority::{PriorityRequest, PriorityRule, ResponseCallback};
pub use request::{content_type, mime_type, Method, RequestSpec, ResponseType, CONTENT_TYPE};
pub use response::Response;
pub use transport::{OfflineTransport, RequestNode, Transport};

#[cfg(feature = "blocking-transport")]
pub use blocking::BlockingTransport;
