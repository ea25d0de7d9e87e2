//=========================================================================
// Priority Requests
//=========================================================================
//
// Recovery requests injected ahead of a dispatcher's queue when the
// globally registered rule recognizes a response (e.g. an expired
// session token).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use super::{RequestSpec, Response};

//=== Types ===============================================================

pub type ResponseCallback = Box<dyn FnMut(&Response)>;

/// Pure function from a response to an optional recovery request.
pub type PriorityRule = Box<dyn Fn(&Response) -> Option<PriorityRequest>>;

//=== PriorityRequest =====================================================

/// A recovery request with its own outcome callbacks.
pub struct PriorityRequest {
    pub(crate) spec: RequestSpec,
    pub(crate) on_success: Option<ResponseCallback>,
    pub(crate) on_failure: Option<ResponseCallback>,
    pub(crate) on_error: Option<ResponseCallback>,
}

impl PriorityRequest {
    pub fn new(spec: RequestSpec) -> Self {
        Self {
            spec,
            on_success: None,
            on_failure: None,
            on_error: None,
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

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Fires exactly one of the outcome callbacks.
    pub(crate) fn resolve(&mut self, response: &Response) {
        let callback = if response.is_network_error() {
            &mut self.on_error
        } else if response.is_success() {
            &mut self.on_success
        } else {
            &mut self.on_failure
        };
        if let Some(callback) = callback {
            callback(response);
        }
    }
}

impl fmt::Debug for PriorityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityRequest")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}
