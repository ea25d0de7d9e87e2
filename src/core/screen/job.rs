//=========================================================================
// Jobs
//=========================================================================
//
// Transition requests serialized by the director. One job runs at a time;
// the rest wait in FIFO order.
//
//   Load:  Load → Waiting(scene load | presentation flow) → End
//   Close: Start → Exiting → End
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use super::flows::Flow;
use super::loader::LoadedScreen;
use super::{Payload, ScreenHandle};
use crate::core::task::Pending;

//=== Progress ============================================================

/// Outcome of stepping a state machine once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    Pending,
    Done,
}

//=== Job =================================================================

pub(crate) enum Job {
    Load(LoadJob),
    Close(CloseJob),
}

pub(crate) struct LoadJob {
    pub(crate) name: String,
    pub(crate) payload: Payload,
    pub(crate) cache: bool,
}

pub(crate) struct CloseJob {
    pub(crate) target: ScreenHandle,
    pub(crate) quick: bool,
    pub(crate) on_finish: Option<Box<dyn FnOnce()>>,
}

impl CloseJob {
    pub(crate) fn finish(&mut self) {
        if let Some(on_finish) = self.on_finish.take() {
            on_finish();
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Load(job) => write!(f, "Load({:?}, cache: {})", job.name, job.cache),
            Job::Close(job) => write!(f, "Close({:?}, quick: {})", job.target, job.quick),
        }
    }
}

//=== Active Job ==========================================================

pub(crate) enum LoadState {
    /// Resolve the template, loading it if needed.
    Load,

    /// A scene load or a presentation flow is in progress.
    Waiting(LoadWait),

    End,
}

pub(crate) enum LoadWait {
    Scene(Pending<LoadedScreen>),
    Present(Flow),
}

pub(crate) enum CloseState {
    Start,
    Exiting { was_top: bool },
    End,
}

/// The job occupying the director's single active slot.
pub(crate) enum ActiveJob {
    Load { job: LoadJob, state: LoadState },
    Close { job: CloseJob, state: CloseState },
}

impl ActiveJob {
    pub(crate) fn start(job: Job) -> Self {
        match job {
            Job::Load(job) => ActiveJob::Load {
                job,
                state: LoadState::Load,
            },
            Job::Close(job) => ActiveJob::Close {
                job,
                state: CloseState::Start,
            },
        }
    }
}
