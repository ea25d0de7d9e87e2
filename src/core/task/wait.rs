//=========================================================================
// Wait Tasks
//=========================================================================
//
// Frame-polled waits used by the loading phases.
//
// A wait task is polled once per tick until it reports completion.
// Implementations must be cheap to poll and must never block.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

//=== Internal Dependencies ===============================================

use super::{Pending, PollState};

//=== WaitTask Trait ======================================================

/// A suspension point polled once per tick.
pub trait WaitTask {
    /// Advances the wait by one tick. Returns `true` once finished.
    ///
    /// Polling a finished task keeps returning `true`.
    fn poll(&mut self) -> bool;
}

//=== WaitFrames ==========================================================

/// Completes after a fixed number of polls.
#[derive(Debug, Clone)]
pub struct WaitFrames {
    remaining: u32,
}

impl WaitFrames {
    /// A wait of `frames` ticks. Zero completes on the first poll.
    pub fn new(frames: u32) -> Self {
        Self { remaining: frames }
    }
}

impl WaitTask for WaitFrames {
    fn poll(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

//=== WaitUntil ===========================================================

/// Completes once the predicate returns `true`.
pub struct WaitUntil<F: FnMut() -> bool> {
    predicate: F,
    done: bool,
}

impl<F: FnMut() -> bool> WaitUntil<F> {
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            done: false,
        }
    }
}

impl<F: FnMut() -> bool> WaitTask for WaitUntil<F> {
    fn poll(&mut self) -> bool {
        if !self.done {
            self.done = (self.predicate)();
        }
        self.done
    }
}

//=== WaitFor =============================================================

/// Completes once a wall-clock duration has elapsed since the first poll.
#[derive(Debug, Clone)]
pub struct WaitFor {
    duration: Duration,
    started: Option<Instant>,
}

impl WaitFor {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
        }
    }
}

impl WaitTask for WaitFor {
    fn poll(&mut self) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() >= self.duration
    }
}

//=== Pending<()> =========================================================

// A pending unit value finishes when delivered or abandoned.
impl WaitTask for Pending<()> {
    fn poll(&mut self) -> bool {
        !matches!(Pending::poll(self), PollState::Waiting)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::completion;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn wait_frames_counts_polls() {
        let mut wait = WaitFrames::new(3);

        assert!(!wait.poll());
        assert!(!wait.poll());
        assert!(wait.poll());
        assert!(wait.poll(), "Finished waits stay finished");
    }

    #[test]
    fn wait_frames_zero_is_immediate() {
        assert!(WaitFrames::new(0).poll());
    }

    #[test]
    fn wait_until_latches() {
        let flag = Rc::new(Cell::new(false));
        let observed = flag.clone();
        let mut wait = WaitUntil::new(move || observed.get());

        assert!(!wait.poll());
        flag.set(true);
        assert!(wait.poll());

        flag.set(false);
        assert!(wait.poll(), "Predicate is not re-evaluated once satisfied");
    }

    #[test]
    fn wait_for_zero_duration_is_immediate() {
        assert!(WaitFor::new(Duration::ZERO).poll());
    }

    #[test]
    fn pending_unit_finishes_on_delivery_or_drop() {
        let (done, mut pending) = completion::<()>();
        assert!(!WaitTask::poll(&mut pending));
        done.complete(());
        assert!(WaitTask::poll(&mut pending));

        let (dropped, mut abandoned) = completion::<()>();
        drop(dropped);
        assert!(WaitTask::poll(&mut abandoned));
    }
}
