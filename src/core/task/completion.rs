//=========================================================================
// Completion / Pending
//=========================================================================
//
// One-shot hand-off between an external collaborator and the tick loop.
//
// The producer owns a `Completion<T>` and fulfils it exactly once by
// value. The consumer owns a `Pending<T>` and polls it at its own pace.
// Dropping the completion without fulfilling it is observable as
// `PollState::Abandoned`, so a job never waits forever on a loader that
// gave up.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::debug;

//=== PollState ===========================================================

/// Result of polling a [`Pending`] value.
#[derive(Debug, PartialEq, Eq)]
pub enum PollState<T> {
    /// The value has been delivered.
    Ready(T),

    /// The producer has not delivered yet.
    Waiting,

    /// The producer was dropped without delivering, or the value was
    /// already taken by an earlier poll.
    Abandoned,
}

//=== Constructor =========================================================

/// Creates a connected completion/pending pair.
pub fn completion<T>() -> (Completion<T>, Pending<T>) {
    let (sender, receiver) = bounded(1);
    (
        Completion { sender },
        Pending {
            receiver,
            taken: false,
        },
    )
}

//=== Completion ==========================================================

/// Producer side of a one-shot value.
pub struct Completion<T> {
    sender: Sender<T>,
}

impl<T> Completion<T> {
    /// Delivers the value. Consumes the completion so it fires at most once.
    ///
    /// Delivering to a consumer that no longer listens is not an error;
    /// the value is dropped.
    pub fn complete(self, value: T) {
        if self.sender.try_send(value).is_err() {
            debug!("Completion delivered after its consumer went away");
        }
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

//=== Pending =============================================================

/// Consumer side of a one-shot value.
pub struct Pending<T> {
    receiver: Receiver<T>,
    taken: bool,
}

impl<T> Pending<T> {
    /// Non-blocking check for the value.
    pub fn poll(&mut self) -> PollState<T> {
        if self.taken {
            return PollState::Abandoned;
        }

        match self.receiver.try_recv() {
            Ok(value) => {
                self.taken = true;
                PollState::Ready(value)
            }
            Err(TryRecvError::Empty) => PollState::Waiting,
            Err(TryRecvError::Disconnected) => PollState::Abandoned,
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("taken", &self.taken)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
