//=========================================================================
// Host Inbox
//=========================================================================
//
// Runtime side of the host channel. Each tick drains what the host sent
// since the last one straight into the key tracker:
//
//   Input(batch) ──► StateTracker::process_events
//   Shutdown     ──► TickControl::Exit (later events stay unread)
//   disconnected ──► TickControl::Exit
//
// At most `budget` events are read per tick; the rest wait for the next
// one so a flooding host cannot stall navigation.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::HostEvent;
use crate::core::input::StateTracker;

//=== TickControl =========================================================

/// Whether the runtime keeps ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== HostInbox ===========================================================

pub(crate) struct HostInbox {
    receiver: Receiver<HostEvent>,
    budget: usize,
}

impl HostInbox {
    pub(crate) fn new(receiver: Receiver<HostEvent>, budget: usize) -> Self {
        Self { receiver, budget }
    }

    /// Starts a new input frame on `input` and folds pending host events
    /// into it.
    pub(crate) fn drain_into(&mut self, input: &mut StateTracker) -> TickControl {
        input.clear();

        for _ in 0..self.budget {
            match self.receiver.try_recv() {
                Ok(HostEvent::Input(batch)) => input.process_events(&batch),
                Ok(HostEvent::Shutdown) => {
                    debug!("Host requested shutdown");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Empty) => return TickControl::Continue,
                Err(TryRecvError::Disconnected) => {
                    debug!("Every runtime handle dropped");
                    return TickControl::Exit;
                }
            }
        }

        if !self.receiver.is_empty() {
            trace!("{} host events deferred to the next tick", self.receiver.len());
        }
        TickControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{InputEvent, KeyCode};
    use crossbeam_channel::unbounded;

    fn tap(key: KeyCode) -> HostEvent {
        HostEvent::Input(vec![InputEvent::KeyDown(key), InputEvent::KeyUp(key)])
    }

    #[test]
    fn back_tap_is_seen_for_one_tick_only() {
        let (tx, rx) = unbounded();
        let mut inbox = HostInbox::new(rx, 16);
        let mut input = StateTracker::new();

        tx.send(tap(KeyCode::Escape)).unwrap();

        assert_eq!(inbox.drain_into(&mut input), TickControl::Continue);
        assert!(input.is_back_pressed());

        assert_eq!(inbox.drain_into(&mut input), TickControl::Continue);
        assert!(!input.is_back_pressed());
    }

    #[test]
    fn held_key_survives_empty_ticks() {
        let (tx, rx) = unbounded();
        let mut inbox = HostInbox::new(rx, 16);
        let mut input = StateTracker::new();

        tx.send(HostEvent::Input(vec![InputEvent::KeyDown(KeyCode::Back)])).unwrap();
        inbox.drain_into(&mut input);
        inbox.drain_into(&mut input);

        assert!(input.is_key_down(KeyCode::Back));
        assert!(!input.is_back_pressed());
    }

    #[test]
    fn custom_back_keys_are_respected() {
        let (tx, rx) = unbounded();
        let mut inbox = HostInbox::new(rx, 16);
        let mut input = StateTracker::with_back_keys(vec![KeyCode::Back]);

        tx.send(tap(KeyCode::Escape)).unwrap();
        inbox.drain_into(&mut input);

        assert!(input.is_key_released(KeyCode::Escape));
        assert!(!input.is_back_pressed());
    }

    #[test]
    fn shutdown_stops_before_later_input() {
        let (tx, rx) = unbounded();
        let mut inbox = HostInbox::new(rx, 16);
        let mut input = StateTracker::new();

        tx.send(HostEvent::Shutdown).unwrap();
        tx.send(tap(KeyCode::Escape)).unwrap();

        assert_eq!(inbox.drain_into(&mut input), TickControl::Exit);
        assert!(!input.is_back_pressed());
    }

    #[test]
    fn over_budget_events_wait_for_the_next_tick() {
        let (tx, rx) = unbounded();
        let mut inbox = HostInbox::new(rx, 1);
        let mut input = StateTracker::new();

        tx.send(tap(KeyCode::Space)).unwrap();
        tx.send(tap(KeyCode::Escape)).unwrap();

        inbox.drain_into(&mut input);
        assert!(input.is_key_pressed(KeyCode::Space));
        assert!(!input.is_back_pressed());

        inbox.drain_into(&mut input);
        assert!(input.is_back_pressed());
    }

    #[test]
    fn dropped_handles_end_the_run() {
        let (tx, rx) = unbounded::<HostEvent>();
        let mut inbox = HostInbox::new(rx, 16);

        drop(tx);

        assert_eq!(inbox.drain_into(&mut StateTracker::new()), TickControl::Exit);
    }
}
