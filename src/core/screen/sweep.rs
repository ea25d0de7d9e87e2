//=========================================================================
// Sweep
//=========================================================================
//
// Close-recursion used by the presentation flows: repeatedly pick a live
// entry, close it without an exit animation, and continue until nothing
// matches.
//
//   Above(L)   top-most entries while their layer > L
//   Only(set)  any entry whose layer is in `set`, top-most first
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::director::ScreenDirector;
use super::live_stack::LiveStack;
use super::{Layer, ScreenHandle};
use crate::core::globals::GlobalContext;

//=== SweepMode ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SweepMode {
    Above(Layer),
    Only(&'static [Layer]),
}

//=== Sweep ===============================================================

#[derive(Debug)]
pub(crate) struct Sweep {
    mode: SweepMode,
    keep: Option<ScreenHandle>,
}

impl Sweep {
    pub(crate) fn above(layer: Layer) -> Self {
        Self::new(SweepMode::Above(layer))
    }

    pub(crate) fn only(layers: &'static [Layer]) -> Self {
        Self::new(SweepMode::Only(layers))
    }

    fn new(mode: SweepMode) -> Self {
        Self { mode, keep: None }
    }

    /// Never closes `handle`, even if it matches.
    pub(crate) fn keeping(mut self, handle: ScreenHandle) -> Self {
        self.keep = Some(handle);
        self
    }

    fn next_victim(&self, live: &LiveStack) -> Option<ScreenHandle> {
        let mut candidates = live
            .entries()
            .iter()
            .rev()
            .filter(|entry| Some(entry.handle()) != self.keep);

        match self.mode {
            SweepMode::Above(floor) => candidates
                .next()
                .filter(|entry| entry.layer() > floor)
                .map(|entry| entry.handle()),
            SweepMode::Only(layers) => candidates
                .find(|entry| layers.contains(&entry.layer()))
                .map(|entry| entry.handle()),
        }
    }
}

//=== Director Integration ================================================

impl ScreenDirector {
    /// Closes every entry the sweep matches, top-most first.
    pub(super) fn sweep(&mut self, sweep: Sweep, ctx: &mut GlobalContext) {
        while let Some(victim) = sweep.next_victim(&self.live) {
            debug!("Sweeping {:?} ({:?})", victim, sweep.mode);
            self.lose_focus(victim, ctx);
            self.finish_close(victim);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::LiveEntry;

    fn stack(layers: &[Layer]) -> LiveStack {
        let mut stack = LiveStack::new();
        for (index, layer) in layers.iter().enumerate() {
            stack.insert_from_top(LiveEntry::new(
                1,
                format!("S{}", index),
                *layer,
                ScreenHandle::from_raw(index as u64 + 1),
            ));
        }
        stack
    }

    #[test]
    fn above_stops_at_floor() {
        let live = stack(&[Layer::Low, Layer::Popup]);

        let sweep = Sweep::above(Layer::Popup);

        assert_eq!(sweep.next_victim(&live), None);
        assert_eq!(
            Sweep::above(Layer::Low).next_victim(&live),
            Some(ScreenHandle::from_raw(2))
        );
    }

    #[test]
    fn above_skips_kept_entry() {
        let live = stack(&[Layer::Low, Layer::Popup, Layer::High]);

        let sweep = Sweep::above(Layer::Low).keeping(ScreenHandle::from_raw(3));

        assert_eq!(sweep.next_victim(&live), Some(ScreenHandle::from_raw(2)));
    }

    #[test]
    fn only_reaches_below_unmatched_layers() {
        let live = stack(&[Layer::Low, Layer::High]);

        let sweep = Sweep::only(&[Layer::Low]);

        assert_eq!(sweep.next_victim(&live), Some(ScreenHandle::from_raw(1)));
        assert_eq!(Sweep::only(&[Layer::Popup]).next_victim(&live), None);
    }
}
