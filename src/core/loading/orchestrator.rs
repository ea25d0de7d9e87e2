//=========================================================================
// Loading Orchestrator
//=========================================================================
//
// Owns every active loading run and decides what happens when one ends.
//
//   StartLoading ──► LoadingRun { owner, Sequencer }
//                         │ step once per tick
//                         ▼
//              Finished ──► load next screen (and close owner if additive)
//              ForceClosed / no next screen ──► close owner
//              owner no longer live ──► abort, release dispatchers
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::data::SharedLoadingData;
use super::sequencer::{Sequencer, SequencerStep};
use crate::core::globals::CommandQueue;
use crate::core::http::NetContext;
use crate::core::resource::ResourceManager;
use crate::core::screen::{Payload, ScreenDirector, ScreenHandle};

//=== LoadingRun ==========================================================

#[derive(Debug)]
struct LoadingRun {
    owner: Option<ScreenHandle>,
    sequencer: Sequencer,
}

//=== LoadingOrchestrator =================================================

#[derive(Debug, Default)]
pub struct LoadingOrchestrator {
    runs: Vec<LoadingRun>,
}

impl LoadingOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run. A screen owns at most one run; starting another
    /// replaces it.
    pub fn start(&mut self, owner: Option<ScreenHandle>, data: SharedLoadingData) {
        if let Some(owner) = owner {
            if let Some(index) = self.runs.iter().position(|run| run.owner == Some(owner)) {
                warn!("Loading run of {:?} restarted", owner);
                self.runs.remove(index);
            }
        }

        debug!("Loading run started for {:?}", owner);
        self.runs.push(LoadingRun {
            owner,
            sequencer: Sequencer::new(data),
        });
    }

    pub fn is_running(&self) -> bool {
        !self.runs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Drops every run, releasing their dispatchers.
    pub fn abort_all(&mut self) {
        self.runs.clear();
    }

    //--- Tick -------------------------------------------------------------

    pub(crate) fn update(
        &mut self,
        net: &NetContext,
        resources: &mut ResourceManager,
        director: &ScreenDirector,
        commands: &mut CommandQueue,
    ) {
        self.runs.retain_mut(|run| {
            if let Some(owner) = run.owner {
                if !director.is_live(owner) {
                    warn!("Loading screen {:?} is gone; aborting its run", owner);
                    run.sequencer.release();
                    return false;
                }
            }

            match run.sequencer.step(net, resources) {
                SequencerStep::Running => true,
                SequencerStep::Finished => {
                    Self::complete(run, commands, false);
                    false
                }
                SequencerStep::ForceClosed => {
                    Self::complete(run, commands, true);
                    false
                }
            }
        });
    }

    fn complete(run: &LoadingRun, commands: &mut CommandQueue, forced: bool) {
        let data = run.sequencer.data();
        let (next, cached, additive) = {
            let data = data.borrow();
            (
                data.next_screen().map(str::to_string),
                data.is_next_cached(),
                data.is_additive(),
            )
        };

        match next {
            Some(next) if !forced => {
                debug!("Loading finished; loading '{}'", next);
                commands.load_screen(next, Payload::from_rc(data.clone()), cached);
                if additive {
                    Self::close_owner(run, commands);
                }
            }
            _ => {
                debug!("Loading finished without a next screen (forced: {})", forced);
                Self::close_owner(run, commands);
            }
        }
    }

    fn close_owner(run: &LoadingRun, commands: &mut CommandQueue) {
        if let Some(owner) = run.owner {
            commands.close_screen(owner, false);
        }
    }
}
