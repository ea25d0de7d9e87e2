//=========================================================================
// Presentation Flows
//=========================================================================
//
// Layer-specific presentation routines, one state machine per layer.
//
//   Alert  stack a copy on top; nothing closes
//   Popup  close existing popups, then stack a copy
//   High   close everything above Low, replace the previous top
//   Low    close alerts/popups, then cross-fade with a High top or
//          swap out the previous Low screen
//
// Every wait is an animation poll; screens without animations complete
// their whole flow within one tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::director::ScreenDirector;
use super::job::Progress;
use super::sweep::Sweep;
use super::{Animation, Layer, Payload, ScreenHandle};
use crate::core::globals::GlobalContext;

//=== Flow ================================================================

pub(crate) struct Flow {
    name: String,
    template: ScreenHandle,
    payload: Payload,
    route: Route,
}

enum Route {
    Alert(StackStage),
    Popup(StackStage),
    High(HighStage),
    Low(LowStage),
}

enum StackStage {
    Start,
    Entering(ScreenHandle),
    Done,
}

enum HighStage {
    Start,
    ExitingPrevious(ScreenHandle),
    Entering,
    Done,
}

enum LowStage {
    Start,
    CrossFading(ScreenHandle),
    ExitingPrevious(ScreenHandle),
    Entering,
    Done,
}

impl Flow {
    pub(crate) fn new(name: String, template: ScreenHandle, layer: Layer, payload: Payload) -> Self {
        let route = match layer {
            Layer::Alert => Route::Alert(StackStage::Start),
            Layer::Popup => Route::Popup(StackStage::Start),
            Layer::High => Route::High(HighStage::Start),
            Layer::Low => Route::Low(LowStage::Start),
        };
        Self {
            name,
            template,
            payload,
            route,
        }
    }
}

//=== Director Integration ================================================

impl ScreenDirector {
    pub(super) fn step_flow(&mut self, flow: &mut Flow, ctx: &mut GlobalContext) -> Progress {
        let Flow {
            name,
            template,
            payload,
            route,
        } = flow;

        match route {
            Route::Alert(stage) => self.step_stacked(name, *template, payload, Layer::Alert, stage, ctx),
            Route::Popup(stage) => self.step_stacked(name, *template, payload, Layer::Popup, stage, ctx),
            Route::High(stage) => self.step_high(name, *template, payload, stage, ctx),
            Route::Low(stage) => self.step_low(name, *template, payload, stage, ctx),
        }
    }

    //--- Alert / Popup ----------------------------------------------------

    fn step_stacked(
        &mut self,
        name: &str,
        template: ScreenHandle,
        payload: &Payload,
        layer: Layer,
        stage: &mut StackStage,
        ctx: &mut GlobalContext,
    ) -> Progress {
        loop {
            match stage {
                StackStage::Start => {
                    if let Some(top) = self.top_handle() {
                        self.lose_focus(top, ctx);
                    }
                    if layer == Layer::Popup {
                        self.sweep(Sweep::only(&[Layer::Popup]), ctx);
                    }
                    let Some(copy) = self.spawn_copy(template) else {
                        warn!("Template for {:?} vanished before presentation", name);
                        *stage = StackStage::Done;
                        return Progress::Done;
                    };
                    let id = self.live.next_id(layer);
                    debug!("Stacking {:?} #{} as {:?}", name, id, copy);
                    self.stack(copy, name, layer, id, true);
                    self.present(copy, payload, ctx);
                    self.enter(copy, payload, ctx);
                    *stage = StackStage::Entering(copy);
                }
                StackStage::Entering(copy) => {
                    let copy = *copy;
                    if !self.animation_ended(copy, Animation::In) {
                        return Progress::Pending;
                    }
                    self.ready(copy, ctx);
                    *stage = StackStage::Done;
                }
                StackStage::Done => return Progress::Done,
            }
        }
    }

    //--- High -------------------------------------------------------------

    fn step_high(
        &mut self,
        name: &str,
        target: ScreenHandle,
        payload: &Payload,
        stage: &mut HighStage,
        ctx: &mut GlobalContext,
    ) -> Progress {
        loop {
            match stage {
                HighStage::Start => {
                    if let Some(top) = self.top_handle() {
                        self.lose_focus(top, ctx);
                    }
                    self.sweep(Sweep::above(Layer::Low).keeping(target), ctx);
                    if self.live.contains(target) {
                        debug!("{:?} already live, re-entering", name);
                        self.with_screen(target, |screen| screen.prepare_animate_in());
                        self.enter(target, payload, ctx);
                        *stage = HighStage::Entering;
                    } else if let Some(previous) = self.top_handle() {
                        self.begin_exit(previous);
                        *stage = HighStage::ExitingPrevious(previous);
                    } else {
                        self.stack(target, name, Layer::High, 1, true);
                        self.present(target, payload, ctx);
                        self.enter(target, payload, ctx);
                        *stage = HighStage::Entering;
                    }
                }
                HighStage::ExitingPrevious(previous) => {
                    let previous = *previous;
                    if !self.animation_ended(previous, Animation::Out) {
                        return Progress::Pending;
                    }
                    self.stack(target, name, Layer::High, 1, true);
                    self.present(target, payload, ctx);
                    self.enter(target, payload, ctx);
                    self.lose_focus(previous, ctx);
                    self.finish_close(previous);
                    *stage = HighStage::Entering;
                }
                HighStage::Entering => {
                    if !self.animation_ended(target, Animation::In) {
                        return Progress::Pending;
                    }
                    self.ready(target, ctx);
                    *stage = HighStage::Done;
                }
                HighStage::Done => return Progress::Done,
            }
        }
    }

    //--- Low --------------------------------------------------------------

    fn step_low(
        &mut self,
        name: &str,
        target: ScreenHandle,
        payload: &Payload,
        stage: &mut LowStage,
        ctx: &mut GlobalContext,
    ) -> Progress {
        loop {
            match stage {
                LowStage::Start => {
                    if let Some(top) = self.top_handle() {
                        if matches!(self.layer_of(top), Some(Layer::Alert | Layer::Popup)) {
                            self.lose_focus(top, ctx);
                        }
                    }
                    self.sweep(Sweep::only(&[Layer::Alert, Layer::Popup]), ctx);
                    let top = self.top_handle();
                    match top {
                        Some(high) if self.layer_of(high) == Some(Layer::High) => {
                            self.focus(high, ctx);
                            if self.live.contains(target) {
                                self.with_screen(target, |screen| {
                                    screen.prepare_animate_in();
                                    screen.set_visible(true);
                                });
                            } else {
                                self.sweep(Sweep::only(&[Layer::Low]), ctx);
                                self.stack(target, name, Layer::Low, 1, true);
                                self.present(target, payload, ctx);
                            }
                            self.begin_exit(high);
                            *stage = LowStage::CrossFading(high);
                        }
                        _ if self.live.contains(target) => {
                            debug!("{:?} already live, re-entering", name);
                            self.with_screen(target, |screen| screen.prepare_animate_in());
                            self.enter(target, payload, ctx);
                            *stage = LowStage::Entering;
                        }
                        previous => {
                            self.stack(target, name, Layer::Low, 1, false);
                            self.present(target, payload, ctx);
                            match previous {
                                Some(previous) => {
                                    self.begin_exit(previous);
                                    *stage = LowStage::ExitingPrevious(previous);
                                }
                                None => {
                                    self.enter(target, payload, ctx);
                                    *stage = LowStage::Entering;
                                }
                            }
                        }
                    }
                }
                LowStage::CrossFading(high) => {
                    let high = *high;
                    if !self.animation_ended(high, Animation::Out) {
                        return Progress::Pending;
                    }
                    self.lose_focus(high, ctx);
                    self.finish_close(high);
                    self.enter(target, payload, ctx);
                    *stage = LowStage::Entering;
                }
                LowStage::ExitingPrevious(previous) => {
                    let previous = *previous;
                    if !self.animation_ended(previous, Animation::Out) {
                        return Progress::Pending;
                    }
                    self.lose_focus(previous, ctx);
                    self.finish_close(previous);
                    self.enter(target, payload, ctx);
                    *stage = LowStage::Entering;
                }
                LowStage::Entering => {
                    if !self.animation_ended(target, Animation::In) {
                        return Progress::Pending;
                    }
                    self.ready(target, ctx);
                    *stage = LowStage::Done;
                }
                LowStage::Done => return Progress::Done,
            }
        }
    }
}
