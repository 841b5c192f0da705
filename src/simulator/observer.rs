//! Stage-transition notifications.  The engine knows nothing about how
//! patients are drawn; consoles, front-ends and tests subscribe through
//! `StageObserver`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::patient::{PatientId, Stage};

/// A patient entering a stage.  `from` is `None` for an arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransition {
    pub time: f64,
    pub patient: PatientId,
    pub from: Option<Stage>,
    pub to: Stage,
}

pub trait StageObserver {
    fn on_transition(&mut self, transition: &StageTransition);

    /// Called once, before the first event of a run.
    fn on_run_start(&mut self, _run_id: usize) {}

    /// Called once, after the last event of a run that produced results.
    fn on_run_end(&mut self, _run_id: usize) {}
}

/// Forwards the patient-state tag of every transition to a renderer.
pub struct RendererSink<F: FnMut(&str)> {
    draw: F,
}

impl<F: FnMut(&str)> RendererSink<F> {
    pub fn new(draw: F) -> Self {
        Self { draw }
    }
}

impl<F: FnMut(&str)> StageObserver for RendererSink<F> {
    fn on_transition(&mut self, transition: &StageTransition) {
        (self.draw)(transition.to.tag());
    }
}

/// Records every transition of the most recent run.  Clones share the same
/// log, so a handle can be kept after subscribing.
#[derive(Debug, Clone, Default)]
pub struct TransitionLog {
    transitions: Rc<RefCell<Vec<StageTransition>>>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<StageTransition> {
        self.transitions.borrow().clone()
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.transitions
            .borrow()
            .iter()
            .map(|transition| transition.to.tag())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.borrow().is_empty()
    }
}

impl StageObserver for TransitionLog {
    fn on_transition(&mut self, transition: &StageTransition) {
        self.transitions.borrow_mut().push(*transition);
    }

    fn on_run_start(&mut self, _run_id: usize) {
        self.transitions.borrow_mut().clear();
    }
}
