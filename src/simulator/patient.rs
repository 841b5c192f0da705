use std::fmt;

use serde::{Deserialize, Serialize};

use crate::input_modeling::DecisionPoint;

pub type PatientId = u64;

/// The discrete states of a patient's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Sick,
    Lab,
    Xray,
    Treatment,
    Doctor,
    Done,
}

impl Stage {
    /// Stages with a station (servers and a queue), in care order.
    pub const SERVICE_STAGES: [Stage; 5] = [
        Stage::Sick,
        Stage::Lab,
        Stage::Xray,
        Stage::Treatment,
        Stage::Doctor,
    ];

    /// The patient-state tag understood by renderers.  `"done"` has no
    /// dedicated visual and falls back to the renderer default.
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::Sick => "sick",
            Stage::Lab => "lab",
            Stage::Xray => "xray",
            Stage::Treatment => "treatment",
            Stage::Doctor => "doctor",
            Stage::Done => "done",
        }
    }

    /// The stage reached when the gate of a decision point passes.
    pub fn for_decision(decision: DecisionPoint) -> Stage {
        match decision {
            DecisionPoint::Lab => Stage::Lab,
            DecisionPoint::Xray => Stage::Xray,
            DecisionPoint::Treatment => Stage::Treatment,
        }
    }

    /// The decision points still ahead of a patient leaving this stage, in
    /// evaluation order.
    pub fn remaining_decisions(&self) -> &'static [DecisionPoint] {
        match self {
            Stage::Sick => &[
                DecisionPoint::Lab,
                DecisionPoint::Xray,
                DecisionPoint::Treatment,
            ],
            Stage::Lab => &[DecisionPoint::Xray, DecisionPoint::Treatment],
            Stage::Xray => &[DecisionPoint::Treatment],
            Stage::Treatment | Stage::Doctor | Stage::Done => &[],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A patient in the system.  The stage history records the time each stage
/// was entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    id: PatientId,
    arrival_time: f64,
    current_stage: Stage,
    stage_history: Vec<(Stage, f64)>,
    queue_time: f64,
}

impl Patient {
    pub fn new(id: PatientId, arrival_time: f64) -> Self {
        Patient {
            id,
            arrival_time,
            current_stage: Stage::Sick,
            stage_history: vec![(Stage::Sick, arrival_time)],
            queue_time: 0.0,
        }
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn current_stage(&self) -> Stage {
        self.current_stage
    }

    pub fn stage_history(&self) -> &[(Stage, f64)] {
        &self.stage_history
    }

    /// Total time spent waiting in station queues so far.
    pub fn queue_time(&self) -> f64 {
        self.queue_time
    }

    pub(crate) fn add_queue_time(&mut self, waited: f64) {
        self.queue_time += waited;
    }

    pub(crate) fn advance(&mut self, stage: Stage, time: f64) {
        self.current_stage = stage;
        self.stage_history.push((stage, time));
    }
}
