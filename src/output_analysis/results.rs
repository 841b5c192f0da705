use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::simulator::Stage;

/// The aggregate statistics of one simulation run.  Results are produced
/// once, at the end of a successful run, and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    pub(crate) run_id: usize,
    /// Mean time from arrival to completion, over completed patients
    pub(crate) average_wait_time: f64,
    /// Completed patients
    pub(crate) total_patients: usize,
    /// Busy time over available server time, per service stage
    pub(crate) per_stage_utilization: BTreeMap<Stage, f64>,
    /// Mean total time spent queueing, over completed patients
    pub(crate) average_queue_time: f64,
    pub(crate) max_wait_time: f64,
    /// Services started, per service stage
    pub(crate) stage_visits: BTreeMap<Stage, usize>,
    pub(crate) end_time: f64,
    /// Patients admitted but still in the system when a time limit ended
    /// the run
    pub(crate) incomplete_patients: usize,
}

impl SimulationResults {
    pub fn run_id(&self) -> usize {
        self.run_id
    }

    pub fn average_wait_time(&self) -> f64 {
        self.average_wait_time
    }

    pub fn total_patients(&self) -> usize {
        self.total_patients
    }

    pub fn per_stage_utilization(&self) -> &BTreeMap<Stage, f64> {
        &self.per_stage_utilization
    }

    pub fn utilization(&self, stage: Stage) -> f64 {
        self.per_stage_utilization
            .get(&stage)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn average_queue_time(&self) -> f64 {
        self.average_queue_time
    }

    pub fn max_wait_time(&self) -> f64 {
        self.max_wait_time
    }

    pub fn stage_visits(&self) -> &BTreeMap<Stage, usize> {
        &self.stage_visits
    }

    pub fn visits(&self, stage: Stage) -> usize {
        self.stage_visits.get(&stage).copied().unwrap_or(0)
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn incomplete_patients(&self) -> usize {
        self.incomplete_patients
    }
}
