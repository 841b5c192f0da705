use serde::{Deserialize, Serialize};

use super::patient::Stage;
use crate::input_modeling::{DistributionTable, ProbabilityModel};
use crate::utils::errors::SimulationError;

pub const DEFAULT_MAX_PATIENTS: usize = 100;

/// Termination criteria for a run.  At least one limit must be set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLimits {
    /// Number of patients admitted before arrivals stop
    pub max_patients: Option<usize>,
    /// Events later than this simulation time are not processed
    pub time_limit: Option<f64>,
}

impl Default for RunLimits {
    fn default() -> Self {
        RunLimits {
            max_patients: Some(DEFAULT_MAX_PATIENTS),
            time_limit: None,
        }
    }
}

impl RunLimits {
    pub fn validate(&self) -> Result<(), SimulationError> {
        match (self.max_patients, self.time_limit) {
            (None, None) => Err(SimulationError::InvalidRunLimits),
            (_, Some(limit)) if !limit.is_finite() || limit < 0.0 => {
                Err(SimulationError::InvalidRunLimits)
            }
            _ => Ok(()),
        }
    }
}

/// Number of parallel servers at each station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationCapacity {
    sick: usize,
    lab: usize,
    xray: usize,
    treatment: usize,
    doctor: usize,
}

impl Default for StationCapacity {
    fn default() -> Self {
        StationCapacity {
            sick: 1,
            lab: 1,
            xray: 1,
            treatment: 1,
            doctor: 1,
        }
    }
}

impl StationCapacity {
    /// Servers at a stage; `Done` has no station.
    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Sick => self.sick,
            Stage::Lab => self.lab,
            Stage::Xray => self.xray,
            Stage::Treatment => self.treatment,
            Stage::Doctor => self.doctor,
            Stage::Done => 0,
        }
    }

    pub fn set(&mut self, stage: Stage, servers: usize) -> Result<(), SimulationError> {
        if servers == 0 {
            return Err(SimulationError::InvalidRunLimits);
        }
        match stage {
            Stage::Sick => self.sick = servers,
            Stage::Lab => self.lab = servers,
            Stage::Xray => self.xray = servers,
            Stage::Treatment => self.treatment = servers,
            Stage::Doctor => self.doctor = servers,
            Stage::Done => return Err(SimulationError::InvalidModelState),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if Stage::SERVICE_STAGES
            .iter()
            .all(|stage| self.get(*stage) > 0)
        {
            Ok(())
        } else {
            Err(SimulationError::InvalidRunLimits)
        }
    }
}

/// Everything a run needs.  The engine works on a snapshot of this, so
/// changes made while a run is active never affect that run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(default)]
    pub probabilities: ProbabilityModel,
    #[serde(default)]
    pub distributions: DistributionTable,
    #[serde(default)]
    pub servers: StationCapacity,
    #[serde(default)]
    pub limits: RunLimits,
    /// With a seed, every run starts from a fresh generator; without one,
    /// the engine's generator continues across runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.probabilities.validate()?;
        self.limits.validate()?;
        self.servers.validate()
    }
}
