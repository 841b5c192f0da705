//! Distributions drive the stochastic timing of the hospital: how long until
//! the next patient arrives, and how long each stage of care takes.  Every
//! distribution is parameterized by a single average time, and the family
//! (`DistributionKind`) determines the shape around that average.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use rand::distributions::Distribution as _;
use rand::Rng;
use rand_distr::{Exp, Normal, Triangular, Uniform};
use serde::{Deserialize, Serialize};

use crate::simulator::Stage;
use crate::utils::errors::SimulationError;
use crate::utils::is_valid_average_time;

/// The average time of every default distribution.
pub const DEFAULT_AVERAGE_TIME: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DistributionKind {
    Exponential,
    /// Uniform over [0, 2 * average)
    Uniform,
    /// Normal with a standard deviation of a quarter of the average,
    /// truncated at zero
    Normal,
    /// Triangular over [0, 2 * average] with the mode at the average
    Triangular,
    Constant,
}

impl DistributionKind {
    pub fn name(&self) -> &'static str {
        match self {
            DistributionKind::Exponential => "exponential",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Normal => "normal",
            DistributionKind::Triangular => "triangular",
            DistributionKind::Constant => "constant",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = SimulationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "exponential" | "exp" => Ok(DistributionKind::Exponential),
            "uniform" => Ok(DistributionKind::Uniform),
            "normal" => Ok(DistributionKind::Normal),
            "triangular" => Ok(DistributionKind::Triangular),
            "constant" | "deterministic" => Ok(DistributionKind::Constant),
            _ => Err(SimulationError::UnknownDistributionKind(name.to_string())),
        }
    }
}

/// A duration distribution.  Construction validates the average time, so a
/// `Distribution` value can always be sampled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "DistributionRepr",
    into = "DistributionRepr"
)]
pub struct Distribution {
    kind: DistributionKind,
    average_time: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DistributionRepr {
    kind: DistributionKind,
    average_time: f64,
}

impl TryFrom<DistributionRepr> for Distribution {
    type Error = SimulationError;

    fn try_from(repr: DistributionRepr) -> Result<Self, Self::Error> {
        Distribution::new(repr.kind, repr.average_time)
    }
}

impl From<Distribution> for DistributionRepr {
    fn from(distribution: Distribution) -> Self {
        DistributionRepr {
            kind: distribution.kind,
            average_time: distribution.average_time,
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution {
            kind: DistributionKind::Exponential,
            average_time: DEFAULT_AVERAGE_TIME,
        }
    }
}

impl Distribution {
    pub fn new(kind: DistributionKind, average_time: f64) -> Result<Self, SimulationError> {
        if !is_valid_average_time(average_time) {
            return Err(SimulationError::InvalidParameter {
                name: String::from("averageTime"),
                value: average_time,
            });
        }
        Ok(Distribution { kind, average_time })
    }

    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    pub fn average_time(&self) -> f64 {
        self.average_time
    }

    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the simulation, and produces a non-negative duration.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SimulationError> {
        let mean = self.average_time;
        match self.kind {
            DistributionKind::Exponential => Ok(Exp::new(1.0 / mean)?.sample(rng)),
            DistributionKind::Uniform => Ok(Uniform::new(0.0, 2.0 * mean).sample(rng)),
            DistributionKind::Normal => Ok(Normal::new(mean, mean / 4.0)?.sample(rng).max(0.0)),
            DistributionKind::Triangular => {
                Ok(Triangular::new(0.0, 2.0 * mean, mean)?.sample(rng))
            }
            DistributionKind::Constant => Ok(mean),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(average={})", self.kind, self.average_time)
    }
}

/// Activities are the named events that carry a duration distribution - the
/// inter-arrival time plus one service time per stage of care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Activity {
    Arrival,
    Sick,
    Lab,
    Xray,
    Treatment,
    Doctor,
}

impl Activity {
    pub const ALL: [Activity; 6] = [
        Activity::Arrival,
        Activity::Sick,
        Activity::Lab,
        Activity::Xray,
        Activity::Treatment,
        Activity::Doctor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Activity::Arrival => "arrival",
            Activity::Sick => "sick",
            Activity::Lab => "lab",
            Activity::Xray => "xray",
            Activity::Treatment => "treatment",
            Activity::Doctor => "doctor",
        }
    }

    /// The service activity performed at a stage, if the stage has one.
    pub fn for_stage(stage: Stage) -> Option<Activity> {
        match stage {
            Stage::Sick => Some(Activity::Sick),
            Stage::Lab => Some(Activity::Lab),
            Stage::Xray => Some(Activity::Xray),
            Stage::Treatment => Some(Activity::Treatment),
            Stage::Doctor => Some(Activity::Doctor),
            Stage::Done => None,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = SimulationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "arrival" => Ok(Activity::Arrival),
            "sick" => Ok(Activity::Sick),
            "lab" => Ok(Activity::Lab),
            "xray" | "x-ray" => Ok(Activity::Xray),
            "treatment" => Ok(Activity::Treatment),
            "doctor" => Ok(Activity::Doctor),
            _ => Err(SimulationError::UnknownEvent(name.to_string())),
        }
    }
}

/// One distribution per activity.  The table is total - every activity
/// always has a distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistributionTable {
    arrival: Distribution,
    sick: Distribution,
    lab: Distribution,
    xray: Distribution,
    treatment: Distribution,
    doctor: Distribution,
}

impl DistributionTable {
    pub fn get(&self, activity: Activity) -> &Distribution {
        match activity {
            Activity::Arrival => &self.arrival,
            Activity::Sick => &self.sick,
            Activity::Lab => &self.lab,
            Activity::Xray => &self.xray,
            Activity::Treatment => &self.treatment,
            Activity::Doctor => &self.doctor,
        }
    }

    pub fn set(&mut self, activity: Activity, distribution: Distribution) {
        let slot = match activity {
            Activity::Arrival => &mut self.arrival,
            Activity::Sick => &mut self.sick,
            Activity::Lab => &mut self.lab,
            Activity::Xray => &mut self.xray,
            Activity::Treatment => &mut self.treatment,
            Activity::Doctor => &mut self.doctor,
        };
        *slot = distribution;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Activity, &Distribution)> + '_ {
        Activity::ALL
            .iter()
            .map(move |activity| (*activity, self.get(*activity)))
    }
}
