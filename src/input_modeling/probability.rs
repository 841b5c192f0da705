//! Routing probabilities for the decision points of patient flow.  Each
//! decision point is an independent gate - a Bernoulli trial evaluated once
//! per patient - so the probabilities are not required to sum to one.

use std::fmt;
use std::str::FromStr;

use rand::distributions::Distribution as _;
use rand::Rng;
use rand_distr::Bernoulli;
use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;
use crate::utils::is_valid_probability;

pub const DEFAULT_LAB_PROBABILITY: f64 = 0.5;
pub const DEFAULT_XRAY_PROBABILITY: f64 = 0.3;
pub const DEFAULT_TREATMENT_PROBABILITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionPoint {
    Lab,
    Xray,
    Treatment,
}

impl DecisionPoint {
    /// Gates are evaluated in this order.
    pub const ALL: [DecisionPoint; 3] = [
        DecisionPoint::Lab,
        DecisionPoint::Xray,
        DecisionPoint::Treatment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DecisionPoint::Lab => "lab",
            DecisionPoint::Xray => "xray",
            DecisionPoint::Treatment => "treatment",
        }
    }
}

impl fmt::Display for DecisionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DecisionPoint {
    type Err = SimulationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lab" => Ok(DecisionPoint::Lab),
            "xray" | "x-ray" => Ok(DecisionPoint::Xray),
            "treatment" => Ok(DecisionPoint::Treatment),
            _ => Err(SimulationError::UnknownDecisionType(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityModel {
    lab: f64,
    xray: f64,
    treatment: f64,
}

impl Default for ProbabilityModel {
    fn default() -> Self {
        ProbabilityModel {
            lab: DEFAULT_LAB_PROBABILITY,
            xray: DEFAULT_XRAY_PROBABILITY,
            treatment: DEFAULT_TREATMENT_PROBABILITY,
        }
    }
}

impl ProbabilityModel {
    pub fn new(lab: f64, xray: f64, treatment: f64) -> Result<Self, SimulationError> {
        let mut model = ProbabilityModel::default();
        model.set_probabilities(lab, xray, treatment)?;
        Ok(model)
    }

    /// All three probabilities are validated before any is stored, so a
    /// rejected update leaves the model untouched.
    pub fn set_probabilities(
        &mut self,
        lab: f64,
        xray: f64,
        treatment: f64,
    ) -> Result<(), SimulationError> {
        [
            (DecisionPoint::Lab, lab),
            (DecisionPoint::Xray, xray),
            (DecisionPoint::Treatment, treatment),
        ]
        .iter()
        .try_for_each(|(decision, value)| {
            if is_valid_probability(*value) {
                Ok(())
            } else {
                Err(SimulationError::InvalidProbability {
                    decision: decision.to_string(),
                    value: *value,
                })
            }
        })?;
        self.lab = lab;
        self.xray = xray;
        self.treatment = treatment;
        Ok(())
    }

    /// Re-check stored values, for models that were deserialized rather
    /// than constructed.
    pub fn validate(&self) -> Result<(), SimulationError> {
        ProbabilityModel::new(self.lab, self.xray, self.treatment).map(|_| ())
    }

    pub fn get_probability(&self, decision: DecisionPoint) -> f64 {
        match decision {
            DecisionPoint::Lab => self.lab,
            DecisionPoint::Xray => self.xray,
            DecisionPoint::Treatment => self.treatment,
        }
    }

    /// Evaluate a single gate.  Returns true when the patient is routed
    /// through the decision point's stage.
    pub fn passes<R: Rng + ?Sized>(
        &self,
        decision: DecisionPoint,
        rng: &mut R,
    ) -> Result<bool, SimulationError> {
        Ok(Bernoulli::new(self.get_probability(decision))?.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn defaults_are_documented_constants() {
        let model = ProbabilityModel::default();
        assert_eq!(model.get_probability(DecisionPoint::Lab), 0.5);
        assert_eq!(model.get_probability(DecisionPoint::Xray), 0.3);
        assert_eq!(model.get_probability(DecisionPoint::Treatment), 0.8);
    }

    #[test]
    fn probabilities_round_trip() {
        let grid = [0.0, 0.1, 0.25, 1.0 / 3.0, 0.5, 0.999, 1.0];
        let mut model = ProbabilityModel::default();
        for lab in grid.iter() {
            for xray in grid.iter() {
                for treatment in grid.iter() {
                    model.set_probabilities(*lab, *xray, *treatment).unwrap();
                    assert_eq!(model.get_probability(DecisionPoint::Lab), *lab);
                    assert_eq!(model.get_probability(DecisionPoint::Xray), *xray);
                    assert_eq!(model.get_probability(DecisionPoint::Treatment), *treatment);
                }
            }
        }
    }

    #[test]
    fn rejected_update_is_atomic() {
        let mut model = ProbabilityModel::new(0.2, 0.4, 0.6).unwrap();
        let result = model.set_probabilities(0.9, 0.9, 1.5);
        match result {
            Err(SimulationError::InvalidProbability { decision, value }) => {
                assert_eq!(decision, "treatment");
                assert_eq!(value, 1.5);
            }
            other => panic!("expected InvalidProbability, got {:?}", other),
        }
        assert_eq!(model, ProbabilityModel::new(0.2, 0.4, 0.6).unwrap());
        assert!(model.set_probabilities(f64::NAN, 0.1, 0.1).is_err());
        assert!(model.set_probabilities(0.1, -0.0001, 0.1).is_err());
    }

    #[test]
    fn decision_points_parse() {
        assert_eq!("LAB".parse::<DecisionPoint>().unwrap(), DecisionPoint::Lab);
        assert_eq!("x-ray".parse::<DecisionPoint>().unwrap(), DecisionPoint::Xray);
        assert!(matches!(
            "unknown".parse::<DecisionPoint>(),
            Err(SimulationError::UnknownDecisionType(_))
        ));
    }

    #[test]
    fn certain_gates_are_deterministic() {
        let mut rng = Pcg64Mcg::new(42);
        let always = ProbabilityModel::new(1.0, 1.0, 1.0).unwrap();
        let never = ProbabilityModel::new(0.0, 0.0, 0.0).unwrap();
        for _ in 0..1000 {
            assert!(always.passes(DecisionPoint::Lab, &mut rng).unwrap());
            assert!(!never.passes(DecisionPoint::Treatment, &mut rng).unwrap());
        }
    }

    #[test]
    fn gate_frequency_chi_square() {
        let model = ProbabilityModel::default();
        let mut rng = Pcg64Mcg::new(42);
        let passes = (0..10000)
            .filter(|_| model.passes(DecisionPoint::Xray, &mut rng).unwrap())
            .count() as f64;
        let expected = [7000.0, 3000.0];
        let observed = [10000.0 - passes, passes];
        let chi_square = observed
            .iter()
            .zip(expected.iter())
            .fold(0.0, |acc, (o, e)| acc + (o - e).powi(2) / e);
        // At a significance level of 0.001, and with n-1=1 degrees of freedom, the chi square critical
        // value for this scenario is 10.828
        assert![chi_square < 10.828];
    }
}
