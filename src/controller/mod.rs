//! The controller module is the façade between the simulation and its
//! consumers.  `DataController` holds the active configuration - routing
//! probabilities, the distribution of every activity, station capacities
//! and run limits - executes runs on a `SimulationEngine`, and keeps the
//! ordered history of `SimulationResults`.
//!
//! String keys (`"lab"`, `"xray"`, `"arrival"`, ...) are parsed into closed
//! enumerations here, at the boundary, so lookups in the core never miss.

use log::{debug, info, warn};

use crate::input_modeling::{
    Activity, DecisionPoint, Distribution, DistributionKind, DistributionTable, DynRng,
    ProbabilityModel,
};
use crate::output_analysis::{ConfidenceInterval, IndependentSample, SimulationResults};
use crate::simulator::{RunLimits, SimulationConfig, SimulationEngine, Stage, StageObserver};
use crate::utils::errors::SimulationError;

pub mod web;

pub use self::web::WebDataController;

#[derive(Default)]
pub struct DataController {
    config: SimulationConfig,
    engine: SimulationEngine,
    results: Vec<SimulationResults>,
}

impl DataController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller from an explicit configuration, validating it.
    pub fn with_config(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Create a controller whose unseeded runs draw from an injected random
    /// number generator.
    pub fn with_rng(rng: DynRng) -> Self {
        Self {
            engine: SimulationEngine::with_rng(rng),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn get_probability(&self, decision_type: &str) -> Result<f64, SimulationError> {
        let decision: DecisionPoint = decision_type.parse()?;
        Ok(self.config.probabilities.get_probability(decision))
    }

    pub fn set_probabilities(
        &mut self,
        lab: f64,
        xray: f64,
        treatment: f64,
    ) -> Result<(), SimulationError> {
        self.config
            .probabilities
            .set_probabilities(lab, xray, treatment)
            .map_err(|error| {
                warn!("rejected probabilities: {}", error);
                error
            })?;
        debug!(
            "probabilities set: lab={} xray={} treatment={}",
            lab, xray, treatment
        );
        Ok(())
    }

    /// The distribution kind name of an event, e.g. `"exponential"`.
    pub fn get_distribution(&self, event: &str) -> Result<String, SimulationError> {
        Ok(self.get_distribution_object(event)?.kind().to_string())
    }

    pub fn get_average_time(&self, event: &str) -> Result<f64, SimulationError> {
        Ok(self.get_distribution_object(event)?.average_time())
    }

    pub fn get_distribution_object(&self, event: &str) -> Result<Distribution, SimulationError> {
        let activity: Activity = event.parse()?;
        Ok(*self.config.distributions.get(activity))
    }

    /// Validate and replace the distribution of an event.  On any error the
    /// stored distribution is left unchanged.
    pub fn update_distribution(
        &mut self,
        event: &str,
        distribution: &str,
        average_time: f64,
    ) -> Result<(), SimulationError> {
        let update = event.parse::<Activity>().and_then(|activity| {
            let kind: DistributionKind = distribution.parse()?;
            Ok((activity, Distribution::new(kind, average_time)?))
        });
        match update {
            Ok((activity, distribution)) => {
                debug!("distribution of {} set to {}", activity, distribution);
                self.config.distributions.set(activity, distribution);
                Ok(())
            }
            Err(error) => {
                warn!("rejected distribution update for {}: {}", event, error);
                Err(error)
            }
        }
    }

    /// Reset the routing probabilities and every distribution to the
    /// documented defaults.
    pub fn set_default_distributions(&mut self) {
        self.config.probabilities = ProbabilityModel::default();
        self.config.distributions = DistributionTable::default();
        debug!("probabilities and distributions reset to defaults");
    }

    pub fn set_run_limits(&mut self, limits: RunLimits) -> Result<(), SimulationError> {
        limits.validate()?;
        self.config.limits = limits;
        Ok(())
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.config.seed = seed;
    }

    pub fn set_servers(&mut self, stage: Stage, servers: usize) -> Result<(), SimulationError> {
        self.config.servers.set(stage, servers)
    }

    pub fn subscribe(&self, observer: Box<dyn StageObserver>) -> Result<(), SimulationError> {
        self.engine.subscribe(observer)
    }

    /// Run the simulation on a snapshot of the current configuration and
    /// append the result to the history.
    pub fn run_simulation(&mut self) -> Result<&SimulationResults, SimulationError> {
        let run_id = self.results.len();
        let results = self.engine.run(&self.config, run_id)?;
        info!("run {} appended to results history", run_id);
        self.results.push(results);
        self.results.last().ok_or(SimulationError::InvalidModelState)
    }

    /// Every completed run, in the order the runs were executed.
    pub fn get_simulation_results(&self) -> &[SimulationResults] {
        &self.results
    }

    /// The per-run average wait times, treated as an independent sample.
    pub fn wait_time_summary(&self) -> Result<IndependentSample<f64>, SimulationError> {
        IndependentSample::post(
            self.results
                .iter()
                .map(SimulationResults::average_wait_time)
                .collect(),
        )
    }

    pub fn wait_time_confidence_interval(
        &self,
        alpha: f64,
    ) -> Result<ConfidenceInterval<f64>, SimulationError> {
        self.wait_time_summary()?.confidence_interval_mean(alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_modeling::dyn_rng;
    use rand_core::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn unknown_decision_type() {
        let controller = DataController::new();
        assert!(matches!(
            controller.get_probability("unknown"),
            Err(SimulationError::UnknownDecisionType(_))
        ));
    }

    #[test]
    fn distribution_lookups() {
        let mut controller = DataController::new();
        assert_eq!(controller.get_distribution("lab").unwrap(), "exponential");
        assert_eq!(controller.get_average_time("doctor").unwrap(), 10.0);
        controller
            .update_distribution("xray", "Uniform", 4.5)
            .unwrap();
        assert_eq!(controller.get_distribution("xray").unwrap(), "uniform");
        assert_eq!(
            controller.get_distribution_object("xray").unwrap(),
            Distribution::new(DistributionKind::Uniform, 4.5).unwrap()
        );
        assert!(matches!(
            controller.get_average_time("surgery"),
            Err(SimulationError::UnknownEvent(_))
        ));
    }

    #[test]
    fn rejected_updates_leave_distributions_unchanged() {
        let mut controller = DataController::new();
        controller.update_distribution("lab", "normal", 6.0).unwrap();
        let before = controller.config().distributions.clone();
        assert!(matches!(
            controller.update_distribution("lab", "uniform", 0.0),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            controller.update_distribution("lab", "uniform", -4.0),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            controller.update_distribution("lab", "cauchy", 4.0),
            Err(SimulationError::UnknownDistributionKind(_))
        ));
        assert!(matches!(
            controller.update_distribution("surgery", "uniform", 4.0),
            Err(SimulationError::UnknownEvent(_))
        ));
        assert_eq!(controller.config().distributions, before);
    }

    #[test]
    fn defaults_are_restored() {
        let mut controller = DataController::new();
        controller.set_probabilities(0.1, 0.2, 0.3).unwrap();
        controller
            .update_distribution("arrival", "constant", 2.0)
            .unwrap();
        controller.set_default_distributions();
        assert_eq!(controller.get_probability("lab").unwrap(), 0.5);
        assert_eq!(controller.get_probability("xray").unwrap(), 0.3);
        assert_eq!(controller.get_probability("treatment").unwrap(), 0.8);
        assert_eq!(controller.get_distribution("arrival").unwrap(), "exponential");
        assert_eq!(controller.get_average_time("arrival").unwrap(), 10.0);
    }

    #[test]
    fn history_is_appended_in_order() {
        let mut controller = DataController::new();
        controller.set_seed(Some(3));
        (0..3).for_each(|_| {
            controller.run_simulation().unwrap();
        });
        let run_ids: Vec<usize> = controller
            .get_simulation_results()
            .iter()
            .map(SimulationResults::run_id)
            .collect();
        assert_eq!(run_ids, vec![0, 1, 2]);
    }

    #[test]
    fn injected_generator_drives_unseeded_runs() {
        let mut first = DataController::with_rng(dyn_rng(Pcg64Mcg::seed_from_u64(9)));
        let mut second = DataController::with_rng(dyn_rng(Pcg64Mcg::seed_from_u64(9)));
        let first_results = first.run_simulation().unwrap().clone();
        let second_results = second.run_simulation().unwrap().clone();
        assert_eq!(first_results, second_results);
        assert!(first.config().seed.is_none());
    }

    #[test]
    fn failed_runs_append_nothing() {
        let mut controller = DataController::new();
        assert!(controller
            .set_run_limits(RunLimits {
                max_patients: None,
                time_limit: None,
            })
            .is_err());
        assert_eq!(controller.config().limits, RunLimits::default());
        assert!(controller.get_simulation_results().is_empty());
        assert!(matches!(
            controller.wait_time_summary(),
            Err(SimulationError::InsufficientRuns { .. })
        ));
    }
}
