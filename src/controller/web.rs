use js_sys::Array;
use wasm_bindgen::prelude::*;

use crate::simulator::{SimulationConfig, TransitionLog};
use crate::utils::errors::SimulationError;
use crate::utils::set_panic_hook;

use super::DataController;

fn to_js(error: SimulationError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// The web `DataController` provides JS/WASM-compatible interfaces to the
/// core `DataController`.  For additional insight on these methods, refer
/// to the associated core methods.  Errors are returned to JavaScript as
/// their message strings.
#[wasm_bindgen]
pub struct WebDataController {
    controller: DataController,
    stages: TransitionLog,
}

impl WebDataController {
    fn from_controller(controller: DataController) -> Result<Self, SimulationError> {
        let stages = TransitionLog::new();
        controller.subscribe(Box::new(stages.clone()))?;
        Ok(Self { controller, stages })
    }
}

#[wasm_bindgen]
impl WebDataController {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebDataController, JsValue> {
        set_panic_hook();
        Self::from_controller(DataController::new()).map_err(to_js)
    }

    /// Build a controller from a JSON `SimulationConfig`.  Omitted fields
    /// take their defaults.
    pub fn post_json(config: &str) -> Result<WebDataController, JsValue> {
        set_panic_hook();
        let config: SimulationConfig =
            serde_json::from_str(config).map_err(|error| to_js(error.into()))?;
        DataController::with_config(config)
            .and_then(Self::from_controller)
            .map_err(to_js)
    }

    /// Build a controller from a YAML `SimulationConfig`.
    pub fn post_yaml(config: &str) -> Result<WebDataController, JsValue> {
        set_panic_hook();
        let config: SimulationConfig =
            serde_yaml::from_str(config).map_err(|error| to_js(error.into()))?;
        DataController::with_config(config)
            .and_then(Self::from_controller)
            .map_err(to_js)
    }

    /// Get a JSON representation of the active configuration.
    pub fn get_config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(self.controller.config())
            .map_err(|error| to_js(error.into()))
    }

    /// Get a YAML representation of the active configuration.
    pub fn get_config_yaml(&self) -> Result<String, JsValue> {
        serde_yaml::to_string(self.controller.config()).map_err(|error| to_js(error.into()))
    }

    pub fn get_probability(&self, decision_type: &str) -> Result<f64, JsValue> {
        self.controller.get_probability(decision_type).map_err(to_js)
    }

    pub fn set_probabilities(&mut self, lab: f64, xray: f64, treatment: f64) -> Result<(), JsValue> {
        self.controller
            .set_probabilities(lab, xray, treatment)
            .map_err(to_js)
    }

    pub fn get_distribution(&self, event: &str) -> Result<String, JsValue> {
        self.controller.get_distribution(event).map_err(to_js)
    }

    pub fn get_average_time(&self, event: &str) -> Result<f64, JsValue> {
        self.controller.get_average_time(event).map_err(to_js)
    }

    pub fn update_distribution(
        &mut self,
        event: &str,
        distribution: &str,
        average_time: f64,
    ) -> Result<(), JsValue> {
        self.controller
            .update_distribution(event, distribution, average_time)
            .map_err(to_js)
    }

    pub fn set_default_distributions(&mut self) {
        self.controller.set_default_distributions();
    }

    /// Seed the following runs, making them reproducible.
    pub fn set_seed(&mut self, seed: u64) {
        self.controller.set_seed(Some(seed));
    }

    pub fn clear_seed(&mut self) {
        self.controller.set_seed(None);
    }

    /// Execute one run and return its results as a JSON string.
    pub fn run_simulation(&mut self) -> Result<String, JsValue> {
        let results = self.controller.run_simulation().map_err(to_js)?;
        serde_json::to_string(results).map_err(|error| to_js(error.into()))
    }

    /// The results history as a JSON string.
    pub fn get_results_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.get_simulation_results())
            .map_err(|error| to_js(error.into()))
    }

    /// The results history as a YAML string.
    pub fn get_results_yaml(&self) -> Result<String, JsValue> {
        serde_yaml::to_string(self.controller.get_simulation_results())
            .map_err(|error| to_js(error.into()))
    }

    pub fn get_results_count(&self) -> usize {
        self.controller.get_simulation_results().len()
    }

    /// The stage tags entered during the last run, in event order, as a
    /// JSON string.
    pub fn get_stage_tags_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.stages.tags()).map_err(|error| to_js(error.into()))
    }

    /// The stage tags entered during the last run, as a JavaScript Array.
    pub fn get_stage_tags_js(&self) -> Array {
        self.stages.tags().into_iter().map(JsValue::from).collect()
    }

    /// Half width of the confidence interval on the mean of per-run average
    /// wait times.
    pub fn wait_time_half_width(&self, alpha: f64) -> Result<f64, JsValue> {
        self.controller
            .wait_time_confidence_interval(alpha)
            .map(|interval| interval.half_width())
            .map_err(to_js)
    }
}
