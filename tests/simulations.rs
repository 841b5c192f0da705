use std::cell::RefCell;
use std::rc::Rc;

use hospital_sim::controller::DataController;
use hospital_sim::input_modeling::{Distribution, DistributionKind};
use hospital_sim::output_analysis::SimulationResults;
use hospital_sim::simulator::{RendererSink, RunLimits, SimulationConfig, Stage, TransitionLog};
use hospital_sim::utils::errors::SimulationError;

fn epsilon() -> f64 {
    1e-9
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn seeded_controller(seed: u64) -> DataController {
    init_logging();
    let mut controller = DataController::new();
    controller.set_seed(Some(seed));
    controller
}

#[test]
fn default_configuration_completes_every_patient() {
    let mut controller = seeded_controller(42);
    let results = controller.run_simulation().unwrap().clone();
    assert_eq!(results.run_id(), 0);
    assert_eq!(results.total_patients(), 100);
    assert_eq!(results.incomplete_patients(), 0);
    assert!(results.average_wait_time() > 0.0);
    assert!(results.max_wait_time() >= results.average_wait_time());
    assert!(results.average_queue_time() >= 0.0);
    assert!(results.average_queue_time() < results.average_wait_time());
    // Every patient passes the sick and doctor stations exactly once
    assert_eq!(results.visits(Stage::Sick), 100);
    assert_eq!(results.visits(Stage::Doctor), 100);
    Stage::SERVICE_STAGES.iter().for_each(|stage| {
        let utilization = results.utilization(*stage);
        assert!((0.0..=1.0 + epsilon()).contains(&utilization));
    });
}

#[test]
fn seeded_runs_are_reproducible() {
    let mut first = seeded_controller(2024);
    let mut second = seeded_controller(2024);
    let first_results = first.run_simulation().unwrap().clone();
    let second_results = second.run_simulation().unwrap().clone();
    assert_eq!(first_results, second_results);
}

#[test]
fn unknown_keys_are_rejected() {
    let mut controller = seeded_controller(1);
    assert!(matches!(
        controller.get_probability("unknown"),
        Err(SimulationError::UnknownDecisionType(_))
    ));
    assert!(matches!(
        controller.get_distribution("surgery"),
        Err(SimulationError::UnknownEvent(_))
    ));
    assert!(matches!(
        controller.update_distribution("lab", "lognormal", 3.0),
        Err(SimulationError::UnknownDistributionKind(_))
    ));
}

#[test]
fn invalid_probabilities_are_rejected_atomically() {
    let mut controller = seeded_controller(1);
    controller.set_probabilities(0.2, 0.4, 0.6).unwrap();
    assert!(matches!(
        controller.set_probabilities(0.9, 1.5, 0.9),
        Err(SimulationError::InvalidProbability { .. })
    ));
    assert!(controller.set_probabilities(f64::NAN, 0.5, 0.5).is_err());
    assert!((controller.get_probability("lab").unwrap() - 0.2).abs() < epsilon());
    assert!((controller.get_probability("xray").unwrap() - 0.4).abs() < epsilon());
    assert!((controller.get_probability("treatment").unwrap() - 0.6).abs() < epsilon());
}

#[test]
fn non_positive_average_time_leaves_table_unchanged() {
    let mut controller = seeded_controller(1);
    let before = controller.get_distribution_object("treatment").unwrap();
    assert!(matches!(
        controller.update_distribution("treatment", "normal", 0.0),
        Err(SimulationError::InvalidParameter { .. })
    ));
    assert!(matches!(
        controller.update_distribution("treatment", "normal", -1.0),
        Err(SimulationError::InvalidParameter { .. })
    ));
    assert_eq!(
        controller.get_distribution_object("treatment").unwrap(),
        before
    );
}

#[test]
fn closed_gates_skip_optional_stages() {
    let mut controller = seeded_controller(5);
    controller.set_probabilities(0.0, 0.0, 0.0).unwrap();
    let results = controller.run_simulation().unwrap().clone();
    assert_eq!(results.visits(Stage::Lab), 0);
    assert_eq!(results.visits(Stage::Xray), 0);
    assert_eq!(results.visits(Stage::Treatment), 0);
    assert_eq!(results.utilization(Stage::Lab), 0.0);
    assert_eq!(results.visits(Stage::Doctor), 100);
}

#[test]
fn open_gates_visit_every_stage() {
    let mut controller = seeded_controller(5);
    controller.set_probabilities(1.0, 1.0, 1.0).unwrap();
    let results = controller.run_simulation().unwrap().clone();
    Stage::SERVICE_STAGES
        .iter()
        .for_each(|stage| assert_eq!(results.visits(*stage), 100));
}

#[test]
fn gate_proportions_follow_probabilities() {
    let mut controller = seeded_controller(11);
    controller.set_probabilities(0.5, 0.3, 0.8).unwrap();
    controller
        .set_run_limits(RunLimits {
            max_patients: Some(4000),
            time_limit: None,
        })
        .unwrap();
    // Fast services keep the queues short
    ["sick", "lab", "xray", "treatment", "doctor"]
        .iter()
        .for_each(|event| {
            controller
                .update_distribution(event, "exponential", 0.1)
                .unwrap()
        });
    let results = controller.run_simulation().unwrap().clone();
    let patients = results.total_patients() as f64;
    let lab = results.visits(Stage::Lab) as f64 / patients;
    let xray = results.visits(Stage::Xray) as f64 / patients;
    let treatment = results.visits(Stage::Treatment) as f64 / patients;
    assert!((lab - 0.5).abs() < 0.05);
    assert!((xray - 0.3).abs() < 0.05);
    assert!((treatment - 0.8).abs() < 0.05);
}

#[test]
fn constant_times_produce_exact_waits() {
    let mut controller = seeded_controller(1);
    controller.set_probabilities(1.0, 0.0, 0.0).unwrap();
    controller
        .update_distribution("arrival", "constant", 100.0)
        .unwrap();
    ["sick", "lab", "doctor"].iter().for_each(|event| {
        controller
            .update_distribution(event, "deterministic", 2.0)
            .unwrap()
    });
    controller
        .set_run_limits(RunLimits {
            max_patients: Some(5),
            time_limit: None,
        })
        .unwrap();
    let results = controller.run_simulation().unwrap().clone();
    assert_eq!(results.total_patients(), 5);
    assert!((results.average_wait_time() - 6.0).abs() < epsilon());
    assert!((results.max_wait_time() - 6.0).abs() < epsilon());
    assert!(results.average_queue_time().abs() < epsilon());
    assert_eq!(
        controller.get_distribution_object("doctor").unwrap(),
        Distribution::new(DistributionKind::Constant, 2.0).unwrap()
    );
}

#[test]
fn time_limited_runs_report_incomplete_patients() {
    let mut controller = seeded_controller(9);
    controller
        .update_distribution("arrival", "constant", 1.0)
        .unwrap();
    controller
        .set_run_limits(RunLimits {
            max_patients: None,
            time_limit: Some(50.0),
        })
        .unwrap();
    let results = controller.run_simulation().unwrap().clone();
    assert!((results.end_time() - 50.0).abs() < epsilon());
    // Arrivals outpace a mean service time of 10, so patients are left over
    assert!(results.incomplete_patients() > 0);
}

#[test]
fn results_history_preserves_run_order() {
    let mut controller = seeded_controller(3);
    let averages: Vec<f64> = (0..4)
        .map(|run| {
            controller.set_seed(Some(100 + run));
            controller.run_simulation().unwrap().average_wait_time()
        })
        .collect();
    let history = controller.get_simulation_results();
    assert_eq!(history.len(), 4);
    history.iter().enumerate().for_each(|(index, results)| {
        assert_eq!(results.run_id(), index);
        assert_eq!(results.average_wait_time(), averages[index]);
    });
}

#[test]
fn failed_runs_do_not_publish_results() {
    let mut controller = seeded_controller(1);
    controller.run_simulation().unwrap();
    assert!(controller.set_servers(Stage::Doctor, 0).is_err());
    assert!(controller.set_servers(Stage::Done, 2).is_err());
    controller.set_servers(Stage::Doctor, 2).unwrap();
    controller.run_simulation().unwrap();
    assert_eq!(controller.get_simulation_results().len(), 2);
    assert_eq!(controller.config().servers.get(Stage::Doctor), 2);
}

#[test]
fn ci_half_width_for_average_waiting_time() {
    let mut controller = seeded_controller(0);
    (0..10).for_each(|run| {
        controller.set_seed(Some(run));
        controller.run_simulation().unwrap();
    });
    let summary = controller.wait_time_summary().unwrap();
    assert_eq!(summary.len(), 10);
    let mean = controller
        .get_simulation_results()
        .iter()
        .map(SimulationResults::average_wait_time)
        .sum::<f64>()
        / 10.0;
    assert!((summary.point_estimate_mean() - mean).abs() < epsilon());
    let interval = controller.wait_time_confidence_interval(0.05).unwrap();
    assert!(interval.contains(mean));
    assert!(interval.half_width() > 0.0);
    let wider = controller.wait_time_confidence_interval(0.01).unwrap();
    assert!(wider.half_width() > interval.half_width());
    assert!(matches!(
        controller.wait_time_confidence_interval(0.2),
        Err(SimulationError::UnsupportedSignificanceLevel(_))
    ));
}

#[test]
fn renderer_receives_stage_tags() {
    let mut controller = seeded_controller(8);
    let drawn = Rc::new(RefCell::new(Vec::new()));
    let sink = drawn.clone();
    controller
        .subscribe(Box::new(RendererSink::new(move |tag: &str| {
            sink.borrow_mut().push(tag.to_string())
        })))
        .unwrap();
    let log = TransitionLog::new();
    controller.subscribe(Box::new(log.clone())).unwrap();
    controller
        .set_run_limits(RunLimits {
            max_patients: Some(10),
            time_limit: None,
        })
        .unwrap();
    controller.run_simulation().unwrap();
    let drawn = drawn.borrow();
    assert_eq!(drawn.len(), log.len());
    assert_eq!(drawn.iter().filter(|tag| *tag == "sick").count(), 10);
    assert_eq!(drawn.iter().filter(|tag| *tag == "done").count(), 10);
    // Stage transition times never decrease
    let transitions = log.transitions();
    assert!(transitions
        .windows(2)
        .all(|pair| pair[0].time <= pair[1].time));
}

#[test]
fn configuration_deserialization_validates() {
    let config: SimulationConfig = serde_json::from_str(
        r#"{
            "probabilities": { "lab": 0.25, "xray": 0.5, "treatment": 1.0 },
            "distributions": {
                "arrival": { "kind": "uniform", "averageTime": 4.0 }
            },
            "servers": { "doctor": 3 },
            "limits": { "maxPatients": 20 },
            "seed": 7
        }"#,
    )
    .unwrap();
    assert_eq!(config.servers.get(Stage::Doctor), 3);
    assert_eq!(config.servers.get(Stage::Lab), 1);
    assert_eq!(config.limits.max_patients, Some(20));
    let mut controller = DataController::with_config(config).unwrap();
    assert_eq!(controller.get_distribution("arrival").unwrap(), "uniform");
    assert_eq!(controller.get_average_time("sick").unwrap(), 10.0);
    assert_eq!(controller.run_simulation().unwrap().total_patients(), 20);

    let invalid = serde_json::from_str::<SimulationConfig>(
        r#"{ "distributions": { "lab": { "kind": "normal", "averageTime": -2.0 } } }"#,
    );
    assert!(invalid.is_err());
}

#[test]
fn endless_time_limit_is_rejected() {
    let mut controller = seeded_controller(1);
    assert!(matches!(
        controller.set_run_limits(RunLimits {
            max_patients: None,
            time_limit: Some(f64::INFINITY),
        }),
        Err(SimulationError::InvalidRunLimits)
    ));
    assert_eq!(controller.config().limits, RunLimits::default());
    assert!(matches!(
        controller.update_distribution("lab", "uniform", 1.0e308),
        Err(SimulationError::InvalidParameter { .. })
    ));
}
