use thiserror::Error;

use crate::simulator::Stage;

/// `SimulationError` enumerates all possible errors returned by the hospital
/// simulation, from configuration validation through run execution.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a non-positive (or non-finite) average time
    #[error("Invalid parameter {name}: {value} (average times must be finite and greater than zero)")]
    InvalidParameter { name: String, value: f64 },

    /// Represents a routing probability outside of [0, 1]
    #[error("Invalid probability for the {decision} decision point: {value} (must be within [0, 1])")]
    InvalidProbability { decision: String, value: f64 },

    /// Represents a lookup of a decision point that does not exist
    #[error("Unknown decision type: {0}")]
    UnknownDecisionType(String),

    /// Represents a lookup of an event (activity) that does not exist
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Represents a distribution family that is not supported
    #[error("Unknown distribution kind: {0}")]
    UnknownDistributionKind(String),

    /// Represents a pop on an exhausted event scheduler
    #[error("The event scheduler is empty")]
    EmptyQueue,

    /// Represents an invalid state of event scheduling
    #[error("An event was scheduled at {scheduled}, before the current simulation time {now}")]
    EventScheduling { now: f64, scheduled: f64 },

    /// Represents patients left in the system after the scheduler ran dry
    #[error("The event scheduler was exhausted at time {time} with {} active patient(s): {patients:?}", .patients.len())]
    StrandedPatients {
        time: f64,
        patients: Vec<(u64, Stage)>,
    },

    /// Represents a run requested while another run is in progress
    #[error("A simulation run is already in progress")]
    Reentrancy,

    /// Represents a run configuration that would never terminate
    #[error("Either a patient limit or a time limit must be configured, and station capacities must be at least one")]
    InvalidRunLimits,

    /// Represents an invalid model state
    #[error("An invalid model state was encountered")]
    InvalidModelState,

    /// Represents an output analysis requested without enough runs
    #[error("Output analysis requires at least {required} run(s), but only {available} are available")]
    InsufficientRuns { required: usize, available: usize },

    /// Represents a confidence level that has no tabulated t-score
    #[error("Unsupported significance level: {0}")]
    UnsupportedSignificanceLevel(f64),

    /// Represents a failed conversion to num-traits Float
    #[error("Failed to convert to a Float value")]
    FloatConvError,

    /// Transparent serde_json errors
    #[error(transparent)]
    JSONError(#[from] serde_json::error::Error),

    /// Transparent serde_yaml errors
    #[error(transparent)]
    YAMLError(#[from] serde_yaml::Error),

    /// Transparent Exponential distribution errors
    #[error(transparent)]
    ExpError(#[from] rand_distr::ExpError),

    /// Transparent Normal distribution errors
    #[error(transparent)]
    NormalError(#[from] rand_distr::NormalError),

    /// Transparent Triangular distribution errors
    #[error(transparent)]
    TriangularError(#[from] rand_distr::TriangularError),

    /// Transparent Bernoulli distribution errors
    #[error(transparent)]
    BernoulliError(#[from] rand_distr::BernoulliError),
}
