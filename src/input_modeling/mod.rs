//! The input modeling module provides a foundation for the stochastic
//! behavior of the hospital - duration distributions for arrivals and each
//! stage of care, routing probabilities for the decision points, and a
//! structure around random number generation.

pub mod distribution;
pub mod dynamic_rng;
pub mod probability;

pub use distribution::{
    Activity, Distribution, DistributionKind, DistributionTable, DEFAULT_AVERAGE_TIME,
};
pub use dynamic_rng::{dyn_rng, seeded_rng, DynRng};
pub use probability::{DecisionPoint, ProbabilityModel};
