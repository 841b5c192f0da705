//! Two-sided Student's t critical values, t(1 - alpha/2, df).  Degrees of
//! freedom above the table use the normal approximation.

use num_traits::Float;

use crate::utils::errors::SimulationError;

const T_90: [f64; 30] = [
    6.314, 2.920, 2.353, 2.132, 2.015, 1.943, 1.895, 1.860, 1.833, 1.812, 1.796, 1.782, 1.771,
    1.761, 1.753, 1.746, 1.740, 1.734, 1.729, 1.725, 1.721, 1.717, 1.714, 1.711, 1.708, 1.706,
    1.703, 1.701, 1.699, 1.697,
];
const T_95: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];
const T_99: [f64; 30] = [
    63.657, 9.925, 5.841, 4.604, 4.032, 3.707, 3.499, 3.355, 3.250, 3.169, 3.106, 3.055, 3.012,
    2.977, 2.947, 2.921, 2.898, 2.878, 2.861, 2.845, 2.831, 2.819, 2.807, 2.797, 2.787, 2.779,
    2.771, 2.763, 2.756, 2.750,
];

fn table(alpha: f64) -> Option<(&'static [f64; 30], f64)> {
    let matches = |target: f64| (alpha - target).abs() < 1.0e-9;
    if matches(0.1) {
        Some((&T_90, 1.645))
    } else if matches(0.05) {
        Some((&T_95, 1.960))
    } else if matches(0.01) {
        Some((&T_99, 2.576))
    } else {
        None
    }
}

pub fn t_score<T: Float>(alpha: T, degrees_of_freedom: usize) -> Result<T, SimulationError> {
    let alpha = alpha.to_f64().ok_or(SimulationError::FloatConvError)?;
    let (scores, normal) =
        table(alpha).ok_or(SimulationError::UnsupportedSignificanceLevel(alpha))?;
    let score = match degrees_of_freedom {
        0 => {
            return Err(SimulationError::InsufficientRuns {
                required: 2,
                available: 1,
            })
        }
        df if df <= scores.len() => scores[df - 1],
        _ => normal,
    };
    T::from(score).ok_or(SimulationError::FloatConvError)
}
