//! The utilities module provides general capabilities that span the input
//! modeling, simulator, output analysis, and controller modules - error
//! types and panic reporting.

pub mod errors;

/// When the `console_error_panic_hook` feature is enabled, we can call the
/// `set_panic_hook` function at least once during initialization, and then
/// we will get better error messages if our code ever panics.
///
/// For more details see
/// <https://github.com/rustwasm/console_error_panic_hook#readme>
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Average times must be strictly positive, and finite even when doubled
/// for the upper bound of the uniform and triangular ranges.
pub(crate) fn is_valid_average_time(average_time: f64) -> bool {
    average_time > 0.0 && (2.0 * average_time).is_finite()
}

/// Probabilities must lie within [0, 1]; NaN is rejected.
pub(crate) fn is_valid_probability(probability: f64) -> bool {
    (0.0..=1.0).contains(&probability)
}
