mod test_features;
mod test_parser;
mod test_similarity;
mod test_verify;

use crate::features::N_FEATURES;

/// Tolerance for float comparisons against hand-computed values.
pub const EPS: f64 = 1e-9;

pub const ZERO_COUNTS: [f64; N_FEATURES] = [0.0; N_FEATURES];
