//! Radiation combiner: intersection matrix × sky vector.

use crate::sim::radiation::intersection::IntersectionMatrix;
use crate::sky::matrix::SkyVector;

/// Combines per-sensor visibility weights with per-patch sky values:
/// `result[i] = Σ_j weights[i][j] · sky[j]`.
///
/// Density or length mismatches are internal invariant violations and
/// fail loudly; they are never surfaced as recoverable errors.
pub fn combine(matrix: &IntersectionMatrix, sky: &SkyVector) -> Vec<f64> {
    assert_eq!(
        matrix.density, sky.density,
        "sky vector and intersection matrix were built for different densities"
    );
    assert_eq!(
        matrix.direction_count(),
        sky.values.len(),
        "intersection matrix columns must match the sky vector length"
    );

    matrix.weights.dot(&sky.values).to_vec()
}
