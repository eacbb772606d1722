//! Radiation results and the metadata external consumers need to
//! visualize them (legend bounds, unit label, signedness).

use serde::Serialize;

use crate::sky::matrix::SkyVector;
use crate::vecutils;

/// One radiation scalar per sensor point, plus display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct RadiationResult {
    /// One value per sensor point.
    pub values: Vec<f64>,
    /// Unit label ("kWh/m2" or "W/m2").
    pub unit: String,
    /// True for benefit/harm results, whose values may be negative.
    pub signed: bool,
    /// Smallest value (legend lower bound).
    pub min: f64,
    /// Largest value (legend upper bound).
    pub max: f64,
}

impl RadiationResult {
    /// Packs combined values with the metadata of the sky they came from.
    pub fn new(values: Vec<f64>, sky: &SkyVector) -> Self {
        assert!(!values.is_empty(), "a radiation result needs sensor values");
        let min = vecutils::min(&values);
        let max = vecutils::max(&values);
        Self {
            values,
            unit: sky.unit().to_string(),
            signed: sky.signed,
            min,
            max,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
