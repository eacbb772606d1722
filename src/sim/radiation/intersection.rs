//! Visibility/intersection engine.
//!
//! For every sensor point, computes the cosine-weighted visibility of
//! every sky and ground patch direction against the context geometry.
//! The pass is embarrassingly parallel across sensor points: each worker
//! produces one independent matrix row against the shared read-only
//! scene.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use ndarray::Array2;
use rayon::prelude::*;

use crate::scene::study::StudyMesh;
use crate::scene::ContextScene;
use crate::sky::dome::{SkyDensity, SkyDome};
use crate::Vector;

/// Dense visibility weights: rows = sensor points, columns = 2P sky and
/// ground directions.
#[derive(Debug, Clone)]
pub struct IntersectionMatrix {
    pub density: SkyDensity,
    pub weights: Array2<f64>,
}

impl IntersectionMatrix {
    pub fn sensor_count(&self) -> usize {
        self.weights.nrows()
    }

    pub fn direction_count(&self) -> usize {
        self.weights.ncols()
    }
}

/// The 2P test directions: rotated sky dome vectors followed by their
/// ground-facing reversals. The rotation convention matches the sky
/// discretizer, so matrix columns line up with sky vector entries.
pub fn dome_and_ground_directions(density: SkyDensity, north: f64) -> Vec<Vector> {
    let sky_dirs = SkyDome::new(density).rotated_directions(north);
    let ground_dirs: Vec<Vector> = sky_dirs.iter().map(|v| v.reversed()).collect();
    sky_dirs.into_iter().chain(ground_dirs).collect()
}

/// Computes the intersection matrix between sensor points and the sky
/// dome.
///
/// Per (sensor, direction) pair the weight is 0 if the direction is
/// behind the surface (cos θ ≤ 0) or occluded by context geometry, and
/// cos θ otherwise. Sensors are offset along their normal by
/// `offset_distance` before casting, to avoid self-occlusion.
///
/// A timeout aborts the pass, discards all partial rows and reports an
/// error; cached artifacts held by the caller stay untouched.
pub fn intersection_matrix(
    study: &StudyMesh,
    context: &ContextScene,
    density: SkyDensity,
    north: f64,
    offset_distance: f64,
    timeout: Option<Duration>,
) -> Result<IntersectionMatrix> {
    ensure!(!study.is_empty(), "Study mesh has no sensor points");

    let directions = dome_and_ground_directions(density, north);
    let n_dirs = directions.len();

    let started = Instant::now();
    let timed_out = AtomicBool::new(false);

    let rows: Vec<Vec<f64>> = study
        .sensors()
        .par_iter()
        .map(|sensor| {
            if timed_out.load(Ordering::Relaxed) {
                return Vec::new();
            }
            if let Some(limit) = timeout {
                if started.elapsed() >= limit {
                    timed_out.store(true, Ordering::Relaxed);
                    return Vec::new();
                }
            }

            let origin = sensor.position + sensor.normal * offset_distance;
            directions
                .iter()
                .map(|dir| {
                    let cos_theta = sensor.normal.dot(dir);
                    if cos_theta <= 0.0 {
                        0.0 // patch is behind the surface
                    } else if context.occluded(origin, *dir) {
                        0.0
                    } else {
                        cos_theta
                    }
                })
                .collect()
        })
        .collect();

    if let Some(limit) = timeout {
        ensure!(
            !timed_out.load(Ordering::Relaxed),
            "Visibility pass exceeded the {limit:?} timeout; partial results discarded"
        );
    }

    let n_sensors = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let weights = Array2::from_shape_vec((n_sensors, n_dirs), flat)
        .expect("every sensor row has one weight per direction");

    Ok(IntersectionMatrix { density, weights })
}
