//! Spatial acceleration for occlusion rays.

use std::collections::{HashMap, HashSet};

use crate::geom::bboxes::bounding_box;
use crate::{Point, Polygon, Vector};

/// A uniform voxel grid over the occluder polygons.
///
/// Each occupied cell stores the indices of the polygons whose bounding
/// boxes overlap it. Rays walk the grid with 3D-DDA and only test the
/// polygons registered along their path.
pub struct VoxelGrid {
    grid: HashMap<(i32, i32, i32), Vec<usize>>,
    step: f64,
}

impl VoxelGrid {
    pub fn new(polygons: &[Polygon], step: f64) -> Self {
        let mut grid: HashMap<(i32, i32, i32), Vec<usize>> = HashMap::new();

        for (idx, poly) in polygons.iter().enumerate() {
            let (pmin, pmax) = bounding_box(poly.vertices());
            let imin = (pmin.x / step).floor() as i32;
            let jmin = (pmin.y / step).floor() as i32;
            let kmin = (pmin.z / step).floor() as i32;
            let imax = (pmax.x / step).floor() as i32;
            let jmax = (pmax.y / step).floor() as i32;
            let kmax = (pmax.z / step).floor() as i32;

            for i in imin..=imax {
                for j in jmin..=jmax {
                    for k in kmin..=kmax {
                        grid.entry((i, j, k)).or_default().push(idx);
                    }
                }
            }
        }

        Self { grid, step }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Returns the indices of all polygons registered in cells the ray
    /// passes through, walking cell to cell (3D-DDA) up to `max_dist`.
    pub fn find_along_ray(&self, origin: Point, direction: Vector, max_dist: f64) -> Vec<usize> {
        if self.grid.is_empty() {
            return Vec::new();
        }

        let step = self.step;
        let mut i = (origin.x / step).floor() as i32;
        let mut j = (origin.y / step).floor() as i32;
        let mut k = (origin.z / step).floor() as i32;

        let (step_i, mut t_max_x, t_delta_x) = axis_setup(origin.x, direction.dx, step);
        let (step_j, mut t_max_y, t_delta_y) = axis_setup(origin.y, direction.dy, step);
        let (step_k, mut t_max_z, t_delta_z) = axis_setup(origin.z, direction.dz, step);

        let mut found = HashSet::new();
        let mut t = 0.0;

        while t <= max_dist {
            if let Some(indices) = self.grid.get(&(i, j, k)) {
                found.extend(indices.iter().copied());
            }

            // Advance to the closest cell boundary
            if t_max_x <= t_max_y && t_max_x <= t_max_z {
                t = t_max_x;
                t_max_x += t_delta_x;
                i += step_i;
            } else if t_max_y <= t_max_z {
                t = t_max_y;
                t_max_y += t_delta_y;
                j += step_j;
            } else {
                t = t_max_z;
                t_max_z += t_delta_z;
                k += step_k;
            }
        }

        let mut out: Vec<usize> = found.into_iter().collect();
        out.sort_unstable();
        out
    }
}

/// DDA setup for one axis: (cell step, distance to the first boundary,
/// distance between boundaries), all in ray parameter units.
fn axis_setup(origin: f64, dir: f64, step: f64) -> (i32, f64, f64) {
    if dir > 1e-12 {
        let cell = (origin / step).floor();
        let next_boundary = (cell + 1.0) * step;
        (1, (next_boundary - origin) / dir, step / dir)
    } else if dir < -1e-12 {
        let cell = (origin / step).floor();
        let boundary = cell * step;
        (-1, (boundary - origin) / dir, step / -dir)
    } else {
        (0, f64::INFINITY, f64::INFINITY)
    }
}
