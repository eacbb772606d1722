pub mod study;
pub mod surface;
pub mod voxel;

use crate::geom::bboxes::bounding_box;
use crate::geom::ray::Ray;
use crate::{Point, Polygon, Surface, Vector};

use self::voxel::VoxelGrid;

/// Flattened context geometry for fast occlusion queries.
///
/// Context surfaces only block radiation; they are never evaluated
/// themselves. The polygons of all surfaces are flattened into one list
/// and indexed by a voxel grid.
pub struct ContextScene {
    polygons: Vec<Polygon>,
    voxel_grid: VoxelGrid,
    bbox_min: Point,
    bbox_max: Point,
}

impl ContextScene {
    /// Flattens context surfaces into an occlusion scene. An empty
    /// context is valid: nothing occludes.
    pub fn new(surfaces: &[Surface], voxel_size: f64) -> Self {
        let polygons: Vec<Polygon> = surfaces.iter().flat_map(|s| s.faces()).collect();

        let all_pts: Vec<Point> = polygons
            .iter()
            .flat_map(|p| p.vertices().iter().copied())
            .collect();
        let (bbox_min, bbox_max) = bounding_box(&all_pts);

        let voxel_grid = VoxelGrid::new(&polygons, voxel_size);

        Self {
            polygons,
            voxel_grid,
            bbox_min,
            bbox_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Checks whether an unbounded ray from `origin` along `direction`
    /// hits any context polygon.
    ///
    /// The search distance is bounded by the farthest scene bounding box
    /// corner, which handles origins both inside and outside the scene;
    /// beyond it nothing can intersect.
    pub fn occluded(&self, origin: Point, direction: Vector) -> bool {
        if self.polygons.is_empty() {
            return false;
        }
        let Some(ray) = Ray::new(origin, direction) else {
            return false;
        };

        let max_dist = self.max_search_distance(origin);
        let candidates = self.voxel_grid.find_along_ray(origin, ray.direction, max_dist);

        candidates
            .iter()
            .any(|&idx| ray.intersect_polygon(&self.polygons[idx]).is_some())
    }

    /// Distance from `origin` to the farthest bounding box corner, plus
    /// a small margin.
    fn max_search_distance(&self, origin: Point) -> f64 {
        let (lo, hi) = (self.bbox_min, self.bbox_max);
        let corners = [
            lo,
            hi,
            Point::new(lo.x, lo.y, hi.z),
            Point::new(lo.x, hi.y, lo.z),
            Point::new(hi.x, lo.y, lo.z),
            Point::new(lo.x, hi.y, hi.z),
            Point::new(hi.x, lo.y, hi.z),
            Point::new(hi.x, hi.y, lo.z),
        ];
        corners
            .iter()
            .map(|c| origin.distance(c))
            .fold(0.0_f64, f64::max)
            + 1.0
    }
}
