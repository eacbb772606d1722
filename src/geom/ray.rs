//! Ray casting infrastructure.
//!
//! Provides a Ray struct and ray-polygon intersection tests used by the
//! occlusion checks of the visibility pass.

use crate::{Point, Polygon, Vector};

/// A ray defined by an origin point and a direction vector.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Point,
    /// Direction vector (normalized at construction)
    pub direction: Vector,
}

impl Ray {
    /// Creates a new ray from origin point and direction vector.
    ///
    /// The direction vector is automatically normalized.
    pub fn new(origin: Point, direction: Vector) -> Option<Self> {
        let normalized = direction.normalize()?;
        Some(Self {
            origin,
            direction: normalized,
        })
    }

    /// Returns the point along the ray at parameter t.
    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// Calculates the intersection of this ray with a polygon.
    ///
    /// Returns `Some(t)` where `t` is the ray parameter of the hit,
    /// considering only intersections in front of the origin (t > eps to
    /// avoid self-intersection).
    pub fn intersect_polygon(&self, polygon: &Polygon) -> Option<f64> {
        let (a, b, c, d) = polygon.plane_coefficients();
        let plane_normal = Vector::new(a, b, c);

        // Ray parallel to the plane
        let denom = plane_normal.dot(&self.direction);
        if denom.abs() < 1e-10 {
            return None;
        }

        // Plane: a*x + b*y + c*z + d = 0; ray: P = origin + t * direction
        let origin_dot = a * self.origin.x + b * self.origin.y + c * self.origin.z + d;
        let t = -origin_dot / denom;

        if t < 1e-10 {
            return None;
        }

        let hit = self.point_at(t);
        if polygon.is_point_inside(hit) {
            Some(t)
        } else {
            None
        }
    }

    /// Returns the closest intersection (smallest positive t) with any of
    /// the given polygons, or None.
    pub fn intersect_polygons(&self, polygons: &[Polygon]) -> Option<(usize, f64)> {
        let mut closest: Option<(usize, f64)> = None;
        for (idx, polygon) in polygons.iter().enumerate() {
            if let Some(t) = self.intersect_polygon(polygon) {
                match closest {
                    None => closest = Some((idx, t)),
                    Some((_, best_t)) if t < best_t => closest = Some((idx, t)),
                    _ => {}
                }
            }
        }
        closest
    }
}
