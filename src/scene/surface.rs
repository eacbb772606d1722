//! Geometry input abstraction.
//!
//! CAD environments hand over study and context geometry in several
//! shapes. `Surface` folds them into one tagged type with two uniform
//! capabilities: enumerating constituent planar faces (for occlusion)
//! and subdividing into a sensor grid (for study meshes).

use crate::scene::study::SensorPoint;
use crate::{Mesh, Polygon};

/// One piece of input geometry.
#[derive(Debug, Clone)]
pub enum Surface {
    /// A single planar face.
    Polygon(Polygon),
    /// A triangle mesh carrying its own sensor resolution.
    Mesh(Mesh),
    /// A set of planar faces (e.g. a closed polyhedral shell).
    PolygonSet(Vec<Polygon>),
}

impl Surface {
    /// The constituent planar faces.
    pub fn faces(&self) -> Vec<Polygon> {
        match self {
            Surface::Polygon(p) => vec![p.clone()],
            Surface::Mesh(m) => (0..m.face_count()).map(|i| m.face_polygon(i)).collect(),
            Surface::PolygonSet(set) => set.clone(),
        }
    }

    /// Subdivides the surface into a sensor grid at the given cell size.
    ///
    /// Planar faces get a rectangular grid in their own plane; meshes
    /// already carry a grid and return one sensor per face centroid.
    pub fn sample_grid(&self, grid_size: f64) -> Vec<SensorPoint> {
        match self {
            Surface::Polygon(p) => polygon_grid(p, grid_size),
            Surface::Mesh(m) => (0..m.face_count())
                .map(|i| SensorPoint {
                    position: m.face_centroid(i),
                    normal: m.face_normal(i),
                })
                .collect(),
            Surface::PolygonSet(set) => set
                .iter()
                .flat_map(|p| polygon_grid(p, grid_size))
                .collect(),
        }
    }
}

/// Generates a sensor grid on a polygon with the given spacing.
///
/// Places sensors in a rectangular grid aligned with the polygon's local
/// coordinate system; only grid nodes inside the polygon are kept.
fn polygon_grid(polygon: &Polygon, spacing: f64) -> Vec<SensorPoint> {
    let vertices = polygon.vertices();
    if vertices.len() < 3 {
        return Vec::new();
    }

    let normal = polygon.vn;

    // Local coordinate system on the polygon plane
    let edge = vertices[1] - vertices[0];
    let u_axis = match edge.normalize() {
        Some(v) => v,
        None => return Vec::new(),
    };
    let v_axis = normal.cross(&u_axis);

    // Project vertices to local 2D coordinates
    let origin = vertices[0];
    let local_pts: Vec<(f64, f64)> = vertices
        .iter()
        .map(|p| {
            let d = *p - origin;
            (d.dot(&u_axis), d.dot(&v_axis))
        })
        .collect();

    let u_min = local_pts.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let u_max = local_pts
        .iter()
        .map(|p| p.0)
        .fold(f64::NEG_INFINITY, f64::max);
    let v_min = local_pts.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let v_max = local_pts
        .iter()
        .map(|p| p.1)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut sensors = Vec::new();
    let mut u = u_min + spacing * 0.5;
    while u <= u_max {
        let mut v = v_min + spacing * 0.5;
        while v <= v_max {
            let point = origin + u_axis * u + v_axis * v;
            if polygon.is_point_inside(point) {
                sensors.push(SensorPoint {
                    position: point,
                    normal,
                });
            }
            v += spacing;
        }
        u += spacing;
    }

    sensors
}
