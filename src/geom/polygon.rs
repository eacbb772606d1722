use anyhow::{bail, Result};

use crate::{Point, Vector};

/// Tolerance for on-plane and containment checks.
///
/// Looser than the geometric EPS: intersection points computed from the
/// plane equation carry a few ULPs of error.
const PLANE_TOL: f64 = 1e-6;

/// A planar polygon defined by an ordered boundary.
///
/// The normal follows the right-hand rule over the vertex order unless an
/// explicit normal is given at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    name: String,
    pts: Vec<Point>,
    /// Unit normal vector.
    pub vn: Vector,
}

impl Polygon {
    /// Creates a new polygon from its boundary vertices.
    ///
    /// If `normal` is given it overrides the orientation implied by the
    /// vertex order (it is normalized first). Fails for fewer than
    /// 3 vertices or a degenerate (collinear) boundary.
    pub fn new(name: &str, pts: Vec<Point>, normal: Option<Vector>) -> Result<Self> {
        if pts.len() < 3 {
            bail!(
                "Polygon '{}' needs at least 3 vertices, got {}",
                name,
                pts.len()
            );
        }

        let vn = match normal {
            Some(v) => match v.normalize() {
                Some(u) => u,
                None => bail!("Polygon '{}': zero-length normal", name),
            },
            None => match newell_normal(&pts) {
                Some(u) => u,
                None => bail!("Polygon '{}': degenerate boundary (no normal)", name),
            },
        };

        Ok(Self {
            name: name.to_string(),
            pts,
            vn,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    /// Polygon area from the Newell vector.
    pub fn area(&self) -> f64 {
        newell_vector(&self.pts).length() / 2.0
    }

    /// Average of the boundary vertices.
    pub fn centroid(&self) -> Point {
        let n = self.pts.len() as f64;
        let mut c = Point::new(0.0, 0.0, 0.0);
        for p in &self.pts {
            c.x += p.x / n;
            c.y += p.y / n;
            c.z += p.z / n;
        }
        c
    }

    /// Plane coefficients (a, b, c, d) such that a*x + b*y + c*z + d = 0.
    pub fn plane_coefficients(&self) -> (f64, f64, f64, f64) {
        let p0 = self.pts[0];
        let d = -(self.vn.dx * p0.x + self.vn.dy * p0.y + self.vn.dz * p0.z);
        (self.vn.dx, self.vn.dy, self.vn.dz, d)
    }

    /// Checks if a point lies inside the polygon.
    ///
    /// The point must be on the polygon's plane (within tolerance); the
    /// containment test is a crossing-number test on the boundary
    /// projected along the dominant axis of the normal. Points on the
    /// boundary may land on either side.
    pub fn is_point_inside(&self, ptest: Point) -> bool {
        let (a, b, c, d) = self.plane_coefficients();
        let dist = a * ptest.x + b * ptest.y + c * ptest.z + d;
        if dist.abs() > PLANE_TOL {
            return false;
        }

        let (u, v) = self.project_2d(ptest);
        let mut inside = false;
        let n = self.pts.len();
        let mut j = n - 1;
        for i in 0..n {
            let (ui, vi) = self.project_2d(self.pts[i]);
            let (uj, vj) = self.project_2d(self.pts[j]);
            if ((vi > v) != (vj > v)) && (u < (uj - ui) * (v - vi) / (vj - vi) + ui) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Projects a point to 2D by dropping the dominant axis of the normal.
    fn project_2d(&self, p: Point) -> (f64, f64) {
        let ax = self.vn.dx.abs();
        let ay = self.vn.dy.abs();
        let az = self.vn.dz.abs();
        if az >= ax && az >= ay {
            (p.x, p.y)
        } else if ax >= ay {
            (p.y, p.z)
        } else {
            (p.x, p.z)
        }
    }
}

/// Newell vector of an ordered boundary (normal direction, length = 2*area).
fn newell_vector(pts: &[Point]) -> Vector {
    let mut n = Vector::new(0.0, 0.0, 0.0);
    let len = pts.len();
    for i in 0..len {
        let p = pts[i];
        let q = pts[(i + 1) % len];
        n.dx += (p.y - q.y) * (p.z + q.z);
        n.dy += (p.z - q.z) * (p.x + q.x);
        n.dz += (p.x - q.x) * (p.y + q.y);
    }
    n
}

fn newell_normal(pts: &[Point]) -> Option<Vector> {
    newell_vector(pts).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn make_square() -> Result<Polygon> {
        let pts = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(2.0, 2.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        ];
        Polygon::new("square", pts, None)
    }

    #[test]
    fn test_normal_and_area() -> Result<()> {
        let poly = make_square()?;
        assert!(poly.vn.is_close(&Vector::new(0.0, 0.0, 1.0)));
        assert!((poly.area() - 4.0).abs() < 1e-10);
        Ok(())
    }

    #[test]
    fn test_explicit_normal_override() -> Result<()> {
        let pts = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(2.0, 2.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        ];
        let poly = Polygon::new("down", pts, Some(Vector::new(0.0, 0.0, -2.0)))?;
        assert!(poly.vn.is_close(&Vector::new(0.0, 0.0, -1.0)));
        Ok(())
    }

    #[test]
    fn test_too_few_vertices() {
        let pts = vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0)];
        assert!(Polygon::new("bad", pts, None).is_err());
    }

    #[test]
    fn test_point_inside() -> Result<()> {
        let poly = make_square()?;
        assert!(poly.is_point_inside(Point::new(1.0, 1.0, 0.0)));
        assert!(!poly.is_point_inside(Point::new(3.0, 1.0, 0.0)));
        // Off the plane
        assert!(!poly.is_point_inside(Point::new(1.0, 1.0, 0.5)));
        Ok(())
    }

    #[test]
    fn test_point_inside_vertical() -> Result<()> {
        let pts = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
            Point::new(0.0, 2.0, 2.0),
            Point::new(0.0, 0.0, 2.0),
        ];
        let poly = Polygon::new("wall", pts, None)?;
        assert!(poly.is_point_inside(Point::new(0.0, 1.0, 1.0)));
        assert!(!poly.is_point_inside(Point::new(0.0, 3.0, 1.0)));
        Ok(())
    }

    #[test]
    fn test_concave_containment() -> Result<()> {
        // L-shaped polygon in the XY plane
        let pts = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(2.0, 1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(1.0, 2.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        ];
        let poly = Polygon::new("ell", pts, None)?;
        assert!(poly.is_point_inside(Point::new(0.5, 1.5, 0.0)));
        // Inside the bbox but in the notch
        assert!(!poly.is_point_inside(Point::new(1.5, 1.5, 0.0)));
        Ok(())
    }

    #[test]
    fn test_centroid() -> Result<()> {
        let poly = make_square()?;
        assert!(poly.centroid().is_close(&Point::new(1.0, 1.0, 0.0)));
        Ok(())
    }
}
