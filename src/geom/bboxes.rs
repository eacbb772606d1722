use crate::geom::EPS;
use crate::Point;

pub fn bounding_box(pts: &[Point]) -> (Point, Point) {
    let mut pmin = Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut pmax = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

    for p in pts {
        pmin.x = pmin.x.min(p.x);
        pmin.y = pmin.y.min(p.y);
        pmin.z = pmin.z.min(p.z);
        pmax.x = pmax.x.max(p.x);
        pmax.y = pmax.y.max(p.y);
        pmax.z = pmax.z.max(p.z);
    }

    (pmin, pmax)
}

/// Checks whether two bounding boxes overlap.
///
/// Takes min and max corners of each bbox.
/// Returns true if boxes overlap (including touching).
pub fn are_bboxes_overlapping(min1: Point, max1: Point, min2: Point, max2: Point) -> bool {
    // Boxes don't overlap if separated along any axis
    if max1.x < min2.x - EPS || min1.x > max2.x + EPS {
        return false;
    }
    if max1.y < min2.y - EPS || min1.y > max2.y + EPS {
        return false;
    }
    if max1.z < min2.z - EPS || min1.z > max2.z + EPS {
        return false;
    }
    true
}
