use anyhow::{bail, Result};

use crate::{Point, Polygon, Vector};

/// An indexed triangle mesh.
///
/// Used both for meshed context geometry and for study surfaces that
/// already carry a sensor grid (one sensor per face, at the face
/// centroid, oriented along the face normal).
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point>,
    faces: Vec<(usize, usize, usize)>,
    normals: Vec<Vector>,
}

impl Mesh {
    /// Creates a mesh from vertices and triangle indices.
    ///
    /// Fails on out-of-range indices or degenerate (zero-area) faces.
    pub fn new(vertices: Vec<Point>, faces: Vec<(usize, usize, usize)>) -> Result<Self> {
        let n = vertices.len();
        let mut normals = Vec::with_capacity(faces.len());

        for (i, &(a, b, c)) in faces.iter().enumerate() {
            if a >= n || b >= n || c >= n {
                bail!("Mesh face {i} references a vertex out of range (0..{n})");
            }
            match Vector::normal(vertices[a], vertices[b], vertices[c]) {
                Some(vn) => normals.push(vn),
                None => bail!("Mesh face {i} is degenerate (collinear vertices)"),
            }
        }

        Ok(Self {
            vertices,
            faces,
            normals,
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Centroid of face `i`.
    pub fn face_centroid(&self, i: usize) -> Point {
        let (a, b, c) = self.faces[i];
        let (pa, pb, pc) = (self.vertices[a], self.vertices[b], self.vertices[c]);
        Point::new(
            (pa.x + pb.x + pc.x) / 3.0,
            (pa.y + pb.y + pc.y) / 3.0,
            (pa.z + pb.z + pc.z) / 3.0,
        )
    }

    /// Unit normal of face `i` (right-hand rule over the vertex order).
    pub fn face_normal(&self, i: usize) -> Vector {
        self.normals[i]
    }

    /// Area of face `i`.
    pub fn face_area(&self, i: usize) -> f64 {
        let (a, b, c) = self.faces[i];
        let v1 = self.vertices[b] - self.vertices[a];
        let v2 = self.vertices[c] - self.vertices[a];
        v1.cross(&v2).length() / 2.0
    }

    /// Converts face `i` into a standalone triangular polygon.
    pub fn face_polygon(&self, i: usize) -> Polygon {
        let (a, b, c) = self.faces[i];
        let pts = vec![self.vertices[a], self.vertices[b], self.vertices[c]];
        Polygon::new(&format!("face_{i}"), pts, Some(self.normals[i]))
            .expect("mesh faces are validated at construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_quad_mesh() -> Result<Mesh> {
        // Two triangles forming a unit square at z=0
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        Mesh::new(vertices, vec![(0, 1, 2), (0, 2, 3)])
    }

    #[test]
    fn test_mesh_faces() -> Result<()> {
        let mesh = make_quad_mesh()?;
        assert_eq!(mesh.face_count(), 2);

        let c = mesh.face_centroid(0);
        assert!(c.is_close(&Point::new(2.0 / 3.0, 1.0 / 3.0, 0.0)));

        let vn = mesh.face_normal(0);
        assert!(vn.is_close(&Vector::new(0.0, 0.0, 1.0)));

        let total_area: f64 = (0..mesh.face_count()).map(|i| mesh.face_area(i)).sum();
        assert!((total_area - 1.0).abs() < 1e-10);
        Ok(())
    }

    #[test]
    fn test_mesh_invalid_index() {
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let result = Mesh::new(vertices, vec![(0, 1, 5)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mesh_degenerate_face() {
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
        ];
        let result = Mesh::new(vertices, vec![(0, 1, 2)]);
        assert!(result.is_err(), "Collinear face should be rejected");
    }

    #[test]
    fn test_face_polygon() -> Result<()> {
        let mesh = make_quad_mesh()?;
        let poly = mesh.face_polygon(1);
        assert_eq!(poly.vertices().len(), 3);
        assert!(poly.vn.is_close(&Vector::new(0.0, 0.0, 1.0)));
        Ok(())
    }
}
