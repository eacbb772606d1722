//! Study meshes: the sensor points a radiation study evaluates.

use anyhow::{bail, Result};

use crate::{Mesh, Point, Surface, Vector};

/// A single sensor point on a study surface.
#[derive(Debug, Clone, Copy)]
pub struct SensorPoint {
    pub position: Point,
    /// Outward unit normal of the surface at the sensor.
    pub normal: Vector,
}

/// The set of sensor points of one simulation run, immutable once built.
#[derive(Debug, Clone)]
pub struct StudyMesh {
    sensors: Vec<SensorPoint>,
}

impl StudyMesh {
    /// Builds a study mesh by subdividing surfaces into sensor grids at
    /// the given grid size.
    ///
    /// Fails if no surfaces are given, or if the grid size is too coarse
    /// to place a single sensor on any of them (the caller should lower
    /// the grid size and retry).
    pub fn from_surfaces(surfaces: &[Surface], grid_size: f64) -> Result<Self> {
        if surfaces.is_empty() {
            bail!("Study geometry is empty");
        }
        if grid_size <= 0.0 {
            bail!("Grid size must be positive, got {grid_size}");
        }

        let mut sensors = Vec::new();
        for surface in surfaces {
            sensors.extend(surface.sample_grid(grid_size));
        }

        if sensors.is_empty() {
            bail!(
                "Grid size {grid_size} is too coarse to subdivide the study geometry; \
                 lower the grid size and retry"
            );
        }

        Ok(Self { sensors })
    }

    /// Takes the sensor grid directly from a mesh's face centroids and
    /// normals (precomputed grids on imported models).
    pub fn from_mesh(mesh: &Mesh) -> Result<Self> {
        if mesh.face_count() == 0 {
            bail!("Study mesh has no faces");
        }
        let sensors = (0..mesh.face_count())
            .map(|i| SensorPoint {
                position: mesh.face_centroid(i),
                normal: mesh.face_normal(i),
            })
            .collect();
        Ok(Self { sensors })
    }

    /// Builds a study mesh from explicit sensor points.
    pub fn from_sensors(sensors: Vec<SensorPoint>) -> Result<Self> {
        if sensors.is_empty() {
            bail!("Study mesh needs at least one sensor point");
        }
        Ok(Self { sensors })
    }

    pub fn sensors(&self) -> &[SensorPoint] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Polygon;

    fn floor_surface(size: f64) -> Surface {
        let pts = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(size, 0.0, 0.0),
            Point::new(size, size, 0.0),
            Point::new(0.0, size, 0.0),
        ];
        Surface::Polygon(Polygon::new("floor", pts, None).unwrap())
    }

    #[test]
    fn test_from_surfaces() -> Result<()> {
        let study = StudyMesh::from_surfaces(&[floor_surface(2.0)], 0.5)?;
        // 0.5 spacing on a 2x2 face: roughly a 4x4 grid
        assert!(
            study.len() >= 9,
            "Expected a dense sensor grid, got {}",
            study.len()
        );
        for s in study.sensors() {
            assert!((s.position.z - 0.0).abs() < 1e-9);
            assert!(s.normal.is_close(&Vector::new(0.0, 0.0, 1.0)));
        }
        Ok(())
    }

    #[test]
    fn test_empty_geometry() {
        let err = StudyMesh::from_surfaces(&[], 0.5).unwrap_err();
        assert!(format!("{err}").contains("empty"));
    }

    #[test]
    fn test_degenerate_grid_size() {
        // A 1x1 face cannot host a sensor at 10 m spacing
        let err = StudyMesh::from_surfaces(&[floor_surface(1.0)], 10.0).unwrap_err();
        assert!(
            format!("{err}").contains("too coarse"),
            "Expected a degenerate-meshing failure"
        );
    }

    #[test]
    fn test_from_mesh_uses_centroids() -> Result<()> {
        let vertices = vec![
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(0.0, 1.0, 1.0),
        ];
        let mesh = Mesh::new(vertices, vec![(0, 1, 2)])?;
        let study = StudyMesh::from_mesh(&mesh)?;
        assert_eq!(study.len(), 1);
        assert!(study.sensors()[0]
            .position
            .is_close(&mesh.face_centroid(0)));
        Ok(())
    }
}
