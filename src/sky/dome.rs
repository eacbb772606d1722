//! Fixed hemispherical sky subdivisions.
//!
//! Two patch densities are supported: the Tregenza dome (145 patches)
//! and its Reinhart subdivision at MF 2 (577 patches). Patch layout is a
//! fixed table: rows of equal-count patches in equal-altitude bands,
//! closed by a single zenith cap.

use crate::Vector;

/// Tregenza row patch counts, bottom band first (12° bands, 84° cap).
const TREGENZA_ROWS: [usize; 7] = [30, 30, 24, 24, 18, 12, 6];

/// Reinhart (MF 2) row patch counts (6° bands, 84° cap).
const REINHART_ROWS: [usize; 14] = [60, 60, 60, 60, 48, 48, 48, 48, 36, 36, 24, 24, 12, 12];

/// Sky dome resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyDensity {
    /// 145 patches.
    Tregenza,
    /// 577 patches.
    Reinhart,
}

impl SkyDensity {
    /// Number of sky patches for this density.
    pub fn patch_count(&self) -> usize {
        match self {
            SkyDensity::Tregenza => TREGENZA_ROWS.iter().sum::<usize>() + 1,
            SkyDensity::Reinhart => REINHART_ROWS.iter().sum::<usize>() + 1,
        }
    }

    fn rows(&self) -> &'static [usize] {
        match self {
            SkyDensity::Tregenza => &TREGENZA_ROWS,
            SkyDensity::Reinhart => &REINHART_ROWS,
        }
    }

    /// Altitude band height in degrees (the cap sits above the last band).
    fn band_height(&self) -> f64 {
        match self {
            SkyDensity::Tregenza => 12.0,
            SkyDensity::Reinhart => 6.0,
        }
    }
}

/// A discretized sky hemisphere: per-patch unit directions and solid
/// angles in canonical order (bottom row first, zenith cap last; within a
/// row, azimuth from north clockwise).
#[derive(Debug, Clone)]
pub struct SkyDome {
    density: SkyDensity,
    directions: Vec<Vector>,
    solid_angles: Vec<f64>,
}

impl SkyDome {
    pub fn new(density: SkyDensity) -> Self {
        let rows = density.rows();
        let band = density.band_height();
        let count = density.patch_count();

        let mut directions = Vec::with_capacity(count);
        let mut solid_angles = Vec::with_capacity(count);

        for (r, &n) in rows.iter().enumerate() {
            let alt0 = (r as f64 * band).to_radians();
            let alt1 = ((r as f64 + 1.0) * band).to_radians();
            let alt_center = (alt0 + alt1) / 2.0;
            let omega = 2.0 * std::f64::consts::PI * (alt1.sin() - alt0.sin()) / n as f64;

            for i in 0..n {
                // Azimuth from north (=+Y), clockwise toward east (=+X)
                let az = (i as f64 * 360.0 / n as f64).to_radians();
                directions.push(Vector::new(
                    alt_center.cos() * az.sin(),
                    alt_center.cos() * az.cos(),
                    alt_center.sin(),
                ));
                solid_angles.push(omega);
            }
        }

        // Zenith cap
        let cap_alt0 = (rows.len() as f64 * band).to_radians();
        directions.push(Vector::new(0.0, 0.0, 1.0));
        solid_angles.push(2.0 * std::f64::consts::PI * (1.0 - cap_alt0.sin()));

        Self {
            density,
            directions,
            solid_angles,
        }
    }

    pub fn density(&self) -> SkyDensity {
        self.density
    }

    pub fn patch_count(&self) -> usize {
        self.directions.len()
    }

    /// Unit direction toward each patch center.
    pub fn directions(&self) -> &[Vector] {
        &self.directions
    }

    /// Solid angle of each patch in steradians.
    pub fn solid_angles(&self) -> &[f64] {
        &self.solid_angles
    }

    /// Patch directions rotated about the vertical axis by `north`
    /// degrees (counterclockwise in plan, the same convention the
    /// visibility pass uses).
    pub fn rotated_directions(&self, north: f64) -> Vec<Vector> {
        if north == 0.0 {
            return self.directions.clone();
        }
        let phi = north.to_radians();
        self.directions.iter().map(|v| v.rotate_z(phi)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_counts() {
        assert_eq!(SkyDensity::Tregenza.patch_count(), 145);
        assert_eq!(SkyDensity::Reinhart.patch_count(), 577);
        assert_eq!(SkyDome::new(SkyDensity::Tregenza).patch_count(), 145);
        assert_eq!(SkyDome::new(SkyDensity::Reinhart).patch_count(), 577);
    }

    #[test]
    fn test_solid_angles_cover_hemisphere() {
        for density in [SkyDensity::Tregenza, SkyDensity::Reinhart] {
            let dome = SkyDome::new(density);
            let total: f64 = dome.solid_angles().iter().sum();
            let hemisphere = 2.0 * std::f64::consts::PI;
            assert!(
                (total - hemisphere).abs() < 1e-9,
                "Solid angles should sum to 2π for {density:?}, got {total}"
            );
        }
    }

    #[test]
    fn test_directions_are_unit_and_upward() {
        let dome = SkyDome::new(SkyDensity::Tregenza);
        for (i, dir) in dome.directions().iter().enumerate() {
            assert!(
                (dir.length() - 1.0).abs() < 1e-12,
                "Patch {i} direction is not unit length"
            );
            assert!(dir.dz > 0.0, "Patch {i} points below the horizon");
        }
    }

    #[test]
    fn test_first_patch_points_north() {
        let dome = SkyDome::new(SkyDensity::Tregenza);
        let first = dome.directions()[0];
        assert!(first.dx.abs() < 1e-12);
        assert!(first.dy > 0.0, "First patch azimuth should be north (+Y)");
    }

    #[test]
    fn test_last_patch_is_zenith() {
        for density in [SkyDensity::Tregenza, SkyDensity::Reinhart] {
            let dome = SkyDome::new(density);
            let last = dome.directions().last().unwrap();
            assert!(last.is_close(&Vector::new(0.0, 0.0, 1.0)));
        }
    }

    #[test]
    fn test_rotation_roundtrip() {
        let dome = SkyDome::new(SkyDensity::Tregenza);
        let rotated = dome.rotated_directions(90.0);
        // The north-facing first patch rotates into the western half
        assert!(rotated[0].dy.abs() < 1e-9);
        assert!(rotated[0].dx < -0.9);
        assert!((rotated[0].dz - dome.directions()[0].dz).abs() < 1e-12);
        // Zero rotation is exact identity
        let same = dome.rotated_directions(0.0);
        assert_eq!(same[0], dome.directions()[0]);
    }
}
