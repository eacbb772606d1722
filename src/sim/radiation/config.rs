use std::time::Duration;

use crate::sky::dome::SkyDensity;
use crate::weather::period::RunPeriod;

/// Configuration for a radiation study.
#[derive(Debug, Clone)]
pub struct RadiationConfig {
    /// Hours of the year to integrate over.
    pub period: RunPeriod,
    /// Sky dome resolution.
    pub density: SkyDensity,
    /// North rotation in degrees (any real value; wrapped modulo 360
    /// when the session adopts the config).
    pub north: f64,
    /// Ground reflectance, 0-1.
    pub ground_reflectance: f64,
    /// Sensor offset along the normal in meters, to prevent
    /// self-occlusion by the originating surface.
    pub offset_distance: f64,
    /// Report mean irradiance (W/m^2) instead of cumulative radiation (kWh/m^2).
    pub avg_irradiance: bool,
    /// Compute the signed heating-benefit / cooling-harm metric.
    pub use_benefit: bool,
    /// Balance temperature for benefit mode in °C (clamped to 2-26).
    pub balance_temperature: f64,
    /// Voxel size for the occlusion acceleration grid.
    pub voxel_size: f64,
    /// Optional wall-clock bound for the visibility pass.
    pub timeout: Option<Duration>,
}

impl RadiationConfig {
    pub fn new() -> Self {
        Self {
            period: RunPeriod::annual(),
            density: SkyDensity::Tregenza,
            north: 0.0,
            ground_reflectance: 0.2,
            offset_distance: 0.1,
            avg_irradiance: false,
            use_benefit: false,
            balance_temperature: 15.0,
            voxel_size: 1.0,
            timeout: None,
        }
    }

    /// Returns a copy with all bounded inputs forced into range.
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.north = config.north.rem_euclid(360.0);
        config.ground_reflectance = config.ground_reflectance.clamp(0.0, 1.0);
        config.offset_distance = config.offset_distance.max(0.0);
        config.balance_temperature = config.balance_temperature.clamp(2.0, 26.0);
        config
    }
}

impl Default for RadiationConfig {
    fn default() -> Self {
        Self::new()
    }
}
