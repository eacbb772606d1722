//! Simulation orchestrator.
//!
//! Holds the three inputs (weather, study mesh, context geometry) and
//! the three cached artifacts (sky vector, intersection matrix,
//! radiation result). Every input setter invalidates exactly the
//! artifacts that depend on it; `compute()` rebuilds only what is
//! absent. Changing only the ground reflectance therefore reruns the
//! cheap sky discretization but never the visibility pass.

use anyhow::Result;

use crate::scene::study::StudyMesh;
use crate::scene::ContextScene;
use crate::sim::radiation::combine::combine;
use crate::sim::radiation::config::RadiationConfig;
use crate::sim::radiation::intersection::{intersection_matrix, IntersectionMatrix};
use crate::sim::radiation::result::RadiationResult;
use crate::sky::dome::SkyDensity;
use crate::sky::matrix::{benefit_sky, cumulative_sky, SkyOptions, SkyVector};
use crate::weather::period::RunPeriod;
use crate::weather::WeatherSeries;
use crate::Surface;

/// A radiation study session with cached intermediate artifacts.
pub struct RadiationSession {
    config: RadiationConfig,

    // Inputs
    weather: Option<WeatherSeries>,
    study: Option<StudyMesh>,
    context: Option<Vec<Surface>>,

    // Cached artifacts
    sky_vector: Option<SkyVector>,
    intersection: Option<IntersectionMatrix>,
    result: Option<RadiationResult>,

    // Instrumentation: how many times each expensive pass actually ran
    sky_passes: usize,
    visibility_passes: usize,
}

impl RadiationSession {
    pub fn new(config: RadiationConfig) -> Self {
        Self {
            config: config.normalized(),
            weather: None,
            study: None,
            context: None,
            sky_vector: None,
            intersection: None,
            result: None,
            sky_passes: 0,
            visibility_passes: 0,
        }
    }

    pub fn config(&self) -> &RadiationConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Input setters and their invalidations
    // ---------------------------------------------------------------

    pub fn set_weather(&mut self, weather: WeatherSeries) {
        self.weather = Some(weather);
        self.invalidate_sky();
    }

    pub fn set_study_mesh(&mut self, study: StudyMesh) {
        self.study = Some(study);
        self.invalidate_intersection();
    }

    /// Context surfaces used for occlusion. An empty vector is valid
    /// (nothing occludes); an absent context makes `compute()` a no-op.
    pub fn set_context(&mut self, context: Vec<Surface>) {
        self.context = Some(context);
        self.invalidate_intersection();
    }

    pub fn set_period(&mut self, period: RunPeriod) {
        if self.config.period != period {
            self.config.period = period;
            self.invalidate_sky();
        }
    }

    pub fn set_density(&mut self, density: SkyDensity) {
        if self.config.density != density {
            self.config.density = density;
            self.invalidate_sky();
            self.invalidate_intersection();
        }
    }

    /// North rotation in degrees; any real value, wrapped modulo 360.
    pub fn set_north(&mut self, north: f64) {
        let north = north.rem_euclid(360.0);
        if self.config.north != north {
            self.config.north = north;
            self.invalidate_sky();
            self.invalidate_intersection();
        }
    }

    pub fn set_ground_reflectance(&mut self, reflectance: f64) {
        let reflectance = reflectance.clamp(0.0, 1.0);
        if self.config.ground_reflectance != reflectance {
            self.config.ground_reflectance = reflectance;
            self.invalidate_sky();
        }
    }

    pub fn set_offset_distance(&mut self, offset: f64) {
        let offset = offset.max(0.0);
        if self.config.offset_distance != offset {
            self.config.offset_distance = offset;
            self.invalidate_intersection();
        }
    }

    pub fn set_avg_irradiance(&mut self, avg: bool) {
        if self.config.avg_irradiance != avg {
            self.config.avg_irradiance = avg;
            self.invalidate_sky();
        }
    }

    pub fn set_use_benefit(&mut self, use_benefit: bool) {
        if self.config.use_benefit != use_benefit {
            self.config.use_benefit = use_benefit;
            self.invalidate_sky();
        }
    }

    /// Balance temperature for benefit mode, clamped to 2-26 °C.
    pub fn set_balance_temperature(&mut self, temperature: f64) {
        let temperature = temperature.clamp(2.0, 26.0);
        if self.config.balance_temperature != temperature {
            self.config.balance_temperature = temperature;
            self.invalidate_sky();
        }
    }

    fn invalidate_sky(&mut self) {
        self.sky_vector = None;
        self.result = None;
    }

    fn invalidate_intersection(&mut self) {
        self.intersection = None;
        self.result = None;
    }

    // ---------------------------------------------------------------
    // Computation
    // ---------------------------------------------------------------

    /// Runs the study.
    ///
    /// Returns `Ok(None)` without doing anything while any required
    /// input (weather, study mesh, context) is absent. Otherwise
    /// recomputes only the artifacts that are missing and returns the
    /// radiation result. A failure leaves previously cached artifacts
    /// untouched.
    pub fn compute(&mut self) -> Result<Option<&RadiationResult>> {
        if self.weather.is_none() || self.study.is_none() || self.context.is_none() {
            return Ok(None);
        }

        if self.sky_vector.is_none() {
            let weather = self.weather.as_ref().expect("checked above");
            let opts = SkyOptions {
                period: self.config.period,
                density: self.config.density,
                north: self.config.north,
                ground_reflectance: self.config.ground_reflectance,
                avg_irradiance: self.config.avg_irradiance,
            };
            let sky = if self.config.use_benefit {
                benefit_sky(weather, &opts, self.config.balance_temperature)?
            } else {
                cumulative_sky(weather, &opts)?
            };
            self.sky_passes += 1;
            self.sky_vector = Some(sky);
        }

        if self.intersection.is_none() {
            let study = self.study.as_ref().expect("checked above");
            let surfaces = self.context.as_ref().expect("checked above");
            // Follow the density of the active sky vector
            let density = self
                .sky_vector
                .as_ref()
                .map(|s| s.density)
                .unwrap_or(self.config.density);
            let scene = ContextScene::new(surfaces, self.config.voxel_size);
            let matrix = intersection_matrix(
                study,
                &scene,
                density,
                self.config.north,
                self.config.offset_distance,
                self.config.timeout,
            )?;
            self.visibility_passes += 1;
            self.intersection = Some(matrix);
        }

        if self.result.is_none() {
            let sky = self.sky_vector.as_ref().expect("computed above");
            let matrix = self.intersection.as_ref().expect("computed above");
            let values = combine(matrix, sky);
            self.result = Some(RadiationResult::new(values, sky));
        }

        Ok(self.result.as_ref())
    }

    // ---------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------

    pub fn result(&self) -> Option<&RadiationResult> {
        self.result.as_ref()
    }

    pub fn sky_vector(&self) -> Option<&SkyVector> {
        self.sky_vector.as_ref()
    }

    pub fn intersection(&self) -> Option<&IntersectionMatrix> {
        self.intersection.as_ref()
    }

    /// How many times the sky discretization has actually run.
    pub fn sky_passes(&self) -> usize {
        self.sky_passes
    }

    /// How many times the visibility pass has actually run.
    pub fn visibility_passes(&self) -> usize {
        self.visibility_passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::study::SensorPoint;
    use crate::{Point, Vector};

    fn ready_session() -> RadiationSession {
        let mut session = RadiationSession::new(RadiationConfig::new());
        session.set_weather(WeatherSeries::synthetic("Test", 45.0, 12.0, 10.0));
        session.set_study_mesh(
            StudyMesh::from_sensors(vec![SensorPoint {
                position: Point::new(0.0, 0.0, 0.0),
                normal: Vector::new(0.0, 0.0, 1.0),
            }])
            .unwrap(),
        );
        session.set_context(vec![]);
        session
    }

    #[test]
    fn test_noop_without_inputs() -> Result<()> {
        let mut session = RadiationSession::new(RadiationConfig::new());
        assert!(session.compute()?.is_none());
        assert_eq!(session.sky_passes(), 0);
        assert_eq!(session.visibility_passes(), 0);

        // Weather alone is not enough
        session.set_weather(WeatherSeries::synthetic("Test", 45.0, 12.0, 10.0));
        assert!(session.compute()?.is_none());
        assert_eq!(session.visibility_passes(), 0);
        Ok(())
    }

    #[test]
    fn test_compute_and_idempotence() -> Result<()> {
        let mut session = ready_session();
        let first = session.compute()?.expect("all inputs present").values.clone();
        assert_eq!(session.sky_passes(), 1);
        assert_eq!(session.visibility_passes(), 1);

        // A second trigger with no input changes reuses every artifact
        let second = session.compute()?.expect("still present").values.clone();
        assert_eq!(session.sky_passes(), 1, "Sky must not recompute");
        assert_eq!(session.visibility_passes(), 1, "Visibility must not recompute");
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_ground_reflectance_change_skips_visibility() -> Result<()> {
        let mut session = ready_session();
        session.compute()?;
        assert_eq!(session.visibility_passes(), 1);

        session.set_ground_reflectance(0.3);
        assert!(session.result().is_none(), "Result must be invalidated");
        session.compute()?;
        assert_eq!(session.sky_passes(), 2, "Sky must recompute");
        assert_eq!(
            session.visibility_passes(),
            1,
            "Visibility must be reused from cache"
        );
        Ok(())
    }

    #[test]
    fn test_density_change_invalidates_both() -> Result<()> {
        let mut session = ready_session();
        session.compute()?;
        session.set_density(SkyDensity::Reinhart);
        session.compute()?;
        assert_eq!(session.sky_passes(), 2);
        assert_eq!(session.visibility_passes(), 2);

        let matrix = session.intersection().unwrap();
        assert_eq!(matrix.direction_count(), 2 * 577);
        Ok(())
    }

    #[test]
    fn test_setting_same_value_does_not_invalidate() -> Result<()> {
        let mut session = ready_session();
        session.compute()?;
        session.set_north(0.0);
        session.set_ground_reflectance(0.2);
        assert!(session.result().is_some(), "Unchanged inputs keep the cache");
        Ok(())
    }

    #[test]
    fn test_north_wraps_modulo_360() -> Result<()> {
        let mut session = ready_session();
        session.compute()?;
        // A full turn is the same orientation: nothing to invalidate
        session.set_north(360.0);
        assert!(session.result().is_some());
        session.set_north(-90.0);
        assert!(session.result().is_none());
        assert_eq!(session.config().north, 270.0);
        Ok(())
    }

    #[test]
    fn test_failure_leaves_cache_untouched() -> Result<()> {
        let mut session = ready_session();
        session.compute()?;
        let cached_values = session.result().unwrap().values.clone();

        // A truncated weather series makes the sky pass fail
        let mut short = WeatherSeries::synthetic("Short", 45.0, 12.0, 10.0);
        short.records.truncate(10);
        session.set_weather(short);
        assert!(session.compute().is_err());

        // The intersection matrix survived the failed attempt
        assert!(session.intersection().is_some());
        assert_eq!(session.visibility_passes(), 1);

        // Restoring good weather recovers without a visibility rerun
        session.set_weather(WeatherSeries::synthetic("Test", 45.0, 12.0, 10.0));
        let values = session.compute()?.unwrap().values.clone();
        assert_eq!(session.visibility_passes(), 1);
        assert_eq!(values, cached_values);
        Ok(())
    }
}
