//! Sky discretization: annual irradiance time series → per-patch
//! cumulative radiation (or mean irradiance) over a sky dome, plus the
//! emissive ground patches and the signed benefit/harm variant.

use anyhow::{ensure, Result};
use ndarray::Array1;

use crate::sky::dome::{SkyDensity, SkyDome};
use crate::sky::perez;
use crate::sky::solar::{self, SolarPosition};
use crate::weather::period::{day_of_year, hoy_to_date, RunPeriod};
use crate::weather::WeatherSeries;
use crate::Vector;

/// Number of patches the direct irradiance of one hour is smeared over.
const N_SUNS: usize = 4;

/// Options controlling the sky discretization.
#[derive(Debug, Clone)]
pub struct SkyOptions {
    /// Hours of the year to integrate over.
    pub period: RunPeriod,
    /// Sky dome resolution.
    pub density: SkyDensity,
    /// North rotation in degrees, counterclockwise in plan.
    pub north: f64,
    /// Ground reflectance (0-1) for the emissive ground patches.
    pub ground_reflectance: f64,
    /// Output mean irradiance (W/m^2) instead of cumulative radiation (kWh/m^2).
    pub avg_irradiance: bool,
}

impl Default for SkyOptions {
    fn default() -> Self {
        Self {
            period: RunPeriod::annual(),
            density: SkyDensity::Tregenza,
            north: 0.0,
            ground_reflectance: 0.2,
            avg_irradiance: false,
        }
    }
}

/// Discretized sky: one value per sky patch followed by one value per
/// ground patch (2P total).
#[derive(Debug, Clone)]
pub struct SkyVector {
    pub density: SkyDensity,
    /// Length 2P: sky patches first, ground patches second.
    pub values: Array1<f64>,
    /// True if the values are mean W/m^2 rather than cumulative kWh/m^2.
    pub avg_irradiance: bool,
    /// True for benefit/harm skies, whose values may be negative.
    pub signed: bool,
}

impl SkyVector {
    /// Number of sky patches (half the vector length).
    pub fn patch_count(&self) -> usize {
        self.values.len() / 2
    }

    /// Unit of the values.
    pub fn unit(&self) -> &'static str {
        if self.avg_irradiance {
            "W/m2"
        } else {
            "kWh/m2"
        }
    }
}

/// Discretizes a weather series onto the sky dome.
///
/// For every period hour with measurable irradiance and the sun above
/// the horizon, the diffuse horizontal component is distributed over the
/// patches with the Perez all-weather luminance model (scaled so that
/// its horizontal projection integrates back to the measured value) and
/// the direct normal component is assigned to the patches nearest the
/// sun. Ground patches are appended last.
pub fn cumulative_sky(weather: &WeatherSeries, opts: &SkyOptions) -> Result<SkyVector> {
    let hours = period_hours(weather, &opts.period)?;
    let dome = SkyDome::new(opts.density);
    let directions = dome.rotated_directions(opts.north);

    let sky = accumulate_patches(weather, &hours, &dome, &directions);
    Ok(finish_sky_vector(sky, opts, false))
}

/// Discretizes a weather series into a signed benefit/harm sky.
///
/// Hours colder than `balance_temperature - 2 °C` count as heating
/// benefit, hours warmer than `balance_temperature + 2 °C` as cooling
/// harm, and hours within the ±2 °C dead band as neither. Both
/// sub-series run through the regular discretization; the result is
/// their element-wise difference.
pub fn benefit_sky(
    weather: &WeatherSeries,
    opts: &SkyOptions,
    balance_temperature: f64,
) -> Result<SkyVector> {
    let hours = period_hours(weather, &opts.period)?;
    let dome = SkyDome::new(opts.density);
    let directions = dome.rotated_directions(opts.north);

    let heating_hours: Vec<usize> = hours
        .iter()
        .copied()
        .filter(|&h| weather.records[h].dry_bulb_temperature < balance_temperature - 2.0)
        .collect();
    let cooling_hours: Vec<usize> = hours
        .iter()
        .copied()
        .filter(|&h| weather.records[h].dry_bulb_temperature > balance_temperature + 2.0)
        .collect();

    let heating = accumulate_patches(weather, &heating_hours, &dome, &directions);
    let cooling = accumulate_patches(weather, &cooling_hours, &dome, &directions);

    let signed: Vec<f64> = heating
        .iter()
        .zip(cooling.iter())
        .map(|(h, c)| h - c)
        .collect();
    Ok(finish_sky_vector(signed, opts, true))
}

/// Resolves and validates the period hours against the weather series.
fn period_hours(weather: &WeatherSeries, period: &RunPeriod) -> Result<Vec<usize>> {
    let hours = period.hours();
    ensure!(!hours.is_empty(), "Run period selects no hours");
    let max_hoy = *hours.last().unwrap();
    ensure!(
        weather.num_hours() > max_hoy,
        "Weather series has {} hours but the run period needs hour {}",
        weather.num_hours(),
        max_hoy
    );
    Ok(hours)
}

/// Accumulates Wh/m^2 per sky patch over the given hours.
fn accumulate_patches(
    weather: &WeatherSeries,
    hours: &[usize],
    dome: &SkyDome,
    directions: &[Vector],
) -> Vec<f64> {
    let loc = &weather.location;
    let omegas = dome.solid_angles();
    let mut patches = vec![0.0; dome.patch_count()];

    for &hoy in hours {
        let rec = &weather.records[hoy];
        let dni = rec.direct_normal_irradiance.max(0.0);
        let dhi = rec.diffuse_horizontal_irradiance.max(0.0);
        if dni + dhi < 1e-4 {
            continue; // nighttime
        }

        let (month, day, hour) = hoy_to_date(hoy);
        let doy = day_of_year(month, day);
        let pos = SolarPosition::from_local_time(
            loc.latitude,
            loc.longitude,
            loc.timezone,
            doy,
            hour as f64 + 0.5,
        );
        if !pos.is_above_horizon() {
            continue; // twilight rows carry no sun position
        }

        let sun = pos.to_direction();
        let zenith = pos.zenith_clamped();

        if dhi > 0.0 {
            let air_mass = solar::air_mass(zenith);
            let e0 = solar::extraterrestrial_normal_irradiance(doy);
            let brightness = perez::sky_brightness(dhi, air_mass, e0);
            let clearness = perez::sky_clearness(dhi, dni, zenith);
            let params = perez::calc_params(zenith, clearness, brightness);

            // Scale the relative distribution so its horizontal
            // projection integrates back to the measured DHI.
            let rel: Vec<f64> = directions
                .iter()
                .map(|d| perez::relative_luminance(&params, d, &sun))
                .collect();
            let norm: f64 = rel
                .iter()
                .zip(directions)
                .zip(omegas)
                .map(|((r, d), w)| r * w * d.dz)
                .sum();
            if norm > 1e-9 {
                let scale = dhi / norm;
                for (p, (r, w)) in patches.iter_mut().zip(rel.iter().zip(omegas)) {
                    *p += r * scale * w;
                }
            }
        }

        if dni > 0.0 {
            for (bin, weight) in nearest_patches(directions, &sun) {
                patches[bin] += dni * weight;
            }
        }
    }

    patches
}

/// The `N_SUNS` patches closest to the sun with their normalized weights.
fn nearest_patches(directions: &[Vector], sun: &Vector) -> [(usize, f64); N_SUNS] {
    let mut closest: [(usize, f64); N_SUNS] = [(0, -1.0); N_SUNS];
    for (bin, dir) in directions.iter().enumerate() {
        let dot = dir.dot(sun);
        for k in 0..N_SUNS {
            // A greater dot product means a closer patch
            if dot > closest[k].1 {
                for j in (k + 1..N_SUNS).rev() {
                    closest[j] = closest[j - 1];
                }
                closest[k] = (bin, dot);
                break;
            }
        }
    }

    let mut weights = [0.0; N_SUNS];
    let mut total = 0.0;
    for (k, &(_, dot)) in closest.iter().enumerate() {
        weights[k] = 1.0 / (1.002 - dot);
        total += weights[k];
    }

    let mut out = [(0usize, 0.0); N_SUNS];
    for k in 0..N_SUNS {
        out[k] = (closest[k].0, weights[k] / total);
    }
    out
}

/// Applies the unit conversion and appends the ground patches.
fn finish_sky_vector(mut sky: Vec<f64>, opts: &SkyOptions, signed: bool) -> SkyVector {
    if opts.avg_irradiance {
        // Wh/m^2 accumulated over the period → mean W/m^2
        let duration = opts.period.duration_hours() as f64;
        for v in sky.iter_mut() {
            *v /= duration;
        }
    } else {
        // Wh/m^2 → kWh/m^2
        for v in sky.iter_mut() {
            *v /= 1000.0;
        }
    }

    // Emissive ground: uniform mean sky radiation scaled by reflectance
    let mean = sky.iter().sum::<f64>() / sky.len() as f64;
    let ground_value = mean * opts.ground_reflectance;
    let patch_count = sky.len();
    sky.extend(std::iter::repeat(ground_value).take(patch_count));

    SkyVector {
        density: opts.density,
        values: Array1::from_vec(sky),
        avg_irradiance: opts.avg_irradiance,
        signed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_weather() -> WeatherSeries {
        WeatherSeries::synthetic("Test", 45.0, 12.0, 10.0)
    }

    #[test]
    fn test_vector_length_is_twice_patch_count() -> Result<()> {
        let weather = test_weather();
        for density in [SkyDensity::Tregenza, SkyDensity::Reinhart] {
            let opts = SkyOptions {
                density,
                ..SkyOptions::default()
            };
            let sky = cumulative_sky(&weather, &opts)?;
            assert_eq!(sky.values.len(), 2 * density.patch_count());
            assert_eq!(sky.patch_count(), density.patch_count());
        }
        Ok(())
    }

    #[test]
    fn test_annual_sky_nonnegative_and_nonzero() -> Result<()> {
        let weather = test_weather();
        let sky = cumulative_sky(&weather, &SkyOptions::default())?;
        assert!(!sky.signed);
        assert!(sky.values.iter().all(|&v| v >= 0.0));
        assert!(
            sky.values.iter().sum::<f64>() > 0.0,
            "An annual sky should carry radiation"
        );
        Ok(())
    }

    #[test]
    fn test_zero_ground_reflectance() -> Result<()> {
        let weather = test_weather();
        let opts = SkyOptions {
            ground_reflectance: 0.0,
            ..SkyOptions::default()
        };
        let sky = cumulative_sky(&weather, &opts)?;
        let p = sky.patch_count();
        for v in sky.values.iter().skip(p) {
            assert_eq!(*v, 0.0, "Ground patches must be exactly zero");
        }
        Ok(())
    }

    #[test]
    fn test_ground_value_is_scaled_mean() -> Result<()> {
        let weather = test_weather();
        let opts = SkyOptions {
            ground_reflectance: 0.3,
            ..SkyOptions::default()
        };
        let sky = cumulative_sky(&weather, &opts)?;
        let p = sky.patch_count();
        let mean = sky.values.iter().take(p).sum::<f64>() / p as f64;
        let ground = sky.values[p];
        assert!((ground - mean * 0.3).abs() < 1e-10);
        // All ground patches share the value
        for v in sky.values.iter().skip(p) {
            assert_eq!(*v, ground);
        }
        Ok(())
    }

    #[test]
    fn test_north_rotation_full_turn_is_identity() -> Result<()> {
        let weather = test_weather();
        let base = SkyOptions::default();
        let turned = SkyOptions {
            north: 360.0,
            ..SkyOptions::default()
        };
        let a = cumulative_sky(&weather, &base)?;
        let b = cumulative_sky(&weather, &turned)?;
        for (x, y) in a.values.iter().zip(b.values.iter()) {
            assert!((x - y).abs() < 1e-6, "north=0 vs north=360: {x} vs {y}");
        }
        Ok(())
    }

    #[test]
    fn test_north_rotation_moves_radiation() -> Result<()> {
        let weather = test_weather();
        let base = cumulative_sky(&weather, &SkyOptions::default())?;
        let turned = cumulative_sky(
            &weather,
            &SkyOptions {
                north: 90.0,
                ..SkyOptions::default()
            },
        )?;
        // Same total energy, different distribution
        let sum_a: f64 = base.values.iter().sum();
        let sum_b: f64 = turned.values.iter().sum();
        assert!((sum_a - sum_b).abs() / sum_a < 0.05);
        let p = base.patch_count();
        let same = base
            .values
            .iter()
            .take(p)
            .zip(turned.values.iter().take(p))
            .all(|(a, b)| (a - b).abs() < 1e-9);
        assert!(!same, "A 90° north rotation should move patch radiation");
        Ok(())
    }

    #[test]
    fn test_avg_irradiance_scaling() -> Result<()> {
        let weather = test_weather();
        let cumulative = cumulative_sky(&weather, &SkyOptions::default())?;
        let average = cumulative_sky(
            &weather,
            &SkyOptions {
                avg_irradiance: true,
                ..SkyOptions::default()
            },
        )?;
        assert_eq!(cumulative.unit(), "kWh/m2");
        assert_eq!(average.unit(), "W/m2");
        // avg[W] = cumulative[kWh] * 1000 / 8760
        let p = cumulative.patch_count();
        for i in 0..p {
            let expected = cumulative.values[i] * 1000.0 / 8760.0;
            assert!(
                (average.values[i] - expected).abs() < 1e-9,
                "patch {i}: {} vs {}",
                average.values[i],
                expected
            );
        }
        Ok(())
    }

    #[test]
    fn test_diffuse_integrates_to_horizontal() -> Result<()> {
        // One diffuse-only hour: the cosine-projected sum over the dome
        // must recover DHI on an unobstructed horizontal plane.
        let mut weather = test_weather();
        for rec in weather.records.iter_mut() {
            rec.direct_normal_irradiance = 0.0;
            rec.diffuse_horizontal_irradiance = 0.0;
        }
        let noon = (day_of_year(6, 21) as usize - 1) * 24 + 12;
        weather.records[noon].diffuse_horizontal_irradiance = 200.0;

        let opts = SkyOptions {
            period: RunPeriod::single_hour(6, 21, 12)?,
            ..SkyOptions::default()
        };
        let sky = cumulative_sky(&weather, &opts)?;

        let dome = SkyDome::new(opts.density);
        let horizontal: f64 = sky
            .values
            .iter()
            .take(sky.patch_count())
            .zip(dome.directions())
            .map(|(v, d)| v * 1000.0 * d.dz) // kWh → Wh over one hour
            .sum();
        assert!(
            (horizontal - 200.0).abs() < 1.0,
            "Horizontal projection should recover DHI, got {horizontal}"
        );
        Ok(())
    }

    #[test]
    fn test_benefit_dead_band_yields_zero() -> Result<()> {
        // All temperatures within ±2 °C of the balance point
        let mut weather = test_weather();
        for rec in weather.records.iter_mut() {
            rec.dry_bulb_temperature = 15.0;
        }
        let sky = benefit_sky(&weather, &SkyOptions::default(), 15.0)?;
        assert!(sky.signed);
        assert!(
            sky.values.iter().all(|&v| v == 0.0),
            "Dead-band coverage must produce an all-zero sky"
        );
        Ok(())
    }

    #[test]
    fn test_benefit_cold_year_is_positive() -> Result<()> {
        let mut weather = test_weather();
        for rec in weather.records.iter_mut() {
            rec.dry_bulb_temperature = 0.0;
        }
        let sky = benefit_sky(&weather, &SkyOptions::default(), 15.0)?;
        let total: f64 = sky.values.iter().sum();
        assert!(total > 0.0, "An always-cold year is pure heating benefit");

        // And an always-hot year mirrors it exactly
        let mut hot = weather.clone();
        for rec in hot.records.iter_mut() {
            rec.dry_bulb_temperature = 30.0;
        }
        let harm = benefit_sky(&hot, &SkyOptions::default(), 15.0)?;
        for (b, h) in sky.values.iter().zip(harm.values.iter()) {
            assert!((b + h).abs() < 1e-9, "benefit {b} should mirror harm {h}");
        }
        Ok(())
    }

    #[test]
    fn test_period_beyond_series_fails() {
        let mut weather = test_weather();
        weather.records.truncate(100);
        let err = cumulative_sky(&weather, &SkyOptions::default());
        assert!(err.is_err());
    }
}
