pub mod epw;
pub mod period;
pub mod stat;

use std::path::Path;

use anyhow::{bail, Result};

/// Site metadata of a weather source.
#[derive(Debug, Clone)]
pub struct Location {
    /// Location name.
    pub name: String,
    /// Latitude in degrees (positive north).
    pub latitude: f64,
    /// Longitude in degrees (positive east).
    pub longitude: f64,
    /// Time zone (hours from UTC).
    pub timezone: f64,
    /// Elevation in meters.
    pub elevation: f64,
}

/// A single hourly weather record.
#[derive(Debug, Clone, Copy)]
pub struct WeatherRecord {
    /// Direct normal irradiance in Wh/m^2.
    pub direct_normal_irradiance: f64,
    /// Diffuse horizontal irradiance in Wh/m^2.
    pub diffuse_horizontal_irradiance: f64,
    /// Dry bulb temperature in °C.
    pub dry_bulb_temperature: f64,
    /// Dew point temperature in °C.
    pub dew_point_temperature: f64,
}

/// An annual hourly weather series (8760 records), immutable once loaded.
#[derive(Debug, Clone)]
pub struct WeatherSeries {
    pub location: Location,
    pub records: Vec<WeatherRecord>,
}

impl WeatherSeries {
    /// Loads a weather series from a file path, dispatching on the
    /// extension: `.epw` (hourly records) or `.stat` (monthly clear-sky
    /// statistics). Any other extension is an unrecognized format.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("epw") => {
                let content = std::fs::read_to_string(path)?;
                epw::parse_epw(&content)
            }
            Some("stat") => {
                let content = std::fs::read_to_string(path)?;
                stat::parse_stat(&content)
            }
            _ => bail!(
                "Unrecognized weather file: {}. Must have an .epw or a .stat extension",
                path.display()
            ),
        }
    }

    /// Parses EPW (EnergyPlus Weather) file content.
    pub fn from_epw(content: &str) -> Result<Self> {
        epw::parse_epw(content)
    }

    /// Parses STAT file content, synthesizing a clear-sky year from the
    /// monthly ASHRAE optical depths.
    pub fn from_stat(content: &str) -> Result<Self> {
        stat::parse_stat(content)
    }

    /// Returns the number of hours in the dataset.
    pub fn num_hours(&self) -> usize {
        self.records.len()
    }

    /// Returns the annual mean dry bulb temperature.
    pub fn mean_temperature(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.records.iter().map(|r| r.dry_bulb_temperature).sum();
        sum / self.records.len() as f64
    }

    /// Creates simple synthetic weather data for testing.
    ///
    /// Generates 8760 hours with sinusoidal temperature variation and a
    /// parabolic daytime irradiance profile.
    pub fn synthetic(name: &str, latitude: f64, mean_temp: f64, temp_amplitude: f64) -> Self {
        let mut records = Vec::with_capacity(8760);
        for hoy in 0..8760usize {
            let day_of_year = (hoy / 24) as f64 + 1.0;
            let hour = (hoy % 24) as f64;

            // Annual sinusoidal temperature variation (peak in July/August)
            let annual_phase = 2.0 * std::f64::consts::PI * (day_of_year - 200.0) / 365.0;
            // Daily variation (peak at 14:00)
            let daily_phase = 2.0 * std::f64::consts::PI * (hour - 14.0) / 24.0;
            let temp = mean_temp + temp_amplitude * annual_phase.cos() + 3.0 * daily_phase.cos();

            // Parabolic daytime profile between 07:00 and 19:00
            let solar_factor = if (7.0..=19.0).contains(&hour) {
                let solar_hour = (hour - 13.0) / 6.0;
                (1.0 - solar_hour * solar_hour).max(0.0)
            } else {
                0.0
            };

            records.push(WeatherRecord {
                direct_normal_irradiance: 700.0 * solar_factor,
                diffuse_horizontal_irradiance: 150.0 * solar_factor,
                dry_bulb_temperature: temp,
                dew_point_temperature: temp - 5.0,
            });
        }

        Self {
            location: Location {
                name: name.to_string(),
                latitude,
                longitude: 0.0,
                timezone: 0.0,
                elevation: 0.0,
            },
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_weather() {
        let weather = WeatherSeries::synthetic("Test City", 52.0, 10.0, 12.0);
        assert_eq!(weather.num_hours(), 8760);
        assert_eq!(weather.location.name, "Test City");

        let mean = weather.mean_temperature();
        assert!(
            (mean - 10.0).abs() < 3.0,
            "Mean temp should be near 10°C, got {mean}"
        );

        // Nights are dark
        assert_eq!(weather.records[0].direct_normal_irradiance, 0.0);
        // Middays are not
        assert!(weather.records[13].direct_normal_irradiance > 0.0);
    }

    #[test]
    fn test_from_path_unrecognized_extension() {
        let err = WeatherSeries::from_path(Path::new("chicago.wea")).unwrap_err();
        let msg = format!("{err}");
        assert!(
            msg.contains("Unrecognized weather file"),
            "Unexpected message: {msg}"
        );
    }
}
