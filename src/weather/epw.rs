//! EPW (EnergyPlus Weather) parsing.
//!
//! EPW format: 8 header lines followed by hourly data rows with 35
//! comma-separated fields. Only the fields the radiation engine needs are
//! extracted.

use anyhow::{bail, Context, Result};

use super::{Location, WeatherRecord, WeatherSeries};

/// Parses EPW file content into a weather series.
pub fn parse_epw(content: &str) -> Result<WeatherSeries> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 9 {
        bail!("EPW file too short: expected at least 9 lines");
    }

    // Parse LOCATION header (line 0)
    // Format: LOCATION,city,state_province,country,source,WMO,lat,lon,tz,elevation
    let location_fields: Vec<&str> = lines[0].split(',').collect();
    if location_fields.len() < 10 {
        bail!("Invalid LOCATION header");
    }

    let name = format!(
        "{}, {}",
        location_fields[1].trim(),
        location_fields[3].trim()
    );
    let latitude: f64 = location_fields[6]
        .trim()
        .parse()
        .context("Invalid latitude")?;
    let longitude: f64 = location_fields[7]
        .trim()
        .parse()
        .context("Invalid longitude")?;
    let timezone: f64 = location_fields[8]
        .trim()
        .parse()
        .context("Invalid timezone")?;
    let elevation: f64 = location_fields[9]
        .trim()
        .parse()
        .context("Invalid elevation")?;

    // Data rows start at line 8
    let mut records = Vec::new();
    for (i, line) in lines.iter().enumerate().skip(8) {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 35 {
            continue; // Skip malformed lines
        }

        let record = WeatherRecord {
            dry_bulb_temperature: fields[6]
                .trim()
                .parse()
                .with_context(|| format!("Invalid dry bulb at line {i}"))?,
            dew_point_temperature: fields[7]
                .trim()
                .parse()
                .with_context(|| format!("Invalid dew point at line {i}"))?,
            direct_normal_irradiance: fields[14]
                .trim()
                .parse()
                .with_context(|| format!("Invalid DNI at line {i}"))?,
            diffuse_horizontal_irradiance: fields[15]
                .trim()
                .parse()
                .with_context(|| format!("Invalid DHI at line {i}"))?,
        };
        records.push(record);
    }

    Ok(WeatherSeries {
        location: Location {
            name,
            latitude,
            longitude,
            timezone,
            elevation,
        },
        records,
    })
}
