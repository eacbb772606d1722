//! STAT file support.
//!
//! A `.stat` file carries no hourly records, only monthly statistics.
//! The monthly ASHRAE clear-sky optical depths (taub/taud) are enough to
//! synthesize a clear-sky year: for every daylight hour,
//! DNI = E0·exp(−taub·m^ab) and DHI = E0·exp(−taud·m^ad), with m the
//! relative air mass and ab/ad the ASHRAE air mass exponents.

use anyhow::{bail, Result};

use super::period::{day_of_year, hoy_to_date};
use super::{Location, WeatherRecord, WeatherSeries};
use crate::sky::solar::{self, SolarPosition};

/// Dew point assumed for synthesized records (Radiance's default when
/// the dew point is unknown).
const DEFAULT_DEW_POINT: f64 = 11.0;

/// Parses STAT file content and synthesizes a clear-sky year.
pub fn parse_stat(content: &str) -> Result<WeatherSeries> {
    let mut name = String::from("unknown");
    let mut lat_lon_tz: Option<(f64, f64, f64)> = None;
    let mut elevation = 0.0;
    let mut taub: Option<[f64; 12]> = None;
    let mut taud: Option<[f64; 12]> = None;
    let mut monthly_db: Option<[f64; 12]> = None;
    let mut in_dry_bulb_section = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("Location --") {
            name = rest.trim().to_string();
        } else if trimmed.contains('{') && trimmed.contains("GMT") {
            lat_lon_tz = parse_lat_lon_tz(trimmed);
        } else if let Some(rest) = trimmed.strip_prefix("Elevation --") {
            let numbers = extract_numbers(rest);
            if let Some(&e) = numbers.first() {
                elevation = if rest.contains("below") { -e } else { e };
            }
        } else if trimmed.starts_with("taub (beam)") {
            taub = parse_monthly_row(trimmed);
        } else if trimmed.starts_with("taud (diffuse)") {
            taud = parse_monthly_row(trimmed);
        } else if trimmed.contains("Monthly Statistics for Dry Bulb temperatures") {
            in_dry_bulb_section = true;
        } else if in_dry_bulb_section && trimmed.starts_with("Daily Avg") {
            monthly_db = parse_monthly_row(trimmed);
            in_dry_bulb_section = false;
        }
    }

    let Some((latitude, longitude, timezone)) = lat_lon_tz else {
        bail!("STAT file is missing the latitude/longitude/GMT header line");
    };
    let Some(taub) = taub else {
        bail!("STAT file is missing the monthly 'taub (beam)' optical depths");
    };
    let Some(taud) = taud else {
        bail!("STAT file is missing the monthly 'taud (diffuse)' optical depths");
    };
    let monthly_db = monthly_db.unwrap_or([10.0; 12]);

    let location = Location {
        name,
        latitude,
        longitude,
        timezone,
        elevation,
    };
    let records = clear_sky_year(&location, &taub, &taud, &monthly_db);

    Ok(WeatherSeries { location, records })
}

/// Synthesizes 8760 clear-sky records from monthly optical depths.
fn clear_sky_year(
    location: &Location,
    taub: &[f64; 12],
    taud: &[f64; 12],
    monthly_db: &[f64; 12],
) -> Vec<WeatherRecord> {
    let mut records = Vec::with_capacity(8760);

    for hoy in 0..8760usize {
        let (month, day, hour) = hoy_to_date(hoy);
        let m = month as usize - 1;
        let doy = day_of_year(month, day);

        let pos = SolarPosition::from_local_time(
            location.latitude,
            location.longitude,
            location.timezone,
            doy,
            hour as f64 + 0.5,
        );

        let (dni, dhi) = if pos.is_above_horizon() {
            let tb = taub[m];
            let td = taud[m];
            // ASHRAE air mass exponents
            let ab = 1.219 - 0.043 * tb - 0.151 * td - 0.204 * tb * td;
            let ad = 0.202 + 0.852 * tb - 0.007 * td - 0.357 * tb * td;

            let air_mass = solar::air_mass(pos.zenith_clamped());
            let e0 = solar::extraterrestrial_normal_irradiance(doy);
            (
                e0 * (-tb * air_mass.powf(ab)).exp(),
                e0 * (-td * air_mass.powf(ad)).exp(),
            )
        } else {
            (0.0, 0.0)
        };

        records.push(WeatherRecord {
            direct_normal_irradiance: dni,
            diffuse_horizontal_irradiance: dhi,
            dry_bulb_temperature: monthly_db[m],
            dew_point_temperature: DEFAULT_DEW_POINT,
        });
    }

    records
}

/// Parses a `{N 41° 58'} {W 87° 55'} {GMT -6.0 Hours}` header line.
fn parse_lat_lon_tz(line: &str) -> Option<(f64, f64, f64)> {
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut timezone: Option<f64> = None;

    for group in line.split('{').skip(1) {
        let group = group.split('}').next()?;
        let numbers = extract_numbers(group);

        if group.contains("GMT") {
            timezone = numbers.first().copied();
        } else if numbers.len() >= 2 {
            let degrees = numbers[0] + numbers[1] / 60.0;
            if group.starts_with('N') {
                latitude = Some(degrees);
            } else if group.starts_with('S') {
                latitude = Some(-degrees);
            } else if group.starts_with('E') {
                longitude = Some(degrees);
            } else if group.starts_with('W') {
                longitude = Some(-degrees);
            }
        }
    }

    Some((latitude?, longitude?, timezone?))
}

/// Extracts the 12 monthly values from a tab-separated statistics row.
fn parse_monthly_row(line: &str) -> Option<[f64; 12]> {
    let numbers = extract_numbers(line);
    if numbers.len() < 12 {
        return None;
    }
    let mut out = [0.0; 12];
    out.copy_from_slice(&numbers[..12]);
    Some(out)
}

/// All parseable floats in a string, splitting on anything that cannot be
/// part of a number.
fn extract_numbers(s: &str) -> Vec<f64> {
    s.split(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .filter(|tok| !tok.is_empty())
        .filter_map(|tok| tok.parse::<f64>().ok())
        .collect()
}
