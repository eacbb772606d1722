//! Solar geometry: sun position, time corrections and the scalar
//! quantities the Perez model needs (air mass, extraterrestrial
//! irradiance).

use crate::Vector;

/// W/m^2
const SOLAR_CONSTANT: f64 = 1367.0;

/// Solar position (azimuth and altitude angles).
#[derive(Debug, Clone, Copy)]
pub struct SolarPosition {
    /// Solar altitude angle in degrees (0 = horizon, 90 = zenith).
    pub altitude: f64,
    /// Solar azimuth angle in degrees from north, clockwise (0=N, 90=E, 180=S, 270=W).
    pub azimuth: f64,
}

impl SolarPosition {
    /// Calculates the solar position using the Spencer algorithm.
    ///
    /// - `latitude`: in degrees (positive north)
    /// - `day_of_year`: 1-365
    /// - `hour`: solar time in hours (0-24)
    pub fn calculate(latitude: f64, day_of_year: u32, hour: f64) -> Self {
        let lat = latitude.to_radians();
        let declination = declination(day_of_year);

        // Hour angle (15 degrees per hour from solar noon)
        let hour_angle = ((hour - 12.0) * 15.0_f64).to_radians();

        // Solar altitude
        let sin_alt =
            lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
        let altitude = sin_alt.asin().to_degrees();

        // Solar azimuth
        let cos_azimuth = (declination.sin() * lat.cos()
            - declination.cos() * lat.sin() * hour_angle.cos())
            / altitude.to_radians().cos().max(1e-10);

        let mut azimuth = cos_azimuth.clamp(-1.0, 1.0).acos().to_degrees();
        if hour_angle > 0.0 {
            azimuth = 360.0 - azimuth;
        }

        Self { altitude, azimuth }
    }

    /// Calculates the solar position from civil (standard) time.
    ///
    /// Applies the equation of time and the longitude offset from the
    /// time zone meridian before delegating to [`SolarPosition::calculate`].
    ///
    /// - `longitude`: in degrees (positive east)
    /// - `timezone`: hours from UTC (positive east)
    /// - `local_hour`: local standard time in hours (0-24)
    pub fn from_local_time(
        latitude: f64,
        longitude: f64,
        timezone: f64,
        day_of_year: u32,
        local_hour: f64,
    ) -> Self {
        // 4 minutes per degree of offset from the time zone meridian
        let meridian = 15.0 * timezone;
        let correction_minutes = 4.0 * (longitude - meridian) + equation_of_time(day_of_year);
        let solar_hour = local_hour + correction_minutes / 60.0;
        Self::calculate(latitude, day_of_year, solar_hour)
    }

    /// Returns true if the sun is above the horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }

    /// Solar zenith angle in radians, limited to [3°, 90°] the way
    /// Radiance's gendaymtx does before feeding the Perez model.
    pub fn zenith_clamped(&self) -> f64 {
        let zenith = (90.0 - self.altitude).to_radians();
        zenith.clamp(3.0_f64.to_radians(), std::f64::consts::FRAC_PI_2)
    }

    /// Converts solar position to a direction vector (pointing toward the sun).
    ///
    /// Convention: azimuth from north clockwise; north = +Y, east = +X, z up.
    pub fn to_direction(&self) -> Vector {
        let alt = self.altitude.to_radians();
        let azi = self.azimuth.to_radians();

        let x = alt.cos() * azi.sin();
        let y = alt.cos() * azi.cos();
        let z = alt.sin();

        Vector::new(x, y, z)
    }
}

/// Solar declination in radians (Spencer approximation).
fn declination(day_of_year: u32) -> f64 {
    let gamma = day_angle(day_of_year);
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

fn day_angle(day_of_year: u32) -> f64 {
    2.0 * std::f64::consts::PI * (day_of_year as f64 - 1.0) / 365.0
}

/// Equation of time in minutes (Spencer).
pub fn equation_of_time(day_of_year: u32) -> f64 {
    let b = day_angle(day_of_year);
    229.2
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.04089 * (2.0 * b).sin())
}

/// Normal extraterrestrial irradiance in W/m^2 for a day of the year.
pub fn extraterrestrial_normal_irradiance(day_of_year: u32) -> f64 {
    let b = day_angle(day_of_year);
    let aux = 1.000110
        + 0.034221 * b.cos()
        + 0.001280 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin();
    SOLAR_CONSTANT * aux
}

/// Relative optical air mass for a solar zenith angle in radians
/// (Kasten-Young, the form used by Radiance).
pub fn air_mass(solar_zenith: f64) -> f64 {
    1.0 / (solar_zenith.cos() + 0.15 * (93.885 - solar_zenith.to_degrees()).powf(-1.253))
}
