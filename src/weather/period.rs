//! Run periods: subsets of the 8760 hours of a year.
//!
//! A run period applies an hour-of-day range to every day inside a
//! month/day range. Both ranges may wrap (Dec → Feb, 22:00 → 02:00).
//! A single-hour period supports point-in-time skies.

use anyhow::{ensure, Result};

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_BEFORE_MONTH: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Day of year (1-365) from month (1-12) and day (1-31); no leap years.
pub fn day_of_year(month: u32, day: u32) -> u32 {
    DAYS_BEFORE_MONTH[(month as usize - 1).min(11)] + day
}

/// (month, day, hour-of-day) from an hour-of-year index (0-8759).
pub fn hoy_to_date(hoy: usize) -> (u32, u32, u32) {
    let doy = (hoy / 24) as u32; // 0-based
    let hour = (hoy % 24) as u32;
    let mut month = 1;
    let mut rem = doy;
    for (m, &days) in DAYS_IN_MONTH.iter().enumerate() {
        if rem < days {
            month = m as u32 + 1;
            break;
        }
        rem -= days;
    }
    (month, rem + 1, hour)
}

/// A contiguous month/day/hour range over the year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunPeriod {
    st_month: u32,
    st_day: u32,
    st_hour: u32,
    end_month: u32,
    end_day: u32,
    end_hour: u32,
}

impl RunPeriod {
    /// The full year: every hour of every day.
    pub fn annual() -> Self {
        Self {
            st_month: 1,
            st_day: 1,
            st_hour: 0,
            end_month: 12,
            end_day: 31,
            end_hour: 23,
        }
    }

    /// A custom period. Hours are 0-23; the hour range applies to each
    /// day in the date range. Date and hour ranges may wrap.
    pub fn new(
        st_month: u32,
        st_day: u32,
        st_hour: u32,
        end_month: u32,
        end_day: u32,
        end_hour: u32,
    ) -> Result<Self> {
        ensure!((1..=12).contains(&st_month), "start month out of range");
        ensure!((1..=12).contains(&end_month), "end month out of range");
        ensure!(
            st_day >= 1 && st_day <= DAYS_IN_MONTH[st_month as usize - 1],
            "start day out of range for month {st_month}"
        );
        ensure!(
            end_day >= 1 && end_day <= DAYS_IN_MONTH[end_month as usize - 1],
            "end day out of range for month {end_month}"
        );
        ensure!(st_hour <= 23 && end_hour <= 23, "hour out of range");
        Ok(Self {
            st_month,
            st_day,
            st_hour,
            end_month,
            end_day,
            end_hour,
        })
    }

    /// A single hour of the year (point-in-time).
    pub fn single_hour(month: u32, day: u32, hour: u32) -> Result<Self> {
        Self::new(month, day, hour, month, day, hour)
    }

    /// Returns true if this period covers all 8760 hours.
    pub fn is_annual(&self) -> bool {
        *self == Self::annual()
    }

    /// Hour-of-year indices (0-8759) covered by this period, in order.
    pub fn hours(&self) -> Vec<usize> {
        let st_doy = day_of_year(self.st_month, self.st_day);
        let end_doy = day_of_year(self.end_month, self.end_day);

        let days: Vec<u32> = if st_doy <= end_doy {
            (st_doy..=end_doy).collect()
        } else {
            // Wrapped date range (e.g. December through February)
            (st_doy..=365).chain(1..=end_doy).collect()
        };

        let hours_of_day: Vec<u32> = if self.st_hour <= self.end_hour {
            (self.st_hour..=self.end_hour).collect()
        } else {
            (self.st_hour..=23).chain(0..=self.end_hour).collect()
        };

        let mut hoys = Vec::with_capacity(days.len() * hours_of_day.len());
        for &doy in &days {
            for &h in &hours_of_day {
                hoys.push(((doy - 1) * 24 + h) as usize);
            }
        }
        hoys
    }

    /// Total number of hours in the period.
    pub fn duration_hours(&self) -> usize {
        if self.is_annual() {
            8760
        } else {
            self.hours().len()
        }
    }
}

impl Default for RunPeriod {
    fn default() -> Self {
        Self::annual()
    }
}
