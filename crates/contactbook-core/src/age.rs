//! Age-threshold arithmetic for the address listing.

use chrono::{Days, NaiveDate};

use crate::{Error, Result};

/// Days counted per year of age. Leap days are ignored, so the cutoff drifts
/// by roughly one day every four years of threshold.
pub const DAYS_PER_YEAR: u64 = 365;

/// A record is "older than `years`" when its birthday is strictly before the
/// returned date.
pub fn birthday_cutoff(today: NaiveDate, years: u32) -> Result<NaiveDate> {
  today
    .checked_sub_days(Days::new(u64::from(years) * DAYS_PER_YEAR))
    .ok_or(Error::ThresholdOutOfRange(years))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn one_year_is_365_days() {
    // 2024 is a leap year, so 365 days back lands one day past the calendar
    // anniversary.
    assert_eq!(birthday_cutoff(date(2024, 3, 1), 1).unwrap(), date(2023, 3, 2));
    assert_eq!(birthday_cutoff(date(2023, 6, 15), 1).unwrap(), date(2022, 6, 15));
  }

  #[test]
  fn zero_years_is_today() {
    assert_eq!(birthday_cutoff(date(2021, 6, 2), 0).unwrap(), date(2021, 6, 2));
  }

  #[test]
  fn huge_threshold_is_an_error() {
    assert!(matches!(
      birthday_cutoff(date(2021, 6, 2), u32::MAX),
      Err(Error::ThresholdOutOfRange(u32::MAX))
    ));
  }
}
