//! Report configuration: bucket granularity and the inclusive date range.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

/// The width of a report period.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Granularity {
  Daily,
  Weekly,
  Monthly,
}

impl Granularity {
  /// Parse a granularity, rejecting anything but `daily`, `weekly` or
  /// `monthly` (any case). There is no fallback value.
  pub fn parse(raw: &str) -> Result<Self> {
    raw
      .trim()
      .parse()
      .map_err(|_| Error::InvalidGranularity(raw.to_owned()))
  }
}

/// What to report on: bucket width plus an inclusive timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
  pub granularity: Granularity,
  pub range_start: NaiveDateTime,
  /// Inclusive. Built by [`ReportConfig::for_dates`] this is the last
  /// millisecond of the end day.
  pub range_end:   NaiveDateTime,
}

impl ReportConfig {
  /// Build a validated config from explicit bounds.
  pub fn new(
    granularity: Granularity,
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
  ) -> Result<Self> {
    let config = Self {
      granularity,
      range_start,
      range_end,
    };
    config.validate()?;
    Ok(config)
  }

  /// Build a validated config covering whole calendar days, from the start of
  /// `start` to 23:59:59.999 on `end`.
  pub fn for_dates(
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Self> {
    Self::new(granularity, start_of_day(start), end_of_day(end))
  }

  pub fn validate(&self) -> Result<()> {
    if self.range_start > self.range_end {
      return Err(Error::InvalidRange {
        start: self.range_start,
        end:   self.range_end,
      });
    }
    Ok(())
  }

  pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
    self.range_start <= timestamp && timestamp <= self.range_end
  }
}

/// Midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
  date.and_time(NaiveTime::MIN)
}

/// The last millisecond of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
  let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    .unwrap_or(NaiveTime::MIN);
  date.and_time(last)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn granularity_parses_any_case() {
    assert_eq!(Granularity::parse("daily").unwrap(), Granularity::Daily);
    assert_eq!(Granularity::parse("WEEKLY").unwrap(), Granularity::Weekly);
    assert_eq!(Granularity::parse("Monthly").unwrap(), Granularity::Monthly);
  }

  #[test]
  fn granularity_has_no_default() {
    for bad in ["", "yearly", "day"] {
      let err = Granularity::parse(bad).unwrap_err();
      assert!(matches!(err, Error::InvalidGranularity(s) if s == bad));
    }
  }

  #[test]
  fn for_dates_includes_whole_end_day() {
    let cfg =
      ReportConfig::for_dates(Granularity::Daily, date(2025, 1, 1), date(2025, 1, 31))
        .unwrap();
    let last = date(2025, 1, 31)
      .and_hms_milli_opt(23, 59, 59, 999)
      .unwrap();
    assert!(cfg.contains(last));
    assert!(cfg.contains(date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap()));
    assert!(!cfg.contains(date(2025, 2, 1).and_hms_opt(0, 0, 0).unwrap()));
    assert!(!cfg.contains(date(2024, 12, 31).and_hms_opt(23, 59, 59).unwrap()));
  }

  #[test]
  fn single_day_range_is_valid() {
    assert!(
      ReportConfig::for_dates(Granularity::Daily, date(2025, 3, 3), date(2025, 3, 3))
        .is_ok()
    );
  }

  #[test]
  fn inverted_range_is_rejected() {
    let err =
      ReportConfig::for_dates(Granularity::Weekly, date(2025, 2, 1), date(2025, 1, 1))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));
  }
}
