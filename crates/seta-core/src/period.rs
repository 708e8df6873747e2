//! Period bucketing: mapping a date to the start of its report period and
//! formatting that start as the row label.
//!
//! | Granularity | Bucket start | Label |
//! |-------------|--------------|-------|
//! | daily   | the date itself | `06 Jan 2025` |
//! | weekly  | Sunday on or before the date | `Week of 05 Jan 2025` |
//! | monthly | first of the month | `January 2025` |

use chrono::{Datelike, Days, NaiveDate};

use crate::config::Granularity;

const DAY_FORMAT: &str = "%d %b %Y";
const MONTH_FORMAT: &str = "%B %Y";
const WEEK_PREFIX: &str = "Week of ";

impl Granularity {
  /// The first day of the period containing `date`.
  pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
    match self {
      Self::Daily => date,
      Self::Weekly => {
        let back = u64::from(date.weekday().num_days_from_sunday());
        date.checked_sub_days(Days::new(back)).unwrap_or(date)
      }
      Self::Monthly => date.with_day(1).unwrap_or(date),
    }
  }

  /// The row label for the period starting at `start`.
  pub fn label(self, start: NaiveDate) -> String {
    match self {
      Self::Daily => start.format(DAY_FORMAT).to_string(),
      Self::Weekly => format!("{WEEK_PREFIX}{}", start.format(DAY_FORMAT)),
      Self::Monthly => start.format(MONTH_FORMAT).to_string(),
    }
  }

  /// Recover the period start from a label produced by [`Self::label`].
  ///
  /// Returns `None` for any label this granularity would not produce.
  pub fn parse_label(self, label: &str) -> Option<NaiveDate> {
    match self {
      Self::Daily => NaiveDate::parse_from_str(label, DAY_FORMAT).ok(),
      Self::Weekly => label
        .strip_prefix(WEEK_PREFIX)
        .and_then(|rest| NaiveDate::parse_from_str(rest, DAY_FORMAT).ok())
        .filter(|d| d.weekday().num_days_from_sunday() == 0),
      // Month labels carry no day; chrono needs one to build a date.
      Self::Monthly => {
        NaiveDate::parse_from_str(&format!("1 {label}"), "%d %B %Y").ok()
      }
    }
  }
}
