//! South African ID number helpers.
//!
//! An ID number is 13 digits, `YYMMDD SSSS C A Z`: date of birth, a
//! sequence number (gender), a citizenship digit, a legacy digit and a Luhn
//! check digit.

use chrono::NaiveDate;
use thiserror::Error;

pub const ID_NUMBER_LEN: usize = 13;

/// Visible characters at the start (date of birth) and end of a masked ID.
const MASK_KEEP_PREFIX: usize = 6;
const MASK_KEEP_SUFFIX: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdNumberError {
  #[error("expected {ID_NUMBER_LEN} digits, got {0} characters")]
  Length(usize),

  #[error("ID number must contain digits only")]
  NonDigit,

  #[error("ID number does not start with a valid date of birth")]
  BirthDate,

  #[error("citizenship digit must be 0 or 1")]
  Citizenship,

  #[error("checksum digit does not match")]
  Checksum,
}

/// Validate the structure and checksum of an SA ID number.
pub fn validate_id_number(id: &str) -> Result<(), IdNumberError> {
  let len = id.chars().count();
  if len != ID_NUMBER_LEN {
    return Err(IdNumberError::Length(len));
  }
  if !id.bytes().all(|b| b.is_ascii_digit()) {
    return Err(IdNumberError::NonDigit);
  }

  let digits: Vec<u32> = id.bytes().map(|b| u32::from(b - b'0')).collect();

  if birth_date(&digits).is_none() {
    return Err(IdNumberError::BirthDate);
  }
  if digits[10] > 1 {
    return Err(IdNumberError::Citizenship);
  }
  if !luhn_valid(&digits) {
    return Err(IdNumberError::Checksum);
  }
  Ok(())
}

pub fn is_valid_id_number(id: &str) -> bool { validate_id_number(id).is_ok() }

/// Mask an identifier for display, keeping the date-of-birth prefix and the
/// final character: `9001015009087` → `900101******7`.
///
/// Identifiers too short to keep anything hidden are masked entirely.
pub fn mask_id_number(id: &str) -> String {
  let chars: Vec<char> = id.chars().collect();
  let keep = MASK_KEEP_PREFIX + MASK_KEEP_SUFFIX;
  if chars.len() <= keep {
    return "*".repeat(chars.len());
  }

  let hidden_end = chars.len() - MASK_KEEP_SUFFIX;
  chars
    .iter()
    .enumerate()
    .map(|(i, c)| {
      if (MASK_KEEP_PREFIX..hidden_end).contains(&i) {
        '*'
      } else {
        *c
      }
    })
    .collect()
}

/// Any century works for validation; leap days need a leap year in either.
fn birth_date(digits: &[u32]) -> Option<NaiveDate> {
  let yy = (digits[0] * 10 + digits[1]) as i32;
  let month = digits[2] * 10 + digits[3];
  let day = digits[4] * 10 + digits[5];
  NaiveDate::from_ymd_opt(2000 + yy, month, day)
    .or_else(|| NaiveDate::from_ymd_opt(1900 + yy, month, day))
}

fn luhn_valid(digits: &[u32]) -> bool {
  let sum: u32 = digits
    .iter()
    .rev()
    .enumerate()
    .map(|(i, &d)| {
      if i % 2 == 1 {
        let doubled = d * 2;
        if doubled > 9 { doubled - 9 } else { doubled }
      } else {
        d
      }
    })
    .sum();
  sum % 10 == 0
}
