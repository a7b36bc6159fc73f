//! Age arithmetic for the age-range report.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validate::{FieldError, ValidationErrors};

/// Whole years between `birth` and `today`. `None` for a birth date in the
/// future.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
  if birth > today {
    return None;
  }
  let mut years = today.year() - birth.year();
  if (today.month(), today.day()) < (birth.month(), birth.day()) {
    years -= 1;
  }
  u32::try_from(years).ok()
}

/// An inclusive age interval, `min <= age <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
  min: u32,
  max: u32,
}

impl AgeRange {
  pub fn new(min: u32, max: u32) -> Result<Self, ValidationErrors> {
    if min > max {
      return Err(ValidationErrors::from(vec![FieldError::new(
        "min",
        "minimum age must not exceed maximum age",
      )]));
    }
    Ok(Self { min, max })
  }

  pub fn min(&self) -> u32 { self.min }

  pub fn max(&self) -> u32 { self.max }

  pub fn contains(&self, age: u32) -> bool { (self.min..=self.max).contains(&age) }

  /// Whether someone born on `birth` falls in range on `today`.
  pub fn admits(&self, birth: NaiveDate, today: NaiveDate) -> bool {
    age_on(birth, today).is_some_and(|age| self.contains(age))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

  #[test]
  fn birthday_boundary() {
    let today = d(2024, 6, 15);
    assert_eq!(age_on(d(2006, 6, 15), today), Some(18));
    assert_eq!(age_on(d(2006, 6, 16), today), Some(17));
    assert_eq!(age_on(d(2024, 6, 15), today), Some(0));
    assert_eq!(age_on(d(2024, 6, 16), today), None);
  }

  #[test]
  fn leap_day_birthdays() {
    assert_eq!(age_on(d(2004, 2, 29), d(2022, 2, 28)), Some(17));
    assert_eq!(age_on(d(2004, 2, 29), d(2022, 3, 1)), Some(18));
  }

  #[test]
  fn range_is_inclusive_both_ends() {
    let r = AgeRange::new(18, 30).unwrap();
    let today = d(2024, 1, 1);
    assert!(r.admits(d(2006, 1, 1), today)); // 18
    assert!(r.admits(d(1993, 1, 2), today)); // 30
    assert!(!r.admits(d(1993, 1, 1), today)); // 31
    assert!(!r.admits(d(2006, 1, 2), today)); // 17
  }

  #[test]
  fn inverted_range_is_rejected() {
    assert!(AgeRange::new(30, 18).is_err());
    assert!(AgeRange::new(5, 5).is_ok());
  }
}
