//! Attributes shared by beneficiaries and dependents.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Placeholder the community uses for "no chronic illness / no disability".
pub const NONE_LABEL: &str = "Ninguna";

pub fn none_label() -> String { NONE_LABEL.to_owned() }

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
  Masculino,
  Femenino,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum MaritalStatus {
  Soltero,
  Casado,
  Divorciado,
  Viudo,
  #[serde(rename = "Unión Libre")]
  #[strum(to_string = "Unión Libre", serialize = "Union Libre")]
  UnionLibre,
}

/// Parentesco: how a dependent relates to the head of household.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Relationship {
  Hijo,
  Hija,
  Esposo,
  Esposa,
  Padre,
  Madre,
  Hermano,
  Hermana,
  Otro,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only the date.
///
/// The backend stores birth dates in a timestamp column and some endpoints
/// return them with a time component.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_date(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
  let raw = raw.trim();
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(date);
  }
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.date_naive())
    .map_err(|_| format!("invalid date: {raw:?}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn marital_status_round_trips_accented_label() {
    let json = serde_json::to_string(&MaritalStatus::UnionLibre).unwrap();
    assert_eq!(json, "\"Unión Libre\"");
    let back: MaritalStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, MaritalStatus::UnionLibre);
    assert_eq!("union libre".parse::<MaritalStatus>().unwrap(), MaritalStatus::UnionLibre);
  }

  #[test]
  fn labels_parse_case_insensitively() {
    assert_eq!("femenino".parse::<Gender>().unwrap(), Gender::Femenino);
    assert_eq!("HIJA".parse::<Relationship>().unwrap(), Relationship::Hija);
    assert!("Primo".parse::<Relationship>().is_err());
  }

  #[test]
  fn dates_accept_timestamps() {
    let d = NaiveDate::from_ymd_opt(1990, 4, 12).unwrap();
    assert_eq!(parse_date("1990-04-12").unwrap(), d);
    assert_eq!(parse_date("1990-04-12T00:00:00.000Z").unwrap(), d);
    assert!(parse_date("12/04/1990").is_err());
  }
}
