//! Beneficiary status lifecycle.
//!
//! A beneficiary is either `Active` or `Inactive`. Beneficiaries are never
//! hard-deleted: "disable" moves them to `Inactive` and "reactivate" moves
//! them back. The backend has returned both `ACTIVO` and `Activo` for the same
//! field, so every inbound string goes through [`Status::parse`] and nothing
//! else compares raw status text.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
  #[default]
  Active,
  Inactive,
}

impl Status {
  /// Canonical wire encoding sent to the backend.
  pub fn as_wire(self) -> &'static str {
    match self {
      Self::Active => "ACTIVO",
      Self::Inactive => "INACTIVO",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Active => "Activo",
      Self::Inactive => "Inactivo",
    }
  }

  /// Normalise a status string from the backend. Surrounding whitespace and
  /// letter case are ignored; any other value is rejected.
  pub fn parse(raw: &str) -> Result<Self, Error> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("activo") {
      Ok(Self::Active)
    } else if trimmed.eq_ignore_ascii_case("inactivo") {
      Ok(Self::Inactive)
    } else {
      Err(Error::UnknownStatus(raw.to_owned()))
    }
  }

  pub fn is_active(self) -> bool { matches!(self, Self::Active) }

  /// Apply a requested change. Applying a change whose target is the current
  /// state is allowed and yields an unchanged transition.
  pub fn apply(self, change: StatusChange) -> StatusTransition {
    StatusTransition { from: self, to: change.target() }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl Serialize for Status {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_wire())
  }
}

impl<'de> Deserialize<'de> for Status {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Self::parse(&raw).map_err(serde::de::Error::custom)
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// A user-requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
  /// Active → Inactive. Stands in for deletion.
  Disable,
  /// Inactive → Active.
  Reactivate,
}

impl StatusChange {
  pub fn target(self) -> Status {
    match self {
      Self::Disable => Status::Inactive,
      Self::Reactivate => Status::Active,
    }
  }

  pub fn verb(self) -> &'static str {
    match self {
      Self::Disable => "disable",
      Self::Reactivate => "reactivate",
    }
  }
}

/// The outcome of applying a [`StatusChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
  pub from: Status,
  pub to:   Status,
}

impl StatusTransition {
  pub fn changed(&self) -> bool { self.from != self.to }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_ignores_case() {
    for raw in ["ACTIVO", "Activo", "activo", " Activo "] {
      assert_eq!(Status::parse(raw).unwrap(), Status::Active, "{raw}");
    }
    for raw in ["INACTIVO", "Inactivo", "inactivo"] {
      assert_eq!(Status::parse(raw).unwrap(), Status::Inactive, "{raw}");
    }
  }

  #[test]
  fn no_third_value_is_active() {
    for raw in ["", "ACTIVA", "activos", "1", "true", "SUSPENDIDO"] {
      assert!(matches!(Status::parse(raw), Err(Error::UnknownStatus(_))), "{raw}");
    }
  }

  #[test]
  fn serde_normalises_and_emits_uppercase() {
    let s: Status = serde_json::from_str("\"Inactivo\"").unwrap();
    assert_eq!(s, Status::Inactive);
    assert_eq!(serde_json::to_string(&s).unwrap(), "\"INACTIVO\"");
    assert!(serde_json::from_str::<Status>("\"borrado\"").is_err());
  }

  #[test]
  fn transitions_are_idempotent() {
    let t = Status::Inactive.apply(StatusChange::Disable);
    assert_eq!(t.to, Status::Inactive);
    assert!(!t.changed());

    let t = Status::Active.apply(StatusChange::Disable);
    assert!(t.changed());
    assert_eq!(t.to, Status::Inactive);

    let t = Status::Active.apply(StatusChange::Reactivate);
    assert!(!t.changed());
  }
}
