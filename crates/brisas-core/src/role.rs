//! Role model and the acting operator.
//!
//! Roles travel over the wire as small integers. Only `1` and `2` are
//! recognised; every other value is kept verbatim on the [`Actor`] so the
//! policy layer can deny it instead of guessing.

use serde::{Deserialize, Serialize};

use crate::{account::Account, street::StreetId};

/// The two operator roles known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
  /// Líder de Comunidad: unrestricted access.
  CommunityLeader,
  /// Jefe de Calle: restricted to one assigned street.
  StreetChief,
}

impl Role {
  pub const COMMUNITY_LEADER_ID: i64 = 1;
  pub const STREET_CHIEF_ID: i64 = 2;

  /// Map a wire role id to a role. Unknown ids yield `None`.
  pub fn from_id(id: i64) -> Option<Self> {
    match id {
      Self::COMMUNITY_LEADER_ID => Some(Self::CommunityLeader),
      Self::STREET_CHIEF_ID => Some(Self::StreetChief),
      _ => None,
    }
  }

  pub fn id(self) -> i64 {
    match self {
      Self::CommunityLeader => Self::COMMUNITY_LEADER_ID,
      Self::StreetChief => Self::STREET_CHIEF_ID,
    }
  }

  /// Display label used in the community's own vocabulary.
  pub fn label(self) -> &'static str {
    match self {
      Self::CommunityLeader => "Líder de Comunidad",
      Self::StreetChief => "Jefe de Calle",
    }
  }
}

/// The authenticated operator on whose behalf every scoped query runs.
///
/// Built once from the session's account at login and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub role_id:            i64,
  pub assigned_street_id: Option<StreetId>,
}

impl Actor {
  pub fn new(role_id: i64, assigned_street_id: Option<StreetId>) -> Self {
    Self { role_id, assigned_street_id }
  }

  pub fn leader() -> Self { Self::new(Role::COMMUNITY_LEADER_ID, None) }

  pub fn street_chief(street_id: StreetId) -> Self {
    Self::new(Role::STREET_CHIEF_ID, Some(street_id))
  }

  pub fn role(&self) -> Option<Role> { Role::from_id(self.role_id) }

  pub fn is_leader(&self) -> bool {
    self.role() == Some(Role::CommunityLeader)
  }
}

impl From<&Account> for Actor {
  fn from(account: &Account) -> Self {
    Self::new(account.role_id, account.assigned_street_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_one_and_two_are_roles() {
    assert_eq!(Role::from_id(1), Some(Role::CommunityLeader));
    assert_eq!(Role::from_id(2), Some(Role::StreetChief));
    for id in [0, 3, -1, 99] {
      assert_eq!(Role::from_id(id), None);
    }
  }

  #[test]
  fn unknown_role_is_not_leader() {
    assert!(!Actor::new(7, None).is_leader());
    assert!(Actor::leader().is_leader());
  }
}
