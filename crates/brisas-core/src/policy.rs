//! Access policy: who may view, edit, or export which record.
//!
//! This module is the only place role ids are interpreted. Every consumer
//! (lists, forms, reports) calls [`authorize`] or [`scope_for`] and treats the
//! answer as final. The backend enforces the same rules server-side; these
//! checks keep out-of-scope rows from ever reaching a view.

use serde::Serialize;
use thiserror::Error;

use crate::{
  beneficiary::{Beneficiary, NewBeneficiary},
  dependent::Dependent,
  role::{Actor, Role},
  street::StreetId,
};

/// Why an actor was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum AccessDenied {
  /// The role id is not one the client recognises, or the role lacks the
  /// capability (e.g. a street chief managing accounts).
  #[error("insufficient permissions")]
  InsufficientPermissions,

  /// A street chief whose session carries no assigned street.
  #[error("cannot determine assigned street")]
  UnresolvedStreet,

  /// A street chief addressing a record on another street.
  #[error("record belongs to street {record_street:?}, outside assigned street {assigned}")]
  OutOfScope {
    assigned:      StreetId,
    record_street: Option<StreetId>,
  },
}

/// The set of streets an actor may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  AllStreets,
  Street(StreetId),
}

impl Scope {
  pub fn admits(self, street: Option<StreetId>) -> bool {
    match self {
      Self::AllStreets => true,
      Self::Street(id) => street == Some(id),
    }
  }
}

/// Resolve the actor's data scope. Unknown roles and street chiefs without a
/// street are refused with distinct reasons.
pub fn scope_for(actor: &Actor) -> Result<Scope, AccessDenied> {
  match actor.role() {
    Some(Role::CommunityLeader) => Ok(Scope::AllStreets),
    Some(Role::StreetChief) => actor
      .assigned_street_id
      .map(Scope::Street)
      .ok_or(AccessDenied::UnresolvedStreet),
    None => Err(AccessDenied::InsufficientPermissions),
  }
}

/// Anything whose visibility is decided by the street it lives on.
pub trait StreetScoped {
  /// The record's street, if known. A street chief never sees a record whose
  /// street is unknown.
  fn street_id(&self) -> Option<StreetId>;
}

impl<T: StreetScoped + ?Sized> StreetScoped for &T {
  fn street_id(&self) -> Option<StreetId> { (**self).street_id() }
}

impl StreetScoped for Beneficiary {
  fn street_id(&self) -> Option<StreetId> { Some(self.street_id) }
}

impl StreetScoped for NewBeneficiary {
  fn street_id(&self) -> Option<StreetId> { Some(self.details.street_id) }
}

/// Decide whether `actor` may act on `record`. Evaluate per row: a street
/// chief's answer depends on the record's own street.
pub fn authorize<T: StreetScoped + ?Sized>(actor: &Actor, record: &T) -> Result<(), AccessDenied> {
  match scope_for(actor)? {
    Scope::AllStreets => Ok(()),
    Scope::Street(assigned) => {
      let record_street = record.street_id();
      if record_street == Some(assigned) {
        Ok(())
      } else {
        Err(AccessDenied::OutOfScope { assigned, record_street })
      }
    }
  }
}

/// Boolean form of [`authorize`] for row-level UI gating.
pub fn can_access<T: StreetScoped + ?Sized>(actor: &Actor, record: &T) -> bool {
  authorize(actor, record).is_ok()
}

/// Dependents inherit access from their parent beneficiary. `parent` must be
/// the beneficiary the dependent points at.
pub fn authorize_dependent(
  actor: &Actor,
  dependent: &Dependent,
  parent: &Beneficiary,
) -> Result<(), crate::Error> {
  if dependent.beneficiary_cedula != parent.cedula {
    return Err(crate::Error::ParentMismatch {
      dependent:   dependent.cedula.clone(),
      beneficiary: parent.cedula.clone(),
    });
  }
  authorize(actor, parent)?;
  Ok(())
}

/// Listing, creating, editing or deleting other operators' accounts.
pub fn authorize_account_admin(actor: &Actor) -> Result<(), AccessDenied> {
  if actor.is_leader() {
    Ok(())
  } else {
    Err(AccessDenied::InsufficientPermissions)
  }
}

/// Acting on account `target`: leaders on any account, everyone on their own.
pub fn authorize_account_self_or_admin(
  actor: &Actor,
  own_id: i64,
  target: i64,
) -> Result<(), AccessDenied> {
  if own_id == target && actor.role().is_some() {
    return Ok(());
  }
  authorize_account_admin(actor)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tests::{beneficiary, dependent};

  #[test]
  fn leader_sees_every_street() {
    let leader = Actor::leader();
    for street in [1, 3, 5, 7, 1000] {
      assert!(can_access(&leader, &beneficiary("1", street)));
    }
  }

  #[test]
  fn street_chief_sees_only_assigned_street() {
    let chief = Actor::street_chief(5);
    for street in [1, 3, 5, 7] {
      let b = beneficiary("1", street);
      assert_eq!(can_access(&chief, &b), b.street_id == 5);
    }
    assert_eq!(
      authorize(&chief, &beneficiary("1", 3)),
      Err(AccessDenied::OutOfScope { assigned: 5, record_street: Some(3) })
    );
  }

  #[test]
  fn street_chief_without_street_is_distinguishable() {
    let chief = Actor::new(Role::STREET_CHIEF_ID, None);
    assert_eq!(
      authorize(&chief, &beneficiary("1", 5)),
      Err(AccessDenied::UnresolvedStreet)
    );
  }

  #[test]
  fn unknown_role_is_denied() {
    for role in [0, 3, 42] {
      let actor = Actor::new(role, Some(5));
      assert_eq!(
        authorize(&actor, &beneficiary("1", 5)),
        Err(AccessDenied::InsufficientPermissions)
      );
      assert!(authorize_account_admin(&actor).is_err());
    }
  }

  #[test]
  fn dependent_follows_parent() {
    let parent = beneficiary("100", 5);
    let mut dep = dependent("200", "100");
    assert!(authorize_dependent(&Actor::street_chief(5), &dep, &parent).is_ok());
    assert!(authorize_dependent(&Actor::street_chief(4), &dep, &parent).is_err());

    dep.beneficiary_cedula = "999".into();
    assert!(matches!(
      authorize_dependent(&Actor::leader(), &dep, &parent),
      Err(crate::Error::ParentMismatch { .. })
    ));
  }

  #[test]
  fn account_admin_is_leader_only() {
    assert!(authorize_account_admin(&Actor::leader()).is_ok());
    assert_eq!(
      authorize_account_admin(&Actor::street_chief(1)),
      Err(AccessDenied::InsufficientPermissions)
    );
    assert!(authorize_account_self_or_admin(&Actor::street_chief(1), 9, 9).is_ok());
    assert!(authorize_account_self_or_admin(&Actor::street_chief(1), 9, 10).is_err());
  }
}
