//! Scoped query shaping.
//!
//! Record sets fetched from the backend are narrowed to the actor's scope
//! before any other filter runs. Status and text filters only ever see rows
//! that already passed [`scope`], so a search can never surface an
//! out-of-scope record.

use tracing::debug;

use crate::{
  beneficiary::Beneficiary,
  policy::{AccessDenied, StreetScoped, scope_for},
  role::Actor,
  status::Status,
};

/// Keep only the records `actor` may see.
///
/// Leaders get the input unchanged. A street chief without an assigned
/// street, or an unknown role, gets an error rather than an empty success.
pub fn scope<T: StreetScoped>(actor: &Actor, records: Vec<T>) -> Result<Vec<T>, AccessDenied> {
  let scope = scope_for(actor)?;
  let total = records.len();
  let kept: Vec<T> = records
    .into_iter()
    .filter(|r| scope.admits(r.street_id()))
    .collect();
  debug!(?scope, total, kept = kept.len(), "scoped record set");
  Ok(kept)
}

pub fn scope_beneficiaries(
  actor: &Actor,
  beneficiaries: Vec<Beneficiary>,
) -> Result<Vec<Beneficiary>, AccessDenied> {
  scope(actor, beneficiaries)
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters applied after scoping, in this order: status, then text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeneficiaryQuery {
  /// Restrict to one status. `None` keeps both.
  pub status: Option<Status>,
  /// Case-insensitive substring over cédula, full name, phone and house
  /// number.
  pub text:   Option<String>,
}

impl BeneficiaryQuery {
  pub fn active() -> Self {
    Self { status: Some(Status::Active), text: None }
  }

  pub fn inactive() -> Self {
    Self { status: Some(Status::Inactive), text: None }
  }

  #[must_use]
  pub fn with_text(mut self, text: impl Into<String>) -> Self {
    let text = text.into();
    self.text = (!text.trim().is_empty()).then_some(text);
    self
  }
}

/// Scope, then filter by status, then by text.
pub fn shape(
  actor: &Actor,
  beneficiaries: Vec<Beneficiary>,
  query: &BeneficiaryQuery,
) -> Result<Vec<Beneficiary>, AccessDenied> {
  let mut rows = scope_beneficiaries(actor, beneficiaries)?;
  if let Some(status) = query.status {
    rows.retain(|b| b.status == status);
  }
  if let Some(text) = &query.text {
    let needle = text.trim().to_lowercase();
    rows.retain(|b| matches_text(b, &needle));
  }
  Ok(rows)
}

/// `needle` must already be lower-cased.
fn matches_text(b: &Beneficiary, needle: &str) -> bool {
  [&b.cedula, &b.full_name, &b.phone, &b.house_number]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{role::Role, tests::beneficiary};

  fn dataset() -> Vec<Beneficiary> {
    vec![
      beneficiary("1", 3),
      beneficiary("2", 5),
      beneficiary("3", 5),
      beneficiary("4", 7),
    ]
  }

  #[test]
  fn street_chief_gets_exactly_their_street() {
    let rows = scope_beneficiaries(&Actor::street_chief(5), dataset()).unwrap();
    let ids: Vec<_> = rows.iter().map(|b| b.cedula.as_str()).collect();
    assert_eq!(ids, ["2", "3"]);
  }

  #[test]
  fn leader_gets_everything() {
    assert_eq!(scope_beneficiaries(&Actor::leader(), dataset()).unwrap(), dataset());
  }

  #[test]
  fn scope_is_a_subset() {
    for street in [3, 5, 7, 9] {
      let all = dataset();
      let rows = scope_beneficiaries(&Actor::street_chief(street), all.clone()).unwrap();
      assert!(rows.iter().all(|b| all.contains(b)));
      assert!(rows.iter().all(|b| b.street_id == street));
    }
  }

  #[test]
  fn unresolved_street_is_an_error_not_empty() {
    let chief = Actor::new(Role::STREET_CHIEF_ID, None);
    assert_eq!(
      scope_beneficiaries(&chief, dataset()),
      Err(AccessDenied::UnresolvedStreet)
    );
    assert_eq!(
      scope_beneficiaries(&Actor::new(9, Some(5)), dataset()),
      Err(AccessDenied::InsufficientPermissions)
    );
  }

  #[test]
  fn active_and_inactive_lists_are_exclusive() {
    let mut rows = dataset();
    rows[1].status = Status::Inactive;
    rows[3].status = Status::Inactive;
    let actor = Actor::leader();

    let active = shape(&actor, rows.clone(), &BeneficiaryQuery::active()).unwrap();
    let inactive = shape(&actor, rows.clone(), &BeneficiaryQuery::inactive()).unwrap();

    assert_eq!(active.len() + inactive.len(), rows.len());
    assert!(active.iter().all(|a| !inactive.iter().any(|i| i.cedula == a.cedula)));
  }

  #[test]
  fn text_search_runs_after_scoping() {
    let mut rows = dataset();
    rows[0].full_name = "María Pérez".into(); // street 3
    rows[1].full_name = "María Gómez".into(); // street 5
    let q = BeneficiaryQuery::default().with_text("maría");

    let found = shape(&Actor::street_chief(5), rows.clone(), &q).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].cedula, "2");

    let found = shape(&Actor::leader(), rows, &q).unwrap();
    assert_eq!(found.len(), 2);
  }

  #[test]
  fn blank_text_is_ignored() {
    assert_eq!(BeneficiaryQuery::active().with_text("   ").text, None);
  }
}
