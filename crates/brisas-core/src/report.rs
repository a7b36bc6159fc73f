//! Report payloads and their scoping.
//!
//! Every report is built from rows that first pass [`crate::scope::scope`].
//! Role decides only the candidate pool; the per-report filters (street,
//! status, age range) are pure and role-independent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  age::{AgeRange, age_on},
  beneficiary::Beneficiary,
  dependent::Dependent,
  person::{Gender, deserialize_date},
  policy::{AccessDenied, Scope, StreetScoped, authorize, scope_for},
  role::Actor,
  scope::scope,
  street::{Street, StreetId},
};

// ─── Backend payloads ────────────────────────────────────────────────────────

/// A beneficiary together with its full dependent list (carga familiar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyBurden {
  #[serde(rename = "beneficiario")]
  pub beneficiary: Beneficiary,
  #[serde(rename = "dependientes", default)]
  pub dependents:  Vec<Dependent>,
}

impl FamilyBurden {
  /// The beneficiary plus every dependent.
  pub fn household_size(&self) -> usize { 1 + self.dependents.len() }
}

impl StreetScoped for FamilyBurden {
  fn street_id(&self) -> Option<StreetId> { Some(self.beneficiary.street_id) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonKind {
  #[serde(rename = "beneficiario", alias = "Beneficiario")]
  Beneficiary,
  #[serde(rename = "dependiente", alias = "Dependiente")]
  Dependent,
}

impl PersonKind {
  pub fn label(self) -> &'static str {
    match self {
      Self::Beneficiary => "Beneficiario",
      Self::Dependent => "Dependiente",
    }
  }
}

/// One person in the `rango-edad` report, beneficiary or dependent.
///
/// `street_id` is the street of the household. The backend does not always
/// join it in; [`resolve_entry_streets`] fills the gaps before scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRangeEntry {
  pub cedula:             String,
  #[serde(rename = "nombre_completo")]
  pub full_name:          String,
  #[serde(rename = "fecha_nacimiento", deserialize_with = "deserialize_date")]
  pub birth_date:         NaiveDate,
  #[serde(rename = "genero")]
  pub gender:             Gender,
  #[serde(rename = "tipo")]
  pub kind:               PersonKind,
  #[serde(rename = "cedula_beneficiario", default)]
  pub beneficiary_cedula: Option<String>,
  #[serde(rename = "id_calle", default)]
  pub street_id:          Option<StreetId>,
}

impl AgeRangeEntry {
  /// Cédula of the beneficiary heading this person's household.
  pub fn household_cedula(&self) -> &str {
    match (self.kind, &self.beneficiary_cedula) {
      (PersonKind::Dependent, Some(parent)) => parent,
      _ => &self.cedula,
    }
  }
}

impl StreetScoped for AgeRangeEntry {
  fn street_id(&self) -> Option<StreetId> { self.street_id }
}

/// Give every entry without a street the street of its household head.
/// Entries whose household is not among `beneficiaries` stay without one,
/// which keeps them out of any street chief's scope.
pub fn resolve_entry_streets(people: &mut [AgeRangeEntry], beneficiaries: &[Beneficiary]) {
  for p in people.iter_mut().filter(|p| p.street_id.is_none()) {
    p.street_id = beneficiaries
      .iter()
      .find(|b| b.cedula == p.household_cedula())
      .map(|b| b.street_id);
  }
}

// ─── Targets and subjects ────────────────────────────────────────────────────

/// What the operator asked a report to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTarget {
  /// The whole community (aggregate across streets).
  Community,
  Street(StreetId),
}

impl ReportTarget {
  fn as_scope(self) -> Scope {
    match self {
      Self::Community => Scope::AllStreets,
      Self::Street(id) => Scope::Street(id),
    }
  }
}

/// Resolve the requested target against the actor's role.
///
/// Leaders get what they asked for. A street chief always gets their own
/// street; naming any other street is refused.
pub fn resolve_target(actor: &Actor, requested: ReportTarget) -> Result<ReportTarget, AccessDenied> {
  match (scope_for(actor)?, requested) {
    (Scope::AllStreets, target) => Ok(target),
    (Scope::Street(own), ReportTarget::Community) => Ok(ReportTarget::Street(own)),
    (Scope::Street(own), ReportTarget::Street(id)) if id == own => Ok(ReportTarget::Street(own)),
    (Scope::Street(own), ReportTarget::Street(id)) => Err(AccessDenied::OutOfScope {
      assigned:      own,
      record_street: Some(id),
    }),
  }
}

/// Who or what a report is about; drives its title and file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSubject {
  Community,
  Street(Street),
  Person {
    cedula:    String,
    full_name: String,
  },
}

impl ReportSubject {
  pub fn label(&self) -> String {
    match self {
      Self::Community => "Brisas del Orinoco II".to_owned(),
      Self::Street(street) => street.name.clone(),
      Self::Person { full_name, .. } => full_name.clone(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
  FamilyBurden,
  StreetHabitants,
  AgeRange,
  Sale,
}

impl ReportKind {
  pub fn title(self) -> &'static str {
    match self {
      Self::FamilyBurden => "Carga familiar",
      Self::StreetHabitants => "Habitantes por calle",
      Self::AgeRange => "Rango de edad",
      Self::Sale => "Reporte de venta",
    }
  }

  pub fn slug(self) -> &'static str {
    match self {
      Self::FamilyBurden => "carga_familiar",
      Self::StreetHabitants => "habitantes_calle",
      Self::AgeRange => "rango_edad",
      Self::Sale => "reporte_venta",
    }
  }
}

// ─── Built reports ───────────────────────────────────────────────────────────

/// Household listing used by the family-burden and street-habitants reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseholdReport {
  pub kind:       ReportKind,
  pub subject:    ReportSubject,
  pub households: Vec<FamilyBurden>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeRangeReport {
  pub subject: ReportSubject,
  pub range:   AgeRange,
  pub as_of:   NaiveDate,
  pub people:  Vec<AgeRangeEntry>,
}

/// One household line of the sale roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleLine {
  pub cedula:         String,
  pub full_name:      String,
  pub house_number:   String,
  pub phone:          String,
  pub street_id:      StreetId,
  pub household_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleReport {
  pub subject: ReportSubject,
  pub lines:   Vec<SaleLine>,
}

/// The whole-community (or whole-street, for a street chief) family-burden
/// export: active households only.
pub fn family_burden(
  actor: &Actor,
  households: Vec<FamilyBurden>,
  target: ReportTarget,
  subject: ReportSubject,
) -> Result<HouseholdReport, AccessDenied> {
  let households = active_households_in(actor, households, target)?;
  Ok(HouseholdReport { kind: ReportKind::FamilyBurden, subject, households })
}

/// Family burden of a single beneficiary, whatever its status.
pub fn family_burden_of(actor: &Actor, household: FamilyBurden) -> Result<HouseholdReport, AccessDenied> {
  authorize(actor, &household)?;
  let subject = ReportSubject::Person {
    cedula:    household.beneficiary.cedula.clone(),
    full_name: household.beneficiary.full_name.clone(),
  };
  Ok(HouseholdReport {
    kind: ReportKind::FamilyBurden,
    subject,
    households: vec![household],
  })
}

/// Active households on the target street, or on every street in scope for
/// a community-wide request.
pub fn street_habitants(
  actor: &Actor,
  households: Vec<FamilyBurden>,
  target: ReportTarget,
  subject: ReportSubject,
) -> Result<HouseholdReport, AccessDenied> {
  let households = active_households_in(actor, households, target)?;
  Ok(HouseholdReport { kind: ReportKind::StreetHabitants, subject, households })
}

/// Everyone in scope whose age on `today` lies in `range`.
pub fn age_range(
  actor: &Actor,
  people: Vec<AgeRangeEntry>,
  range: AgeRange,
  today: NaiveDate,
  target: ReportTarget,
  subject: ReportSubject,
) -> Result<AgeRangeReport, AccessDenied> {
  let target = resolve_target(actor, target)?.as_scope();
  let mut people = scope(actor, people)?;
  people.retain(|p| target.admits(p.street_id) && range.admits(p.birth_date, today));
  people.sort_by(|a, b| b.birth_date.cmp(&a.birth_date).then_with(|| a.cedula.cmp(&b.cedula)));
  Ok(AgeRangeReport { subject, range, as_of: today, people })
}

/// One line per active household, for distribution sales.
pub fn sale(
  actor: &Actor,
  households: Vec<FamilyBurden>,
  target: ReportTarget,
  subject: ReportSubject,
) -> Result<SaleReport, AccessDenied> {
  let lines = active_households_in(actor, households, target)?
    .into_iter()
    .map(|h| SaleLine {
      household_size: h.household_size(),
      cedula:         h.beneficiary.cedula,
      full_name:      h.beneficiary.full_name,
      house_number:   h.beneficiary.house_number,
      phone:          h.beneficiary.phone,
      street_id:      h.beneficiary.street_id,
    })
    .collect();
  Ok(SaleReport { subject, lines })
}

fn active_households_in(
  actor: &Actor,
  households: Vec<FamilyBurden>,
  target: ReportTarget,
) -> Result<Vec<FamilyBurden>, AccessDenied> {
  let target = resolve_target(actor, target)?.as_scope();
  let mut households = scope(actor, households)?;
  households.retain(|h| h.beneficiary.is_active() && target.admits(Some(h.beneficiary.street_id)));
  households.sort_by(|a, b| {
    a.beneficiary
      .street_id
      .cmp(&b.beneficiary.street_id)
      .then_with(|| a.beneficiary.house_number.cmp(&b.beneficiary.house_number))
      .then_with(|| a.beneficiary.cedula.cmp(&b.beneficiary.cedula))
  });
  Ok(households)
}

/// Age of a person for display in a report row.
pub fn display_age(birth: NaiveDate, today: NaiveDate) -> String {
  age_on(birth, today).map(|a| a.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    status::Status,
    tests::{beneficiary, dependent},
  };

  fn households() -> Vec<FamilyBurden> {
    let mut inactive = beneficiary("4", 5);
    inactive.status = Status::Inactive;
    vec![
      FamilyBurden { beneficiary: beneficiary("1", 3), dependents: vec![] },
      FamilyBurden {
        beneficiary: beneficiary("2", 5),
        dependents:  vec![dependent("21", "2"), dependent("22", "2")],
      },
      FamilyBurden { beneficiary: beneficiary("3", 7), dependents: vec![dependent("31", "3")] },
      FamilyBurden { beneficiary: inactive, dependents: vec![] },
    ]
  }

  fn entry(cedula: &str, born: NaiveDate, street: Option<StreetId>) -> AgeRangeEntry {
    AgeRangeEntry {
      cedula:             cedula.into(),
      full_name:          cedula.into(),
      birth_date:         born,
      gender:             Gender::Masculino,
      kind:               PersonKind::Dependent,
      beneficiary_cedula: Some("1".into()),
      street_id:          street,
    }
  }

  #[test]
  fn street_chief_target_is_forced_to_own_street() {
    let chief = Actor::street_chief(5);
    assert_eq!(resolve_target(&chief, ReportTarget::Community), Ok(ReportTarget::Street(5)));
    assert_eq!(resolve_target(&chief, ReportTarget::Street(5)), Ok(ReportTarget::Street(5)));
    assert!(resolve_target(&chief, ReportTarget::Street(3)).is_err());
    assert_eq!(
      resolve_target(&Actor::leader(), ReportTarget::Street(3)),
      Ok(ReportTarget::Street(3))
    );
  }

  #[test]
  fn general_export_for_street_chief_holds_only_their_street() {
    let report = family_burden(
      &Actor::street_chief(5),
      households(),
      ReportTarget::Community,
      ReportSubject::Community,
    )
    .unwrap();
    let ids: Vec<_> = report.households.iter().map(|h| h.beneficiary.cedula.as_str()).collect();
    assert_eq!(ids, ["2"]);
  }

  #[test]
  fn leader_aggregate_skips_inactive() {
    let report = family_burden(
      &Actor::leader(),
      households(),
      ReportTarget::Community,
      ReportSubject::Community,
    )
    .unwrap();
    assert_eq!(report.households.len(), 3);
  }

  #[test]
  fn single_family_burden_requires_access() {
    let h = households().remove(0);
    assert!(family_burden_of(&Actor::street_chief(5), h.clone()).is_err());
    let r = family_burden_of(&Actor::street_chief(3), h).unwrap();
    assert!(matches!(r.subject, ReportSubject::Person { ref cedula, .. } if cedula == "1"));
  }

  #[test]
  fn age_range_includes_boundaries() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let people = vec![
      entry("18", NaiveDate::from_ymd_opt(2006, 3, 10).unwrap(), Some(5)),
      entry("30", NaiveDate::from_ymd_opt(1993, 3, 11).unwrap(), Some(5)),
      entry("31", NaiveDate::from_ymd_opt(1993, 3, 10).unwrap(), Some(5)),
      entry("17", NaiveDate::from_ymd_opt(2006, 3, 11).unwrap(), Some(5)),
      entry("other", NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), Some(3)),
      AgeRangeEntry {
        beneficiary_cedula: Some("unknown".into()),
        ..entry("orphan", NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), None)
      },
    ];
    let range = AgeRange::new(18, 30).unwrap();

    let report = age_range(
      &Actor::street_chief(5),
      people.clone(),
      range,
      today,
      ReportTarget::Community,
      ReportSubject::Community,
    )
    .unwrap();
    let ids: Vec<_> = report.people.iter().map(|p| p.cedula.as_str()).collect();
    assert_eq!(ids, ["18", "30"]);
    for p in &report.people {
      let age = age_on(p.birth_date, today).unwrap();
      assert!((18..=30).contains(&age));
    }

    let report = age_range(
      &Actor::leader(),
      people,
      range,
      today,
      ReportTarget::Community,
      ReportSubject::Community,
    )
    .unwrap();
    assert_eq!(report.people.len(), 4);
  }

  #[test]
  fn dependent_without_street_takes_household_street() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let born = NaiveDate::from_ymd_opt(2012, 7, 15).unwrap();
    let mut people = vec![
      AgeRangeEntry { beneficiary_cedula: Some("2000200".into()), ..entry("3002001", born, None) },
      AgeRangeEntry { beneficiary_cedula: Some("9999999".into()), ..entry("3009001", born, None) },
      AgeRangeEntry {
        kind: PersonKind::Beneficiary,
        beneficiary_cedula: None,
        ..entry("2000201", born, None)
      },
    ];
    resolve_entry_streets(&mut people, &[beneficiary("2000200", 5), beneficiary("2000201", 5)]);
    assert_eq!(people[0].street_id, Some(5));
    assert_eq!(people[1].street_id, None);
    assert_eq!(people[2].street_id, Some(5));

    let report = age_range(
      &Actor::street_chief(5),
      people,
      AgeRange::new(0, 18).unwrap(),
      today,
      ReportTarget::Community,
      ReportSubject::Community,
    )
    .unwrap();
    let ids: Vec<_> = report.people.iter().map(|p| p.cedula.as_str()).collect();
    assert_eq!(ids, ["2000201", "3002001"]);
  }

  #[test]
  fn sale_counts_household_members() {
    let report = sale(&Actor::leader(), households(), ReportTarget::Street(5), ReportSubject::Community)
      .unwrap();
    assert_eq!(report.lines.len(), 1);
    assert_eq!(report.lines[0].household_size, 3);
  }

  #[test]
  fn street_habitants_refuses_foreign_street_for_chief() {
    let street = Street { id: 3, name: "Los Mangos".into() };
    let subject = ReportSubject::Street(street);
    assert!(
      street_habitants(&Actor::street_chief(5), households(), ReportTarget::Street(3), subject.clone())
        .is_err()
    );
    let report =
      street_habitants(&Actor::leader(), households(), ReportTarget::Street(3), subject).unwrap();
    assert_eq!(report.households.len(), 1);
    assert_eq!(report.kind, ReportKind::StreetHabitants);
    assert_eq!(report.subject.label(), "Los Mangos");
  }
}
