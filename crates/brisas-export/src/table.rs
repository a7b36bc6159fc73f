//! Flattening reports into rows.

use brisas_core::{
  beneficiary::Beneficiary,
  dependent::Dependent,
  report::{
    AgeRangeReport, HouseholdReport, PersonKind, ReportKind, ReportSubject, SaleReport, display_age,
  },
  street::{self, Street, StreetId},
};
use chrono::NaiveDate;
use serde::Serialize;

/// A titled grid of text cells, the common shape of every export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
  pub title:    String,
  pub subtitle: String,
  pub columns:  Vec<&'static str>,
  pub rows:     Vec<Vec<String>>,
  /// Summary lines printed under the text rendering.
  pub footer:   Vec<String>,
}

impl Table {
  /// Widest cell of each column in chars, header included.
  pub fn column_widths(&self) -> Vec<usize> {
    self
      .columns
      .iter()
      .enumerate()
      .map(|(i, col)| {
        self
          .rows
          .iter()
          .filter_map(|r| r.get(i))
          .map(|c| c.chars().count())
          .chain(std::iter::once(col.chars().count()))
          .max()
          .unwrap_or(0)
      })
      .collect()
  }
}

/// A built report that can be exported.
pub trait Exportable: Serialize {
  fn kind(&self) -> ReportKind;

  fn subject(&self) -> &ReportSubject;

  /// `streets` resolves street ids to names; unknown ids print as numbers.
  fn table(&self, streets: &[Street], today: NaiveDate) -> Table;
}

fn street_name(streets: &[Street], id: StreetId, joined: Option<&str>) -> String {
  joined
    .map(str::to_owned)
    .or_else(|| street::find(streets, id).map(|s| s.name.clone()))
    .unwrap_or_else(|| id.to_string())
}

fn subtitle(subject: &ReportSubject, today: NaiveDate) -> String {
  format!("{} · {}", subject.label(), today.format("%d/%m/%Y"))
}

// ─── Households ──────────────────────────────────────────────────────────────

const HOUSEHOLD_COLUMNS: [&str; 13] = [
  "Calle",
  "Casa",
  "Tipo",
  "Cédula",
  "Nombre completo",
  "Parentesco",
  "Edad",
  "Género",
  "Estado civil",
  "Teléfono",
  "Enfermedad crónica",
  "Discapacidad",
  "Estatus",
];

fn beneficiary_row(b: &Beneficiary, street: &str, today: NaiveDate) -> Vec<String> {
  vec![
    street.to_owned(),
    b.house_number.clone(),
    PersonKind::Beneficiary.label().to_owned(),
    b.cedula.clone(),
    b.full_name.clone(),
    "Titular".to_owned(),
    display_age(b.birth_date, today),
    b.gender.to_string(),
    b.marital_status.to_string(),
    b.phone.clone(),
    b.chronic_illness.clone(),
    b.disability.clone(),
    b.status.label().to_owned(),
  ]
}

fn dependent_row(d: &Dependent, parent: &Beneficiary, street: &str, today: NaiveDate) -> Vec<String> {
  vec![
    street.to_owned(),
    parent.house_number.clone(),
    PersonKind::Dependent.label().to_owned(),
    d.cedula.clone(),
    d.full_name.clone(),
    d.relationship.to_string(),
    display_age(d.birth_date, today),
    d.gender.to_string(),
    d.marital_status.to_string(),
    d.phone.clone(),
    d.chronic_illness.clone(),
    d.disability.clone(),
    String::new(),
  ]
}

impl Exportable for HouseholdReport {
  fn kind(&self) -> ReportKind { self.kind }

  fn subject(&self) -> &ReportSubject { &self.subject }

  fn table(&self, streets: &[Street], today: NaiveDate) -> Table {
    let mut rows = Vec::new();
    let mut people = 0;
    for h in &self.households {
      let b = &h.beneficiary;
      let street = street_name(streets, b.street_id, b.street_name.as_deref());
      rows.push(beneficiary_row(b, &street, today));
      rows.extend(h.dependents.iter().map(|d| dependent_row(d, b, &street, today)));
      people += h.household_size();
    }
    Table {
      title: self.kind.title().to_owned(),
      subtitle: subtitle(&self.subject, today),
      columns: HOUSEHOLD_COLUMNS.to_vec(),
      rows,
      footer: vec![
        format!("Grupos familiares: {}", self.households.len()),
        format!("Personas: {people}"),
      ],
    }
  }
}

// ─── Age range ───────────────────────────────────────────────────────────────

impl Exportable for AgeRangeReport {
  fn kind(&self) -> ReportKind { ReportKind::AgeRange }

  fn subject(&self) -> &ReportSubject { &self.subject }

  /// Ages are computed on the report's own `as_of` date, not `today`.
  fn table(&self, streets: &[Street], _today: NaiveDate) -> Table {
    let rows = self
      .people
      .iter()
      .map(|p| {
        vec![
          p.cedula.clone(),
          p.full_name.clone(),
          p.kind.label().to_owned(),
          display_age(p.birth_date, self.as_of),
          p.birth_date.format("%d/%m/%Y").to_string(),
          p.gender.to_string(),
          p.beneficiary_cedula.clone().unwrap_or_default(),
          p.street_id
            .map(|id| street_name(streets, id, None))
            .unwrap_or_default(),
        ]
      })
      .collect();
    Table {
      title: format!(
        "{} ({} a {} años)",
        ReportKind::AgeRange.title(),
        self.range.min(),
        self.range.max()
      ),
      subtitle: subtitle(&self.subject, self.as_of),
      columns: vec![
        "Cédula",
        "Nombre completo",
        "Tipo",
        "Edad",
        "Fecha de nacimiento",
        "Género",
        "Cédula del titular",
        "Calle",
      ],
      rows,
      footer: vec![format!("Personas: {}", self.people.len())],
    }
  }
}

// ─── Sale ────────────────────────────────────────────────────────────────────

impl Exportable for SaleReport {
  fn kind(&self) -> ReportKind { ReportKind::Sale }

  fn subject(&self) -> &ReportSubject { &self.subject }

  fn table(&self, streets: &[Street], today: NaiveDate) -> Table {
    let rows = self
      .lines
      .iter()
      .map(|l| {
        vec![
          street_name(streets, l.street_id, None),
          l.house_number.clone(),
          l.cedula.clone(),
          l.full_name.clone(),
          l.phone.clone(),
          l.household_size.to_string(),
        ]
      })
      .collect();
    let people: usize = self.lines.iter().map(|l| l.household_size).sum();
    Table {
      title: ReportKind::Sale.title().to_owned(),
      subtitle: subtitle(&self.subject, today),
      columns: vec!["Calle", "Casa", "Cédula", "Titular", "Teléfono", "Integrantes"],
      rows,
      footer: vec![
        format!("Grupos familiares: {}", self.lines.len()),
        format!("Personas: {people}"),
      ],
    }
  }
}
