//! Plain-text rendering of records for the subcommands.

use std::io::{self, Write};

use anyhow::Result;
use brisas_core::{
  account::Account,
  beneficiary::Beneficiary,
  dependent::Dependent,
  report::display_age,
  role::Role,
  street::{self, Street},
};
use brisas_export::{Table, write::write_text};
use chrono::NaiveDate;
use serde::Serialize;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  let mut out = io::stdout().lock();
  serde_json::to_writer_pretty(&mut out, value)?;
  writeln!(out)?;
  Ok(())
}

fn table(title: &str, columns: Vec<&'static str>, rows: Vec<Vec<String>>) -> Result<()> {
  let table = Table {
    title: title.to_owned(),
    subtitle: format!("{} registros", rows.len()),
    columns,
    rows,
    footer: Vec::new(),
  };
  write_text(&table, io::stdout().lock())?;
  Ok(())
}

/// `hint` is printed instead of an empty table.
pub fn beneficiaries(title: &str, rows: &[Beneficiary], streets: &[Street], hint: &str) -> Result<()> {
  if rows.is_empty() {
    println!("{title}: no records.");
    println!("{hint}");
    return Ok(());
  }
  let rows = rows
    .iter()
    .map(|b| {
      vec![
        b.cedula.clone(),
        b.full_name.clone(),
        street_label(streets, b),
        b.house_number.clone(),
        b.phone.clone(),
        b.status.label().to_owned(),
      ]
    })
    .collect();
  table(title, vec!["Cédula", "Nombre completo", "Calle", "Casa", "Teléfono", "Estatus"], rows)
}

fn street_label(streets: &[Street], b: &Beneficiary) -> String {
  b.street_name
    .clone()
    .or_else(|| street::find(streets, b.street_id).map(|s| s.name.clone()))
    .unwrap_or_else(|| b.street_id.to_string())
}

pub fn beneficiary(b: &Beneficiary, dependents: &[Dependent], streets: &[Street], today: NaiveDate) {
  let fields = [
    ("Cédula", b.cedula.clone()),
    ("Nombre completo", b.full_name.clone()),
    ("Estatus", b.status.label().to_owned()),
    ("Fecha de nacimiento", format!("{} ({} años)", b.birth_date, display_age(b.birth_date, today))),
    ("Género", b.gender.to_string()),
    ("Estado civil", b.marital_status.to_string()),
    ("Profesión", b.profession.clone()),
    ("Nivel educativo", b.education_level.clone()),
    ("Enfermedad crónica", b.chronic_illness.clone()),
    ("Discapacidad", b.disability.clone()),
    ("Teléfono", b.phone.clone()),
    ("Calle", street_label(streets, b)),
    ("Casa", b.house_number.clone()),
  ];
  print_fields(&fields);
  println!();
  if dependents.is_empty() {
    println!("No dependents registered. Add one with `brisas dependents add --beneficiary {}`.", b.cedula);
  } else {
    println!("Carga familiar ({}):", dependents.len());
    for d in dependents {
      println!(
        "  {:<12} {:<32} {:<10} {} años",
        d.cedula,
        d.full_name,
        d.relationship.to_string(),
        display_age(d.birth_date, today)
      );
    }
  }
}

pub fn dependents(beneficiary: &str, rows: &[Dependent], today: NaiveDate) -> Result<()> {
  if rows.is_empty() {
    println!("Beneficiary {beneficiary} has no dependents.");
    println!("Add one with `brisas dependents add --beneficiary {beneficiary}`.");
    return Ok(());
  }
  let rows = rows
    .iter()
    .map(|d| {
      vec![
        d.cedula.clone(),
        d.full_name.clone(),
        d.relationship.to_string(),
        display_age(d.birth_date, today),
        d.gender.to_string(),
      ]
    })
    .collect();
  table(
    &format!("Carga familiar de {beneficiary}"),
    vec!["Cédula", "Nombre completo", "Parentesco", "Edad", "Género"],
    rows,
  )
}

pub fn dependent(d: &Dependent, parent: &Beneficiary, today: NaiveDate) {
  let fields = [
    ("Cédula", d.cedula.clone()),
    ("Nombre completo", d.full_name.clone()),
    ("Titular", format!("{} ({})", parent.full_name, parent.cedula)),
    ("Parentesco", d.relationship.to_string()),
    ("Fecha de nacimiento", format!("{} ({} años)", d.birth_date, display_age(d.birth_date, today))),
    ("Género", d.gender.to_string()),
    ("Estado civil", d.marital_status.to_string()),
    ("Profesión", d.profession.clone()),
    ("Nivel educativo", d.education_level.clone()),
    ("Enfermedad crónica", d.chronic_illness.clone()),
    ("Discapacidad", d.disability.clone()),
    ("Teléfono", d.phone.clone()),
  ];
  print_fields(&fields);
}

pub fn account(a: &Account, streets: &[Street]) {
  let role = Role::from_id(a.role_id).map_or("desconocido", Role::label);
  let street = a
    .assigned_street_id
    .map(|id| street::find(streets, id).map_or_else(|| id.to_string(), |s| s.name.clone()))
    .unwrap_or_else(|| "todas".to_owned());
  let fields = [
    ("Id", a.id.to_string()),
    ("Usuario", a.username.clone()),
    ("Nombre completo", a.full_name.clone()),
    ("Cédula", a.national_id.clone()),
    ("Correo", a.email.clone()),
    ("Rol", role.to_owned()),
    ("Calle", street),
  ];
  print_fields(&fields);
}

pub fn accounts(rows: &[Account]) -> Result<()> {
  let rows = rows
    .iter()
    .map(|a| {
      vec![
        a.id.to_string(),
        a.username.clone(),
        a.full_name.clone(),
        Role::from_id(a.role_id).map_or("desconocido", Role::label).to_owned(),
        a.assigned_street_id.map(|id| id.to_string()).unwrap_or_default(),
      ]
    })
    .collect();
  table("Usuarios", vec!["Id", "Usuario", "Nombre completo", "Rol", "Calle"], rows)
}

pub fn streets(rows: &[Street]) -> Result<()> {
  let rows = rows.iter().map(|s| vec![s.id.to_string(), s.name.clone()]).collect();
  table("Calles", vec!["Id", "Nombre"], rows)
}

fn print_fields(fields: &[(&str, String)]) {
  let width = fields.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
  for (key, value) in fields {
    let pad = width - key.chars().count();
    println!("{key}{}  {value}", " ".repeat(pad));
  }
}
