//! Form drafts and client-side validation.
//!
//! A draft holds raw text exactly as typed into a form. Converting a draft
//! into a wire body validates every field and reports all failures at once,
//! keyed by field, before any network call is made.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  account::{Account, AccountUpdate, NewAccount, PasswordChange},
  beneficiary::{Beneficiary, BeneficiaryUpdate, NewBeneficiary},
  dependent::{Dependent, DependentUpdate, NewDependent},
  person::{Gender, MaritalStatus, NONE_LABEL, Relationship, parse_date},
  role::Role,
  status::Status,
  street::StreetId,
};

pub const PASSWORD_MIN_LEN: usize = 8;

/// A cédula as it is keyed on the backend: surrounding blanks and the
/// thousands dots of `12.345.678` removed.
pub fn normalize_cedula(raw: &str) -> String { raw.trim().chars().filter(|c| *c != '.').collect() }

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self { field, message: message.into() }
  }
}

/// All field failures found in one form submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn fields(&self) -> &[FieldError] { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn for_field(&self, field: &str) -> Option<&FieldError> {
    self.0.iter().find(|e| e.field == field)
  }
}

impl From<Vec<FieldError>> for ValidationErrors {
  fn from(errors: Vec<FieldError>) -> Self { Self(errors) }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("invalid form: ")?;
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.field, e.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Field checks ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Checker {
  errors: Vec<FieldError>,
}

impl Checker {
  fn fail(&mut self, field: &'static str, message: impl Into<String>) {
    self.errors.push(FieldError::new(field, message));
  }

  fn required(&mut self, field: &'static str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
      self.fail(field, "required");
    }
    value.to_owned()
  }

  /// Digits only once dots are removed, 6 to 10 of them.
  fn cedula(&mut self, field: &'static str, value: &str) -> String {
    let digits = normalize_cedula(value);
    if digits.is_empty() {
      self.fail(field, "required");
    } else if !digits.chars().all(|c| c.is_ascii_digit()) {
      self.fail(field, "must contain digits only");
    } else if !(6..=10).contains(&digits.len()) {
      self.fail(field, "must have between 6 and 10 digits");
    }
    digits
  }

  /// Optional; when present, an optional `+` followed by 10 to 12 digits.
  /// Spaces and dashes are dropped.
  fn phone(&mut self, field: &'static str, value: &str) -> String {
    let compact: String = value
      .trim()
      .chars()
      .filter(|c| !matches!(c, ' ' | '-'))
      .collect();
    if compact.is_empty() {
      return compact;
    }
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    if !digits.chars().all(|c| c.is_ascii_digit()) || !(10..=12).contains(&digits.len()) {
      self.fail(field, "must be 10 to 12 digits, optionally prefixed by +");
    }
    compact
  }

  fn birth_date(&mut self, field: &'static str, value: &str, today: NaiveDate) -> Option<NaiveDate> {
    if value.trim().is_empty() {
      self.fail(field, "required");
      return None;
    }
    match parse_date(value) {
      Ok(date) if date > today => {
        self.fail(field, "cannot be in the future");
        None
      }
      Ok(date) => Some(date),
      Err(_) => {
        self.fail(field, "expected YYYY-MM-DD");
        None
      }
    }
  }

  fn choice<T: FromStr>(&mut self, field: &'static str, value: &str) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
      self.fail(field, "required");
      return None;
    }
    let parsed = value.parse().ok();
    if parsed.is_none() {
      self.fail(field, format!("unrecognised value {value:?}"));
    }
    parsed
  }

  fn street(&mut self, field: &'static str, value: Option<StreetId>) -> Option<StreetId> {
    if value.is_none() {
      self.fail(field, "required");
    }
    value
  }

  fn email(&mut self, field: &'static str, value: &str) -> String {
    let value = value.trim();
    let well_formed = value
      .split_once('@')
      .is_some_and(|(local, domain)| {
        !local.is_empty()
          && domain.contains('.')
          && !domain.starts_with('.')
          && !domain.ends_with('.')
          && !domain.contains('@')
      })
      && !value.contains(char::is_whitespace);
    if value.is_empty() {
      self.fail(field, "required");
    } else if !well_formed {
      self.fail(field, "not a valid email address");
    }
    value.to_owned()
  }

  fn username(&mut self, field: &'static str, value: &str) -> String {
    let value = value.trim();
    if value.len() < 3 {
      self.fail(field, "must have at least 3 characters");
    } else if value.contains(char::is_whitespace) {
      self.fail(field, "must not contain spaces");
    }
    value.to_owned()
  }

  fn password(&mut self, field: &'static str, value: &str) -> String {
    if value.chars().count() < PASSWORD_MIN_LEN {
      self.fail(field, format!("must have at least {PASSWORD_MIN_LEN} characters"));
    }
    value.to_owned()
  }

  fn finish(self) -> Result<(), ValidationErrors> {
    if self.errors.is_empty() { Ok(()) } else { Err(self.errors.into()) }
  }

  fn into_errors(self) -> ValidationErrors { self.errors.into() }
}

fn or_none_label(value: &str) -> String {
  let value = value.trim();
  if value.is_empty() { NONE_LABEL.to_owned() } else { value.to_owned() }
}

// ─── Beneficiary ─────────────────────────────────────────────────────────────

/// Raw beneficiary form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeneficiaryDraft {
  pub cedula:          String,
  pub full_name:       String,
  pub profession:      String,
  pub birth_date:      String,
  pub education_level: String,
  /// Blank means "Ninguna".
  pub chronic_illness: String,
  /// Blank means "Ninguna".
  pub disability:      String,
  pub gender:          String,
  pub phone:           String,
  pub house_number:    String,
  pub street_id:       Option<StreetId>,
  pub marital_status:  String,
}

impl BeneficiaryDraft {
  /// Validate for registration. The new record starts `Active`.
  pub fn to_new(&self, today: NaiveDate) -> Result<NewBeneficiary, ValidationErrors> {
    let mut c = Checker::default();
    let cedula = c.cedula("cedula", &self.cedula);
    let details = self.check_details(&mut c, today);
    let Some(details) = details else {
      return Err(c.into_errors());
    };
    c.finish()?;
    Ok(NewBeneficiary { cedula, details, status: Status::Active })
  }

  /// Validate for an edit. `cedula` is not part of the result.
  pub fn to_update(&self, today: NaiveDate) -> Result<BeneficiaryUpdate, ValidationErrors> {
    let mut c = Checker::default();
    let Some(details) = self.check_details(&mut c, today) else {
      return Err(c.into_errors());
    };
    c.finish()?;
    Ok(details)
  }

  fn check_details(&self, c: &mut Checker, today: NaiveDate) -> Option<BeneficiaryUpdate> {
    let full_name = c.required("nombre_completo", &self.full_name);
    let birth_date = c.birth_date("fecha_nacimiento", &self.birth_date, today);
    let gender = c.choice::<Gender>("genero", &self.gender);
    let phone = c.phone("telefono", &self.phone);
    let house_number = c.required("numero_casa", &self.house_number);
    let street_id = c.street("id_calle", self.street_id);
    let marital_status = c.choice::<MaritalStatus>("estado_civil", &self.marital_status);

    Some(BeneficiaryUpdate {
      full_name,
      profession: self.profession.trim().to_owned(),
      birth_date: birth_date?,
      education_level: self.education_level.trim().to_owned(),
      chronic_illness: or_none_label(&self.chronic_illness),
      disability: or_none_label(&self.disability),
      gender: gender?,
      phone,
      house_number,
      street_id: street_id?,
      marital_status: marital_status?,
    })
  }
}

impl From<&Beneficiary> for BeneficiaryDraft {
  fn from(b: &Beneficiary) -> Self {
    Self {
      cedula:          b.cedula.clone(),
      full_name:       b.full_name.clone(),
      profession:      b.profession.clone(),
      birth_date:      b.birth_date.format("%Y-%m-%d").to_string(),
      education_level: b.education_level.clone(),
      chronic_illness: b.chronic_illness.clone(),
      disability:      b.disability.clone(),
      gender:          b.gender.to_string(),
      phone:           b.phone.clone(),
      house_number:    b.house_number.clone(),
      street_id:       Some(b.street_id),
      marital_status:  b.marital_status.to_string(),
    }
  }
}

// ─── Dependent ───────────────────────────────────────────────────────────────

/// Raw dependent form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependentDraft {
  pub cedula:             String,
  pub beneficiary_cedula: String,
  pub full_name:          String,
  pub profession:         String,
  pub birth_date:         String,
  pub education_level:    String,
  pub chronic_illness:    String,
  pub disability:         String,
  pub gender:             String,
  pub phone:              String,
  pub marital_status:     String,
  pub relationship:       String,
}

impl DependentDraft {
  /// An empty draft pre-filled with the household it will belong to.
  pub fn for_beneficiary(beneficiary_cedula: impl Into<String>) -> Self {
    Self { beneficiary_cedula: beneficiary_cedula.into(), ..Self::default() }
  }

  pub fn to_new(&self, today: NaiveDate) -> Result<NewDependent, ValidationErrors> {
    let mut c = Checker::default();
    let cedula = c.cedula("cedula", &self.cedula);
    let beneficiary_cedula = c.cedula("cedula_beneficiario", &self.beneficiary_cedula);
    let Some(details) = self.check_details(&mut c, today) else {
      return Err(c.into_errors());
    };
    if cedula == beneficiary_cedula && !cedula.is_empty() {
      c.fail("cedula", "a dependent cannot share the beneficiary's cedula");
    }
    c.finish()?;
    Ok(NewDependent { cedula, beneficiary_cedula, details })
  }

  pub fn to_update(&self, today: NaiveDate) -> Result<DependentUpdate, ValidationErrors> {
    let mut c = Checker::default();
    let Some(details) = self.check_details(&mut c, today) else {
      return Err(c.into_errors());
    };
    c.finish()?;
    Ok(details)
  }

  fn check_details(&self, c: &mut Checker, today: NaiveDate) -> Option<DependentUpdate> {
    let full_name = c.required("nombre_completo", &self.full_name);
    let birth_date = c.birth_date("fecha_nacimiento", &self.birth_date, today);
    let gender = c.choice::<Gender>("genero", &self.gender);
    let phone = c.phone("telefono", &self.phone);
    let marital_status = c.choice::<MaritalStatus>("estado_civil", &self.marital_status);
    let relationship = c.choice::<Relationship>("parentesco", &self.relationship);

    Some(DependentUpdate {
      full_name,
      profession: self.profession.trim().to_owned(),
      birth_date: birth_date?,
      education_level: self.education_level.trim().to_owned(),
      chronic_illness: or_none_label(&self.chronic_illness),
      disability: or_none_label(&self.disability),
      gender: gender?,
      phone,
      marital_status: marital_status?,
      relationship: relationship?,
    })
  }
}

impl From<&Dependent> for DependentDraft {
  fn from(d: &Dependent) -> Self {
    Self {
      cedula:             d.cedula.clone(),
      beneficiary_cedula: d.beneficiary_cedula.clone(),
      full_name:          d.full_name.clone(),
      profession:         d.profession.clone(),
      birth_date:         d.birth_date.format("%Y-%m-%d").to_string(),
      education_level:    d.education_level.clone(),
      chronic_illness:    d.chronic_illness.clone(),
      disability:         d.disability.clone(),
      gender:             d.gender.to_string(),
      phone:              d.phone.clone(),
      marital_status:     d.marital_status.to_string(),
      relationship:       d.relationship.to_string(),
    }
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Raw account form input, used both for registration and profile edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDraft {
  pub full_name:          String,
  pub username:           String,
  pub national_id:        String,
  pub email:              String,
  pub password:           String,
  pub password_confirm:   String,
  pub assigned_street_id: Option<StreetId>,
  pub profile_photo:      Option<String>,
}

impl AccountDraft {
  /// Validate for registration. The role is always street chief, which needs
  /// an assigned street.
  pub fn to_new(&self) -> Result<NewAccount, ValidationErrors> {
    let mut c = Checker::default();
    let full_name = c.required("nombre_completo", &self.full_name);
    let username = c.username("usuario", &self.username);
    let national_id = c.cedula("cedula", &self.national_id);
    let email = c.email("correo", &self.email);
    let password = c.password("contrasena", &self.password);
    if self.password != self.password_confirm {
      c.fail("confirmar_contrasena", "passwords do not match");
    }
    let assigned_street_id = c.street("id_calle", self.assigned_street_id);
    c.finish()?;
    Ok(NewAccount {
      full_name,
      username,
      national_id,
      email,
      password,
      role_id: Role::STREET_CHIEF_ID,
      assigned_street_id,
    })
  }

  /// Validate an edit of account `id`. Password fields are ignored.
  pub fn to_update(&self, id: i64) -> Result<AccountUpdate, ValidationErrors> {
    let mut c = Checker::default();
    let full_name = c.required("nombre_completo", &self.full_name);
    let username = c.username("usuario", &self.username);
    let email = c.email("correo", &self.email);
    c.finish()?;
    Ok(AccountUpdate {
      id,
      full_name,
      username,
      email,
      assigned_street_id: self.assigned_street_id,
      profile_photo: self.profile_photo.clone(),
    })
  }
}

impl From<&Account> for AccountDraft {
  fn from(a: &Account) -> Self {
    Self {
      full_name:          a.full_name.clone(),
      username:           a.username.clone(),
      national_id:        a.national_id.clone(),
      email:              a.email.clone(),
      password:           String::new(),
      password_confirm:   String::new(),
      assigned_street_id: a.assigned_street_id,
      profile_photo:      a.profile_photo.clone(),
    }
  }
}

/// Raw password-change form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordDraft {
  pub current:     String,
  pub new:         String,
  pub new_confirm: String,
}

impl PasswordDraft {
  pub fn to_change(&self, id: i64) -> Result<PasswordChange, ValidationErrors> {
    let mut c = Checker::default();
    if self.current.is_empty() {
      c.fail("contrasena_actual", "required");
    }
    let new_password = c.password("nueva_contrasena", &self.new);
    if self.new != self.new_confirm {
      c.fail("confirmar_contrasena", "passwords do not match");
    } else if !self.new.is_empty() && self.new == self.current {
      c.fail("nueva_contrasena", "must differ from the current password");
    }
    c.finish()?;
    Ok(PasswordChange { id, current_password: self.current.clone(), new_password })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  fn valid_beneficiary() -> BeneficiaryDraft {
    BeneficiaryDraft {
      cedula:          "12.345.678".into(),
      full_name:       " Luis Marcano ".into(),
      birth_date:      "1970-03-09".into(),
      gender:          "masculino".into(),
      phone:           "0414-555-1234".into(),
      house_number:    "12-B".into(),
      street_id:       Some(5),
      marital_status:  "Unión Libre".into(),
      ..BeneficiaryDraft::default()
    }
  }

  #[test]
  fn valid_beneficiary_normalises_fields() {
    let new = valid_beneficiary().to_new(today()).unwrap();
    assert_eq!(new.cedula, "12345678");
    assert_eq!(new.details.full_name, "Luis Marcano");
    assert_eq!(new.details.phone, "04145551234");
    assert_eq!(new.details.chronic_illness, "Ninguna");
    assert_eq!(new.details.disability, "Ninguna");
    assert_eq!(new.details.marital_status, MaritalStatus::UnionLibre);
    assert_eq!(new.status, Status::Active);
  }

  #[test]
  fn reports_every_bad_field() {
    let draft = BeneficiaryDraft {
      cedula: "12a".into(),
      birth_date: "2030-01-01".into(),
      gender: "otro".into(),
      ..BeneficiaryDraft::default()
    };
    let errors = draft.to_new(today()).unwrap_err();
    for field in [
      "cedula",
      "nombre_completo",
      "fecha_nacimiento",
      "genero",
      "numero_casa",
      "id_calle",
      "estado_civil",
    ] {
      assert!(errors.for_field(field).is_some(), "missing error for {field}");
    }
  }

  #[test]
  fn short_phone_is_rejected() {
    let mut draft = valid_beneficiary();
    draft.phone = "12345".into();
    let errors = draft.to_update(today()).unwrap_err();
    assert!(errors.for_field("telefono").is_some());
    assert_eq!(errors.fields().len(), 1);
  }

  #[test]
  fn dependent_needs_a_household() {
    let draft = DependentDraft {
      cedula: "30111222".into(),
      full_name: "Sofía".into(),
      birth_date: "2015-05-05".into(),
      gender: "Femenino".into(),
      marital_status: "Soltero".into(),
      relationship: "Hija".into(),
      ..DependentDraft::default()
    };
    let errors = draft.to_new(today()).unwrap_err();
    assert!(errors.for_field("cedula_beneficiario").is_some());

    let draft = DependentDraft { beneficiary_cedula: "12345678".into(), ..draft };
    let new = draft.to_new(today()).unwrap();
    assert_eq!(new.beneficiary_cedula, "12345678");
    assert_eq!(new.details.relationship, Relationship::Hija);
  }

  #[test]
  fn new_accounts_are_street_chiefs() {
    let draft = AccountDraft {
      full_name: "Carmen Díaz".into(),
      username: "cdiaz".into(),
      national_id: "9876543".into(),
      email: "carmen@example.org".into(),
      password: "secreta123".into(),
      password_confirm: "secreta123".into(),
      assigned_street_id: Some(2),
      profile_photo: None,
    };
    assert_eq!(draft.to_new().unwrap().role_id, Role::STREET_CHIEF_ID);

    let bad = AccountDraft {
      email: "carmen@".into(),
      password_confirm: "otra".into(),
      ..draft
    };
    let errors = bad.to_new().unwrap_err();
    assert!(errors.for_field("correo").is_some());
    assert!(errors.for_field("confirmar_contrasena").is_some());
  }

  #[test]
  fn password_change_rules() {
    let draft = PasswordDraft {
      current:     "viejaclave".into(),
      new:         "nuevaclave1".into(),
      new_confirm: "nuevaclave1".into(),
    };
    assert!(draft.to_change(3).is_ok());

    let same = PasswordDraft { new: "viejaclave".into(), new_confirm: "viejaclave".into(), ..draft };
    assert!(same.to_change(3).unwrap_err().for_field("nueva_contrasena").is_some());
  }
}
