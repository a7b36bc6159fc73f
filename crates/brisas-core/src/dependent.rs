//! Dependiente: a person registered under a beneficiary's household.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::person::{Gender, MaritalStatus, Relationship, deserialize_date, none_label};

/// A household member. Belongs to exactly one beneficiary and has no status
/// of its own: its visibility follows the parent's access rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
  pub cedula:             String,
  #[serde(rename = "nombre_completo")]
  pub full_name:          String,
  #[serde(rename = "profesion", default)]
  pub profession:         String,
  #[serde(rename = "fecha_nacimiento", deserialize_with = "deserialize_date")]
  pub birth_date:         NaiveDate,
  #[serde(rename = "nivel_educativo", default)]
  pub education_level:    String,
  #[serde(rename = "enfermedad_cronica", default = "none_label")]
  pub chronic_illness:    String,
  #[serde(rename = "discapacidad", default = "none_label")]
  pub disability:         String,
  #[serde(rename = "genero")]
  pub gender:             Gender,
  #[serde(rename = "telefono", default)]
  pub phone:              String,
  #[serde(rename = "estado_civil")]
  pub marital_status:     MaritalStatus,
  #[serde(rename = "parentesco")]
  pub relationship:       Relationship,
  #[serde(rename = "cedula_beneficiario")]
  pub beneficiary_cedula: String,
}

/// Body of `POST /api/dependientes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDependent {
  pub cedula:             String,
  #[serde(rename = "cedula_beneficiario")]
  pub beneficiary_cedula: String,
  #[serde(flatten)]
  pub details:            DependentUpdate,
}

/// Every editable dependent field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentUpdate {
  #[serde(rename = "nombre_completo")]
  pub full_name:       String,
  #[serde(rename = "profesion")]
  pub profession:      String,
  #[serde(rename = "fecha_nacimiento")]
  pub birth_date:      NaiveDate,
  #[serde(rename = "nivel_educativo")]
  pub education_level: String,
  #[serde(rename = "enfermedad_cronica")]
  pub chronic_illness: String,
  #[serde(rename = "discapacidad")]
  pub disability:      String,
  #[serde(rename = "genero")]
  pub gender:          Gender,
  #[serde(rename = "telefono")]
  pub phone:           String,
  #[serde(rename = "estado_civil")]
  pub marital_status:  MaritalStatus,
  #[serde(rename = "parentesco")]
  pub relationship:    Relationship,
}

impl From<&Dependent> for DependentUpdate {
  fn from(d: &Dependent) -> Self {
    Self {
      full_name:       d.full_name.clone(),
      profession:      d.profession.clone(),
      birth_date:      d.birth_date,
      education_level: d.education_level.clone(),
      chronic_illness: d.chronic_illness.clone(),
      disability:      d.disability.clone(),
      gender:          d.gender,
      phone:           d.phone.clone(),
      marital_status:  d.marital_status,
      relationship:    d.relationship,
    }
  }
}
