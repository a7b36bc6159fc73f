//! Beneficiario: the head-of-household record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  person::{Gender, MaritalStatus, deserialize_date, none_label},
  status::Status,
  street::StreetId,
};

/// A head-of-household record eligible for community benefits.
///
/// `cedula` is the natural key. It is assigned at registration and never
/// changes; [`BeneficiaryUpdate`] deliberately has no `cedula` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
  pub cedula:          String,
  #[serde(rename = "nombre_completo")]
  pub full_name:       String,
  #[serde(rename = "profesion", default)]
  pub profession:      String,
  #[serde(rename = "fecha_nacimiento", deserialize_with = "deserialize_date")]
  pub birth_date:      NaiveDate,
  #[serde(rename = "nivel_educativo", default)]
  pub education_level: String,
  #[serde(rename = "enfermedad_cronica", default = "none_label")]
  pub chronic_illness: String,
  #[serde(rename = "discapacidad", default = "none_label")]
  pub disability:      String,
  #[serde(rename = "genero")]
  pub gender:          Gender,
  #[serde(rename = "telefono", default)]
  pub phone:           String,
  #[serde(rename = "numero_casa", default)]
  pub house_number:    String,
  #[serde(rename = "id_calle")]
  pub street_id:       StreetId,
  /// Present when the backend joins the street name into the row.
  #[serde(rename = "nombre_calle", default, skip_serializing_if = "Option::is_none")]
  pub street_name:     Option<String>,
  #[serde(rename = "estado_civil")]
  pub marital_status:  MaritalStatus,
  #[serde(rename = "estatus", default)]
  pub status:          Status,
}

impl Beneficiary {
  pub fn is_active(&self) -> bool { self.status.is_active() }
}

/// Body of `POST /api/beneficiarios`. New beneficiaries always start active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBeneficiary {
  pub cedula:  String,
  #[serde(flatten)]
  pub details: BeneficiaryUpdate,
  #[serde(rename = "estatus")]
  pub status:  Status,
}

/// Every editable beneficiary field. Used as the `PUT` body and, flattened,
/// inside [`NewBeneficiary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryUpdate {
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
  #[serde(rename = "numero_casa")]
  pub house_number:    String,
  #[serde(rename = "id_calle")]
  pub street_id:       StreetId,
  #[serde(rename = "estado_civil")]
  pub marital_status:  MaritalStatus,
}

impl From<&Beneficiary> for BeneficiaryUpdate {
  fn from(b: &Beneficiary) -> Self {
    Self {
      full_name:       b.full_name.clone(),
      profession:      b.profession.clone(),
      birth_date:      b.birth_date,
      education_level: b.education_level.clone(),
      chronic_illness: b.chronic_illness.clone(),
      disability:      b.disability.clone(),
      gender:          b.gender,
      phone:           b.phone.clone(),
      house_number:    b.house_number.clone(),
      street_id:       b.street_id,
      marital_status:  b.marital_status,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserialises_backend_row_with_defaults() {
    let row = serde_json::json!({
      "cedula": "12345678",
      "nombre_completo": "Ana Rojas",
      "fecha_nacimiento": "1985-02-01T00:00:00.000Z",
      "genero": "Femenino",
      "id_calle": 5,
      "estado_civil": "Casado",
      "estatus": "Activo"
    });
    let b: Beneficiary = serde_json::from_value(row).unwrap();
    assert_eq!(b.chronic_illness, "Ninguna");
    assert_eq!(b.disability, "Ninguna");
    assert!(b.is_active());
    assert_eq!(b.birth_date, NaiveDate::from_ymd_opt(1985, 2, 1).unwrap());
  }

  #[test]
  fn new_beneficiary_body_is_flat() {
    let body = NewBeneficiary {
      cedula:  "1".into(),
      details: BeneficiaryUpdate {
        full_name:       "X".into(),
        profession:      String::new(),
        birth_date:      NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        education_level: String::new(),
        chronic_illness: "Ninguna".into(),
        disability:      "Ninguna".into(),
        gender:          Gender::Masculino,
        phone:           String::new(),
        house_number:    "3".into(),
        street_id:       2,
        marital_status:  MaritalStatus::Soltero,
      },
      status:  Status::Active,
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["cedula"], "1");
    assert_eq!(json["id_calle"], 2);
    assert_eq!(json["estatus"], "ACTIVO");
    assert_eq!(json["fecha_nacimiento"], "2000-01-01");
  }
}
