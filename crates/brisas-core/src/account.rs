//! System operator accounts (usuarios).

use serde::{Deserialize, Serialize};

use crate::street::StreetId;

pub type AccountId = i64;

/// A system operator. Distinct from beneficiaries and dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub id:                 AccountId,
  #[serde(rename = "nombre_completo")]
  pub full_name:          String,
  #[serde(rename = "usuario")]
  pub username:           String,
  #[serde(rename = "cedula")]
  pub national_id:        String,
  #[serde(rename = "correo", default)]
  pub email:              String,
  #[serde(rename = "id_rol")]
  pub role_id:            i64,
  #[serde(rename = "id_calle", default)]
  pub assigned_street_id: Option<StreetId>,
  #[serde(rename = "foto_perfil", default)]
  pub profile_photo:      Option<String>,
}

/// Body of `POST /api/usuarios/registro`.
///
/// `role_id` is overwritten with the street-chief role by
/// [`crate::service::BenefitsService::register_account`] before sending; the
/// client never creates another community-leader account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
  #[serde(rename = "nombre_completo")]
  pub full_name:          String,
  #[serde(rename = "usuario")]
  pub username:           String,
  #[serde(rename = "cedula")]
  pub national_id:        String,
  #[serde(rename = "correo")]
  pub email:              String,
  #[serde(rename = "contrasena")]
  pub password:           String,
  #[serde(rename = "id_rol")]
  pub role_id:            i64,
  #[serde(rename = "id_calle")]
  pub assigned_street_id: Option<StreetId>,
}

/// Body of `PUT /api/usuarios/actualizar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
  pub id:                 AccountId,
  #[serde(rename = "nombre_completo")]
  pub full_name:          String,
  #[serde(rename = "usuario")]
  pub username:           String,
  #[serde(rename = "correo")]
  pub email:              String,
  #[serde(rename = "id_calle")]
  pub assigned_street_id: Option<StreetId>,
  #[serde(rename = "foto_perfil", skip_serializing_if = "Option::is_none")]
  pub profile_photo:      Option<String>,
}

impl From<&Account> for AccountUpdate {
  fn from(a: &Account) -> Self {
    Self {
      id:                 a.id,
      full_name:          a.full_name.clone(),
      username:           a.username.clone(),
      email:              a.email.clone(),
      assigned_street_id: a.assigned_street_id,
      profile_photo:      a.profile_photo.clone(),
    }
  }
}

/// Body of `PUT /api/usuarios/actualizar-contrasena`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChange {
  pub id:               AccountId,
  #[serde(rename = "contrasena_actual")]
  pub current_password: String,
  #[serde(rename = "nueva_contrasena")]
  pub new_password:     String,
}
