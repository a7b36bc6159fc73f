//! The `BenefitsBackend` trait and the auth/recovery payloads.
//!
//! The REST backend is authoritative for storage, uniqueness and access
//! enforcement. The trait is implemented by `brisas-client` over HTTP and by
//! in-memory fakes in tests; everything above it depends on this abstraction.
//!
//! Mutations return `()`. Callers re-fetch after every write instead of
//! trusting a mutation response, so client-held state never drifts from the
//! server's.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  account::{Account, AccountId, AccountUpdate, NewAccount, PasswordChange},
  beneficiary::{Beneficiary, BeneficiaryUpdate, NewBeneficiary},
  dependent::{Dependent, DependentUpdate, NewDependent},
  report::{AgeRangeEntry, FamilyBurden},
  status::Status,
  street::{Street, StreetId},
};

// ─── Auth payloads ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
  #[serde(rename = "usuario")]
  pub username: String,
  #[serde(rename = "contrasena")]
  pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
  pub token:   String,
  #[serde(rename = "usuario")]
  pub account: Account,
}

/// `POST /api/usuarios/recuperar`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRecovery {
  #[serde(rename = "correo")]
  pub email:       String,
  #[serde(rename = "cedula")]
  pub national_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryPassword {
  #[serde(rename = "contrasena_temporal")]
  pub password: String,
}

/// `POST /api/usuarios/recuperar-usuario`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameRecovery {
  #[serde(rename = "cedula")]
  pub national_id: String,
  #[serde(rename = "nombre_completo")]
  pub full_name:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredUsername {
  #[serde(rename = "usuario")]
  pub username: String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the benefits REST backend.
///
/// Single-record reads return `Ok(None)` when the record does not exist.
/// All methods return `Send` futures so implementations can be driven from
/// spawned tokio tasks.
pub trait BenefitsBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Session & recovery ────────────────────────────────────────────────

  fn login(
    &self,
    request: LoginRequest,
  ) -> impl Future<Output = Result<LoginResponse, Self::Error>> + Send + '_;

  fn recover_password(
    &self,
    request: PasswordRecovery,
  ) -> impl Future<Output = Result<TemporaryPassword, Self::Error>> + Send + '_;

  fn recover_username(
    &self,
    request: UsernameRecovery,
  ) -> impl Future<Output = Result<RecoveredUsername, Self::Error>> + Send + '_;

  // ── Accounts ──────────────────────────────────────────────────────────

  fn list_accounts(&self) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn register_account(
    &self,
    account: NewAccount,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_account(
    &self,
    update: AccountUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn change_password(
    &self,
    change: PasswordChange,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_account(&self, id: AccountId) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Streets ───────────────────────────────────────────────────────────

  fn list_streets(&self) -> impl Future<Output = Result<Vec<Street>, Self::Error>> + Send + '_;

  // ── Beneficiaries ─────────────────────────────────────────────────────

  /// Every beneficiary, both statuses. Scoping happens client-side after.
  fn list_beneficiaries(
    &self,
  ) -> impl Future<Output = Result<Vec<Beneficiary>, Self::Error>> + Send + '_;

  fn get_beneficiary<'a>(
    &'a self,
    cedula: &'a str,
  ) -> impl Future<Output = Result<Option<Beneficiary>, Self::Error>> + Send + 'a;

  fn create_beneficiary(
    &self,
    beneficiary: NewBeneficiary,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_beneficiary<'a>(
    &'a self,
    cedula: &'a str,
    update: BeneficiaryUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Status-only transition (`PUT /api/beneficiarios/estatus/{cedula}`).
  fn set_beneficiary_status<'a>(
    &'a self,
    cedula: &'a str,
    status: Status,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Dependents ────────────────────────────────────────────────────────

  fn list_dependents<'a>(
    &'a self,
    beneficiary_cedula: &'a str,
  ) -> impl Future<Output = Result<Vec<Dependent>, Self::Error>> + Send + 'a;

  fn get_dependent<'a>(
    &'a self,
    cedula: &'a str,
  ) -> impl Future<Output = Result<Option<Dependent>, Self::Error>> + Send + 'a;

  fn create_dependent(
    &self,
    dependent: NewDependent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_dependent<'a>(
    &'a self,
    cedula: &'a str,
    update: DependentUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_dependent<'a>(
    &'a self,
    cedula: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reports ───────────────────────────────────────────────────────────

  /// `GET /api/reportes/beneficiarios-dependientes[/{cedula}]`
  fn family_burden<'a>(
    &'a self,
    cedula: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<FamilyBurden>, Self::Error>> + Send + 'a;

  /// `GET /api/reportes/habitantes-calle[/{idCalle}]`
  fn street_habitants(
    &self,
    street_id: Option<StreetId>,
  ) -> impl Future<Output = Result<Vec<FamilyBurden>, Self::Error>> + Send + '_;

  /// `GET /api/reportes/rango-edad?min=&max=`
  fn age_range(
    &self,
    min: u32,
    max: u32,
  ) -> impl Future<Output = Result<Vec<AgeRangeEntry>, Self::Error>> + Send + '_;
}
