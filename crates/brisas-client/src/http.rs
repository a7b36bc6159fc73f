//! `HttpBackend`: reqwest client for the benefits REST API.

use std::time::Duration;

use brisas_core::{
  account::{Account, AccountId, AccountUpdate, NewAccount, PasswordChange},
  backend::{
    BenefitsBackend, LoginRequest, LoginResponse, PasswordRecovery, RecoveredUsername,
    TemporaryPassword, UsernameRecovery,
  },
  beneficiary::{Beneficiary, BeneficiaryUpdate, NewBeneficiary},
  dependent::{Dependent, DependentUpdate, NewDependent},
  report::{AgeRangeEntry, FamilyBurden},
  status::Status,
  street::{Street, StreetId},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the benefits API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_BASE_URL.to_owned(), timeout: DEFAULT_TIMEOUT }
  }
}

/// Async HTTP client for the benefits REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpBackend {
  client: Client,
  config: ClientConfig,
  token:  Option<String>,
}

impl HttpBackend {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config, token: None })
  }

  /// Attach the bearer token from a login.
  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  pub fn token(&self) -> Option<&str> { self.token.as_deref() }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    debug!(%method, path, "request");
    let req = self.client.request(method, self.url(path));
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = check(self.request(Method::GET, path).send().await?).await?;
    Ok(resp.json().await?)
  }

  /// `GET` of a single record; 404 is `None`.
  async fn fetch_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
    let resp = self.request(Method::GET, path).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Ok(Some(check(resp).await?.json().await?))
  }

  async fn exchange<B: Serialize, T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: &B,
  ) -> Result<T> {
    let resp = check(self.request(method, path).json(body).send().await?).await?;
    Ok(resp.json().await?)
  }

  /// A write whose response body is ignored; callers re-fetch.
  async fn submit<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()> {
    let mut req = self.request(method, path);
    if let Some(body) = body {
      req = req.json(body);
    }
    check(req.send().await?).await?;
    Ok(())
  }
}

/// Turn a non-success response into [`Error::Api`], preferring the backend's
/// own `message` or `error` field.
async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  let message = api_message(&body).unwrap_or_else(|| fallback_message(status));
  debug!(status = status.as_u16(), message, "request failed");
  Err(Error::Api { status: status.as_u16(), message })
}

fn api_message(body: &str) -> Option<String> {
  let value: serde_json::Value = serde_json::from_str(body).ok()?;
  ["message", "error"]
    .iter()
    .find_map(|key| value.get(key)?.as_str())
    .map(str::trim)
    .filter(|m| !m.is_empty())
    .map(str::to_owned)
}

fn fallback_message(status: StatusCode) -> String {
  match status {
    StatusCode::UNAUTHORIZED => "session expired or invalid credentials".to_owned(),
    StatusCode::FORBIDDEN => "not allowed".to_owned(),
    StatusCode::NOT_FOUND => "not found".to_owned(),
    s if s.is_server_error() => "the server could not complete the request".to_owned(),
    s => format!("request failed: {s}"),
  }
}

#[derive(Serialize)]
struct StatusBody {
  estatus: Status,
}

// ─── BenefitsBackend impl ────────────────────────────────────────────────────

impl BenefitsBackend for HttpBackend {
  type Error = Error;

  // ── Session & recovery ────────────────────────────────────────────────

  async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
    self.exchange(Method::POST, "/usuarios/login", &request).await
  }

  async fn recover_password(&self, request: PasswordRecovery) -> Result<TemporaryPassword> {
    self.exchange(Method::POST, "/usuarios/recuperar", &request).await
  }

  async fn recover_username(&self, request: UsernameRecovery) -> Result<RecoveredUsername> {
    self.exchange(Method::POST, "/usuarios/recuperar-usuario", &request).await
  }

  // ── Accounts ──────────────────────────────────────────────────────────

  async fn list_accounts(&self) -> Result<Vec<Account>> { self.fetch("/usuarios").await }

  async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
    self.fetch_optional(&format!("/usuarios/{id}")).await
  }

  async fn register_account(&self, account: NewAccount) -> Result<()> {
    self.submit(Method::POST, "/usuarios/registro", Some(&account)).await
  }

  async fn update_account(&self, update: AccountUpdate) -> Result<()> {
    self.submit(Method::PUT, "/usuarios/actualizar", Some(&update)).await
  }

  async fn change_password(&self, change: PasswordChange) -> Result<()> {
    self
      .submit(Method::PUT, "/usuarios/actualizar-contrasena", Some(&change))
      .await
  }

  async fn delete_account(&self, id: AccountId) -> Result<()> {
    self.submit::<()>(Method::DELETE, &format!("/usuarios/{id}"), None).await
  }

  // ── Streets ───────────────────────────────────────────────────────────

  async fn list_streets(&self) -> Result<Vec<Street>> { self.fetch("/calles").await }

  // ── Beneficiaries ─────────────────────────────────────────────────────

  /// A row that does not parse (an `estatus` this client does not know, for
  /// one) is logged and left out so the rest of the list still loads.
  async fn list_beneficiaries(&self) -> Result<Vec<Beneficiary>> {
    let rows: Vec<serde_json::Value> = self.fetch("/beneficiarios").await?;
    Ok(lenient_rows(rows))
  }

  async fn get_beneficiary<'a>(&'a self, cedula: &'a str) -> Result<Option<Beneficiary>> {
    self.fetch_optional(&format!("/beneficiarios/{cedula}")).await
  }

  async fn create_beneficiary(&self, beneficiary: NewBeneficiary) -> Result<()> {
    self.submit(Method::POST, "/beneficiarios", Some(&beneficiary)).await
  }

  async fn update_beneficiary<'a>(&'a self, cedula: &'a str, update: BeneficiaryUpdate) -> Result<()> {
    self
      .submit(Method::PUT, &format!("/beneficiarios/{cedula}"), Some(&update))
      .await
  }

  async fn set_beneficiary_status<'a>(&'a self, cedula: &'a str, status: Status) -> Result<()> {
    self
      .submit(
        Method::PUT,
        &format!("/beneficiarios/estatus/{cedula}"),
        Some(&StatusBody { estatus: status }),
      )
      .await
  }

  // ── Dependents ────────────────────────────────────────────────────────

  async fn list_dependents<'a>(&'a self, beneficiary_cedula: &'a str) -> Result<Vec<Dependent>> {
    self
      .fetch(&format!("/dependientes/beneficiario/{beneficiary_cedula}"))
      .await
  }

  async fn get_dependent<'a>(&'a self, cedula: &'a str) -> Result<Option<Dependent>> {
    self.fetch_optional(&format!("/dependientes/{cedula}")).await
  }

  async fn create_dependent(&self, dependent: NewDependent) -> Result<()> {
    self.submit(Method::POST, "/dependientes", Some(&dependent)).await
  }

  async fn update_dependent<'a>(&'a self, cedula: &'a str, update: DependentUpdate) -> Result<()> {
    self
      .submit(Method::PUT, &format!("/dependientes/{cedula}"), Some(&update))
      .await
  }

  async fn delete_dependent<'a>(&'a self, cedula: &'a str) -> Result<()> {
    self
      .submit::<()>(Method::DELETE, &format!("/dependientes/{cedula}"), None)
      .await
  }

  // ── Reports ───────────────────────────────────────────────────────────

  async fn family_burden<'a>(&'a self, cedula: Option<&'a str>) -> Result<Vec<FamilyBurden>> {
    match cedula {
      Some(cedula) => {
        // The single-beneficiary variant may answer with one object.
        let value: serde_json::Value = self
          .fetch(&format!("/reportes/beneficiarios-dependientes/{cedula}"))
          .await?;
        one_or_many(value)
      }
      None => self.fetch("/reportes/beneficiarios-dependientes").await,
    }
  }

  async fn street_habitants(&self, street_id: Option<StreetId>) -> Result<Vec<FamilyBurden>> {
    match street_id {
      Some(id) => self.fetch(&format!("/reportes/habitantes-calle/{id}")).await,
      None => self.fetch("/reportes/habitantes-calle").await,
    }
  }

  async fn age_range(&self, min: u32, max: u32) -> Result<Vec<AgeRangeEntry>> {
    let resp = self
      .request(Method::GET, "/reportes/rango-edad")
      .query(&[("min", min), ("max", max)])
      .send()
      .await?;
    Ok(check(resp).await?.json().await?)
  }
}

fn lenient_rows(rows: Vec<serde_json::Value>) -> Vec<Beneficiary> {
  rows
    .into_iter()
    .filter_map(|row| {
      let cedula = row.get("cedula").and_then(|c| c.as_str()).unwrap_or("?").to_owned();
      serde_json::from_value::<Beneficiary>(row)
        .inspect_err(|e| warn!(%cedula, "skipping unreadable beneficiary row: {e}"))
        .ok()
    })
    .collect()
}

fn one_or_many<T: DeserializeOwned>(value: serde_json::Value) -> Result<Vec<T>> {
  if value.is_array() {
    Ok(serde_json::from_value(value)?)
  } else {
    Ok(vec![serde_json::from_value(value)?])
  }
}
