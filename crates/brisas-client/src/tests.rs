//! `HttpBackend` against an in-process axum fake of the benefits API.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
  time::Duration,
};

use axum::{
  Json, Router,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{get, post, put},
};
use brisas_core::{
  backend::{BenefitsBackend, LoginRequest},
  report::PersonKind,
  scope::BeneficiaryQuery,
  service::BenefitsService,
  status::Status,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{ClientConfig, Error, HttpBackend, Session, SessionStore};

// ─── Fake backend ────────────────────────────────────────────────────────────

const TOKEN: &str = "tok-123";

#[derive(Default)]
struct Fake {
  beneficiaries: Vec<Value>,
  status_bodies: Vec<(String, Value)>,
  age_queries:   Vec<HashMap<String, String>>,
}

type Shared = Arc<Mutex<Fake>>;

fn chief_account() -> Value {
  json!({
    "id": 2,
    "nombre_completo": "Marta Pérez",
    "usuario": "jefe",
    "cedula": "11222333",
    "correo": "marta@example.org",
    "id_rol": 2,
    "id_calle": 5
  })
}

fn beneficiary_json(cedula: &str, street: i64, status: &str) -> Value {
  json!({
    "cedula": cedula,
    "nombre_completo": format!("Beneficiario {cedula}"),
    "fecha_nacimiento": "1975-04-02T00:00:00.000Z",
    "genero": "Masculino",
    "telefono": "04140000000",
    "numero_casa": "3",
    "id_calle": street,
    "estado_civil": "Casado",
    "estatus": status
  })
}

fn authorized(headers: &HeaderMap) -> bool {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
  (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Token requerido" }))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
  if body["usuario"] == "jefe" && body["contrasena"] == "clave-secreta" {
    Json(json!({ "token": TOKEN, "usuario": chief_account() })).into_response()
  } else {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Credenciales inválidas" }))).into_response()
  }
}

async fn list_beneficiaries(State(fake): State<Shared>, headers: HeaderMap) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  Json(fake.lock().unwrap().beneficiaries.clone()).into_response()
}

async fn get_beneficiary(
  State(fake): State<Shared>,
  Path(cedula): Path<String>,
  headers: HeaderMap,
) -> Response {
  if !authorized(&headers) {
    return unauthorized();
  }
  let fake = fake.lock().unwrap();
  match fake.beneficiaries.iter().find(|b| b["cedula"] == cedula.as_str()) {
    Some(b) => Json(b.clone()).into_response(),
    None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Beneficiario no encontrado" })))
      .into_response(),
  }
}

async fn set_status(
  State(fake): State<Shared>,
  Path(cedula): Path<String>,
  Json(body): Json<Value>,
) -> StatusCode {
  let mut fake = fake.lock().unwrap();
  if let Some(b) = fake.beneficiaries.iter_mut().find(|b| b["cedula"] == cedula.as_str()) {
    // The real backend echoes the title-case form back on reads.
    b["estatus"] = json!(if body["estatus"] == "INACTIVO" { "Inactivo" } else { "Activo" });
  }
  fake.status_bodies.push((cedula, body));
  StatusCode::OK
}

async fn streets() -> Json<Value> {
  Json(json!([
    { "id_calle": 3, "nombre": "Los Mangos" },
    { "id_calle": 5, "nombre": "Las Acacias" }
  ]))
}

async fn age_range(State(fake): State<Shared>, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
  fake.lock().unwrap().age_queries.push(q);
  Json(json!([
    {
      "cedula": "30111222",
      "nombre_completo": "Niña Uno",
      "fecha_nacimiento": "2015-01-01",
      "genero": "Femenino",
      "tipo": "Dependiente",
      "cedula_beneficiario": "20000001",
      "id_calle": 5
    }
  ]))
}

async fn family_burden_one(Path(cedula): Path<String>) -> Json<Value> {
  // Not wrapped in an array.
  Json(json!({
    "beneficiario": beneficiary_json(&cedula, 5, "ACTIVO"),
    "dependientes": []
  }))
}

async fn broken() -> StatusCode { StatusCode::INTERNAL_SERVER_ERROR }

async fn spawn() -> (String, Shared) {
  let fake: Shared = Arc::new(Mutex::new(Fake {
    beneficiaries: vec![
      beneficiary_json("10000001", 3, "ACTIVO"),
      beneficiary_json("20000001", 5, "Activo"),
      beneficiary_json("20000002", 5, "inactivo"),
    ],
    ..Fake::default()
  }));

  let app = Router::new()
    .route("/api/usuarios/login", post(login))
    .route("/api/usuarios", get(broken))
    .route("/api/beneficiarios", get(list_beneficiaries))
    .route("/api/beneficiarios/{cedula}", get(get_beneficiary))
    .route("/api/beneficiarios/estatus/{cedula}", put(set_status))
    .route("/api/calles", get(streets))
    .route("/api/reportes/rango-edad", get(age_range))
    .route("/api/reportes/beneficiarios-dependientes/{cedula}", get(family_burden_one))
    .with_state(fake.clone());

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  (format!("http://{addr}"), fake)
}

fn backend(base_url: &str) -> HttpBackend {
  HttpBackend::new(ClientConfig { base_url: base_url.to_owned(), timeout: Duration::from_secs(5) })
    .unwrap()
}

async fn logged_in(base_url: &str) -> (HttpBackend, Session) {
  let anon = backend(base_url);
  let resp = anon
    .login(LoginRequest { username: "jefe".into(), password: "clave-secreta".into() })
    .await
    .unwrap();
  let session = Session::from(resp);
  (anon.with_token(session.token.clone()), session)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_token_and_profile() {
  let (url, _) = spawn().await;
  let (http, session) = logged_in(&url).await;
  assert_eq!(http.token(), Some(TOKEN));
  assert_eq!(session.account.username, "jefe");
  assert_eq!(session.account.assigned_street_id, Some(5));
  assert_eq!(session.actor().assigned_street_id, Some(5));
}

#[tokio::test]
async fn bad_credentials_surface_backend_message() {
  let (url, _) = spawn().await;
  let err = backend(&url)
    .login(LoginRequest { username: "jefe".into(), password: "nope".into() })
    .await
    .unwrap_err();
  match err {
    Error::Api { status, message } => {
      assert_eq!(status, 401);
      assert_eq!(message, "Credenciales inválidas");
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
  let (url, _) = spawn().await;
  let err = backend(&url).list_beneficiaries().await.unwrap_err();
  assert!(err.is_unauthorized());
  assert!(err.to_string().contains("Token requerido"));
}

#[tokio::test]
async fn empty_error_body_gets_fallback_message() {
  let (url, _) = spawn().await;
  let err = backend(&url).list_accounts().await.unwrap_err();
  assert!(matches!(err, Error::Api { status: 500, ref message } if !message.is_empty()));
}

#[tokio::test]
async fn mixed_case_status_is_normalised() {
  let (url, _) = spawn().await;
  let (http, _) = logged_in(&url).await;
  let rows = http.list_beneficiaries().await.unwrap();
  let statuses: Vec<_> = rows.iter().map(|b| b.status).collect();
  assert_eq!(statuses, [Status::Active, Status::Active, Status::Inactive]);
  assert_eq!(rows[0].birth_date.to_string(), "1975-04-02");
}

#[tokio::test]
async fn unknown_status_row_is_skipped() {
  let (url, fake) = spawn().await;
  fake.lock().unwrap().beneficiaries.push(beneficiary_json("20000099", 5, "PENDIENTE"));
  let (http, _) = logged_in(&url).await;
  let rows = http.list_beneficiaries().await.unwrap();
  assert_eq!(rows.len(), 3);
  assert!(rows.iter().all(|b| b.cedula != "20000099"));
}

#[tokio::test]
async fn missing_record_is_none() {
  let (url, _) = spawn().await;
  let (http, _) = logged_in(&url).await;
  assert!(http.get_beneficiary("99999999").await.unwrap().is_none());
  assert!(http.get_beneficiary("20000001").await.unwrap().is_some());
}

#[tokio::test]
async fn age_range_sends_bounds_as_query() {
  let (url, fake) = spawn().await;
  let (http, _) = logged_in(&url).await;
  let people = http.age_range(0, 12).await.unwrap();
  assert_eq!(people[0].kind, PersonKind::Dependent);
  let q = fake.lock().unwrap().age_queries[0].clone();
  assert_eq!(q.get("min").map(String::as_str), Some("0"));
  assert_eq!(q.get("max").map(String::as_str), Some("12"));
}

#[tokio::test]
async fn single_family_burden_accepts_bare_object() {
  let (url, _) = spawn().await;
  let (http, _) = logged_in(&url).await;
  let rows = http.family_burden(Some("20000001")).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].beneficiary.cedula, "20000001");
}

#[tokio::test]
async fn service_over_http_scopes_and_disables() {
  let (url, fake) = spawn().await;
  let (http, session) = logged_in(&url).await;
  let svc = BenefitsService::new(http, session.account);

  let visible = svc.beneficiaries(&BeneficiaryQuery::default()).await.unwrap();
  let ids: Vec<_> = visible.iter().map(|b| b.cedula.as_str()).collect();
  assert_eq!(ids, ["20000001", "20000002"]);

  let outcome = svc.disable("20000001").await.unwrap();
  assert!(outcome.transition.changed());
  assert_eq!(outcome.beneficiary.status, Status::Inactive);

  let bodies = fake.lock().unwrap().status_bodies.clone();
  assert_eq!(bodies, [("20000001".to_owned(), json!({ "estatus": "INACTIVO" }))]);

  let err = svc.disable("10000001").await.unwrap_err();
  assert!(matches!(err, brisas_core::Error::Access(_)));
  assert_eq!(fake.lock().unwrap().status_bodies.len(), 1);
}

// ─── Session file ────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_file_round_trip() {
  let (url, _) = spawn().await;
  let (_, session) = logged_in(&url).await;

  let dir = tempfile::tempdir().unwrap();
  let store = SessionStore::new(dir.path().join("nested").join("session.json"));
  assert!(store.load().unwrap().is_none());
  assert!(matches!(store.require(), Err(Error::NotLoggedIn)));

  store.save(&session).unwrap();
  assert_eq!(store.load().unwrap(), Some(session));

  store.clear().unwrap();
  assert!(store.load().unwrap().is_none());
  store.clear().unwrap();
}
