//! The logged-in session, persisted between invocations.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use brisas_core::{account::Account, backend::LoginResponse, role::Actor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Bearer token plus the account profile returned at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub token:        String,
  pub account:      Account,
  pub logged_in_at: DateTime<Utc>,
}

impl Session {
  pub fn actor(&self) -> Actor { Actor::from(&self.account) }
}

impl From<LoginResponse> for Session {
  fn from(resp: LoginResponse) -> Self {
    Self { token: resp.token, account: resp.account, logged_in_at: Utc::now() }
  }
}

/// A JSON session file. Written on login, read on start-up, removed on
/// logout.
#[derive(Debug, Clone)]
pub struct SessionStore {
  path: PathBuf,
}

impl SessionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// `<data dir>/brisas/session.json`, when the platform has a data dir.
  pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("brisas").join("session.json"))
  }

  pub fn path(&self) -> &Path { &self.path }

  /// `Ok(None)` when no session has been saved.
  pub fn load(&self) -> Result<Option<Session>> {
    match fs::read(&self.path) {
      Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  /// Like [`load`](Self::load), but a missing session is an error.
  pub fn require(&self) -> Result<Session> { self.load()?.ok_or(Error::NotLoggedIn) }

  pub fn save(&self, session: &Session) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
    restrict_permissions(&self.path)?;
    debug!(path = %self.path.display(), "session saved");
    Ok(())
  }

  /// Remove the session file. Clearing an absent session is not an error.
  pub fn clear(&self) -> Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_: &Path) -> io::Result<()> { Ok(()) }
