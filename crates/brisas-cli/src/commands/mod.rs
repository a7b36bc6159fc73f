//! Subcommand handlers.

pub mod accounts;
pub mod auth;
pub mod beneficiaries;
pub mod dependents;
pub mod reports;

use anyhow::{Context, Result};
use brisas_client::{HttpBackend, SessionStore};
use brisas_core::service::BenefitsService;
use chrono::{Local, NaiveDate};

use crate::config::Settings;

pub type Service = BenefitsService<HttpBackend>;

/// Everything a handler needs to reach the backend.
pub struct Ctx {
  pub settings: Settings,
  pub sessions: SessionStore,
}

impl Ctx {
  pub fn new(settings: Settings) -> Result<Self> {
    let sessions = settings.session_store()?;
    Ok(Self { settings, sessions })
  }

  /// A client without a token, for login and recovery.
  pub fn anonymous(&self) -> Result<HttpBackend> {
    HttpBackend::new(self.settings.client()).context("failed to build HTTP client")
  }

  /// A service bound to the saved session.
  pub fn service(&self) -> Result<Service> {
    let session = self.sessions.require()?;
    let http = self.anonymous()?.with_token(session.token);
    Ok(BenefitsService::new(http, session.account))
  }
}

/// "Today" for age calculations: the local calendar date.
pub fn today() -> NaiveDate { Local::now().date_naive() }

/// Ask before an irreversible or status-changing action unless `--yes`.
pub(crate) fn confirmed(yes: bool, question: &str) -> Result<bool> {
  if yes {
    return Ok(true);
  }
  let ok = crate::prompt::confirm(question)?;
  if !ok {
    println!("Cancelled.");
  }
  Ok(ok)
}
