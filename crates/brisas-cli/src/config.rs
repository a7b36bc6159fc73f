//! Layered settings: defaults, then the config file, then `BRISAS_*`
//! environment variables, then command-line flags.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use brisas_client::{ClientConfig, SessionStore, http::DEFAULT_BASE_URL};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
  pub base_url:     String,
  #[serde(default)]
  pub session_path: Option<PathBuf>,
  pub timeout_secs: u64,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub config:       Option<PathBuf>,
  pub base_url:     Option<String>,
  pub session_path: Option<PathBuf>,
  pub timeout_secs: Option<u64>,
}

/// `~/.config/brisas/config.toml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
  dirs::config_dir().map(|d| d.join("brisas").join("config.toml"))
}

impl Settings {
  pub fn load(overrides: &Overrides) -> Result<Self> {
    // An explicitly named file must exist; the default one is optional.
    let (path, required) = match &overrides.config {
      Some(p) => (Some(p.clone()), true),
      None => (default_config_path(), false),
    };
    Self::load_from(path.as_deref(), required, overrides)
  }

  fn load_from(path: Option<&Path>, required: bool, overrides: &Overrides) -> Result<Self> {
    let mut builder = config::Config::builder()
      .set_default("base_url", DEFAULT_BASE_URL)?
      .set_default("timeout_secs", 30)?;
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path.to_path_buf()).required(required));
    }
    let mut settings: Settings = builder
      .add_source(config::Environment::with_prefix("BRISAS"))
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("invalid configuration")?;

    if let Some(url) = &overrides.base_url {
      settings.base_url = url.clone();
    }
    if let Some(path) = &overrides.session_path {
      settings.session_path = Some(path.clone());
    }
    if let Some(secs) = overrides.timeout_secs {
      settings.timeout_secs = secs;
    }
    Ok(settings)
  }

  pub fn client(&self) -> ClientConfig {
    ClientConfig {
      base_url: self.base_url.clone(),
      timeout:  Duration::from_secs(self.timeout_secs.max(1)),
    }
  }

  pub fn session_store(&self) -> Result<SessionStore> {
    let path = match &self.session_path {
      Some(p) => expand_tilde(p),
      None => SessionStore::default_path().context("no data directory; set session_path")?,
    };
    Ok(SessionStore::new(path))
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
