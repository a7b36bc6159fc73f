use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  /// A non-success response. `message` is the backend's own explanation
  /// when it sent one.
  #[error("{message} (HTTP {status})")]
  Api { status: u16, message: String },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("not logged in")]
  NotLoggedIn,
}

impl Error {
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Api { status, .. } => Some(*status),
      Self::Http(e) => e.status().map(|s| s.as_u16()),
      _ => None,
    }
  }

  /// The backend rejected the session token.
  pub fn is_unauthorized(&self) -> bool { self.status() == Some(401) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
