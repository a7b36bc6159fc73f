//! Error types for `brisas-core`.

use thiserror::Error;

use crate::{policy::AccessDenied, street::StreetId, validate::ValidationErrors};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(ValidationErrors),

  #[error(transparent)]
  Access(#[from] AccessDenied),

  #[error("beneficiary not found: {0}")]
  BeneficiaryNotFound(String),

  #[error("dependent not found: {0}")]
  DependentNotFound(String),

  #[error("account not found: {0}")]
  AccountNotFound(String),

  /// A dependent was submitted for a beneficiary that does not exist.
  #[error("cannot register dependent: beneficiary {0} does not exist")]
  OrphanDependent(String),

  #[error("dependent {dependent} does not belong to beneficiary {beneficiary}")]
  ParentMismatch {
    dependent:   String,
    beneficiary: String,
  },

  #[error("cedula cannot be changed once registered ({0})")]
  ImmutableCedula(String),

  /// The street id is not in the street list returned by the backend.
  #[error("street {0} is not known to the backend")]
  UnknownStreet(StreetId),

  #[error("unknown status value: {0:?}")]
  UnknownStatus(String),

  #[error("{0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl From<ValidationErrors> for Error {
  fn from(e: ValidationErrors) -> Self { Self::Validation(e) }
}

/// How a consumer should present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
  /// Caught before any network call; shown next to the offending fields.
  Validation,
  /// Blocking notice, distinct from "no data found".
  Authorization,
  NotFound,
  /// Network or backend failure; shown as a notification.
  Backend,
}

impl Error {
  pub fn category(&self) -> ErrorCategory {
    match self {
      Self::Validation(_) | Self::ImmutableCedula(_) | Self::OrphanDependent(_) => {
        ErrorCategory::Validation
      }
      Self::Access(_) | Self::ParentMismatch { .. } => ErrorCategory::Authorization,
      Self::BeneficiaryNotFound(_)
      | Self::DependentNotFound(_)
      | Self::AccountNotFound(_)
      | Self::UnknownStreet(_) => ErrorCategory::NotFound,
      Self::UnknownStatus(_) | Self::Backend(_) | Self::Serialization(_) => {
        ErrorCategory::Backend
      }
    }
  }

  pub fn backend<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Backend(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
