//! One-line user-facing messages for failures.

use brisas_core::error::{Error, ErrorCategory};

/// Render a service error for the status bar or stderr. Authorization
/// failures read differently from missing data and from backend trouble.
pub fn describe(err: &Error) -> String {
  if let Error::Backend(inner) = err
    && let Some(client) = inner.downcast_ref::<brisas_client::Error>()
  {
    return describe_client(client);
  }
  match err.category() {
    ErrorCategory::Validation => format!("Check the form: {err}"),
    ErrorCategory::Authorization => format!("Access denied: {err}"),
    ErrorCategory::NotFound => format!("Not found: {err}"),
    ErrorCategory::Backend => format!("Server error: {err}"),
  }
}

pub fn describe_client(err: &brisas_client::Error) -> String {
  match err {
    e if e.is_unauthorized() => "Session expired or invalid. Run `brisas login`.".to_owned(),
    brisas_client::Error::Api { message, .. } => message.clone(),
    brisas_client::Error::NotLoggedIn => "Not logged in. Run `brisas login`.".to_owned(),
    brisas_client::Error::Http(e) if e.is_timeout() => "The server took too long to answer.".to_owned(),
    brisas_client::Error::Http(e) if e.is_connect() => "Could not reach the server.".to_owned(),
    other => other.to_string(),
  }
}

/// Best message for an error that reached `main`.
pub fn describe_any(err: &anyhow::Error) -> String {
  if let Some(e) = err.downcast_ref::<Error>() {
    return describe(e);
  }
  if let Some(e) = err.downcast_ref::<brisas_client::Error>() {
    return describe_client(e);
  }
  format!("{err:#}")
}

#[cfg(test)]
mod tests {
  use super::*;
  use brisas_core::policy::AccessDenied;

  #[test]
  fn categories_read_differently() {
    let denied = describe(&Error::Access(AccessDenied::UnresolvedStreet));
    assert!(denied.starts_with("Access denied"));
    assert!(denied.contains("cannot determine assigned street"));

    let missing = describe(&Error::BeneficiaryNotFound("123".into()));
    assert!(missing.starts_with("Not found"));
  }

  #[test]
  fn backend_message_is_passed_through() {
    let api = brisas_client::Error::Api { status: 409, message: "Cédula ya registrada".into() };
    assert_eq!(describe(&Error::backend(api)), "Cédula ya registrada");

    let expired = brisas_client::Error::Api { status: 401, message: "jwt expired".into() };
    assert!(describe(&Error::backend(expired)).contains("brisas login"));
  }

  #[test]
  fn anyhow_wrapping_is_seen_through() {
    let err = anyhow::Error::new(Error::UnknownStreet(4));
    assert!(describe_any(&err).starts_with("Not found"));
  }
}
