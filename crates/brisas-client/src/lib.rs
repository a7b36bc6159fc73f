//! HTTP implementation of [`brisas_core::backend::BenefitsBackend`] and the
//! local session file.

pub mod error;
pub mod http;
pub mod session;

pub use error::{Error, Result};
pub use http::{ClientConfig, HttpBackend};
pub use session::{Session, SessionStore};

#[cfg(test)]
mod tests;
