//! Domain types, access policy and consumer services for the Brisas del
//! Orinoco II benefits registry.
//!
//! This crate is free of HTTP and terminal dependencies. The REST backend is
//! reached only through [`backend::BenefitsBackend`]; `brisas-client`
//! provides the HTTP implementation.

#![allow(async_fn_in_trait)]

pub mod account;
pub mod age;
pub mod backend;
pub mod beneficiary;
pub mod dependent;
pub mod error;
pub mod person;
pub mod policy;
pub mod report;
pub mod role;
pub mod scope;
pub mod service;
pub mod status;
pub mod street;
pub mod validate;

pub use error::{Error, Result};
