//! Report export to CSV, JSON, plain text, Excel workbooks and PDF.
//!
//! Exports are written from reports that `brisas-core` has already scoped;
//! nothing here filters rows.

pub mod error;
pub mod name;
mod pdf;
pub mod table;
pub mod write;

pub use error::{Error, Result};
pub use name::{file_name, slugify};
pub use table::{Exportable, Table};
pub use write::{Format, write};
