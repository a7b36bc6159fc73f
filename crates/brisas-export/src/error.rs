use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("spreadsheet error: {0}")]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),

  #[error("PDF error: {0}")]
  Pdf(#[from] printpdf::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
