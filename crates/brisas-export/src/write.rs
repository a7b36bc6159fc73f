//! Writers for each export format.

use std::io::Write;

use brisas_core::street::Street;
use chrono::NaiveDate;
use strum::{Display, EnumIter, EnumString};

use rust_xlsxwriter::{Format as CellFormat, Workbook};

use crate::{Exportable, Result, Table, pdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
  /// Comma-separated, opens in any spreadsheet.
  #[default]
  Csv,
  Json,
  /// Aligned columns for printing.
  Text,
  /// Excel workbook with one sheet.
  Xlsx,
  /// Landscape A4 pages.
  Pdf,
}

impl Format {
  pub fn extension(self) -> &'static str {
    match self {
      Self::Csv => "csv",
      Self::Json => "json",
      Self::Text => "txt",
      Self::Xlsx => "xlsx",
      Self::Pdf => "pdf",
    }
  }

  /// Not meant for a terminal.
  pub fn is_binary(self) -> bool { matches!(self, Self::Xlsx | Self::Pdf) }
}

/// Write `report` to `out` in `format`.
pub fn write<R: Exportable, W: Write>(
  report: &R,
  format: Format,
  streets: &[Street],
  today: NaiveDate,
  out: W,
) -> Result<()> {
  match format {
    Format::Csv => write_csv(&report.table(streets, today), out),
    Format::Json => write_json(report, out),
    Format::Text => write_text(&report.table(streets, today), out),
    Format::Xlsx => write_xlsx(&report.table(streets, today), out),
    Format::Pdf => write_pdf(&report.table(streets, today), out),
  }
}

pub fn write_csv<W: Write>(table: &Table, out: W) -> Result<()> {
  let mut w = csv::Writer::from_writer(out);
  w.write_record(&table.columns)?;
  for row in &table.rows {
    w.write_record(row)?;
  }
  w.flush()?;
  Ok(())
}

/// The structured report, not the flattened table.
pub fn write_json<R: Exportable, W: Write>(report: &R, mut out: W) -> Result<()> {
  serde_json::to_writer_pretty(&mut out, report)?;
  writeln!(out)?;
  Ok(())
}

pub fn write_text<W: Write>(table: &Table, mut out: W) -> Result<()> {
  let widths = table.column_widths();

  writeln!(out, "{}", table.title)?;
  writeln!(out, "{}", table.subtitle)?;
  writeln!(out)?;

  let header: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
  write_line(&mut out, &header, &widths)?;
  let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
  write_line(&mut out, &rule, &widths)?;

  if table.rows.is_empty() {
    writeln!(out, "(sin registros)")?;
  }
  for row in &table.rows {
    write_line(&mut out, row, &widths)?;
  }

  if !table.footer.is_empty() {
    writeln!(out)?;
    for line in &table.footer {
      writeln!(out, "{line}")?;
    }
  }
  Ok(())
}

pub const SHEET_NAME: &str = "Reporte";
/// Title, subtitle and a blank row come first.
const HEADER_ROW: u32 = 3;

pub fn write_xlsx<W: Write>(table: &Table, mut out: W) -> Result<()> {
  let mut workbook = Workbook::new();
  let bold = CellFormat::new().set_bold();
  let sheet = workbook.add_worksheet();
  sheet.set_name(SHEET_NAME)?;

  for (col, name) in (0u16..).zip(&table.columns) {
    sheet.write_string_with_format(HEADER_ROW, col, *name, &bold)?;
  }
  let mut row = HEADER_ROW + 1;
  for cells in &table.rows {
    for (col, cell) in (0u16..).zip(cells) {
      sheet.write_string(row, col, cell)?;
    }
    row += 1;
  }
  // Sized on the grid alone so the title does not widen column A.
  sheet.autofit();
  sheet.set_freeze_panes(HEADER_ROW + 1, 0)?;

  sheet.write_string_with_format(0, 0, &table.title, &bold)?;
  sheet.write_string(1, 0, &table.subtitle)?;
  if table.rows.is_empty() {
    sheet.write_string(row, 0, "(sin registros)")?;
    row += 1;
  }
  row += 1;
  for line in &table.footer {
    sheet.write_string(row, 0, line)?;
    row += 1;
  }

  out.write_all(&workbook.save_to_buffer()?)?;
  Ok(())
}

pub fn write_pdf<W: Write>(table: &Table, mut out: W) -> Result<()> {
  out.write_all(&pdf::render(table)?)?;
  Ok(())
}

fn write_line<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> Result<()> {
  let mut line = String::new();
  for (i, width) in widths.iter().enumerate() {
    let cell = cells.get(i).map(String::as_str).unwrap_or_default();
    if i > 0 {
      line.push_str("  ");
    }
    line.push_str(cell);
    line.extend(std::iter::repeat_n(' ', width.saturating_sub(cell.chars().count())));
  }
  writeln!(out, "{}", line.trim_end())?;
  Ok(())
}
