//! PDF rendering of a [`Table`] on landscape A4 with the builtin Helvetica
//! faces. The header row repeats on every page.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::{Result, Table};

const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN: f32 = 12.0;
const TITLE_PT: f32 = 14.0;
const SUBTITLE_PT: f32 = 9.0;
const BODY_PT: f32 = 7.0;
const LINE: f32 = 4.0;
/// Average advance of one Helvetica glyph at `BODY_PT`, in mm.
const GLYPH: f32 = 1.35;
const GAP: f32 = 2.5;
const LAYER: &str = "Reporte";

#[derive(Clone, Copy)]
enum Face {
  Regular,
  Bold,
}

struct Column {
  x:     f32,
  chars: usize,
}

struct Pages {
  doc:     PdfDocumentReference,
  layer:   PdfLayerReference,
  regular: IndirectFontRef,
  bold:    IndirectFontRef,
  y:       f32,
}

impl Pages {
  fn new(title: &str) -> Result<Self> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), LAYER);
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let layer = doc.get_page(page).get_layer(layer);
    Ok(Self { doc, layer, regular, bold, y: PAGE_H - MARGIN })
  }

  fn put(&self, text: &str, pt: f32, x: f32, face: Face) {
    let font = match face {
      Face::Regular => &self.regular,
      Face::Bold => &self.bold,
    };
    self.layer.use_text(text, pt, Mm(x), Mm(self.y), font);
  }

  fn row(&self, cells: &[&str], columns: &[Column], face: Face) {
    for (cell, col) in cells.iter().zip(columns) {
      self.put(&clip(cell, col.chars), BODY_PT, col.x, face);
    }
  }

  fn full(&self) -> bool { self.y - LINE < MARGIN }

  fn next_page(&mut self) {
    let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), LAYER);
    self.layer = self.doc.get_page(page).get_layer(layer);
    self.y = PAGE_H - MARGIN;
  }

  fn finish(self) -> Result<Vec<u8>> { Ok(self.doc.save_to_bytes()?) }
}

pub(crate) fn render(table: &Table) -> Result<Vec<u8>> {
  let columns = layout(table);
  let mut pages = Pages::new(&table.title)?;

  pages.put(&table.title, TITLE_PT, MARGIN, Face::Bold);
  pages.y -= 6.0;
  pages.put(&table.subtitle, SUBTITLE_PT, MARGIN, Face::Regular);
  pages.y -= 8.0;

  pages.row(&table.columns, &columns, Face::Bold);
  pages.y -= LINE;
  if table.rows.is_empty() {
    pages.put("(sin registros)", BODY_PT, MARGIN, Face::Regular);
    pages.y -= LINE;
  }
  for row in &table.rows {
    if pages.full() {
      pages.next_page();
      pages.row(&table.columns, &columns, Face::Bold);
      pages.y -= LINE;
    }
    let cells: Vec<&str> = row.iter().map(String::as_str).collect();
    pages.row(&cells, &columns, Face::Regular);
    pages.y -= LINE;
  }

  pages.y -= LINE;
  for line in &table.footer {
    if pages.full() {
      pages.next_page();
    }
    pages.put(line, BODY_PT, MARGIN, Face::Bold);
    pages.y -= LINE;
  }
  pages.finish()
}

/// Natural widths, shrunk together when they overflow the printable width.
fn layout(table: &Table) -> Vec<Column> {
  let span = |chars: usize| chars as f32 * GLYPH + GAP;
  let widths = table.column_widths();
  let natural: f32 = widths.iter().map(|w| span(*w)).sum();
  let scale = ((PAGE_W - 2.0 * MARGIN) / natural).min(1.0);

  let mut x = MARGIN;
  widths
    .into_iter()
    .map(|w| {
      let width = span(w) * scale;
      let chars = ((width - GAP) / GLYPH).max(1.0) as usize;
      let col = Column { x, chars };
      x += width;
      col
    })
    .collect()
}

fn clip(cell: &str, chars: usize) -> String {
  if cell.chars().count() <= chars {
    return cell.to_owned();
  }
  let mut clipped: String = cell.chars().take(chars.saturating_sub(1)).collect();
  clipped.push('…');
  clipped
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wide_tables_are_scaled_to_the_page() {
    let table = Table {
      title:    "T".into(),
      subtitle: String::new(),
      columns:  vec!["A"; 6],
      rows:     vec![vec!["x".repeat(80); 6]],
      footer:   vec![],
    };
    let columns = layout(&table);
    let last = columns.last().unwrap();
    assert!(last.x + last.chars as f32 * GLYPH <= PAGE_W - MARGIN);
    assert!(columns.windows(2).all(|w| w[0].x < w[1].x));
  }

  #[test]
  fn long_cells_are_clipped() {
    assert_eq!(clip("Las Acacias", 20), "Las Acacias");
    assert_eq!(clip("Las Acacias", 5), "Las …");
  }
}
