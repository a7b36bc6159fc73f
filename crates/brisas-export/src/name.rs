//! Export file names.

use brisas_core::report::{ReportKind, ReportSubject};

use crate::Format;

/// `<kind>_<subject>.<ext>`, ASCII only.
pub fn file_name(kind: ReportKind, subject: &ReportSubject, format: Format) -> String {
  let subject = match subject {
    ReportSubject::Person { cedula, full_name } => format!("{full_name} {cedula}"),
    other => other.label(),
  };
  let subject = slugify(&subject);
  if subject.is_empty() {
    format!("{}.{}", kind.slug(), format.extension())
  } else {
    format!("{}_{}.{}", kind.slug(), subject, format.extension())
  }
}

/// Lower-case ASCII with Spanish diacritics folded and every other run of
/// non-alphanumerics collapsed to one `_`.
pub fn slugify(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut gap = false;
  for c in s.chars().flat_map(char::to_lowercase) {
    let c = fold(c);
    if c.is_ascii_alphanumeric() {
      if gap && !out.is_empty() {
        out.push('_');
      }
      gap = false;
      out.push(c);
    } else {
      gap = true;
    }
  }
  out
}

fn fold(c: char) -> char {
  match c {
    'á' | 'à' | 'â' | 'ä' => 'a',
    'é' | 'è' | 'ê' | 'ë' => 'e',
    'í' | 'ì' | 'î' | 'ï' => 'i',
    'ó' | 'ò' | 'ô' | 'ö' => 'o',
    'ú' | 'ù' | 'û' | 'ü' => 'u',
    'ñ' => 'n',
    'ç' => 'c',
    c => c,
  }
}
