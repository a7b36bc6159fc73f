//! Beneficiary detail pane with the family burden underneath.

use brisas_core::{beneficiary::Beneficiary, dependent::Dependent, report::display_age};
use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::BrowseState;

pub fn draw(f: &mut Frame, area: Rect, state: &BrowseState) {
  let Some((b, dependents)) = &state.detail else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", b.full_name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines = lines(b, dependents, state.street_name(b.street_id));
  let para = Paragraph::new(lines).scroll((state.detail_scroll as u16, 0));
  f.render_widget(para, inner);
}

fn lines(b: &Beneficiary, dependents: &[Dependent], street: &str) -> Vec<Line<'static>> {
  let today = Local::now().date_naive();
  let street = b.street_name.as_deref().filter(|s| !s.is_empty()).unwrap_or(street);

  let mut lines = vec![
    field("Cédula", b.cedula.clone()),
    field("Estatus", b.status.label().to_owned()),
    field("Nacimiento", b.birth_date.format("%d/%m/%Y").to_string()),
    field("Edad", display_age(b.birth_date, today)),
    field("Género", b.gender.to_string()),
    field("Estado civil", b.marital_status.to_string()),
    field("Teléfono", b.phone.clone()),
    field("Calle", street.to_owned()),
    field("Casa", b.house_number.clone()),
    field("Profesión", b.profession.clone()),
    field("Instrucción", b.education_level.clone()),
    field("Enfermedad", b.chronic_illness.clone()),
    field("Discapacidad", b.disability.clone()),
    Line::from(""),
    Line::from(Span::styled(
      format!("Carga familiar ({})", dependents.len()),
      Style::default().add_modifier(Modifier::BOLD),
    )),
  ];

  if dependents.is_empty() {
    lines.push(Line::from(Span::styled("Sin dependientes registrados.", Style::default().fg(Color::DarkGray))));
  }
  for d in dependents {
    lines.push(Line::from(vec![
      Span::styled(format!("{:<10} ", d.relationship), Style::default().fg(Color::Cyan)),
      Span::raw(format!("{} ", d.full_name)),
      Span::styled(
        format!("{}  {} años", d.cedula, display_age(d.birth_date, today)),
        Style::default().fg(Color::DarkGray),
      ),
    ]));
  }
  lines
}

fn field(label: &'static str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{label:<14}"), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    Span::raw(value),
  ])
}
