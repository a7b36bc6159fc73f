//! Beneficiary list pane.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{BrowseState, Mode, Tab};

pub fn draw(f: &mut Frame, area: Rect, state: &BrowseState) {
  let filtered = state.filtered();
  let total = state.rows.len();
  let filtering = state.mode == Mode::Filter || !state.filter.is_empty();

  let title = if filtering {
    format!(" {} ({}/{}) ", state.tab.title(), filtered.len(), total)
  } else {
    format!(" {} ({total}) ", state.tab.title())
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if filtering && inner.height > 2 {
    let filter_area = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
    inner.height -= 1;
    let text = if state.mode == Mode::Filter {
      format!("/{}_", state.filter)
    } else {
      format!("/{}", state.filter)
    };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), filter_area);
  }

  if filtered.is_empty() {
    f.render_widget(empty_message(state).wrap(Wrap { trim: true }), inner);
    return;
  }

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|b| {
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:>10} ", b.cedula), Style::default().fg(Color::DarkGray)),
        Span::raw(b.full_name.clone()),
      ]))
    })
    .collect();

  let mut list_state = ListState::default();
  list_state.select(Some(state.cursor));
  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut list_state,
  );
}

/// What to show instead of an empty list: a loading note, a hint about the
/// filter, or a next step.
fn empty_message(state: &BrowseState) -> Paragraph<'static> {
  let dim = Style::default().fg(Color::DarkGray);
  if state.loading {
    return Paragraph::new("Cargando…").style(dim);
  }
  if !state.filter.is_empty() {
    return Paragraph::new("Sin coincidencias. Esc limpia la búsqueda.").style(dim);
  }
  let lines = match state.tab {
    Tab::Active => vec![
      Line::from("No hay beneficiarios activos."),
      Line::from(Span::styled("Registre uno con `brisas beneficiaries add`.", dim)),
    ],
    Tab::Inactive => vec![
      Line::from("No hay beneficiarios inactivos."),
      Line::from(Span::styled("Tab vuelve a la lista de activos.", dim)),
    ],
  };
  Paragraph::new(lines)
}
