//! TUI rendering. Orchestrates the panes.

pub mod detail;
pub mod list;

use brisas_core::status::StatusChange;
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Mode, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if let Mode::Confirm(pending) = &app.state.mode {
    let verb = match pending.change {
      StatusChange::Disable => "Desactivar",
      StatusChange::Reactivate => "Reactivar",
    };
    draw_confirm(f, &format!("¿{verb} a {} ({})?", pending.name, pending.cedula));
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%d/%m/%Y").to_string();
  let account = app.service().account();

  let tab_span = |tab: Tab| {
    let style = if app.state.tab == tab {
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::White)
    };
    Span::styled(format!(" {} ", tab.title()), style)
  };

  let left = vec![
    Span::styled(" Brisas del Orinoco II ", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    tab_span(Tab::Active),
    tab_span(Tab::Inactive),
  ];
  let right = Span::styled(format!("{}  {date} ", account.username), Style::default().fg(Color::Gray));

  let left_width: usize = left.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.chars().count());

  let mut spans = left;
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
    .split(area);

  list::draw(f, cols[0], &app.state);

  if app.state.detail.is_some() {
    detail::draw(f, cols[1], &app.state);
  } else {
    draw_empty_detail(f, cols[1]);
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detalle ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Seleccione un beneficiario y pulse Enter.").style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Confirm dialog ───────────────────────────────────────────────────────────

fn draw_confirm(f: &mut Frame, question: &str) {
  let [area] = Layout::vertical([Constraint::Length(5)]).flex(Flex::Center).areas(f.area());
  let [area] = Layout::horizontal([Constraint::Percentage(50)]).flex(Flex::Center).areas(area);

  let block = Block::default()
    .title(" Confirmar ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));
  let text = vec![
    Line::from(question.to_owned()),
    Line::from(Span::styled("[s/y] sí   [n/Esc] no", Style::default().fg(Color::DarkGray))),
  ];
  f.render_widget(Clear, area);
  f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let change_hint = match app.state.tab {
    Tab::Active => "d disable",
    Tab::Inactive => "a reactivate",
  };
  let (mode_label, hints) = match &app.state.mode {
    Mode::Filter => ("SEARCH", "Type to filter  Esc cancel  Enter select".to_owned()),
    Mode::Normal => (
      "NORMAL",
      format!("↑↓/jk navigate  / search  Enter detail  Tab switch list  {change_hint}  R reload  q quit"),
    ),
    Mode::Detail => ("DETAIL", format!("↑↓/jk scroll  [ prev  ] next  {change_hint}  Esc back  q quit")),
    Mode::Confirm(_) => ("CONFIRM", "y confirm  n cancel".to_owned()),
  };

  let status = match (&app.state.status_msg, app.state.loading) {
    (msg, _) if !msg.is_empty() => msg.clone(),
    (_, true) => "Cargando…".to_owned(),
    _ => hints,
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::Gray)),
  ]);
  f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Black)), area);
}
