//! Browser state machine and event dispatcher.
//!
//! Backend calls run on spawned tasks and report back over a channel, so the
//! UI never blocks on the network. Each list or detail load carries the
//! generation it was started under; a result from a superseded load is
//! dropped instead of overwriting newer state.

use std::sync::Arc;

use brisas_core::{
  beneficiary::Beneficiary,
  dependent::Dependent,
  service::StatusOutcome,
  status::StatusChange,
  street::Street,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::{commands::Service, notify};

// ─── Tabs and modes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Active,
  Inactive,
}

impl Tab {
  pub fn title(self) -> &'static str {
    match self {
      Self::Active => "Activos",
      Self::Inactive => "Inactivos",
    }
  }

  fn other(self) -> Self {
    match self {
      Self::Active => Self::Inactive,
      Self::Inactive => Self::Active,
    }
  }

  /// The status change offered from this tab.
  pub fn change(self) -> StatusChange {
    match self {
      Self::Active => StatusChange::Disable,
      Self::Inactive => StatusChange::Reactivate,
    }
  }
}

/// A status change waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
  pub change: StatusChange,
  pub cedula: String,
  pub name:   String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Filter,
  Detail,
  Confirm(PendingChange),
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// Results delivered by background tasks.
#[derive(Debug)]
pub enum Message {
  Streets(Result<Vec<Street>, String>),
  List {
    generation: u64,
    result:     Result<Vec<Beneficiary>, String>,
  },
  Detail {
    generation: u64,
    result:     Result<(Beneficiary, Vec<Dependent>), String>,
  },
  Status(Result<StatusOutcome, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
  /// The message belonged to a superseded load and was ignored.
  Stale,
  Applied,
  /// State changed on the server; the current list must be fetched again.
  Reload,
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Everything the UI draws. Holds no handles, so it can be driven directly
/// in tests.
#[derive(Debug)]
pub struct BrowseState {
  pub tab:               Tab,
  pub mode:              Mode,
  pub rows:              Vec<Beneficiary>,
  pub streets:           Vec<Street>,
  pub filter:            String,
  /// Position within the filtered rows.
  pub cursor:            usize,
  pub detail:            Option<(Beneficiary, Vec<Dependent>)>,
  pub detail_scroll:     usize,
  pub loading:           bool,
  pub status_msg:        String,
  pub list_generation:   u64,
  pub detail_generation: u64,
}

impl Default for BrowseState {
  fn default() -> Self {
    Self {
      tab:               Tab::Active,
      mode:              Mode::Normal,
      rows:              Vec::new(),
      streets:           Vec::new(),
      filter:            String::new(),
      cursor:            0,
      detail:            None,
      detail_scroll:     0,
      loading:           false,
      status_msg:        String::new(),
      list_generation:   0,
      detail_generation: 0,
    }
  }
}

impl BrowseState {
  /// Rows matching the filter. Matches on cédula, name, phone and house
  /// number.
  pub fn filtered(&self) -> Vec<&Beneficiary> {
    if self.filter.is_empty() {
      return self.rows.iter().collect();
    }
    let matcher = SkimMatcherV2::default().ignore_case();
    self
      .rows
      .iter()
      .filter(|b| {
        [&b.cedula, &b.full_name, &b.phone, &b.house_number]
          .iter()
          .any(|field| matcher.fuzzy_match(field, &self.filter).is_some())
      })
      .collect()
  }

  pub fn cursor_row(&self) -> Option<&Beneficiary> {
    self.filtered().get(self.cursor).copied()
  }

  pub fn street_name(&self, id: i64) -> &str {
    brisas_core::street::find(&self.streets, id).map_or("", |s| s.name.as_str())
  }

  /// Start a list load and return its generation.
  pub fn begin_list(&mut self) -> u64 {
    self.list_generation += 1;
    self.loading = true;
    self.list_generation
  }

  pub fn begin_detail(&mut self) -> u64 {
    self.detail_generation += 1;
    self.detail_generation
  }

  /// Flip between the active and inactive lists. Any in-flight load for the
  /// old tab becomes stale.
  pub fn switch_tab(&mut self) {
    self.tab = self.tab.other();
    self.rows.clear();
    self.filter.clear();
    self.cursor = 0;
    self.close_detail();
  }

  pub fn close_detail(&mut self) {
    self.detail = None;
    self.detail_scroll = 0;
    self.mode = Mode::Normal;
    // Invalidate a detail load that has not arrived yet.
    self.detail_generation += 1;
  }

  /// The beneficiary a status change would apply to: the open detail, else
  /// the row under the cursor.
  pub fn change_target(&self) -> Option<&Beneficiary> {
    match (&self.mode, &self.detail) {
      (Mode::Detail, Some((b, _))) => Some(b),
      _ => self.cursor_row(),
    }
  }

  pub fn apply(&mut self, msg: Message) -> Applied {
    match msg {
      Message::Streets(Ok(streets)) => {
        self.streets = streets;
        Applied::Applied
      }
      Message::Streets(Err(e)) => {
        self.status_msg = e;
        Applied::Applied
      }
      Message::List { generation, result } => {
        if generation != self.list_generation {
          return Applied::Stale;
        }
        self.loading = false;
        match result {
          Ok(rows) => {
            self.rows = rows;
            let len = self.filtered().len();
            self.cursor = self.cursor.min(len.saturating_sub(1));
          }
          Err(e) => self.status_msg = e,
        }
        Applied::Applied
      }
      Message::Detail { generation, result } => {
        if generation != self.detail_generation {
          return Applied::Stale;
        }
        match result {
          Ok(detail) => {
            self.detail = Some(detail);
            self.detail_scroll = 0;
            self.mode = Mode::Detail;
            self.status_msg.clear();
          }
          Err(e) => self.status_msg = e,
        }
        Applied::Applied
      }
      // Status changes always land: the server state moved regardless of
      // what the user did in the meantime.
      Message::Status(Ok(outcome)) => {
        let list = if outcome.beneficiary.is_active() { "activos" } else { "inactivos" };
        self.status_msg = if !outcome.transition.changed() {
          format!("{} ya estaba en {list}", outcome.beneficiary.full_name)
        } else {
          format!("{} movido a {list}", outcome.beneficiary.full_name)
        };
        self.close_detail();
        Applied::Reload
      }
      Message::Status(Err(e)) => {
        self.status_msg = e;
        if matches!(self.mode, Mode::Confirm(_)) {
          self.mode = Mode::Normal;
        }
        Applied::Applied
      }
    }
  }
}

// ─── App ─────────────────────────────────────────────────────────────────────

pub struct App {
  pub state: BrowseState,
  service:   Arc<Service>,
  tx:        UnboundedSender<Message>,
  rx:        UnboundedReceiver<Message>,
}

impl App {
  pub fn new(service: Service) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { state: BrowseState::default(), service: Arc::new(service), tx, rx }
  }

  pub fn service(&self) -> &Service { &self.service }

  /// Kick off the initial loads.
  pub fn start(&mut self) {
    let svc = Arc::clone(&self.service);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = svc.streets().await.map_err(|e| notify::describe(&e));
      let _ = tx.send(Message::Streets(result));
    });
    self.load_list();
  }

  // ── Loads ─────────────────────────────────────────────────────────────────

  fn load_list(&mut self) {
    let generation = self.state.begin_list();
    let tab = self.state.tab;
    let svc = Arc::clone(&self.service);
    let tx = self.tx.clone();
    debug!(generation, ?tab, "loading list");
    tokio::spawn(async move {
      let result = match tab {
        Tab::Active => svc.active_beneficiaries(None).await,
        Tab::Inactive => svc.inactive_beneficiaries(None).await,
      };
      let result = result.map_err(|e| notify::describe(&e));
      let _ = tx.send(Message::List { generation, result });
    });
  }

  fn open_detail(&mut self, cedula: String) {
    let generation = self.state.begin_detail();
    self.state.status_msg = "Cargando…".into();
    let svc = Arc::clone(&self.service);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = async {
        let b = svc.beneficiary(&cedula).await?;
        let deps = svc.dependents_of(&cedula).await?;
        Ok::<_, brisas_core::Error>((b, deps))
      }
      .await
      .map_err(|e| notify::describe(&e));
      let _ = tx.send(Message::Detail { generation, result });
    });
  }

  fn request_status(&mut self, pending: PendingChange) {
    self.state.status_msg = "Guardando…".into();
    let svc = Arc::clone(&self.service);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = svc
        .change_status(&pending.cedula, pending.change)
        .await
        .map_err(|e| notify::describe(&e));
      let _ = tx.send(Message::Status(result));
    });
  }

  /// Apply every result that has arrived since the last frame.
  pub fn drain(&mut self) {
    while let Ok(msg) = self.rx.try_recv() {
      if self.state.apply(msg) == Applied::Reload {
        self.load_list();
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    // Notices last until the next key press.
    self.state.status_msg.clear();
    match self.state.mode.clone() {
      Mode::Filter => self.handle_filter_key(key),
      Mode::Normal => return self.handle_list_key(key),
      Mode::Detail => return self.handle_detail_key(key),
      Mode::Confirm(pending) => self.handle_confirm_key(key, pending),
    }
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    let s = &mut self.state;
    match key.code {
      KeyCode::Esc => {
        s.mode = Mode::Normal;
        s.filter.clear();
        s.cursor = 0;
      }
      KeyCode::Enter => {
        s.mode = Mode::Normal;
        s.cursor = 0;
        let only = match s.filtered().as_slice() {
          [one] => Some(one.cedula.clone()),
          _ => None,
        };
        if let Some(cedula) = only {
          self.open_detail(cedula);
        }
      }
      KeyCode::Backspace => {
        s.filter.pop();
        s.cursor = 0;
      }
      KeyCode::Char(c) => {
        s.filter.push(c);
        s.cursor = 0;
      }
      _ => {}
    }
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
      KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(cedula) = self.state.cursor_row().map(|b| b.cedula.clone()) {
          self.open_detail(cedula);
        }
      }
      KeyCode::Char('/') => {
        self.state.mode = Mode::Filter;
        self.state.filter.clear();
        self.state.cursor = 0;
      }
      KeyCode::Tab => {
        self.state.switch_tab();
        self.load_list();
      }
      KeyCode::Char('R') => self.load_list(),
      KeyCode::Char('d') | KeyCode::Char('a') => self.confirm_change(key.code),
      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.state.close_detail(),
      KeyCode::Down | KeyCode::Char('j') => self.state.detail_scroll += 1,
      KeyCode::Up | KeyCode::Char('k') => {
        self.state.detail_scroll = self.state.detail_scroll.saturating_sub(1);
      }
      KeyCode::Char(']') | KeyCode::PageDown => self.step_detail(1),
      KeyCode::Char('[') | KeyCode::PageUp => self.step_detail(-1),
      KeyCode::Char('d') | KeyCode::Char('a') => self.confirm_change(key.code),
      _ => {}
    }
    true
  }

  fn handle_confirm_key(&mut self, key: KeyEvent, pending: PendingChange) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('s') | KeyCode::Enter => {
        self.state.mode = Mode::Normal;
        self.request_status(pending);
      }
      KeyCode::Char('n') | KeyCode::Esc => {
        self.state.mode = if self.state.detail.is_some() { Mode::Detail } else { Mode::Normal };
        self.state.status_msg = "Cancelado".into();
      }
      _ => {}
    }
  }

  fn move_cursor(&mut self, delta: isize) {
    let len = self.state.filtered().len();
    if len == 0 {
      return;
    }
    self.state.cursor = self.state.cursor.saturating_add_signed(delta).min(len - 1);
  }

  fn step_detail(&mut self, delta: isize) {
    let before = self.state.cursor;
    self.move_cursor(delta);
    if self.state.cursor != before
      && let Some(cedula) = self.state.cursor_row().map(|b| b.cedula.clone())
    {
      self.open_detail(cedula);
    }
  }

  /// `d` disables from the active tab, `a` reactivates from the inactive one.
  fn confirm_change(&mut self, code: KeyCode) {
    let change = self.state.tab.change();
    let wanted = match change {
      StatusChange::Disable => KeyCode::Char('d'),
      StatusChange::Reactivate => KeyCode::Char('a'),
    };
    if code != wanted {
      return;
    }
    if let Some(b) = self.state.change_target() {
      let pending = PendingChange { change, cedula: b.cedula.clone(), name: b.full_name.clone() };
      self.state.mode = Mode::Confirm(pending);
    }
  }
}

#[cfg(test)]
mod tests {
  use brisas_core::{
    person::{Gender, MaritalStatus},
    status::{Status, StatusTransition},
  };
  use chrono::NaiveDate;

  use super::*;

  fn row(cedula: &str, name: &str, house: &str) -> Beneficiary {
    Beneficiary {
      cedula:          cedula.into(),
      full_name:       name.into(),
      profession:      String::new(),
      birth_date:      NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
      education_level: String::new(),
      chronic_illness: String::new(),
      disability:      String::new(),
      gender:          Gender::Femenino,
      phone:           "04141234567".into(),
      house_number:    house.into(),
      street_id:       3,
      street_name:     None,
      marital_status:  MaritalStatus::Soltero,
      status:          Status::Active,
    }
  }

  fn loaded() -> BrowseState {
    let mut s = BrowseState::default();
    let generation = s.begin_list();
    s.apply(Message::List {
      generation,
      result: Ok(vec![
        row("1000100", "Ana Pérez", "12"),
        row("2000200", "Luis Rojas", "4-B"),
        row("2000201", "María Rojas", "7"),
      ]),
    });
    s
  }

  #[test]
  fn stale_list_result_is_dropped() {
    let mut s = BrowseState::default();
    let old = s.begin_list();
    let new = s.begin_list();
    assert_eq!(
      s.apply(Message::List { generation: old, result: Ok(vec![row("1", "Old", "1")]) }),
      Applied::Stale
    );
    assert!(s.rows.is_empty());
    assert!(s.loading);

    s.apply(Message::List { generation: new, result: Ok(vec![row("2", "New", "1")]) });
    assert_eq!(s.rows[0].full_name, "New");
    assert!(!s.loading);
  }

  #[test]
  fn detail_closed_before_arrival_is_dropped() {
    let mut s = loaded();
    let generation = s.begin_detail();
    s.close_detail();
    let b = row("1000100", "Ana Pérez", "12");
    assert_eq!(s.apply(Message::Detail { generation, result: Ok((b, vec![])) }), Applied::Stale);
    assert!(s.detail.is_none());
    assert_eq!(s.mode, Mode::Normal);
  }

  #[test]
  fn filter_matches_name_and_house_number() {
    let mut s = loaded();
    s.filter = "rojas".into();
    assert_eq!(s.filtered().len(), 2);
    s.filter = "4-B".into();
    let only: Vec<_> = s.filtered().iter().map(|b| b.cedula.as_str()).collect();
    assert_eq!(only, ["2000200"]);
  }

  #[test]
  fn switching_tab_invalidates_in_flight_list() {
    let mut s = BrowseState::default();
    let generation = s.begin_list();
    s.switch_tab();
    let fresh = s.begin_list();
    assert_eq!(s.tab, Tab::Inactive);
    assert_eq!(
      s.apply(Message::List { generation, result: Ok(vec![row("1", "Activa", "1")]) }),
      Applied::Stale
    );
    s.apply(Message::List { generation: fresh, result: Ok(vec![]) });
    assert!(s.rows.is_empty());
  }

  #[test]
  fn status_result_always_applies_and_reloads() {
    let mut s = loaded();
    s.mode = Mode::Confirm(PendingChange {
      change: StatusChange::Disable,
      cedula: "1000100".into(),
      name:   "Ana Pérez".into(),
    });
    // Unrelated loads in between do not make the outcome stale.
    s.begin_list();
    s.begin_detail();

    let mut b = row("1000100", "Ana Pérez", "12");
    b.status = Status::Inactive;
    let outcome = StatusOutcome {
      beneficiary: b,
      transition:  StatusTransition { from: Status::Active, to: Status::Inactive },
    };
    assert_eq!(s.apply(Message::Status(Ok(outcome))), Applied::Reload);
    assert_eq!(s.mode, Mode::Normal);
    assert!(s.status_msg.contains("inactivos"));
  }

  #[test]
  fn failed_list_load_keeps_rows_and_reports() {
    let mut s = loaded();
    let generation = s.begin_list();
    s.apply(Message::List { generation, result: Err("Access denied: outside your street".into()) });
    assert_eq!(s.rows.len(), 3);
    assert!(s.status_msg.starts_with("Access denied"));
  }

  #[test]
  fn change_target_prefers_open_detail() {
    let mut s = loaded();
    s.cursor = 2;
    let generation = s.begin_detail();
    s.apply(Message::Detail { generation, result: Ok((row("1000100", "Ana Pérez", "12"), vec![])) });
    assert_eq!(s.change_target().map(|b| b.cedula.as_str()), Some("1000100"));
    s.close_detail();
    assert_eq!(s.change_target().map(|b| b.cedula.as_str()), Some("2000201"));
  }
}
