//! Dashboard state machine and event dispatcher.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use alerto_core::alert::{Alert, AlertId};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::client::ApiClient;

/// How often the dashboard reloads from the API on its own.
pub const REFRESH_PERIOD: Duration = Duration::from_secs(10);

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the alert list; right pane is empty or shows the selection.
  AlertList,
  /// Focus on the alert detail pane.
  AlertDetail,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level dashboard state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// All alerts returned by the API on the last reload, newest first.
  pub alerts: Vec<Alert>,

  /// Current fuzzy-filter string (only edited while `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* alert list.
  pub list_cursor: usize,

  /// Id of the currently-selected alert (detail pane).
  pub selected_alert_id: Option<AlertId>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// When the alert list was last fetched.
  pub last_refresh: Instant,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] with an empty alert list.
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::AlertList,
      alerts: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      selected_alert_id: None,
      status_msg: String::new(),
      last_refresh: Instant::now(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch all alerts from the API and reconcile cursor and selection.
  pub async fn reload(&mut self) -> anyhow::Result<()> {
    self.last_refresh = Instant::now();
    match self.client.list_alerts(None, None).await {
      Ok(alerts) => {
        self.alerts = alerts;
        let len = self.filtered_alerts().len();
        if self.list_cursor >= len {
          self.list_cursor = len.saturating_sub(1);
        }
        // The selected alert may have been deleted elsewhere.
        if let Some(id) = self.selected_alert_id
          && !self.alerts.iter().any(|a| a.id == id)
        {
          self.selected_alert_id = None;
          self.screen = Screen::AlertList;
        }
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  /// Reload when the refresh period has elapsed. Failures stay in the
  /// status bar; the dashboard keeps its stale list.
  pub async fn maybe_refresh(&mut self) {
    if self.last_refresh.elapsed() >= REFRESH_PERIOD {
      self.reload().await.ok();
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Returns alerts that match the current filter query.
  pub fn filtered_alerts(&self) -> Vec<&Alert> {
    if self.filter.is_empty() {
      return self.alerts.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .alerts
      .iter()
      .filter(|a| {
        matcher.fuzzy_match(&a.name, &self.filter).is_some()
          || matcher.fuzzy_match(&a.contact, &self.filter).is_some()
          || matcher
            .fuzzy_match(&a.id.to_string(), &self.filter)
            .is_some()
      })
      .collect()
  }

  /// The alert under the list cursor in the filtered view, if any.
  pub fn cursor_alert(&self) -> Option<&Alert> {
    let list = self.filtered_alerts();
    list.get(self.list_cursor).copied()
  }

  /// The alert shown in the detail pane, if any.
  pub fn selected_alert(&self) -> Option<&Alert> {
    self
      .selected_alert_id
      .and_then(|id| self.alerts.iter().find(|a| a.id == id))
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      return Ok(self.handle_filter_key(key));
    }

    match self.screen {
      Screen::AlertList => self.handle_list_key(key).await,
      Screen::AlertDetail => self.handle_detail_key(key).await,
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Immediately open detail if there's exactly one match.
        let list = self.filtered_alerts();
        if list.len() == 1 {
          let id = list[0].id;
          self.open_detail(id);
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    true
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_alerts().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
        }
      }

      // Open detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_alert().map(|a| a.id) {
          self.open_detail(id);
        }
      }

      // Filter
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      // Mutations on the alert under the cursor
      KeyCode::Char('r') => {
        if let Some(id) = self.cursor_alert().map(|a| a.id) {
          self.resolve(id).await;
        }
      }
      KeyCode::Char('d') => {
        if let Some(id) = self.cursor_alert().map(|a| a.id) {
          self.delete(id).await;
        }
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Back to list
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::AlertList;
        self.selected_alert_id = None;
      }

      // Mutations on the selected alert
      KeyCode::Char('r') => {
        if let Some(id) = self.selected_alert_id {
          self.resolve(id).await;
        }
      }
      KeyCode::Char('d') => {
        if let Some(id) = self.selected_alert_id {
          self.delete(id).await;
          // reload() drops the selection once the alert is gone.
        }
      }

      // Navigate list from detail (for quick switching)
      KeyCode::Char(']') | KeyCode::PageDown => {
        let len = self.filtered_alerts().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
          if let Some(id) = self.cursor_alert().map(|a| a.id) {
            self.open_detail(id);
          }
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
          if let Some(id) = self.cursor_alert().map(|a| a.id) {
            self.open_detail(id);
          }
        }
      }

      _ => {}
    }
    Ok(true)
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn resolve(&mut self, id: AlertId) {
    match self.client.resolve_alert(id).await {
      Ok(_) => {
        self.reload().await.ok();
        self.status_msg = format!("Alert {id} resolved");
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  async fn delete(&mut self, id: AlertId) {
    match self.client.delete_alert(id).await {
      Ok(()) => {
        self.reload().await.ok();
        self.status_msg = format!("Alert {id} deleted");
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  /// Transition to `AlertDetail` for `id`.
  fn open_detail(&mut self, id: AlertId) {
    self.selected_alert_id = Some(id);
    self.screen = Screen::AlertDetail;
  }
}
