//! Alert detail pane — right panel.

use alerto_core::alert::Alert;
use chrono::{DateTime, Local, Utc};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let title = match app.selected_alert() {
    Some(alert) => format!(" Alert {} ", alert.id),
    None => " Detail ".to_string(),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(alert) = app.selected_alert() else {
    let hint = Paragraph::new("Press Enter to view an alert.")
      .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hint, inner);
    return;
  };

  let lines = vec![
    field("status", status_span(alert)),
    field("name", Span::raw(alert.name.clone())),
    field(
      "time",
      Span::raw(format!(
        "{} ({} ago)",
        stamp(alert.timestamp),
        super::age_label(alert.timestamp)
      )),
    ),
    field(
      "position",
      Span::raw(format!("{:.4}, {:.4}", alert.lat, alert.lon)),
    ),
    field("contact", Span::raw(alert.contact.clone())),
    field(
      "map",
      Span::styled(alert.maps_url(), Style::default().fg(Color::DarkGray)),
    ),
    Line::from(""),
    Line::from(vec![Span::styled(
      "[r] resolve  [d] delete  [Esc] back",
      Style::default().fg(Color::DarkGray),
    )]),
  ];

  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

fn field(label: &str, value: Span<'static>) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<10}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    value,
  ])
}

fn status_span(alert: &Alert) -> Span<'static> {
  if alert.status.is_active() {
    Span::styled(
      "Active",
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )
  } else {
    Span::styled("Resolved", Style::default().fg(Color::Green))
  }
}

fn stamp(ts: DateTime<Utc>) -> String {
  ts.with_timezone(&Local)
    .format("%Y-%m-%d %H:%M:%S")
    .to_string()
}
