use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// What the status bar shows, left to right
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
  pub mode: &'static str,
  pub hint: &'static str,
  pub error: Option<String>,
  /// The displayed week is being fetched
  pub fetching: bool,
  pub pending_adds: usize,
  pub cached_weeks: usize,
}

/// Draw the status bar with mode, key hints and any error
pub fn draw_status_bar(frame: &mut Frame, area: Rect, status: &StatusLine) {
  let mut spans = vec![
    Span::styled(
      format!(" {} ", status.mode),
      Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
    ),
    Span::raw(" "),
  ];

  if let Some(error) = &status.error {
    spans.push(Span::styled(error.clone(), Style::default().fg(Color::Red)));
  } else {
    spans.push(Span::styled(status.hint, Style::default().fg(Color::DarkGray)));
  }

  if status.fetching {
    spans.push(Span::styled("  fetching...", Style::default().fg(Color::Yellow)));
  }

  if status.pending_adds > 0 {
    spans.push(Span::styled(
      format!("  saving {}...", status.pending_adds),
      Style::default().fg(Color::Yellow),
    ));
  }

  spans.push(Span::styled(
    format!("  [{} cached]", status.cached_weeks),
    Style::default().fg(Color::DarkGray),
  ));

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
