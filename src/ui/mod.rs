pub mod components;
pub mod screen;
pub mod view;

use crate::app::{App, Mode};
use crate::controller::ControllerState;
use components::{draw_status_bar, StatusLine};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use screen::WeekScreen;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Week header
      Constraint::Min(1),    // Snippets
      Constraint::Length(3), // Input
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let controller = app.controller();
  let screen = controller.view();

  draw_header(frame, chunks[0], screen, controller.offset());
  draw_snippets(frame, chunks[1], screen);
  draw_input(frame, chunks[2], app);

  let error = screen
    .load_error
    .as_ref()
    .map(|e| format!("Could not load week: {}", e))
    .or_else(|| {
      screen
        .add_error
        .then(|| "Snippet was not saved, edit and press Enter to retry".to_string())
    });

  let status = StatusLine {
    mode: match app.mode() {
      Mode::Normal => "NORMAL",
      Mode::Insert => "INSERT",
    },
    hint: match app.mode() {
      Mode::Normal => "i:add  h/l:newer/older  c:current  r:refresh  q:quit",
      Mode::Insert => "Enter:save  Esc:done",
    },
    error,
    fetching: controller.state() == ControllerState::Fetching,
    pending_adds: controller.pending_adds(),
    cached_weeks: controller.cache().len(),
  };
  draw_status_bar(frame, chunks[3], &status);
}

fn draw_header(frame: &mut Frame, area: Rect, screen: &WeekScreen, offset: u32) {
  let mut spans = vec![Span::styled(
    " <- older (l) ",
    Style::default().fg(Color::Cyan),
  )];

  let label = match &screen.dates {
    Some(dates) => dates.to_string(),
    None if screen.loading => "Loading...".to_string(),
    None => String::new(),
  };
  spans.push(Span::styled(
    format!(" {} ", label),
    Style::default().fg(Color::White).bold(),
  ));
  let age = match offset {
    0 => "this week".to_string(),
    1 => "last week".to_string(),
    n => format!("{} weeks ago", n),
  };
  spans.push(Span::styled(
    format!("({}) ", age),
    Style::default().fg(Color::DarkGray),
  ));

  if screen.show_newer {
    spans.push(Span::styled(
      " newer (h) -> ",
      Style::default().fg(Color::Cyan),
    ));
  }
  if screen.show_current {
    spans.push(Span::styled(
      " current (c) ",
      Style::default().fg(Color::Cyan),
    ));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_snippets(frame: &mut Frame, area: Rect, screen: &WeekScreen) {
  let title = if screen.loading {
    " Snippets (loading...) ".to_string()
  } else {
    format!(" Snippets ({}) ", screen.texts.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if screen.loading || screen.texts.is_empty() {
    let content = if screen.loading {
      "Loading..."
    } else if screen.load_error.is_some() {
      "Week not loaded."
    } else {
      "No snippets this week."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = screen
    .texts
    .iter()
    .map(|text| ListItem::new(Line::from(vec![Span::raw("- "), Span::raw(text.as_str())])))
    .collect();

  frame.render_widget(List::new(items).block(block), area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
  let controller = app.controller();
  let input = &controller.view().input;
  let editing = *app.mode() == Mode::Insert;

  let style = if controller.input().is_placeholder() {
    Style::default().fg(Color::DarkGray).italic()
  } else {
    Style::default().fg(Color::White)
  };

  let border = if editing { Color::Yellow } else { Color::DarkGray };
  let block = Block::default()
    .title(" Add snippet ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let paragraph = Paragraph::new(input.value()).style(style).block(block);
  frame.render_widget(paragraph, area);

  if editing {
    frame.set_cursor_position((
      cursor_x(area, input.cursor_column()),
      area.y.saturating_add(1),
    ));
  }
}

/// Terminal column of the input cursor, clamped inside the input border
fn cursor_x(area: Rect, column: usize) -> u16 {
  let column = u16::try_from(column).unwrap_or(u16::MAX);
  let x = area.x.saturating_add(1).saturating_add(column);
  x.min(area.right().saturating_sub(2))
}
