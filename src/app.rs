use crate::config::Config;
use crate::controller::{Controller, ControllerSettings, Direction};
use crate::event::{Event, EventHandler, SnipperEvent};
use crate::snipper::client::{HttpTransport, SnipperClient};
use crate::ui;
use crate::ui::components::InputResult;
use crate::ui::screen::WeekScreen;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  /// Typing into the snippet input
  Insert,
}

/// Main application state
pub struct App {
  /// Week navigation and snippet submission
  controller: Controller<WeekScreen, HttpTransport>,

  /// Terminal input, ticks and request completions
  events: EventHandler,

  /// Current input mode
  mode: Mode,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    let client = SnipperClient::new(config)?;
    let events = EventHandler::new(Duration::from_millis(250));
    let transport = HttpTransport::new(client, events.sender());

    let settings = ControllerSettings {
      placeholder: config.placeholder.clone(),
      verification: config.verification_token(),
    };

    Ok(Self {
      controller: Controller::new(WeekScreen::new(), transport, settings),
      events,
      mode: Mode::Normal,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Initial data load
    self.controller.start();

    let result = self.main_loop(&mut terminal).await;

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match self.events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::Snipper(snipper_event) => self.handle_snipper_event(snipper_event),
    }
  }

  fn handle_snipper_event(&mut self, event: SnipperEvent) {
    match event {
      SnipperEvent::WeekFetched { offset, result } => {
        self.controller.on_fetch_complete(offset, result);
      }
      SnipperEvent::SnippetAdded { ticket, result } => {
        self.controller.on_add_complete(ticket, result);
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Insert => self.handle_insert_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => self.should_quit = true,

      // Navigation
      KeyCode::Left | KeyCode::Char('h') => self.controller.navigate(Direction::Newer),
      KeyCode::Right | KeyCode::Char('l') => self.controller.navigate(Direction::Older),
      KeyCode::Char('c') => self.controller.navigate(Direction::Current),
      KeyCode::Char('r') => self.controller.refresh(),

      // Mode switches
      KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
        self.mode = Mode::Insert;
        self.controller.focus_input();
      }

      _ => {}
    }
  }

  fn handle_insert_mode_key(&mut self, key: KeyEvent) {
    match self.controller.view_mut().input.handle_key(key) {
      InputResult::Edited => {
        let value = self.controller.view().input.value().to_string();
        self.controller.input_changed(&value);
      }
      InputResult::Submitted => {
        self.controller.add();
      }
      InputResult::Cancelled => {
        self.mode = Mode::Normal;
        self.controller.blur_input();
      }
      InputResult::Consumed | InputResult::NotHandled => {}
    }
  }

  // Accessors for UI rendering
  pub fn controller(&self) -> &Controller<WeekScreen, HttpTransport> {
    &self.controller
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }
}
