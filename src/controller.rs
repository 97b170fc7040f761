//! Week navigation and snippet submission state machine.
//!
//! The controller owns the selected offset, the week cache and the set of
//! fetches in flight. It decides when the network is needed, merges
//! responses into the cache and keeps the view in sync.
//!
//! Prior weeks never change once fetched, so navigating back to a cached
//! week renders immediately without a request. Adds are optimistic: the
//! snippet shows up in the current week right away and is rolled back if
//! the server refuses it.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::cache::{WeekCache, CURRENT_WEEK};
use crate::snipper::types::{DateRange, Offset, WeekRecord};
use crate::transport::{AddForm, AddTicket, Transport, TransportError};
use crate::ui::view::{NavAffordance, WeekView};

/// Navigation request from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// One week forward in time (no-op on the current week)
  Newer,
  /// One week back in time
  Older,
  /// Back to the current week
  Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
  Idle,
  /// A fetch for the displayed week is outstanding
  Fetching,
}

/// Snippet input as tracked by the controller
#[derive(Debug, Clone)]
pub struct InputState {
  value: String,
  placeholder: String,
  is_placeholder: bool,
}

impl InputState {
  fn new(placeholder: String) -> Self {
    Self {
      value: placeholder.clone(),
      placeholder,
      is_placeholder: true,
    }
  }

  pub fn value(&self) -> &str {
    &self.value
  }

  pub fn is_placeholder(&self) -> bool {
    self.is_placeholder
  }

  /// Whether the input holds something the user actually typed
  fn has_submission(&self) -> bool {
    !self.is_placeholder && !self.value.is_empty() && self.value != self.placeholder
  }
}

/// Per-instance settings
#[derive(Debug, Clone)]
pub struct ControllerSettings {
  /// Text shown in the empty input
  pub placeholder: String,
  /// Opaque token sent with every add
  pub verification: String,
}

pub struct Controller<V, T> {
  offset: Offset,
  cache: WeekCache,
  /// Offsets with a fetch outstanding, at most one each
  in_flight: BTreeSet<Offset>,
  input: InputState,
  verification: String,
  next_ticket: u64,
  pending_adds: usize,
  view: V,
  transport: T,
}

impl<V: WeekView, T: Transport> Controller<V, T> {
  pub fn new(view: V, transport: T, settings: ControllerSettings) -> Self {
    Self {
      offset: CURRENT_WEEK,
      cache: WeekCache::new(),
      in_flight: BTreeSet::new(),
      input: InputState::new(settings.placeholder),
      verification: settings.verification,
      next_ticket: 0,
      pending_adds: 0,
      view,
      transport,
    }
  }

  /// Show the placeholder and load the current week.
  pub fn start(&mut self) {
    self.view.set_input_value(&self.input.placeholder);
    self.ensure_loaded(self.offset);
  }

  pub fn navigate(&mut self, direction: Direction) {
    match direction {
      Direction::Newer => {
        if self.offset > CURRENT_WEEK {
          self.offset -= 1;
        }
      }
      Direction::Older => self.offset = self.offset.saturating_add(1),
      Direction::Current => self.offset = CURRENT_WEEK,
    }
    debug!(offset = self.offset, ?direction, "navigate");
    self.ensure_loaded(self.offset);
  }

  /// Render `offset` from cache, or fetch it if it has never been loaded.
  pub fn ensure_loaded(&mut self, offset: Offset) {
    if offset == self.offset {
      self.view.set_load_error(None);
    }

    if self.cache.has(offset) {
      debug!(offset, "week cached");
      if offset == self.offset {
        self.render();
      }
      return;
    }

    if offset == self.offset {
      self.update_nav();
      self.view.set_loading(true);
    }
    self.issue_fetch(offset);
  }

  /// Re-fetch the current week. Other weeks are immutable and just re-render.
  pub fn refresh(&mut self) {
    if self.offset != CURRENT_WEEK {
      self.ensure_loaded(self.offset);
      return;
    }
    self.view.set_load_error(None);
    self.view.set_loading(true);
    self.issue_fetch(CURRENT_WEEK);
  }

  fn issue_fetch(&mut self, offset: Offset) {
    if !self.in_flight.insert(offset) {
      debug!(offset, "fetch already in flight");
      return;
    }
    info!(offset, "fetching week");
    self.transport.fetch(offset);
  }

  pub fn on_fetch_complete(&mut self, offset: Offset, result: Result<WeekRecord, TransportError>) {
    match result {
      Ok(week) => self.on_fetch_success(offset, week.dates, week.texts),
      Err(err) => self.on_fetch_failure(offset, err),
    }
  }

  pub fn on_fetch_success(&mut self, offset: Offset, dates: DateRange, texts: Vec<String>) {
    self.in_flight.remove(&offset);
    info!(offset, count = texts.len(), "week loaded");
    self.cache.put(offset, dates, texts);

    if offset == self.offset {
      self.render();
    } else {
      debug!(offset, current = self.offset, "stale week response cached");
    }
  }

  pub fn on_fetch_failure(&mut self, offset: Offset, error: TransportError) {
    self.in_flight.remove(&offset);
    warn!(offset, %error, "week fetch failed");

    if offset != self.offset {
      return;
    }
    if self.cache.has(offset) {
      // Failed refresh: keep showing what we had
      self.render();
    } else {
      self.view.set_loading(false);
    }
    self.view.set_load_error(Some(&error.to_string()));
  }

  pub fn focus_input(&mut self) {
    if self.input.is_placeholder {
      self.input.value.clear();
      self.input.is_placeholder = false;
      self.view.set_input_value("");
    }
  }

  pub fn blur_input(&mut self) {
    if self.input.value.is_empty() {
      self.input.value = self.input.placeholder.clone();
      self.input.is_placeholder = true;
      self.view.set_input_value(&self.input.placeholder);
    }
  }

  /// Mirror an edit made in the presentation layer.
  pub fn input_changed(&mut self, text: &str) {
    self.input.value = text.to_string();
    self.input.is_placeholder = false;
  }

  /// Submit the current input. Returns false when there is nothing to send.
  pub fn add(&mut self) -> bool {
    if !self.input.has_submission() {
      debug!("empty or placeholder input, skipping add");
      return false;
    }

    let text = std::mem::take(&mut self.input.value);
    self.view.set_input_value("");
    self.view.clear_add_error();

    let appended = match self.cache.append_local(&text) {
      Ok(()) => true,
      Err(e) => {
        warn!(%e, "adding without local preview");
        false
      }
    };
    if appended && self.offset == CURRENT_WEEK {
      self.render();
    }

    self.next_ticket += 1;
    self.pending_adds += 1;
    let ticket = AddTicket {
      id: self.next_ticket,
      text: text.clone(),
      appended,
    };
    info!(ticket = ticket.id, "submitting snippet");

    let form = AddForm {
      verification: self.verification.clone(),
      text,
    };
    self.transport.post(ticket, form);
    true
  }

  pub fn on_add_complete(&mut self, ticket: AddTicket, result: Result<(), TransportError>) {
    match result {
      Ok(()) => self.on_add_success(ticket),
      Err(err) => self.on_add_failure(ticket, err),
    }
  }

  pub fn on_add_success(&mut self, ticket: AddTicket) {
    self.pending_adds = self.pending_adds.saturating_sub(1);
    info!(ticket = ticket.id, "snippet saved");
    if ticket.appended {
      self.cache.confirm_local(&ticket.text);
    }
  }

  /// Roll back a refused add and hand the text back to the user.
  pub fn on_add_failure(&mut self, ticket: AddTicket, error: TransportError) {
    self.pending_adds = self.pending_adds.saturating_sub(1);
    warn!(ticket = ticket.id, %error, "snippet add failed, rolling back");

    if ticket.appended && !self.cache.remove_last_local(&ticket.text) {
      debug!(ticket = ticket.id, "optimistic entry already gone");
    }

    self.view.set_input_value(&ticket.text);
    self.input.value = ticket.text;
    self.input.is_placeholder = false;
    self.view.set_add_error();

    if self.offset == CURRENT_WEEK {
      self.render();
    }
  }

  fn update_nav(&mut self) {
    let visible = self.offset != CURRENT_WEEK;
    self.view.set_nav_affordance(NavAffordance::Current, visible);
    self.view.set_nav_affordance(NavAffordance::Newer, visible);
  }

  fn render(&mut self) {
    self.update_nav();
    if let Some(week) = self.cache.get(self.offset) {
      self.view.set_loading(false);
      self.view.render_week(&week.dates, &week.texts);
    }
  }

  // Accessors

  pub fn offset(&self) -> Offset {
    self.offset
  }

  pub fn state(&self) -> ControllerState {
    if self.is_pending() {
      ControllerState::Fetching
    } else {
      ControllerState::Idle
    }
  }

  /// True while the displayed week is being fetched
  pub fn is_pending(&self) -> bool {
    self.in_flight.contains(&self.offset)
  }

  pub fn cache(&self) -> &WeekCache {
    &self.cache
  }

  pub fn input(&self) -> &InputState {
    &self.input
  }

  /// Adds still waiting for a server answer
  pub fn pending_adds(&self) -> usize {
    self.pending_adds
  }

  pub fn view(&self) -> &V {
    &self.view
  }

  pub fn view_mut(&mut self) -> &mut V {
    &mut self.view
  }

  #[cfg(test)]
  pub fn transport(&self) -> &T {
    &self.transport
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct RecordingTransport {
    fetches: Vec<Offset>,
    posts: Vec<(AddTicket, AddForm)>,
  }

  impl Transport for RecordingTransport {
    fn fetch(&mut self, offset: Offset) {
      self.fetches.push(offset);
    }

    fn post(&mut self, ticket: AddTicket, form: AddForm) {
      self.posts.push((ticket, form));
    }
  }

  #[derive(Default)]
  struct RecordingView {
    dates: Option<DateRange>,
    texts: Vec<String>,
    renders: usize,
    loading: bool,
    current_visible: bool,
    newer_visible: bool,
    input: String,
    add_error: bool,
    load_error: Option<String>,
  }

  impl WeekView for RecordingView {
    fn render_week(&mut self, dates: &DateRange, texts: &[String]) {
      self.dates = Some(dates.clone());
      self.texts = texts.to_vec();
      self.renders += 1;
    }

    fn set_loading(&mut self, loading: bool) {
      self.loading = loading;
    }

    fn set_nav_affordance(&mut self, affordance: NavAffordance, visible: bool) {
      match affordance {
        NavAffordance::Current => self.current_visible = visible,
        NavAffordance::Newer => self.newer_visible = visible,
      }
    }

    fn set_input_value(&mut self, text: &str) {
      self.input = text.to_string();
    }

    fn set_add_error(&mut self) {
      self.add_error = true;
    }

    fn clear_add_error(&mut self) {
      self.add_error = false;
    }

    fn set_load_error(&mut self, message: Option<&str>) {
      self.load_error = message.map(String::from);
    }
  }

  const PLACEHOLDER: &str = "What did you get done?";

  type TestController = Controller<RecordingView, RecordingTransport>;

  fn controller() -> TestController {
    Controller::new(
      RecordingView::default(),
      RecordingTransport::default(),
      ControllerSettings {
        placeholder: PLACEHOLDER.to_string(),
        verification: "v1".to_string(),
      },
    )
  }

  fn week(label: &str, items: &[&str]) -> WeekRecord {
    WeekRecord {
      dates: DateRange {
        from: format!("{} from", label),
        to: format!("{} to", label),
      },
      texts: items.iter().map(|s| s.to_string()).collect(),
    }
  }

  /// Controller that has started and received the current week
  fn loaded(items: &[&str]) -> TestController {
    let mut c = controller();
    c.start();
    c.on_fetch_complete(0, Ok(week("w0", items)));
    c
  }

  fn type_text(c: &mut TestController, text: &str) {
    c.focus_input();
    c.input_changed(text);
  }

  #[test]
  fn test_start_fetches_current_week() {
    let mut c = controller();
    c.start();

    assert_eq!(c.transport().fetches, vec![0]);
    assert_eq!(c.state(), ControllerState::Fetching);
    assert!(c.view().loading);
    assert_eq!(c.view().input, PLACEHOLDER);
    assert!(c.input().is_placeholder());
  }

  #[test]
  fn test_fetch_success_renders() {
    let c = loaded(&["a", "b"]);

    assert_eq!(c.state(), ControllerState::Idle);
    assert!(!c.view().loading);
    assert_eq!(c.view().texts, vec!["a", "b"]);
    assert_eq!(c.view().dates.as_ref().unwrap().from, "w0 from");
    assert!(!c.view().current_visible);
    assert!(!c.view().newer_visible);
  }

  #[test]
  fn test_cached_offset_issues_no_fetch() {
    let mut c = loaded(&["a"]);
    let renders = c.view().renders;

    c.ensure_loaded(0);

    assert_eq!(c.transport().fetches, vec![0]);
    assert_eq!(c.view().renders, renders + 1);
  }

  #[test]
  fn test_concurrent_ensure_loaded_fetches_once() {
    let mut c = loaded(&[]);
    c.navigate(Direction::Older);
    c.ensure_loaded(1);
    c.ensure_loaded(1);

    assert_eq!(c.transport().fetches, vec![0, 1]);
    assert!(c.is_pending());
  }

  #[test]
  fn test_newer_at_current_week_is_noop() {
    let mut c = loaded(&["a"]);
    c.navigate(Direction::Newer);

    assert_eq!(c.offset(), 0);
    assert_eq!(c.transport().fetches, vec![0]);
    assert_eq!(c.view().texts, vec!["a"]);
  }

  #[test]
  fn test_navigation_scenario_fetches_each_week_once() {
    let mut c = loaded(&["now"]);

    c.navigate(Direction::Older);
    c.on_fetch_complete(1, Ok(week("w1", &["last week"])));
    c.navigate(Direction::Older);
    c.on_fetch_complete(2, Ok(week("w2", &["two weeks ago"])));
    c.navigate(Direction::Newer);
    assert_eq!(c.view().texts, vec!["last week"]);
    c.navigate(Direction::Current);

    assert_eq!(c.offset(), 0);
    // Initial load plus offsets 1 and 2, nothing re-fetched on the way back
    assert_eq!(c.transport().fetches, vec![0, 1, 2]);
    assert_eq!(c.view().texts, vec!["now"]);
  }

  #[test]
  fn test_nav_affordances_follow_offset() {
    let mut c = loaded(&[]);

    c.navigate(Direction::Older);
    assert!(c.view().current_visible);
    assert!(c.view().newer_visible);

    c.on_fetch_complete(1, Ok(week("w1", &[])));
    assert!(c.view().current_visible);

    c.navigate(Direction::Current);
    assert!(!c.view().current_visible);
    assert!(!c.view().newer_visible);
  }

  #[test]
  fn test_stale_response_is_cached_but_not_rendered() {
    let mut c = loaded(&["now"]);
    c.navigate(Direction::Older);
    c.navigate(Direction::Older);
    assert_eq!(c.transport().fetches, vec![0, 1, 2]);

    // Week 1 arrives while week 2 is displayed
    c.on_fetch_complete(1, Ok(week("w1", &["late"])));
    assert_eq!(c.cache().get(1).unwrap().texts, vec!["late"]);
    assert!(c.view().loading);
    assert_ne!(c.view().texts, vec!["late"]);

    // Returning to week 1 is a cache hit
    c.navigate(Direction::Newer);
    assert_eq!(c.transport().fetches, vec![0, 1, 2]);
    assert_eq!(c.view().texts, vec!["late"]);
  }

  #[test]
  fn test_fetch_failure_surfaces_error_and_allows_retry() {
    let mut c = loaded(&[]);
    c.navigate(Direction::Older);
    c.on_fetch_complete(1, Err(TransportError::Status(500)));

    assert_eq!(c.state(), ControllerState::Idle);
    assert!(!c.view().loading);
    assert!(c.view().load_error.is_some());
    assert!(!c.cache().has(1));

    // No automatic retry; navigating again issues a new request
    c.navigate(Direction::Newer);
    c.navigate(Direction::Older);
    assert_eq!(c.transport().fetches, vec![0, 1, 1]);
    assert!(c.view().load_error.is_none());
  }

  #[test]
  fn test_malformed_response_leaves_cache_empty() {
    let mut c = controller();
    c.start();
    c.on_fetch_complete(0, Err(TransportError::Malformed("eof".to_string())));

    assert!(c.cache().is_empty());
    assert!(c.view().load_error.is_some());
  }

  #[test]
  fn test_stale_failure_does_not_touch_view() {
    let mut c = loaded(&["now"]);
    c.navigate(Direction::Older);
    c.navigate(Direction::Current);
    c.on_fetch_complete(1, Err(TransportError::Network("reset".to_string())));

    assert!(c.view().load_error.is_none());
    assert_eq!(c.view().texts, vec!["now"]);
  }

  #[test]
  fn test_refresh_refetches_only_current_week() {
    let mut c = loaded(&["a"]);
    c.refresh();
    c.refresh();
    assert_eq!(c.transport().fetches, vec![0, 0]);

    c.on_fetch_complete(0, Ok(week("w0", &["a", "b"])));
    assert_eq!(c.view().texts, vec!["a", "b"]);

    c.navigate(Direction::Older);
    c.on_fetch_complete(1, Ok(week("w1", &[])));
    c.refresh();
    assert_eq!(c.transport().fetches, vec![0, 0, 1]);
  }

  #[test]
  fn test_failed_refresh_keeps_cached_week() {
    let mut c = loaded(&["a"]);
    c.refresh();
    c.on_fetch_complete(0, Err(TransportError::Status(503)));

    assert!(!c.view().loading);
    assert_eq!(c.view().texts, vec!["a"]);
    assert!(c.view().load_error.is_some());
  }

  #[test]
  fn test_add_happy_path() {
    let mut c = loaded(&["earlier"]);
    type_text(&mut c, "Shipped the thing");

    assert!(c.add());

    // Cleared and shown before the server answers
    assert_eq!(c.view().input, "");
    assert_eq!(c.input().value(), "");
    assert!(c.cache().get(0).unwrap().texts.contains(&"Shipped the thing".to_string()));
    assert_eq!(c.view().texts, vec!["earlier", "Shipped the thing"]);
    assert_eq!(c.pending_adds(), 1);

    let (ticket, form) = c.transport().posts[0].clone();
    assert_eq!(form.encode(), "v=v1&s=Shipped+the+thing");

    c.on_add_complete(ticket, Ok(()));
    assert_eq!(c.pending_adds(), 0);
    assert!(c.cache().get(0).unwrap().texts.contains(&"Shipped the thing".to_string()));
    assert!(!c.view().add_error);
  }

  #[test]
  fn test_add_failure_rolls_back() {
    let mut c = loaded(&["earlier"]);
    type_text(&mut c, "Shipped the thing");
    c.add();

    let (ticket, _) = c.transport().posts[0].clone();
    c.on_add_complete(ticket, Err(TransportError::Status(500)));

    assert_eq!(c.cache().get(0).unwrap().texts, vec!["earlier"]);
    assert_eq!(c.view().texts, vec!["earlier"]);
    assert_eq!(c.view().input, "Shipped the thing");
    assert_eq!(c.input().value(), "Shipped the thing");
    assert!(!c.input().is_placeholder());
    assert!(c.view().add_error);
  }

  #[test]
  fn test_add_skips_empty_and_placeholder_input() {
    let mut c = loaded(&["a"]);

    // Untouched input shows the placeholder
    assert!(!c.add());

    c.focus_input();
    assert!(!c.add());

    c.input_changed(PLACEHOLDER);
    assert!(!c.add());

    assert!(c.transport().posts.is_empty());
    assert_eq!(c.cache().get(0).unwrap().texts, vec!["a"]);
  }

  #[test]
  fn test_add_sends_whitespace_input() {
    let mut c = loaded(&[]);
    type_text(&mut c, "  ");

    assert!(c.add());
    assert_eq!(c.transport().posts.len(), 1);
    assert_eq!(c.transport().posts[0].1.text, "  ");
  }

  #[test]
  fn test_refresh_during_add_keeps_optimistic_entry() {
    let mut c = loaded(&["earlier"]);
    type_text(&mut c, "Shipped the thing");
    c.add();

    c.refresh();
    c.on_fetch_complete(0, Ok(week("w0", &["earlier"])));
    assert_eq!(c.view().texts, vec!["earlier", "Shipped the thing"]);

    let (ticket, _) = c.transport().posts[0].clone();
    c.on_add_complete(ticket, Ok(()));

    assert_eq!(
      c.cache().get(0).unwrap().texts,
      vec!["earlier", "Shipped the thing"]
    );
    assert_eq!(c.view().texts, vec!["earlier", "Shipped the thing"]);
  }

  #[test]
  fn test_failed_add_after_refresh_keeps_fetched_duplicate() {
    let mut c = loaded(&["standup"]);
    type_text(&mut c, "standup");
    c.add();

    c.refresh();
    c.on_fetch_complete(0, Ok(week("w0", &["standup"])));

    let (ticket, _) = c.transport().posts[0].clone();
    c.on_add_complete(ticket, Err(TransportError::Status(500)));

    assert_eq!(c.cache().get(0).unwrap().texts, vec!["standup"]);
    assert_eq!(c.view().texts, vec!["standup"]);
    assert_eq!(c.input().value(), "standup");
  }

  #[test]
  fn test_saved_add_survives_refresh_that_missed_it() {
    let mut c = loaded(&[]);
    c.refresh();
    type_text(&mut c, "late save");
    c.add();

    let (ticket, _) = c.transport().posts[0].clone();
    c.on_add_complete(ticket, Ok(()));
    // Refresh was issued before the save reached the server
    c.on_fetch_complete(0, Ok(week("w0", &[])));

    assert_eq!(c.cache().get(0).unwrap().texts, vec!["late save"]);
  }

  #[test]
  fn test_concurrent_adds_roll_back_independently() {
    let mut c = loaded(&[]);
    type_text(&mut c, "first");
    c.add();
    c.input_changed("second");
    c.add();

    let first = c.transport().posts[0].0.clone();
    let second = c.transport().posts[1].0.clone();
    assert_ne!(first.id, second.id);

    c.on_add_complete(first, Err(TransportError::Rejected));
    c.on_add_complete(second, Ok(()));

    assert_eq!(c.cache().get(0).unwrap().texts, vec!["second"]);
    assert_eq!(c.input().value(), "first");
    assert_eq!(c.pending_adds(), 0);
  }

  #[test]
  fn test_add_while_viewing_older_week() {
    let mut c = loaded(&[]);
    c.navigate(Direction::Older);
    c.on_fetch_complete(1, Ok(week("w1", &["old"])));
    let renders = c.view().renders;

    type_text(&mut c, "late add");
    c.add();

    // Week 0 is updated but week 1 stays on screen
    assert_eq!(c.cache().get(0).unwrap().texts, vec!["late add"]);
    assert_eq!(c.view().texts, vec!["old"]);
    assert_eq!(c.view().renders, renders);

    // A late failure still rolls back week 0 without re-rendering week 1
    let (ticket, _) = c.transport().posts[0].clone();
    c.on_add_complete(ticket, Err(TransportError::Status(403)));
    assert!(c.cache().get(0).unwrap().texts.is_empty());
    assert_eq!(c.view().texts, vec!["old"]);
  }

  #[test]
  fn test_add_before_current_week_loaded() {
    let mut c = controller();
    c.start();
    type_text(&mut c, "early");

    assert!(c.add());
    let (ticket, _) = c.transport().posts[0].clone();
    assert!(!ticket.appended);

    c.on_add_complete(ticket, Err(TransportError::Network("down".to_string())));
    assert!(c.cache().is_empty());
    assert_eq!(c.input().value(), "early");
  }

  #[test]
  fn test_focus_and_blur_placeholder() {
    let mut c = controller();
    c.start();

    c.focus_input();
    assert_eq!(c.view().input, "");
    assert!(!c.input().is_placeholder());

    c.blur_input();
    assert_eq!(c.view().input, PLACEHOLDER);
    assert!(c.input().is_placeholder());

    c.focus_input();
    c.input_changed("draft");
    c.blur_input();
    assert_eq!(c.input().value(), "draft");
    assert!(!c.input().is_placeholder());
  }
}
