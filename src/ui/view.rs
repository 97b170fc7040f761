use crate::snipper::types::DateRange;

/// Navigation links whose visibility depends on the selected week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAffordance {
  /// Jump back to the current week
  Current,
  /// Move one week forward in time
  Newer,
}

/// Presentation surface driven by the controller
///
/// The controller never reads from the view; everything it needs to decide
/// (offset, cache, input text) it tracks itself. Implementations only have
/// to reflect what they are told.
pub trait WeekView {
  /// Show a week's date range and snippets, replacing whatever was shown
  fn render_week(&mut self, dates: &DateRange, texts: &[String]);

  /// Toggle the loading indicator. While loading the list is disabled.
  fn set_loading(&mut self, loading: bool);

  fn set_nav_affordance(&mut self, affordance: NavAffordance, visible: bool);

  /// Replace the contents of the snippet input
  fn set_input_value(&mut self, text: &str);

  fn set_add_error(&mut self);

  fn clear_add_error(&mut self);

  /// Show or clear a failed week load
  fn set_load_error(&mut self, message: Option<&str>);
}
