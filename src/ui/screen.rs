use super::components::TextInput;
use super::view::{NavAffordance, WeekView};
use crate::snipper::types::DateRange;

/// Terminal-side state of the week screen, written by the controller and
/// read by the draw functions.
#[derive(Debug, Default)]
pub struct WeekScreen {
  pub dates: Option<DateRange>,
  pub texts: Vec<String>,
  pub loading: bool,
  pub show_current: bool,
  pub show_newer: bool,
  pub input: TextInput,
  pub add_error: bool,
  pub load_error: Option<String>,
}

impl WeekScreen {
  pub fn new() -> Self {
    Self::default()
  }
}

impl WeekView for WeekScreen {
  fn render_week(&mut self, dates: &DateRange, texts: &[String]) {
    self.dates = Some(dates.clone());
    self.texts = texts.to_vec();
  }

  fn set_loading(&mut self, loading: bool) {
    self.loading = loading;
    if loading {
      // Never leave the previous week on screen under a new heading
      self.dates = None;
      self.texts.clear();
    }
  }

  fn set_nav_affordance(&mut self, affordance: NavAffordance, visible: bool) {
    match affordance {
      NavAffordance::Current => self.show_current = visible,
      NavAffordance::Newer => self.show_newer = visible,
    }
  }

  fn set_input_value(&mut self, text: &str) {
    self.input.set_value(text);
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
