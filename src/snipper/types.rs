/// Week offset relative to the current week (0 = this week, 1 = last week)
pub type Offset = u32;

/// Date range of a week as labelled by the server (e.g. "Oct 05" to "Oct 12")
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateRange {
  pub from: String,
  pub to: String,
}

impl std::fmt::Display for DateRange {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} to {}", self.from, self.to)
  }
}

/// Cached contents of one week
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRecord {
  pub dates: DateRange,
  pub texts: Vec<String>, // Display order
}
