//! Per-offset week storage.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::snipper::types::{DateRange, Offset, WeekRecord};

/// Offset of the only week that accepts local edits
pub const CURRENT_WEEK: Offset = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
  #[error("week at offset {0} has not been loaded")]
  NotLoaded(Offset),
}

/// A snippet added locally to the current week that no fetch has returned yet
#[derive(Debug, Clone)]
struct LocalEntry {
  text: String,
  /// The server accepted it; it can no longer be rolled back
  confirmed: bool,
}

/// Weeks known for this session, keyed by offset.
///
/// The current week is kept as the last fetched list plus a tail of local
/// adds. A re-fetch replaces the fetched part and keeps every local add
/// the new list does not account for, so optimistic entries survive a
/// refresh and rollbacks never touch fetched entries.
#[derive(Debug, Default)]
pub struct WeekCache {
  weeks: BTreeMap<Offset, WeekRecord>,
  fetched_current: Vec<String>,
  local: Vec<LocalEntry>,
}

impl WeekCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// True iff a fetch for `offset` has completed successfully
  pub fn has(&self, offset: Offset) -> bool {
    self.weeks.contains_key(&offset)
  }

  pub fn get(&self, offset: Offset) -> Option<&WeekRecord> {
    self.weeks.get(&offset)
  }

  /// Insert or overwrite the record for `offset`.
  pub fn put(&mut self, offset: Offset, dates: DateRange, texts: Vec<String>) {
    if offset != CURRENT_WEEK {
      if self.weeks.contains_key(&offset) {
        tracing::debug!(offset, "overwriting cached prior week");
      }
      self.weeks.insert(offset, WeekRecord { dates, texts });
      return;
    }

    self.absorb_local(&texts);
    self.fetched_current = texts;
    let texts = self.current_texts();
    self.weeks.insert(CURRENT_WEEK, WeekRecord { dates, texts });
  }

  /// Drop local entries that the freshly fetched list now contains.
  ///
  /// Only copies beyond those present in the previous fetch count, so a
  /// local add whose text already existed in the week is kept.
  fn absorb_local(&mut self, fetched: &[String]) {
    let mut arrived: HashMap<&str, usize> = HashMap::new();
    for text in fetched {
      *arrived.entry(text.as_str()).or_default() += 1;
    }
    for text in &self.fetched_current {
      if let Some(count) = arrived.get_mut(text.as_str()) {
        *count = count.saturating_sub(1);
      }
    }

    self.local.retain(|entry| match arrived.get_mut(entry.text.as_str()) {
      Some(count) if *count > 0 => {
        *count -= 1;
        false
      }
      _ => true,
    });
  }

  fn current_texts(&self) -> Vec<String> {
    self
      .fetched_current
      .iter()
      .chain(self.local.iter().map(|entry| &entry.text))
      .cloned()
      .collect()
  }

  fn sync_current(&mut self) {
    let texts = self.current_texts();
    if let Some(week) = self.weeks.get_mut(&CURRENT_WEEK) {
      week.texts = texts;
    }
  }

  /// Append a locally added snippet to the current week.
  pub fn append_local(&mut self, text: &str) -> Result<(), CacheError> {
    let week = self
      .weeks
      .get_mut(&CURRENT_WEEK)
      .ok_or(CacheError::NotLoaded(CURRENT_WEEK))?;
    week.texts.push(text.to_string());
    self.local.push(LocalEntry {
      text: text.to_string(),
      confirmed: false,
    });
    Ok(())
  }

  /// Mark the most recent unconfirmed local add of `text` as accepted.
  pub fn confirm_local(&mut self, text: &str) {
    if let Some(entry) = self
      .local
      .iter_mut()
      .rev()
      .find(|entry| !entry.confirmed && entry.text == text)
    {
      entry.confirmed = true;
    }
  }

  /// Undo an `append_local` of `text`.
  ///
  /// Removes the most recent unconfirmed local add of exactly `text`, so
  /// rolling back one add leaves other pending adds and every fetched entry
  /// in place. Returns whether anything was removed (a re-fetch may already
  /// have accounted for it).
  pub fn remove_last_local(&mut self, text: &str) -> bool {
    let Some(pos) = self
      .local
      .iter()
      .rposition(|entry| !entry.confirmed && entry.text == text)
    else {
      return false;
    };
    self.local.remove(pos);
    self.sync_current();
    true
  }

  /// Number of cached weeks
  pub fn len(&self) -> usize {
    self.weeks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.weeks.is_empty()
  }
}
