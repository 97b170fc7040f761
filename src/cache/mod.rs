//! In-memory cache of fetched weeks.
//!
//! This module provides the per-offset store the controller consults before
//! going to the network:
//! - A record exists for an offset once a fetch for it has succeeded
//! - Prior weeks are write-once; the current week may be re-fetched
//! - Only the current week is modified locally (optimistic adds)

mod week_cache;

pub use week_cache::{WeekCache, CURRENT_WEEK};
