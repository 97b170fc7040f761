//! Serde-deserializable types matching the snippet server's JSON responses.
//!
//! Kept apart from the domain types so the wire shape can change without
//! touching the cache or controller.

use serde::Deserialize;

use super::types::{DateRange, WeekRecord};
use crate::transport::TransportError;

#[derive(Debug, Deserialize)]
pub struct ApiDates {
  pub from: String,
  pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiSnippet {
  pub text: String,
}

/// Response body of the week fetch endpoint
#[derive(Debug, Deserialize)]
pub struct ApiWeekResponse {
  pub dates: ApiDates,
  pub snippets: Vec<ApiSnippet>,
}

impl From<ApiWeekResponse> for WeekRecord {
  fn from(resp: ApiWeekResponse) -> Self {
    WeekRecord {
      dates: DateRange {
        from: resp.dates.from,
        to: resp.dates.to,
      },
      texts: resp.snippets.into_iter().map(|s| s.text).collect(),
    }
  }
}

/// Parse a week fetch body. Anything that doesn't match the expected shape
/// fails the fetch instead of reaching the cache.
pub fn parse_week(body: &[u8]) -> Result<WeekRecord, TransportError> {
  let resp: ApiWeekResponse =
    serde_json::from_slice(body).map_err(|e| TransportError::Malformed(e.to_string()))?;
  Ok(resp.into())
}

/// Interpret the body of a 200 response from the add endpoint.
///
/// The server answers `0` when it refused to save the snippet.
pub fn check_add_body(body: &str) -> Result<(), TransportError> {
  if body.trim() == "0" {
    return Err(TransportError::Rejected);
  }
  Ok(())
}
