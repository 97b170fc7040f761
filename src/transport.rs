//! Boundary between the controller and whatever performs network requests.
//!
//! Every request carries its own context (the offset for a fetch, an
//! [`AddTicket`] for an add). Completions hand that context back, so two
//! requests in flight never share a completion handler.

use thiserror::Error;
use url::form_urlencoded;

use crate::snipper::types::Offset;

/// Why a request did not produce a usable result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
  #[error("server returned status {0}")]
  Status(u16),
  #[error("network error: {0}")]
  Network(String),
  #[error("malformed response: {0}")]
  Malformed(String),
  #[error("server rejected the snippet")]
  Rejected,
}

/// Context for a single add request, returned with its completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTicket {
  pub id: u64,
  pub text: String,
  /// Whether the text was appended to the cached current week
  pub appended: bool,
}

/// Form body of the add endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForm {
  pub verification: String,
  pub text: String,
}

impl AddForm {
  /// Encode as `v=<token>&s=<text>`
  pub fn encode(&self) -> String {
    form_urlencoded::Serializer::new(String::new())
      .append_pair("v", &self.verification)
      .append_pair("s", &self.text)
      .finish()
  }
}

/// Issues requests on behalf of the controller.
///
/// Calls return immediately. Results are delivered later through
/// `Controller::on_fetch_complete` / `Controller::on_add_complete`.
pub trait Transport {
  /// Request the week at `offset`
  fn fetch(&mut self, offset: Offset);

  /// Submit a new snippet for the current week
  fn post(&mut self, ticket: AddTicket, form: AddForm);
}
