use crate::config::Config;
use crate::event::{Event, SnipperEvent};
use crate::snipper::api_types::{check_add_body, parse_week};
use crate::snipper::types::{Offset, WeekRecord};
use crate::transport::{AddForm, AddTicket, Transport, TransportError};
use color_eyre::{eyre::eyre, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tokio::sync::mpsc;
use url::Url;

/// HTTP client for the snippet server
#[derive(Clone)]
pub struct SnipperClient {
  client: reqwest::Client,
  fetch_url: Url,
  add_url: Url,
}

impl SnipperClient {
  pub fn new(config: &Config) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("snip/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      fetch_url: config.fetch_url()?,
      add_url: config.add_url()?,
    })
  }

  /// Fetch one week of snippets
  pub async fn fetch_week(&self, offset: Offset) -> Result<WeekRecord, TransportError> {
    let response = self
      .client
      .get(week_url(&self.fetch_url, offset))
      .send()
      .await
      .map_err(|e| TransportError::Network(e.to_string()))?;

    if response.status() != StatusCode::OK {
      return Err(TransportError::Status(response.status().as_u16()));
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| TransportError::Network(e.to_string()))?;
    parse_week(&body)
  }

  /// Submit a snippet for the current week
  pub async fn add_snippet(&self, form: &AddForm) -> Result<(), TransportError> {
    let response = self
      .client
      .post(self.add_url.clone())
      .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(form.encode())
      .send()
      .await
      .map_err(|e| TransportError::Network(e.to_string()))?;

    if response.status() != StatusCode::OK {
      return Err(TransportError::Status(response.status().as_u16()));
    }

    let body = response
      .text()
      .await
      .map_err(|e| TransportError::Network(e.to_string()))?;
    check_add_body(&body)
  }
}

/// URL of the week at `offset`
fn week_url(fetch_url: &Url, offset: Offset) -> Url {
  let mut url = fetch_url.clone();
  url
    .query_pairs_mut()
    .append_pair("offset", &offset.to_string());
  url
}

/// Transport that runs each request on its own task and reports the
/// result through the app's event channel.
pub struct HttpTransport {
  client: SnipperClient,
  event_tx: mpsc::UnboundedSender<Event>,
}

impl HttpTransport {
  pub fn new(client: SnipperClient, event_tx: mpsc::UnboundedSender<Event>) -> Self {
    Self { client, event_tx }
  }
}

impl Transport for HttpTransport {
  fn fetch(&mut self, offset: Offset) {
    let client = self.client.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let result = client.fetch_week(offset).await;
      let _ = tx.send(Event::Snipper(SnipperEvent::WeekFetched { offset, result }));
    });
  }

  fn post(&mut self, ticket: AddTicket, form: AddForm) {
    let client = self.client.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let result = client.add_snippet(&form).await;
      let _ = tx.send(Event::Snipper(SnipperEvent::SnippetAdded { ticket, result }));
    });
  }
}
