//! Stop forecast client for the moscowapp API
//!
//! Issues `GET {base_url}stop_v2/{stop_id}` and decodes the JSON body into
//! [`StopData`]. Only HTTP 200 counts as success.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{MgtConfig, StopIdEncoding};
use crate::diagnostics::{NoopDiagnostics, ResponseDiagnostics};
use crate::error::MgtError;
use crate::models::StopData;

/// Value of the `Accept` header sent with every request
const ACCEPT_JSON: &str = "application/json";

/// Error bodies are truncated to this many characters in [`MgtError`]
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Anything that can look up a stop by its identifier
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StopDataClient: Send + Sync {
    /// Fetch the current snapshot of a stop and its forecasts
    async fn get_stop_data(&self, stop_id: &str) -> Result<StopData, MgtError>;
}

/// HTTP client for the moscowapp stop forecast API
///
/// The base URL can be swapped at any time with [`MgtApiClient::set_base_url`];
/// every request uses the base URL loaded when the call started.
#[derive(Debug)]
pub struct MgtApiClient {
    client: Client,
    base_url: ArcSwap<String>,
    timeout: Duration,
    stop_id_encoding: StopIdEncoding,
    diagnostics: Arc<dyn ResponseDiagnostics>,
}

impl MgtApiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &MgtConfig) -> Result<Self, MgtError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| MgtError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: ArcSwap::from_pointee(config.base_url.clone()),
            timeout: Duration::from_secs(config.timeout_secs),
            stop_id_encoding: config.stop_id_encoding,
            diagnostics: Arc::new(NoopDiagnostics),
        })
    }

    /// Replace the diagnostics sink that receives error response bodies
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn ResponseDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Point the client at a different API root, e.g. a local mock server
    ///
    /// The value is not validated; a malformed URL surfaces as
    /// [`MgtError::RequestConstruction`] on the next call.
    pub fn set_base_url(&self, base_url: impl Into<String>) {
        self.base_url.store(Arc::new(base_url.into()));
    }

    /// Base URL currently in effect
    #[must_use]
    pub fn base_url(&self) -> Arc<String> {
        self.base_url.load_full()
    }

    /// Fetch a stop with a per-call timeout instead of the configured one
    #[instrument(skip(self))]
    pub async fn get_stop_data_within(
        &self,
        stop_id: &str,
        timeout: Duration,
    ) -> Result<StopData, MgtError> {
        self.fetch_stop_data(stop_id, Some(timeout)).await
    }

    async fn fetch_stop_data(
        &self,
        stop_id: &str,
        timeout: Option<Duration>,
    ) -> Result<StopData, MgtError> {
        let endpoint = self.stop_endpoint(stop_id)?;
        let body = self.get(&endpoint, timeout).await?;
        let stop = decode_stop_data(&body)?;

        debug!(
            name = %stop.name,
            routes = stop.route_path.len(),
            forecasts = stop.forecast_count(),
            "Stop data received"
        );
        Ok(stop)
    }

    /// Relative endpoint for a stop lookup
    ///
    /// Identifiers that would resolve out of `stop_v2/` through `.` or `..`
    /// path segments are rejected.
    fn stop_endpoint(&self, stop_id: &str) -> Result<String, MgtError> {
        let escapes = match self.stop_id_encoding {
            // Percent encoding escapes '/' and '%', so only the whole id can be a dot segment
            StopIdEncoding::Percent => is_dot_segment(stop_id),
            StopIdEncoding::Verbatim => stop_id
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .split(['/', '\\'])
                .any(is_dot_segment),
        };
        if escapes {
            return Err(MgtError::RequestConstruction(format!(
                "stop id {stop_id:?} contains a dot path segment"
            )));
        }

        Ok(match self.stop_id_encoding {
            StopIdEncoding::Verbatim => format!("stop_v2/{stop_id}"),
            StopIdEncoding::Percent => format!("stop_v2/{}", urlencoding::encode(stop_id)),
        })
    }

    /// GET `base_url + endpoint` and return the raw body of a 200 response
    async fn get(&self, endpoint: &str, timeout: Option<Duration>) -> Result<Bytes, MgtError> {
        let base_url = self.base_url.load_full();
        let url = endpoint_url(&base_url, endpoint)?;
        let effective_timeout = timeout.unwrap_or(self.timeout);

        let mut request = self.client.get(url.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        debug!(%url, "Requesting");

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, effective_timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            // Best effort: an unreadable body must not mask the status error
            let body = response.text().await.unwrap_or_default();
            self.diagnostics
                .error_response(url.as_str(), status.as_u16(), &body);
            warn!(%url, status = status.as_u16(), "Unexpected status code");

            return Err(MgtError::UnexpectedStatus {
                status: status.as_u16(),
                body: (!body.is_empty())
                    .then(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect()),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| transport_error(&e, effective_timeout))
    }
}

#[async_trait]
impl StopDataClient for MgtApiClient {
    #[instrument(skip(self))]
    async fn get_stop_data(&self, stop_id: &str) -> Result<StopData, MgtError> {
        self.fetch_stop_data(stop_id, None).await
    }
}

/// Join base URL and endpoint, inserting the separating slash if missing
fn endpoint_url(base_url: &str, endpoint: &str) -> Result<Url, MgtError> {
    let raw = if base_url.ends_with('/') {
        format!("{base_url}{endpoint}")
    } else {
        format!("{base_url}/{endpoint}")
    };

    Url::parse(&raw).map_err(|e| MgtError::RequestConstruction(format!("{raw}: {e}")))
}

/// `.` or `..`, including their `%2e` spellings, which URL parsing resolves
fn is_dot_segment(segment: &str) -> bool {
    let normalized = segment.to_ascii_lowercase().replace("%2e", ".");
    normalized == "." || normalized == ".."
}

/// Classify a reqwest failure
fn transport_error(err: &reqwest::Error, timeout: Duration) -> MgtError {
    if err.is_timeout() {
        MgtError::Timeout { timeout }
    } else if err.is_builder() {
        MgtError::RequestConstruction(err.to_string())
    } else {
        MgtError::Network(err.to_string())
    }
}

fn decode_stop_data(body: &[u8]) -> Result<StopData, MgtError> {
    serde_json::from_slice(body).map_err(|e| MgtError::Decode(e.to_string()))
}
