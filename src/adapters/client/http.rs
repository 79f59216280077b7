use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::{PolicyClient, TransportError};

// Upper bound on how much of an error response body is kept for reporting.
const MAX_ERROR_BODY: usize = 512;

/// Blocking HTTP client for the policy server.
///
/// Only static headers are supported; request signing is left to a fronting
/// proxy or a custom `PolicyClient`.
#[derive(Debug, Clone)]
pub struct HttpPolicyClient {
    base_url: String,
    client: Client,
    headers: Vec<(String, String)>,
}

impl HttpPolicyClient {
    /// # Errors
    ///
    /// Returns `TransportError::Request` when `base_url` is empty or the client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.trim().is_empty() {
            return Err(TransportError::Request(
                "server url cannot be empty".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build http client: {e}")))?;
        Ok(Self {
            base_url,
            client,
            headers: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn url_for(&self, rel_uri: &str) -> String {
        format!("{}/{}", self.base_url, rel_uri.trim_start_matches('/'))
    }
}

impl PolicyClient for HttpPolicyClient {
    fn put(&self, rel_uri: &str, body: &[u8]) -> Result<(), TransportError> {
        let mut request = self
            .client
            .put(self.url_for(rel_uri))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body.to_vec());
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let mut body = response.text().unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
