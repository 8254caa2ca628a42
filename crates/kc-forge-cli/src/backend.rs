//! Client for a delegated conversion backend.
//!
//! Sends one realm document per request. Failures are reported, never
//! retried.

use std::time::Duration;

use kc_forge::api::{ConversionOptions, ConversionRequest, ConversionResponse};
use kc_forge::GeneratedFile;
use serde_json::Value;
use tracing::debug;

use crate::{CliError, CliResult};

/// Path of the conversion endpoint relative to the backend URL.
pub const CONVERT_PATH: &str = "/api/v1/convert";

/// Request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the delegated backend.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client for a backend base URL.
    pub fn new(base_url: &str) -> CliResult<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Converts one document remotely.
    pub async fn convert(&self, realm: Value, options: ConversionOptions) -> CliResult<Vec<GeneratedFile>> {
        let url = format!("{}{}", self.base_url, CONVERT_PATH);
        let request = ConversionRequest { realm, options };
        debug!(url = %url, "posting realm to backend");
        let response = self.client.post(&url).json(&request).send().await?;
        handle_response(response).await
    }
}

/// Maps a backend response to generated files.
async fn handle_response(response: reqwest::Response) -> CliResult<Vec<GeneratedFile>> {
    let status = response.status();

    if status.is_success() {
        let body: ConversionResponse = response.json().await?;
        body.into_files().map_err(CliError::Conversion)
    } else {
        Err(CliError::Backend {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }
}
