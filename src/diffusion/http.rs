//! Blocking HTTP client for the Stable Diffusion UI server.

use super::backend::{BackendError, GenerationBackend, ImageBytes};
use super::payload::{ImageRequest, ImageResponse};
use crate::options::GenerationOptions;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:9000";

pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);
const BODY_PREVIEW_LIMIT: usize = 256;

/// Facade for a Stable Diffusion UI backend.
pub struct StableDiffusion {
    base_url: String,
    client: Client,
    ping_timeout: Duration,
}

impl StableDiffusion {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().build()?;
        Ok(Self {
            base_url,
            client,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        })
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn try_ping(&self) -> Result<bool, BackendError> {
        let body: serde_json::Value = self
            .client
            .get(self.url("ping"))
            .header(ACCEPT, "application/json")
            .timeout(self.ping_timeout)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(body
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.as_str())
            == Some("OK"))
    }
}

impl GenerationBackend for StableDiffusion {
    fn ping(&self) -> bool {
        match self.try_ping() {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(url = %self.base_url, error = %e, "backend ping failed");
                false
            }
        }
    }

    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<ImageBytes>, BackendError> {
        let request = ImageRequest::build(prompt, options)?;
        let url = self.url("image");
        let timeout = Duration::from_millis(options.timeout_ms.max(1000));

        debug!(%url, prompt, outputs = request.num_outputs, "sending generation request");
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&request)
            .timeout(timeout)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                url,
                body: preview_body(&body),
            });
        }

        let body: ImageResponse = response.json()?;
        let seeds: Vec<u64> = body.output.iter().filter_map(|o| o.seed).collect();
        debug!(
            status = body.status.as_deref().unwrap_or("unknown"),
            images = body.output.len(),
            ?seeds,
            "generation finished"
        );
        body.into_images()
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    match trimmed.char_indices().nth(BODY_PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
