//! Google Gemini `generateContent` client.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::TextModel;
use crate::config::ApiConfig;
use crate::constants::TEXT_REQUEST_TIMEOUT;
use crate::error::StudioError;

/// Talks to a single Gemini model.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    /// Builds a client from the run's configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self, StudioError> {
        let api_key = config.require_gemini_key()?;
        Self::new(api_key, &config.gemini_api_base, &config.gemini_model)
            .map_err(|err| StudioError::InternalServerError(format!("{err:#}")))
    }

    /// Builds a client for `model` under `api_base`.
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Result<Self> {
        let endpoint = generate_content_url(api_base, model)?;
        let client = reqwest::Client::builder()
            .timeout(TEXT_REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint,
        })
    }
}

impl TextModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [
                {"role": "user", "parts": [{"text": prompt}]}
            ]
        });

        debug!("POST {}", self.endpoint);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini network error")?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .context("Failed reading Gemini response body")?;
        if !status.is_success() {
            return Err(anyhow!(
                "Gemini HTTP error {status}: {}",
                String::from_utf8_lossy(&bytes)
            ));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_slice(&bytes).context("Failed to parse Gemini JSON")?;
        extract_text(parsed)
    }
}

fn generate_content_url(api_base: &str, model: &str) -> Result<Url> {
    let raw = format!(
        "{}/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model
    );
    Url::parse(&raw).with_context(|| format!("Invalid Gemini endpoint {raw}"))
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No candidates returned from Gemini API"))?;
    let part = candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .ok_or_else(|| anyhow!("No content parts in Gemini response"))?;
    Ok(part.text.unwrap_or_default().trim().to_string())
}
