//! Stability AI image-to-image client.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose;
use image::{DynamicImage, ImageFormat};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{BackgroundError, BackgroundGenerator, base_gradient};
use crate::config::ApiConfig;
use crate::constants::{BACKGROUND_NEGATIVE_PROMPT, STABILITY_MODEL, STABILITY_STRENGTH};
use crate::error::StudioError;

/// Generates backgrounds by steering a plain gradient towards a prompt.
#[derive(Clone)]
pub struct StabilityClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    base64: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StabilityClient {
    /// Builds a client from the run's configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self, StudioError> {
        let api_key = config.require_stability_key()?;
        Ok(Self::new(api_key, &config.stability_api_host))
    }

    /// Builds a client for the API at `host`.
    pub fn new(api_key: &str, host: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            endpoint: format!(
                "{}/v1/generation/image-to-image",
                host.trim_end_matches('/')
            ),
        }
    }
}

impl BackgroundGenerator for StabilityClient {
    #[instrument(skip(self), level = "debug")]
    async fn generate(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackgroundError> {
        let seed_image = encode_seed_image(width, height)?;
        let image_part = Part::bytes(seed_image)
            .file_name("base.png")
            .mime_str("image/png")
            .map_err(|err| BackgroundError::Request(err.to_string()))?;
        let form = Form::new()
            .part("image", image_part)
            .text("prompt", prompt.to_string())
            .text("mode", "image-to-image")
            .text("model", STABILITY_MODEL)
            .text("strength", STABILITY_STRENGTH.to_string())
            .text("seed", rand::random::<u32>().to_string())
            .text("negative_prompt", BACKGROUND_NEGATIVE_PROMPT)
            .text("cfg_scale", "7")
            .text("output_format", "png");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        debug!("Stability responded {status} with {} bytes", bytes.len());
        decode_response(status, &bytes)
    }
}

fn encode_seed_image(width: u32, height: u32) -> Result<Vec<u8>, BackgroundError> {
    let mut output = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(base_gradient(width, height))
        .write_to(&mut output, ImageFormat::Png)
        .map_err(|err| BackgroundError::Request(format!("seed image: {err}")))?;
    Ok(output.into_inner())
}

/// Maps a raw API response onto an image or a classified error.
fn decode_response(status: StatusCode, body: &[u8]) -> Result<DynamicImage, BackgroundError> {
    match status {
        StatusCode::OK => {
            let parsed: GenerationResponse = serde_json::from_slice(body)
                .map_err(|err| BackgroundError::Decode(err.to_string()))?;
            let artifact = parsed
                .artifacts
                .into_iter()
                .next()
                .ok_or(BackgroundError::MissingArtifact)?;
            let bytes = general_purpose::STANDARD
                .decode(artifact.base64)
                .map_err(|err| BackgroundError::Decode(err.to_string()))?;
            image::load_from_memory(&bytes).map_err(|err| BackgroundError::Decode(err.to_string()))
        }
        StatusCode::PAYMENT_REQUIRED => Err(BackgroundError::CreditsExhausted(error_message(body))),
        StatusCode::UNAUTHORIZED => Err(BackgroundError::Auth),
        StatusCode::TOO_MANY_REQUESTS => Err(BackgroundError::RateLimited),
        other => Err(BackgroundError::Api {
            status: other.as_u16(),
            message: error_message(body),
        }),
    }
}

fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}
