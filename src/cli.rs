//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;

use crate::constants::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL, DEFAULT_STABILITY_API_HOST};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "ADSTUDIO_DEBUG")]
    /// Enable debug logging. Env: ADSTUDIO_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "8080", env = "ADSTUDIO_PORT")]
    /// http listener, defaults to `8080`.
    /// Env: ADSTUDIO_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "ADSTUDIO_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: ADSTUDIO_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(flatten)]
    /// Credentials and endpoints for the generative APIs
    pub api: ApiOptions,
}

#[derive(clap::Args, Debug, Clone)]
/// Options for the text and image generation services, shared by the binaries.
pub struct ApiOptions {
    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    /// Gemini API key. Env: GEMINI_API_KEY
    pub gemini_api_key: Option<String>,
    #[clap(long, default_value = DEFAULT_GEMINI_MODEL, env = "GEMINI_MODEL_NAME")]
    /// Gemini model used for prompts and captions. Env: GEMINI_MODEL_NAME
    pub gemini_model: String,
    #[clap(long, default_value = DEFAULT_GEMINI_API_BASE, env = "GEMINI_API_BASE")]
    /// Gemini REST base URL. Env: GEMINI_API_BASE
    pub gemini_api_base: String,
    #[clap(long, env = "STABILITY_API_KEY", hide_env_values = true)]
    /// Stability AI API key. Env: STABILITY_API_KEY
    pub stability_api_key: Option<String>,
    #[clap(long, default_value = DEFAULT_STABILITY_API_HOST, env = "STABILITY_API_HOST")]
    /// Stability AI host. Env: STABILITY_API_HOST
    pub stability_api_host: String,
    #[clap(long, default_value = "500", env = "ADSTUDIO_VARIATION_DELAY_MS")]
    /// Pause after each successful variation, in milliseconds.
    /// Env: ADSTUDIO_VARIATION_DELAY_MS
    pub variation_delay_ms: u64,
}
