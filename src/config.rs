//! Config handling

use std::time::Duration;

use tracing::log::LevelFilter;

use crate::cli::ApiOptions;
use crate::constants::{
    DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL, DEFAULT_STABILITY_API_HOST,
    DEFAULT_VARIATION_DELAY,
};
use crate::error::StudioError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Credentials and endpoints for the generative services.
///
/// Built once per process (or per test) and handed to each client when it is
/// constructed, rather than read from the environment on every call.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Gemini API key, if configured.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: String,
    /// Gemini REST base URL.
    pub gemini_api_base: String,
    /// Stability AI API key, if configured.
    pub stability_api_key: Option<String>,
    /// Stability AI host.
    pub stability_api_host: String,
    /// Pause after each successful variation.
    pub variation_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            stability_api_key: None,
            stability_api_host: DEFAULT_STABILITY_API_HOST.to_string(),
            variation_delay: DEFAULT_VARIATION_DELAY,
        }
    }
}

impl From<ApiOptions> for ApiConfig {
    fn from(options: ApiOptions) -> Self {
        Self {
            gemini_api_key: non_empty(options.gemini_api_key),
            gemini_model: options.gemini_model,
            gemini_api_base: options.gemini_api_base.trim_end_matches('/').to_string(),
            stability_api_key: non_empty(options.stability_api_key),
            stability_api_host: options
                .stability_api_host
                .trim_end_matches('/')
                .to_string(),
            variation_delay: Duration::from_millis(options.variation_delay_ms),
        }
    }
}

impl ApiConfig {
    /// Returns the Gemini key or the error shown to the user when it's missing.
    pub fn require_gemini_key(&self) -> Result<&str, StudioError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(StudioError::MissingCredentials("GEMINI_API_KEY"))
    }

    /// Returns the Stability key or the error shown to the user when it's missing.
    pub fn require_stability_key(&self) -> Result<&str, StudioError> {
        self.stability_api_key
            .as_deref()
            .ok_or(StudioError::MissingCredentials("STABILITY_API_KEY"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_are_reported_by_name() {
        let config = ApiConfig::default();
        match config.require_gemini_key() {
            Err(StudioError::MissingCredentials(name)) => assert_eq!(name, "GEMINI_API_KEY"),
            other => panic!("unexpected result: {other:?}"),
        }
        match config.require_stability_key() {
            Err(StudioError::MissingCredentials(name)) => assert_eq!(name, "STABILITY_API_KEY"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let config = ApiConfig::from(ApiOptions {
            gemini_api_key: Some("   ".to_string()),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: "https://example.org/v1/".to_string(),
            stability_api_key: Some("sk-test".to_string()),
            stability_api_host: DEFAULT_STABILITY_API_HOST.to_string(),
            variation_delay_ms: 0,
        });
        assert!(config.require_gemini_key().is_err());
        assert_eq!(config.require_stability_key().ok(), Some("sk-test"));
        assert_eq!(config.gemini_api_base, "https://example.org/v1");
        assert_eq!(config.variation_delay, Duration::ZERO);
    }
}
