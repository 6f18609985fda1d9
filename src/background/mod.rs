//! Background image generation.

use image::{DynamicImage, Rgb, RgbImage};

mod stability;

pub use stability::StabilityClient;

/// Why a background could not be generated.
#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    /// The API key was rejected.
    #[error("invalid API key, check STABILITY_API_KEY")]
    Auth,

    /// The account has run out of credits or lost access to the model.
    #[error("image model is not accessible, your credits may have run out: {0}")]
    CreditsExhausted(String),

    /// Too many requests.
    #[error("rate limit exceeded, wait a moment and try again")]
    RateLimited,

    /// The request couldn't be built locally, before anything was sent.
    #[error("failed to prepare image request: {0}")]
    Request(String),

    /// Transport failure talking to the API.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Any other non-success response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },

    /// A successful response without an image in it.
    #[error("no artifacts in API response")]
    MissingArtifact,

    /// The returned image could not be decoded.
    #[error("failed to decode generated image: {0}")]
    Decode(String),
}

impl BackgroundError {
    /// True when retrying other variations is pointless and the run should stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CreditsExhausted(_))
    }
}

/// Something that can paint a background for a prompt.
pub trait BackgroundGenerator {
    /// Generates a `width` x `height` background for `prompt`.
    fn generate(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
    ) -> impl std::future::Future<Output = Result<DynamicImage, BackgroundError>> + Send;
}

/// Soft vertical gradient used as the image-to-image starting point.
pub fn base_gradient(width: u32, height: u32) -> RgbImage {
    let height_f = f64::from(height.max(1));
    RgbImage::from_fn(width, height, |_, y| {
        let t = f64::from(y) / height_f;
        let grey = (240.0 - t * 20.0) as u8;
        let blue = (245.0 - t * 15.0) as u8;
        Rgb([grey, grey, blue])
    })
}
