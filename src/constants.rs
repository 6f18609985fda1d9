//! Shared constants/defaults for things
//!

use std::time::Duration;

/// Default product height as a fraction of the background height.
pub const DEFAULT_PRODUCT_SIZE_RATIO: f64 = 0.4;

/// Default logo width as a fraction of the background width.
pub const DEFAULT_LOGO_SIZE_RATIO: f64 = 0.15;

/// The product is never wider than this fraction of the background.
pub const PRODUCT_MAX_WIDTH_RATIO: f64 = 0.9;

/// Gap between the product and the bottom edge, as a fraction of the background height.
pub const PRODUCT_BOTTOM_MARGIN_RATIO: f64 = 0.05;

/// Logo margin from the top and right edges, as a fraction of the background width.
pub const LOGO_MARGIN_RATIO: f64 = 0.02;

/// Width of generated backgrounds, in pixels.
pub const BACKGROUND_WIDTH: u32 = 1024;

/// Height of generated backgrounds, in pixels.
pub const BACKGROUND_HEIGHT: u32 = 1024;

/// Fewest variations a campaign may ask for.
pub const MIN_VARIATIONS: usize = 5;

/// Most variations a campaign may ask for.
pub const MAX_VARIATIONS: usize = 10;

/// Shortest accepted product description, in characters.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Pause after each successful variation so we don't hammer the image API.
pub const DEFAULT_VARIATION_DELAY: Duration = Duration::from_millis(500);

/// Default Gemini model used for prompts and captions.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1";

/// Default Stability AI host.
pub const DEFAULT_STABILITY_API_HOST: &str = "https://api.stability.ai";

/// Model name sent to the Stability image-to-image endpoint.
pub const STABILITY_MODEL: &str = "SD 3.5 Medium";

/// How far the generated background may drift from the gradient seed image.
pub const STABILITY_STRENGTH: f32 = 0.75;

/// Things we never want in a generated background.
pub const BACKGROUND_NEGATIVE_PROMPT: &str =
    "blurry, low quality, distorted, watermark, text, logo, product, person, human";

/// Timeout for a single text-model request.
pub const TEXT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// File name offered for the archive download.
pub const ARCHIVE_FILE_NAME: &str = "ad_creatives.zip";

/// Name of the captions file inside the archive.
pub const CAPTIONS_FILE_NAME: &str = "captions.txt";

/// How long finished campaigns stay downloadable.
pub const CAMPAIGN_RETENTION_MINUTES: i64 = 60;

/// Largest accepted upload request body.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[cfg(test)]
/// Description used in tests
pub const TEST_DESCRIPTION: &str = "Premium wireless headphones with noise cancellation";
