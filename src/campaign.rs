//! Runs a whole campaign: prompts, captions, then one background and
//! composite per variation.

use std::fmt;
use std::time::Duration;

use image::{DynamicImage, RgbaImage};
use tracing::{error, info, instrument, warn};

use crate::background::{BackgroundError, BackgroundGenerator};
use crate::compositor::{CompositeOptions, compose, logo_fits};
use crate::constants::{
    BACKGROUND_HEIGHT, BACKGROUND_WIDTH, DEFAULT_VARIATION_DELAY, MAX_VARIATIONS,
    MIN_DESCRIPTION_CHARS, MIN_VARIATIONS,
};
use crate::text::{TextModel, generate_captions, generate_prompts};

/// What the user handed us.
#[derive(Clone, Debug)]
pub struct CampaignRequest {
    /// Product image, ideally with a transparent background.
    pub product: DynamicImage,
    /// Brand logo, ideally with a transparent background.
    pub logo: DynamicImage,
    /// Free-text product description.
    pub description: String,
    /// How many variations to generate.
    pub variations: usize,
}

/// Problems with a [`CampaignRequest`], reported before anything is generated.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvalidRequest {
    /// Description is missing or too short.
    #[error(
        "Please provide a detailed product description (at least {} characters)",
        MIN_DESCRIPTION_CHARS
    )]
    DescriptionTooShort,
    /// Variation count outside the supported range.
    #[error(
        "Number of variations must be between {} and {}, got {}",
        MIN_VARIATIONS,
        MAX_VARIATIONS,
        .0
    )]
    VariationCount(usize),
    /// The logo would resize taller than the background.
    #[error(
        "The logo ({}x{} px) is too tall for the ad layout, please use a wider logo",
        .width,
        .height
    )]
    LogoTooTall {
        /// Uploaded logo width.
        width: u32,
        /// Uploaded logo height.
        height: u32,
    },
}

impl CampaignRequest {
    /// Checks the request before any external call is made.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(InvalidRequest::DescriptionTooShort);
        }
        if !(MIN_VARIATIONS..=MAX_VARIATIONS).contains(&self.variations) {
            return Err(InvalidRequest::VariationCount(self.variations));
        }
        self.validate_layout(BACKGROUND_WIDTH, BACKGROUND_HEIGHT, &CompositeOptions::default())
    }

    /// Checks that the logo fits a `width` x `height` background laid out
    /// with `options`.
    pub fn validate_layout(
        &self,
        width: u32,
        height: u32,
        options: &CompositeOptions,
    ) -> Result<(), InvalidRequest> {
        let logo = (self.logo.width(), self.logo.height());
        if !logo_fits(width, height, logo, options.logo_size_ratio()) {
            return Err(InvalidRequest::LogoTooTall {
                width: logo.0,
                height: logo.1,
            });
        }
        Ok(())
    }
}

/// Knobs for a run that don't come from the user.
#[derive(Clone, Copy, Debug)]
pub struct CampaignSettings {
    /// Pause after each successful variation.
    pub delay: Duration,
    /// Layout ratios for the compositor.
    pub composite: CompositeOptions,
    /// Background width requested from the generator.
    pub width: u32,
    /// Background height requested from the generator.
    pub height: u32,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_VARIATION_DELAY,
            composite: CompositeOptions::default(),
            width: BACKGROUND_WIDTH,
            height: BACKGROUND_HEIGHT,
        }
    }
}

/// One finished ad.
#[derive(Clone, Debug)]
pub struct Variation {
    /// 1-based position in the batch.
    pub number: usize,
    /// Caption paired with this ad.
    pub caption: String,
    /// The composite.
    pub image: RgbaImage,
}

/// A variation that was skipped, and why.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariationFailure {
    /// 1-based position in the batch.
    pub number: usize,
    /// Human readable reason.
    pub reason: String,
}

impl fmt::Display for VariationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variation {}: {}", self.number, self.reason)
    }
}

/// Result of a run that produced at least one variation.
#[derive(Clone, Debug, Default)]
pub struct CampaignReport {
    /// Successful variations, in order.
    pub variations: Vec<Variation>,
    /// Skipped variations, in order.
    pub failures: Vec<VariationFailure>,
}

/// Progress through the variation loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Progress {
    /// Variations attempted so far.
    pub completed: usize,
    /// Variations in the batch.
    pub total: usize,
}

impl Progress {
    /// Completion as a whole percentage.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed.min(self.total) * 100) / self.total) as u8
    }
}

/// Why a run produced nothing.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    /// The request was rejected up front.
    #[error(transparent)]
    Invalid(#[from] InvalidRequest),
    /// The image service says we're out of credits; the rest of the batch would fail too.
    #[error("{source}")]
    CreditsExhausted {
        /// Variation that hit the error.
        number: usize,
        /// The underlying error.
        source: BackgroundError,
    },
    /// Every variation failed.
    #[error("Failed to generate any variations ({} failed)", .failures.len())]
    NoVariations {
        /// Why each variation failed.
        failures: Vec<VariationFailure>,
    },
}

/// Runs a campaign with no progress callback.
pub async fn run_campaign<T, B>(
    text_model: &T,
    backgrounds: &B,
    request: &CampaignRequest,
    settings: &CampaignSettings,
) -> Result<CampaignReport, CampaignError>
where
    T: TextModel + Sync,
    B: BackgroundGenerator + Sync,
{
    run_campaign_with_progress(text_model, backgrounds, request, settings, |_| {}).await
}

/// Runs a campaign, calling `on_progress` after every attempted variation.
///
/// Variations are generated one after another. A failed background skips
/// its variation, except when the service reports exhausted credits, which
/// ends the run.
#[instrument(skip_all, fields(variations = request.variations))]
pub async fn run_campaign_with_progress<T, B, F>(
    text_model: &T,
    backgrounds: &B,
    request: &CampaignRequest,
    settings: &CampaignSettings,
    mut on_progress: F,
) -> Result<CampaignReport, CampaignError>
where
    T: TextModel + Sync,
    B: BackgroundGenerator + Sync,
    F: FnMut(Progress) + Send,
{
    request.validate()?;
    request.validate_layout(settings.width, settings.height, &settings.composite)?;
    let description = request.description.trim();

    info!("Generating creative prompts");
    let prompts = generate_prompts(text_model, description, request.variations).await;
    info!("Generating ad captions");
    let captions = generate_captions(text_model, description, request.variations).await;

    let total = prompts.len();
    let mut report = CampaignReport::default();
    for (idx, prompt) in prompts.iter().enumerate() {
        let number = idx + 1;
        info!("Generating variation {number}/{total}");

        match backgrounds
            .generate(prompt, settings.width, settings.height)
            .await
        {
            Ok(background) => {
                let image = compose(
                    &background,
                    &request.product,
                    &request.logo,
                    &settings.composite,
                );
                let caption = captions
                    .get(idx)
                    .or_else(|| captions.last())
                    .cloned()
                    .unwrap_or_default();
                report.variations.push(Variation {
                    number,
                    caption,
                    image,
                });
                on_progress(Progress {
                    completed: number,
                    total,
                });
                if !settings.delay.is_zero() {
                    tokio::time::sleep(settings.delay).await;
                }
            }
            Err(err) if err.is_fatal() => {
                error!("Variation {number}: {err}");
                return Err(CampaignError::CreditsExhausted {
                    number,
                    source: err,
                });
            }
            Err(err) => {
                warn!("Variation {number}: {err}");
                report.failures.push(VariationFailure {
                    number,
                    reason: err.to_string(),
                });
                on_progress(Progress {
                    completed: number,
                    total,
                });
            }
        }
    }

    if report.variations.is_empty() {
        return Err(CampaignError::NoVariations {
            failures: report.failures,
        });
    }

    info!(
        "Generated {} variation(s), {} failed",
        report.variations.len(),
        report.failures.len()
    );
    Ok(report)
}
