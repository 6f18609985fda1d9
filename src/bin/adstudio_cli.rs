use anyhow::{Context, Result, anyhow};
use adstudio::archive::build_archive;
use adstudio::background::StabilityClient;
use adstudio::campaign::{CampaignRequest, CampaignSettings, run_campaign_with_progress};
use adstudio::cli::ApiOptions;
use adstudio::compositor::{CompositeOptions, compose, logo_fits};
use adstudio::config::{ApiConfig, setup_logging};
use adstudio::constants::{
    ARCHIVE_FILE_NAME, DEFAULT_LOGO_SIZE_RATIO, DEFAULT_PRODUCT_SIZE_RATIO, MIN_VARIATIONS,
};
use adstudio::text::GeminiClient;
use clap::{Parser, Subcommand};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Generate ad creatives from the command line.
///
///   adstudio_cli campaign --product shoe.png --logo logo.png --description "..."
///   adstudio_cli compose --background bg.png --product shoe.png --logo logo.png
#[derive(Parser, Debug)]
#[command(name = "adstudio_cli")]
struct Args {
    /// Enable debug logging
    #[arg(long, env = "ADSTUDIO_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full campaign and write the ZIP archive
    Campaign {
        /// Product image (PNG or JPEG)
        #[arg(long)]
        product: PathBuf,
        /// Logo image (PNG or JPEG)
        #[arg(long)]
        logo: PathBuf,
        /// Product description, at least 10 characters
        #[arg(long)]
        description: String,
        /// Number of variations, 5 to 10
        #[arg(long, default_value_t = MIN_VARIATIONS)]
        variations: usize,
        /// Where to write the archive
        #[arg(long, default_value = ARCHIVE_FILE_NAME)]
        output: PathBuf,
        #[command(flatten)]
        api: ApiOptions,
    },
    /// Compose one ad onto an existing background, no API calls
    Compose {
        /// Background image
        #[arg(long)]
        background: PathBuf,
        /// Product image
        #[arg(long)]
        product: PathBuf,
        /// Logo image
        #[arg(long)]
        logo: PathBuf,
        /// Product height as a fraction of the background height
        #[arg(long, default_value_t = DEFAULT_PRODUCT_SIZE_RATIO)]
        product_size_ratio: f64,
        /// Logo width as a fraction of the background width
        #[arg(long, default_value_t = DEFAULT_LOGO_SIZE_RATIO)]
        logo_size_ratio: f64,
        /// Where to write the composite PNG
        #[arg(long, default_value = "ad_creative.png")]
        output: PathBuf,
    },
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("Failed to read image {}", path.display()))
}

async fn run_campaign_command(
    product: &Path,
    logo: &Path,
    description: String,
    variations: usize,
    output: &Path,
    api: ApiOptions,
) -> Result<()> {
    let config = ApiConfig::from(api);
    let request = CampaignRequest {
        product: load_image(product)?,
        logo: load_image(logo)?,
        description,
        variations,
    };
    request.validate()?;

    let text_model = GeminiClient::from_config(&config)?;
    let backgrounds = StabilityClient::from_config(&config)?;
    let settings = CampaignSettings {
        delay: config.variation_delay,
        ..CampaignSettings::default()
    };

    let report = run_campaign_with_progress(
        &text_model,
        &backgrounds,
        &request,
        &settings,
        |progress| info!("Progress: {}%", progress.percent()),
    )
    .await?;
    for failure in &report.failures {
        warn!("{failure}");
    }

    let archive = build_archive(&report)?;
    tokio::fs::write(output, archive)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {} variation(s) to {}",
        report.variations.len(),
        output.display()
    );
    Ok(())
}

fn run_compose_command(
    background: &Path,
    product: &Path,
    logo: &Path,
    options: CompositeOptions,
    output: &Path,
) -> Result<()> {
    let background = load_image(background)?;
    let logo = load_image(logo)?;
    if !logo_fits(
        background.width(),
        background.height(),
        (logo.width(), logo.height()),
        options.logo_size_ratio(),
    ) {
        return Err(anyhow!(
            "The logo ({}x{} px) is too tall for a {}x{} background",
            logo.width(),
            logo.height(),
            background.width(),
            background.height()
        ));
    }
    let composite = compose(&background, &load_image(product)?, &logo, &options);
    composite
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug).map_err(|err| anyhow!("Failed to set up logging: {err}"))?;

    match args.command {
        Command::Campaign {
            product,
            logo,
            description,
            variations,
            output,
            api,
        } => run_campaign_command(&product, &logo, description, variations, &output, api).await,
        Command::Compose {
            background,
            product,
            logo,
            product_size_ratio,
            logo_size_ratio,
            output,
        } => {
            let options = CompositeOptions::new(product_size_ratio, logo_size_ratio)
                .ok_or_else(|| anyhow!("Size ratios must be greater than 0 and at most 1"))?;
            run_compose_command(&background, &product, &logo, options, &output)
        }
    }
}
