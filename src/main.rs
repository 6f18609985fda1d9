use clap::Parser;
use adstudio::config::{ApiConfig, setup_logging};
use tracing::{error, warn};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = adstudio::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let config = ApiConfig::from(cli.api);
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set, campaigns will fail until it is");
    }
    if config.stability_api_key.is_none() {
        warn!("STABILITY_API_KEY is not set, campaigns will fail until it is");
    }

    if let Err(err) =
        adstudio::web::setup_server(&cli.listen_address, cli.port, config).await
    {
        error!("Application error: {}", err);
    }
}
