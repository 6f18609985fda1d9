use axum::extract::Multipart;
use axum::http::header::CONTENT_DISPOSITION;
use axum::response::Response;
use tower_sessions::Session;

use super::csrf::{csrf_token, validate_csrf};
use super::prelude::*;
use super::store::StoredCampaign;
use super::upload::UploadForm;
use crate::archive::variation_file_name;
use crate::background::StabilityClient;
use crate::campaign::{CampaignSettings, run_campaign};
use crate::constants::{ARCHIVE_FILE_NAME, MAX_VARIATIONS, MIN_VARIATIONS};
use crate::text::GeminiClient;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) csrf_token: String,
    pub(crate) min_variations: usize,
    pub(crate) max_variations: usize,
    pub(crate) missing_keys: Vec<&'static str>,
}

#[derive(Clone, Debug)]
pub(crate) struct VariationView {
    pub(crate) number: usize,
    pub(crate) caption: String,
    pub(crate) image_url: String,
    pub(crate) file_name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "results.html")]
pub(crate) struct ResultsTemplate {
    pub(crate) variations: Vec<VariationView>,
    pub(crate) failures: Vec<String>,
    pub(crate) requested: usize,
    pub(crate) download_url: String,
    pub(crate) archive_name: &'static str,
}

/// handles the / GET
pub(crate) async fn index_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<IndexTemplate, StudioError> {
    let mut missing_keys = Vec::new();
    if state.config.gemini_api_key.is_none() {
        missing_keys.push("GEMINI_API_KEY");
    }
    if state.config.stability_api_key.is_none() {
        missing_keys.push("STABILITY_API_KEY");
    }
    Ok(IndexTemplate {
        csrf_token: csrf_token(&session).await?,
        min_variations: MIN_VARIATIONS,
        max_variations: MAX_VARIATIONS,
        missing_keys,
    })
}

/// Runs a campaign from the upload form and renders the results.
#[instrument(skip_all)]
pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<ResultsTemplate, StudioError> {
    let form = UploadForm::from_multipart(multipart).await?;
    let token = form
        .csrf_token
        .clone()
        .ok_or(StudioError::Unauthorized)?;
    validate_csrf(&session, &token).await?;

    let request = form.into_request()?;
    request
        .validate()
        .map_err(|err| StudioError::BadRequest(err.to_string()))?;

    let text_model = GeminiClient::from_config(&state.config)?;
    let backgrounds = StabilityClient::from_config(&state.config)?;
    let settings = CampaignSettings {
        delay: state.config.variation_delay,
        ..CampaignSettings::default()
    };

    let report = run_campaign(&text_model, &backgrounds, &request, &settings).await?;
    let stored = StoredCampaign::from_report(&report)?;
    let id = state.campaigns.insert(stored).await;
    info!(
        "Campaign {id} ready with {} variation(s)",
        report.variations.len()
    );

    Ok(ResultsTemplate {
        variations: report
            .variations
            .iter()
            .map(|variation| VariationView {
                number: variation.number,
                caption: variation.caption.clone(),
                image_url: format!("/campaigns/{id}/variations/{}", variation.number),
                file_name: variation_file_name(variation.number),
            })
            .collect(),
        failures: report.failures.iter().map(ToString::to_string).collect(),
        requested: request.variations,
        download_url: format!("/campaigns/{id}/download"),
        archive_name: ARCHIVE_FILE_NAME,
    })
}

/// Serves one composite as a PNG.
pub(crate) async fn variation_image_handler(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, usize)>,
) -> Result<Response, StudioError> {
    let preview = state
        .campaigns
        .get(&id)
        .await
        .and_then(|campaign| campaign.preview(number))
        .ok_or_else(|| StudioError::NotFound(format!("/campaigns/{id}/variations/{number}")))?;
    Ok(([(CONTENT_TYPE, "image/png")], preview).into_response())
}

/// Serves the campaign ZIP as an attachment.
pub(crate) async fn download_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, StudioError> {
    let campaign = state
        .campaigns
        .get(&id)
        .await
        .ok_or_else(|| StudioError::NotFound(format!("/campaigns/{id}/download")))?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{ARCHIVE_FILE_NAME}\""
    ))
    .map_err(|err| StudioError::InternalServerError(err.to_string()))?;
    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (CONTENT_DISPOSITION, disposition),
        ],
        campaign.archive(),
    )
        .into_response())
}
