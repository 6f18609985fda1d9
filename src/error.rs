//! Error handling

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, info, warn};

use crate::archive::ArchiveError;
use crate::campaign::{CampaignError, VariationFailure};

/// Errors surfaced by the adstudio web front end.
#[derive(Debug)]
pub enum StudioError {
    /// Missing or invalid user input, with a message for the user
    BadRequest(String),
    /// Missing or invalid session / CSRF token
    Unauthorized,
    /// A required API key isn't configured; holds the variable name
    MissingCredentials(&'static str),
    /// The image service reported exhausted credits
    CreditsExhausted(String),
    /// Every variation failed
    NoVariations(Vec<VariationFailure>),
    /// When a requested resource is not found
    NotFound(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for StudioError {
    fn from(err: axum::http::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<ArchiveError> for StudioError {
    fn from(err: ArchiveError) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<CampaignError> for StudioError {
    fn from(err: CampaignError) -> Self {
        match err {
            CampaignError::Invalid(invalid) => StudioError::BadRequest(invalid.to_string()),
            CampaignError::CreditsExhausted { source, .. } => {
                StudioError::CreditsExhausted(source.to_string())
            }
            CampaignError::NoVariations { failures } => StudioError::NoVariations(failures),
        }
    }
}

impl std::fmt::Display for StudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing session."),
            Self::MissingCredentials(name) => {
                write!(f, "{name} not found. Please set it in your environment.")
            }
            Self::CreditsExhausted(message) => write!(f, "{message}"),
            Self::NoVariations(failures) => {
                write!(
                    f,
                    "Failed to generate any variations. Please check your API keys and try again."
                )?;
                for failure in failures {
                    write!(f, "\n{failure}")?;
                }
                Ok(())
            }
            Self::NotFound(_) => write!(f, "Not Found"),
            Self::InternalServerError(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for StudioError {}

impl IntoResponse for StudioError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            StudioError::BadRequest(message) => {
                info!("Bad request received: {message}");
                StatusCode::BAD_REQUEST
            }
            StudioError::Unauthorized => {
                info!("Unauthorized request received");
                StatusCode::UNAUTHORIZED
            }
            StudioError::MissingCredentials(name) => {
                error!("{name} is not configured");
                StatusCode::SERVICE_UNAVAILABLE
            }
            StudioError::CreditsExhausted(message) => {
                error!("Image service out of credits: {message}");
                StatusCode::PAYMENT_REQUIRED
            }
            StudioError::NoVariations(failures) => {
                warn!("Campaign failed, {} variation(s) failed", failures.len());
                StatusCode::BAD_GATEWAY
            }
            StudioError::NotFound(url) => {
                tracing::error!("404 {url}");
                StatusCode::NOT_FOUND
            }
            StudioError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let mut response =
            axum::response::Response::new(axum::body::Body::from(self.to_string()));
        *response.status_mut() = status;
        response
    }
}
