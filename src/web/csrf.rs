use rand::distr::{Alphanumeric, SampleString};
use tower_sessions::Session;

use crate::error::StudioError;

const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Random 32 character alphanumeric token, also used for campaign ids.
pub(crate) fn generate_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 32)
}

pub(crate) async fn csrf_token(session: &Session) -> Result<String, StudioError> {
    let existing = session
        .get::<String>(CSRF_TOKEN_KEY)
        .await
        .map_err(|err| StudioError::InternalServerError(err.to_string()))?;
    let token = existing.unwrap_or_else(generate_token);
    session
        .insert(CSRF_TOKEN_KEY, token.clone())
        .await
        .map_err(|err| StudioError::InternalServerError(err.to_string()))?;
    Ok(token)
}

pub(crate) async fn validate_csrf(session: &Session, token: &str) -> Result<(), StudioError> {
    let stored = session
        .get::<String>(CSRF_TOKEN_KEY)
        .await
        .map_err(|err| StudioError::InternalServerError(err.to_string()))?;
    match stored {
        Some(expected) if expected == token => Ok(()),
        _ => Err(StudioError::Unauthorized),
    }
}
