pub(crate) use crate::error::StudioError;
pub(crate) use crate::web::AppState;
pub(crate) use askama::Template;
pub(crate) use askama_web::WebTemplate;
pub(crate) use axum::extract::{Path, State};
pub(crate) use axum::http::{HeaderValue, header::CONTENT_TYPE};
pub(crate) use axum::response::IntoResponse;
pub(crate) use tracing::{info, instrument};
