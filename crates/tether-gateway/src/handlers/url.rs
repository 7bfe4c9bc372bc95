use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tether_core::{RedirectorError, ShortCode, ShortenParams};
use tracing::trace;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(request) = payload?;

    let mut params = ShortenParams::new(request.url);
    if let Some(alias) = request.short.filter(|alias| !alias.is_empty()) {
        params = params.with_alias(ShortCode::new(alias)?);
    }
    if let Some(hours) = request.expiry {
        params = params.with_expiry_hours(hours);
    }

    let link = state.shortener().shorten(params).await?;
    Ok(Json(CreateUrlResponse::new(link, state.base_url())))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    // A malformed code can never have been stored.
    let code = ShortCode::new(code.as_str()).map_err(|_| RedirectorError::NotFound(code))?;

    let target = state.redirector().resolve(&code).await?;
    trace!(code = %code, target = %target, "Redirecting");

    if target.parse::<header::HeaderValue>().is_err() {
        return Err(AppError::InvalidTarget(code.to_string()));
    }
    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response())
}
