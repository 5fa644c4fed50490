//! Route handlers for the duty pharmacy API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, info};

use super::AppState;
use crate::extract;
use crate::models::Pharmacy;
use crate::scrapers::{duty_url, FetchError};

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Static service descriptor, independent of system state.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Nöbetçi Eczane API",
        "status": "ok",
        "endpoints": ["/eczaneler", "/eczaneler/{city}/{district}"],
    }))
}

/// Scrape the configured default district.
pub async fn duty_default(State(state): State<AppState>) -> Result<Json<Vec<Pharmacy>>, ApiError> {
    let city = state.settings.scrape.default_city.clone();
    let district = state.settings.scrape.default_district.clone();
    scrape_district(&state, &city, &district).await
}

/// Scrape the district given in the path.
pub async fn duty_for_district(
    State(state): State<AppState>,
    Path((city, district)): Path<(String, String)>,
) -> Result<Json<Vec<Pharmacy>>, ApiError> {
    scrape_district(&state, &city, &district).await
}

async fn scrape_district(
    state: &AppState,
    city: &str,
    district: &str,
) -> Result<Json<Vec<Pharmacy>>, ApiError> {
    let url = duty_url(&state.settings.scrape.url_template, city, district)?;
    let html = state.fetcher.fetch(&url).await?;

    let extraction = extract::duty_pharmacies(&html, Some(&url));
    if extraction.skipped_rows > 0 {
        debug!(
            "{} malformed rows skipped for {}/{}",
            extraction.skipped_rows, city, district
        );
    }
    info!(
        "{} on-duty pharmacies for {}/{}",
        extraction.pharmacies.len(),
        city,
        district
    );

    // An absent or empty duty table answers 200 with an empty array.
    Ok(Json(extraction.pharmacies))
}

/// Error response for scrape endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Fetch(FetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Fetch(FetchError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
