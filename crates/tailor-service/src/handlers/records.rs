//! Measurement and biodata endpoints.

use axum::{
	extract::{Path, State},
	response::Json,
};
use tailor_types::{ApiError, Biodata, Measurement};

use crate::server::AppState;

/// Handles POST /api/measurements (upsert).
pub async fn upsert_measurement(
	State(state): State<AppState>,
	Json(measurement): Json<Measurement>,
) -> Result<Json<Measurement>, ApiError> {
	Ok(Json(state.engine.upsert_measurement(measurement).await?))
}

/// Handles GET /api/measurements/{username}.
pub async fn get_measurement(
	State(state): State<AppState>,
	Path(username): Path<String>,
) -> Result<Json<Measurement>, ApiError> {
	Ok(Json(state.engine.get_measurement(&username).await?))
}

/// Handles POST /api/biodata.
pub async fn put_biodata(
	State(state): State<AppState>,
	Json(biodata): Json<Biodata>,
) -> Result<Json<Biodata>, ApiError> {
	Ok(Json(state.engine.put_biodata(biodata).await?))
}

/// Handles GET /api/biodata/{username}.
pub async fn get_biodata(
	State(state): State<AppState>,
	Path(username): Path<String>,
) -> Result<Json<Biodata>, ApiError> {
	Ok(Json(state.engine.get_biodata(&username).await?))
}
