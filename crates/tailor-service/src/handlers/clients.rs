//! Client profile endpoints.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use tailor_types::{
	ApiError, ClientProfile, ClientRegistration, ClientUpdate, MessageResponse, VerifyRequest,
	VerifyResponse,
};

use crate::server::AppState;

/// Handles POST /api/clients.
pub async fn register(
	State(state): State<AppState>,
	Json(registration): Json<ClientRegistration>,
) -> Result<(StatusCode, Json<ClientProfile>), ApiError> {
	let profile = state.engine.register_client(registration).await?;
	Ok((StatusCode::CREATED, Json(profile)))
}

/// Handles GET /api/clients.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClientProfile>>, ApiError> {
	Ok(Json(state.engine.list_clients().await?))
}

/// Handles GET /api/clients/{username}.
pub async fn get(
	State(state): State<AppState>,
	Path(username): Path<String>,
) -> Result<Json<ClientProfile>, ApiError> {
	Ok(Json(state.engine.get_client(&username).await?))
}

/// Handles PUT /api/clients/{username}.
pub async fn update(
	State(state): State<AppState>,
	Path(username): Path<String>,
	Json(patch): Json<ClientUpdate>,
) -> Result<Json<ClientProfile>, ApiError> {
	Ok(Json(state.engine.update_client(&username, patch).await?))
}

/// Handles DELETE /api/clients/{username}.
pub async fn delete(
	State(state): State<AppState>,
	Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
	state.engine.delete_client(&username).await?;
	Ok(Json(MessageResponse::new("User deleted successfully.")))
}

/// Handles POST /api/clients/verify.
pub async fn verify(
	State(state): State<AppState>,
	Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
	let role = state
		.engine
		.verify_credentials(&request.username, &request.password)
		.await?;
	Ok(Json(VerifyResponse { role }))
}
