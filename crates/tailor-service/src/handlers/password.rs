//! Password-reset endpoints.

use axum::{extract::State, response::Json};
use tailor_types::{ApiError, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest};

use crate::server::AppState;

/// Handles POST /api/password/forgot.
///
/// Issues a reset token and emails the link. The email is the point of
/// this endpoint, so a delivery failure comes back as an error instead
/// of being swallowed like order notifications are.
pub async fn forgot(
	State(state): State<AppState>,
	Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
	state.engine.request_password_reset(&request.email).await?;
	Ok(Json(MessageResponse::new("Password reset email sent.")))
}

/// Handles POST /api/password/reset.
pub async fn reset(
	State(state): State<AppState>,
	Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
	state
		.engine
		.confirm_password_reset(
			&request.token,
			&request.new_password,
			&request.confirm_password,
		)
		.await?;
	Ok(Json(MessageResponse::new("Password reset successfully.")))
}
