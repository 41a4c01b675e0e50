//! API types for the tailor-shop HTTP API.
//!
//! Request and response bodies shared between the axum handlers and the
//! frontend, plus the structured API error with its HTTP status mapping.

use crate::{OrderDraft, OrderStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic success envelope, `{ "message": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
	pub message: String,
}

impl MessageResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Body for POST /api/orders.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
	/// Username of the client placing the order.
	pub username: String,
	/// Free-form draft attributes captured with the order.
	#[serde(flatten)]
	pub draft: OrderDraft,
}

/// Body for PUT /api/orders/{id}/status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
	pub status: OrderStatus,
}

/// Query string for GET /api/orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
	/// Restrict the listing to one client's orders.
	pub username: Option<String>,
}

/// Body for POST /api/clients/verify.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
	pub username: String,
	pub password: String,
}

/// Response for POST /api/clients/verify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
	pub role: String,
}

/// Body for POST /api/password/forgot.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
	pub email: String,
}

/// Body for POST /api/password/reset.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
	pub token: String,
	pub new_password: String,
	pub confirm_password: String,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed or missing input (400).
	BadRequest { message: String },
	/// Referenced record does not exist (404).
	NotFound { message: String },
	/// The operation violates a state-machine guard (409).
	Conflict { message: String },
	/// Storage or generation failure (500).
	Internal { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::NotFound { .. } => 404,
			ApiError::Conflict { .. } => 409,
			ApiError::Internal { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error, message) = match self {
			ApiError::BadRequest { message } => ("validation_error", message),
			ApiError::NotFound { message } => ("not_found", message),
			ApiError::Conflict { message } => ("conflict", message),
			ApiError::Internal { message } => ("internal_error", message),
		};
		ErrorResponse {
			error: error.to_string(),
			message: message.clone(),
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message } => write!(f, "Conflict: {}", message),
			ApiError::Internal { message } => write!(f, "Internal Server Error: {}", message),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status =
			StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}
