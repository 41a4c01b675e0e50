//! Core engine for the tailor-shop backend.
//!
//! This crate holds the business rules: the date-scoped order-identifier
//! generator, the confirmation/status state machine with its post-commit
//! notification events, client and measurement registries, and the
//! password-reset token lifecycle. Everything persists through the
//! repository boundary in `tailor-storage`; nothing here knows which
//! backend is behind it.

use thiserror::Error;

/// Password hashing and verification.
pub mod auth;
/// Client profile registry.
pub mod clients;
/// Engine orchestration and the notification loop.
pub mod engine;
/// Event bus for post-commit event distribution.
pub mod event_bus;
/// Order identifier generation.
pub mod idgen;
/// Measurement and biodata registries.
pub mod records;
/// Password-reset token lifecycle.
pub mod reset;
/// Order state machine.
pub mod state;

pub use engine::TailorEngine;

/// Errors produced by engine operations.
///
/// Guard violations and missing records are reported synchronously with
/// a specific message. Notification failures on the fire-and-forget path
/// never appear here; only the password-reset email, whose delivery is
/// the operation itself, surfaces as [`EngineError::Notification`].
#[derive(Debug, Error)]
pub enum EngineError {
	/// A referenced order or client does not exist.
	#[error("{0}")]
	NotFound(String),
	/// A transition or edit violates a state-machine guard.
	#[error("{0}")]
	Conflict(String),
	/// Malformed or missing required input.
	#[error("{0}")]
	Validation(String),
	/// Identifier sequence exhausted or generation retries exhausted.
	#[error("Identifier generation failed: {0}")]
	Generation(String),
	/// The storage backend failed.
	#[error("Storage error: {0}")]
	Storage(String),
	/// The reset email could not be handed off.
	#[error("Notification error: {0}")]
	Notification(String),
}

impl From<EngineError> for tailor_types::ApiError {
	fn from(err: EngineError) -> Self {
		use tailor_types::ApiError;
		match err {
			EngineError::NotFound(message) => ApiError::NotFound { message },
			EngineError::Conflict(message) => ApiError::Conflict { message },
			EngineError::Validation(message) => ApiError::BadRequest { message },
			err => ApiError::Internal {
				message: err.to_string(),
			},
		}
	}
}
