//! Password-reset token lifecycle.
//!
//! Tokens are opaque uuids handed to the client once, in the reset
//! email; storage only ever sees their Keccak digest. A token lives for
//! one hour and redeeming it burns every live token issued to the same
//! user, so an older email cannot reset a password a newer one already
//! changed.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tailor_storage::{StorageError, StorageService};
use tailor_types::{ResetToken, StorageKey};
use tracing::info;
use uuid::Uuid;

use crate::{auth, EngineError};

const TOKENS: &str = StorageKey::ResetTokens.as_str();

/// Lifetime of a reset token.
const TOKEN_TTL_HOURS: i64 = 1;

/// Checks a candidate password against the shop's password policy.
///
/// At least eight characters with one uppercase letter, one digit and
/// one special character. The error names the first check that failed.
pub fn validate_password(password: &str) -> Result<(), EngineError> {
	if password.chars().count() < 8 {
		return Err(EngineError::Validation(
			"Password must be at least 8 characters".to_string(),
		));
	}
	if !password.chars().any(|c| c.is_ascii_uppercase()) {
		return Err(EngineError::Validation(
			"Password must contain at least one uppercase letter".to_string(),
		));
	}
	if !password.chars().any(|c| c.is_ascii_digit()) {
		return Err(EngineError::Validation(
			"Password must contain at least one number".to_string(),
		));
	}
	if password.chars().all(|c| c.is_alphanumeric()) {
		return Err(EngineError::Validation(
			"Password must contain at least one special character".to_string(),
		));
	}
	Ok(())
}

/// Issues and redeems password-reset tokens.
pub struct PasswordResetFlow {
	storage: Arc<StorageService>,
}

impl PasswordResetFlow {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Issues a fresh token for `username`.
	///
	/// Returns the clear token for the reset email; only its digest is
	/// persisted.
	pub async fn issue(&self, username: &str) -> Result<String, EngineError> {
		let clear = Uuid::new_v4().to_string();
		let now = Utc::now();
		let token = ResetToken {
			digest: auth::token_digest(&clear),
			username: username.to_string(),
			created_at: now,
			expires_at: now + Duration::hours(TOKEN_TTL_HOURS),
			used: false,
		};
		self.storage
			.store(TOKENS, &token.digest, &token)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		info!(username = %username, "reset token issued");
		Ok(clear)
	}

	/// Redeems a clear token, returning the username it belongs to.
	///
	/// The token must be unexpired and unused. Redemption marks every
	/// live token for the same user as used.
	pub async fn consume(&self, clear_token: &str) -> Result<String, EngineError> {
		let digest = auth::token_digest(clear_token);
		let token: ResetToken = match self.storage.retrieve(TOKENS, &digest).await {
			Ok(token) => token,
			Err(StorageError::NotFound) => {
				return Err(EngineError::Validation(
					"Invalid or expired reset token".to_string(),
				));
			}
			Err(e) => return Err(EngineError::Storage(e.to_string())),
		};

		let now = Utc::now();
		if !token.is_live(now) {
			return Err(EngineError::Validation(
				"Invalid or expired reset token".to_string(),
			));
		}

		let all: Vec<ResetToken> = self
			.storage
			.retrieve_all(TOKENS)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		for mut sibling in all {
			if sibling.username == token.username && sibling.is_live(now) {
				sibling.used = true;
				self.storage
					.store(TOKENS, &sibling.digest.clone(), &sibling)
					.await
					.map_err(|e| EngineError::Storage(e.to_string()))?;
			}
		}

		info!(username = %token.username, "reset token redeemed");
		Ok(token.username)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tailor_storage::implementations::memory::MemoryStorage;

	fn flow() -> PasswordResetFlow {
		PasswordResetFlow::new(Arc::new(StorageService::new(Box::new(MemoryStorage::new()))))
	}

	#[test]
	fn password_policy_enforces_all_classes() {
		assert!(validate_password("Str0ng!Pass").is_ok());
	}

	#[test]
	fn password_policy_names_the_failing_check() {
		for (password, expected) in [
			("Sh0rt!z", "Password must be at least 8 characters"),
			("noupper1!", "Password must contain at least one uppercase letter"),
			("NoDigits!", "Password must contain at least one number"),
			("NoSpecial1", "Password must contain at least one special character"),
		] {
			let err = validate_password(password).unwrap_err();
			assert!(
				matches!(err, EngineError::Validation(ref msg) if msg == expected),
				"{}: {}",
				password,
				err
			);
		}
	}

	#[tokio::test]
	async fn issued_token_redeems_once() {
		let flow = flow();
		let clear = flow.issue("ada").await.unwrap();

		let username = flow.consume(&clear).await.unwrap();
		assert_eq!(username, "ada");

		let err = flow.consume(&clear).await.unwrap_err();
		assert!(matches!(err, EngineError::Validation(_)));
	}

	#[tokio::test]
	async fn unknown_token_is_rejected() {
		let flow = flow();
		let err = flow.consume("not-a-token").await.unwrap_err();
		assert!(
			matches!(err, EngineError::Validation(msg) if msg == "Invalid or expired reset token")
		);
	}

	#[tokio::test]
	async fn redeeming_burns_sibling_tokens() {
		let flow = flow();
		let first = flow.issue("ada").await.unwrap();
		let second = flow.issue("ada").await.unwrap();
		let other = flow.issue("bob").await.unwrap();

		flow.consume(&second).await.unwrap();

		// The earlier token for the same user is dead now.
		let err = flow.consume(&first).await.unwrap_err();
		assert!(matches!(err, EngineError::Validation(_)));

		// Other users' tokens are untouched.
		assert_eq!(flow.consume(&other).await.unwrap(), "bob");
	}
}
