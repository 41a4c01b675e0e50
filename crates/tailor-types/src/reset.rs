//! Password-reset token types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A password-reset token issued to a client.
///
/// Only the Keccak digest of the token is stored; the clear token leaves
/// the system once, inside the reset email. Tokens expire one hour after
/// issuance and are single-use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetToken {
	/// Hex Keccak-256 digest of the clear token, also the storage key.
	pub digest: String,
	/// Username the token was issued for.
	pub username: String,
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
	/// Set once the token (or a sibling for the same user) is consumed.
	pub used: bool,
}

impl ResetToken {
	/// Whether the token can still redeem a password change at `now`.
	pub fn is_live(&self, now: DateTime<Utc>) -> bool {
		!self.used && now < self.expires_at
	}
}
