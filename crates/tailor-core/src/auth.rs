//! Password hashing and reset-token digests.
//!
//! Passwords are stored as `salt$hexdigest` where the digest is
//! Keccak-256 over `salt + password` and the salt is a fresh random
//! hex string per password. Reset tokens are never stored in the
//! clear; only their Keccak-256 digest is persisted.

use sha3::{Digest, Keccak256};
use uuid::Uuid;

/// Hash a password with a fresh random salt.
///
/// Returns the stored form `salt$hexdigest`.
pub fn hash_password(password: &str) -> String {
	let salt = Uuid::new_v4().simple().to_string();
	let digest = salted_digest(&salt, password);
	format!("{salt}${digest}")
}

/// Check a candidate password against a stored `salt$hexdigest` value.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
	let Some((salt, digest)) = stored.split_once('$') else {
		return false;
	};
	salted_digest(salt, candidate) == digest
}

/// Digest of a clear reset token, used as its storage key.
pub fn token_digest(token: &str) -> String {
	let mut hasher = Keccak256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

fn salted_digest(salt: &str, password: &str) -> String {
	let mut hasher = Keccak256::new();
	hasher.update(salt.as_bytes());
	hasher.update(password.as_bytes());
	hex::encode(hasher.finalize())
}
