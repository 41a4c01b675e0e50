//! Storage-related types for the tailor-shop backend.

use std::str::FromStr;

/// Storage namespaces for the different record collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Orders, keyed by order identifier.
	Orders,
	/// Client profiles, keyed by username.
	Clients,
	/// Email uniqueness index, email -> username.
	ClientEmails,
	/// Measurements, keyed by username.
	Measurements,
	/// Biodata entries, keyed by username.
	Biodata,
	/// Notification audit records, keyed by a fresh uuid.
	Notifications,
	/// Password-reset tokens, keyed by token digest.
	ResetTokens,
}

impl StorageKey {
	/// Returns the string representation of the storage namespace.
	pub const fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Clients => "clients",
			StorageKey::ClientEmails => "client_emails",
			StorageKey::Measurements => "measurements",
			StorageKey::Biodata => "biodata",
			StorageKey::Notifications => "notifications",
			StorageKey::ResetTokens => "reset_tokens",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Orders,
			Self::Clients,
			Self::ClientEmails,
			Self::Measurements,
			Self::Biodata,
			Self::Notifications,
			Self::ResetTokens,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"clients" => Ok(Self::Clients),
			"client_emails" => Ok(Self::ClientEmails),
			"measurements" => Ok(Self::Measurements),
			"biodata" => Ok(Self::Biodata),
			"notifications" => Ok(Self::Notifications),
			"reset_tokens" => Ok(Self::ResetTokens),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
