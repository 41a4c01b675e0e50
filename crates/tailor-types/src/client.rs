//! Client profile and biodata types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered shop client.
///
/// The `password` field always holds the salted hash, never the clear
/// text; it is skipped on serialization so API responses cannot leak it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
	/// Unique username, also the storage key.
	pub username: String,
	/// Salted password hash, `salt$digest`.
	#[serde(skip_serializing)]
	pub password: String,
	/// Role label (admin, client).
	pub role: String,
	pub firstname: String,
	pub lastname: String,
	pub phonenumber: String,
	/// Unique email address.
	pub email: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gender: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub birthdate: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bio: Option<String>,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
}

impl ClientProfile {
	/// Full display name, `firstname lastname`.
	pub fn display_name(&self) -> String {
		format!("{} {}", self.firstname, self.lastname)
	}
}

/// Payload for registering a new client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientRegistration {
	pub username: String,
	pub password: String,
	pub role: String,
	pub firstname: String,
	pub lastname: String,
	pub phonenumber: String,
	pub email: String,
	pub gender: Option<String>,
	pub birthdate: Option<String>,
	pub bio: Option<String>,
}

/// Partial update of a client profile.
///
/// Username and password are excluded; the password changes only through
/// the reset flow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientUpdate {
	pub role: Option<String>,
	pub firstname: Option<String>,
	pub lastname: Option<String>,
	pub phonenumber: Option<String>,
	pub email: Option<String>,
	pub gender: Option<String>,
	pub birthdate: Option<String>,
	pub bio: Option<String>,
	pub is_active: Option<bool>,
}

/// Biodata entry captured for a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biodata {
	pub username: String,
	pub name: String,
	pub age: u32,
	pub role: String,
	pub gender: String,
}
