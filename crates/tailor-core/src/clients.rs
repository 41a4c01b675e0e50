//! Client profile registry.
//!
//! Registration enforces both username and email uniqueness. Usernames
//! are the primary key; emails are kept unique through a secondary index
//! namespace mapping email to username, inserted with the same
//! create-only primitive orders use.

use chrono::Utc;
use std::sync::Arc;
use tailor_storage::{StorageError, StorageService};
use tailor_types::{ClientProfile, ClientRegistration, ClientUpdate, StorageKey};
use tracing::{info, warn};

use crate::{auth, EngineError};

const CLIENTS: &str = StorageKey::Clients.as_str();
const EMAILS: &str = StorageKey::ClientEmails.as_str();

/// Manages client profiles and credential checks.
pub struct ClientRegistry {
	storage: Arc<StorageService>,
}

impl ClientRegistry {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Registers a new client.
	///
	/// The username record is claimed first, then the email index entry.
	/// If the email turns out to be taken the username record is rolled
	/// back so a failed registration leaves nothing behind.
	pub async fn register(
		&self,
		registration: ClientRegistration,
	) -> Result<ClientProfile, EngineError> {
		crate::reset::validate_password(&registration.password)?;

		let profile = ClientProfile {
			username: registration.username,
			password: auth::hash_password(&registration.password),
			role: registration.role,
			firstname: registration.firstname,
			lastname: registration.lastname,
			phonenumber: registration.phonenumber,
			email: registration.email,
			gender: registration.gender,
			birthdate: registration.birthdate,
			bio: registration.bio,
			is_active: true,
			created_at: Utc::now(),
		};

		match self
			.storage
			.insert(CLIENTS, &profile.username, &profile)
			.await
		{
			Ok(()) => {}
			Err(StorageError::AlreadyExists) => {
				return Err(EngineError::Conflict("User already exists".to_string()));
			}
			Err(e) => return Err(EngineError::Storage(e.to_string())),
		}

		match self
			.storage
			.insert(EMAILS, &profile.email, &profile.username)
			.await
		{
			Ok(()) => {}
			Err(StorageError::AlreadyExists) => {
				if let Err(e) = self.storage.remove(CLIENTS, &profile.username).await {
					warn!(username = %profile.username, error = %e, "rollback of username claim failed");
				}
				return Err(EngineError::Conflict("Email already in use".to_string()));
			}
			Err(e) => return Err(EngineError::Storage(e.to_string())),
		}

		info!(username = %profile.username, "client registered");
		Ok(profile)
	}

	/// Loads a client profile by username.
	pub async fn get(&self, username: &str) -> Result<ClientProfile, EngineError> {
		match self.storage.retrieve(CLIENTS, username).await {
			Ok(profile) => Ok(profile),
			Err(StorageError::NotFound) => Err(EngineError::NotFound(
				"User profile not found.".to_string(),
			)),
			Err(e) => Err(EngineError::Storage(e.to_string())),
		}
	}

	/// Loads a client profile by email address, through the email index.
	pub async fn get_by_email(&self, email: &str) -> Result<ClientProfile, EngineError> {
		let username: String = match self.storage.retrieve(EMAILS, email).await {
			Ok(username) => username,
			Err(StorageError::NotFound) => {
				return Err(EngineError::NotFound("Email not found".to_string()));
			}
			Err(e) => return Err(EngineError::Storage(e.to_string())),
		};
		self.get(&username).await
	}

	/// Lists every registered client.
	pub async fn list(&self) -> Result<Vec<ClientProfile>, EngineError> {
		self.storage
			.retrieve_all(CLIENTS)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))
	}

	/// Applies a partial profile update.
	///
	/// An email change re-runs the uniqueness check and moves the index
	/// entry.
	pub async fn update(
		&self,
		username: &str,
		patch: ClientUpdate,
	) -> Result<ClientProfile, EngineError> {
		let mut profile = self.get(username).await?;

		if let Some(new_email) = patch.email {
			if new_email != profile.email {
				match self.storage.insert(EMAILS, &new_email, &username).await {
					Ok(()) => {}
					Err(StorageError::AlreadyExists) => {
						return Err(EngineError::Conflict("Email already in use".to_string()));
					}
					Err(e) => return Err(EngineError::Storage(e.to_string())),
				}
				if let Err(e) = self.storage.remove(EMAILS, &profile.email).await {
					warn!(email = %profile.email, error = %e, "stale email index entry not removed");
				}
				profile.email = new_email;
			}
		}
		if let Some(role) = patch.role {
			profile.role = role;
		}
		if let Some(firstname) = patch.firstname {
			profile.firstname = firstname;
		}
		if let Some(lastname) = patch.lastname {
			profile.lastname = lastname;
		}
		if let Some(phonenumber) = patch.phonenumber {
			profile.phonenumber = phonenumber;
		}
		if let Some(gender) = patch.gender {
			profile.gender = Some(gender);
		}
		if let Some(birthdate) = patch.birthdate {
			profile.birthdate = Some(birthdate);
		}
		if let Some(bio) = patch.bio {
			profile.bio = Some(bio);
		}
		if let Some(is_active) = patch.is_active {
			profile.is_active = is_active;
		}

		self.storage
			.update(CLIENTS, username, &profile)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		Ok(profile)
	}

	/// Replaces a client's stored password hash.
	pub async fn set_password(&self, username: &str, password: &str) -> Result<(), EngineError> {
		let mut profile = self.get(username).await?;
		profile.password = auth::hash_password(password);
		self.storage
			.update(CLIENTS, username, &profile)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))
	}

	/// Deletes a client and their email index entry.
	pub async fn delete(&self, username: &str) -> Result<(), EngineError> {
		let profile = self.get(username).await?;
		self.storage
			.remove(CLIENTS, username)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		if let Err(e) = self.storage.remove(EMAILS, &profile.email).await {
			warn!(email = %profile.email, error = %e, "email index entry not removed");
		}
		info!(username = %username, "client deleted");
		Ok(())
	}

	/// Checks a username/password pair.
	///
	/// Returns the client's role on success so the frontend can route
	/// to the right view.
	pub async fn verify_credentials(
		&self,
		username: &str,
		password: &str,
	) -> Result<String, EngineError> {
		let profile = match self.storage.retrieve::<ClientProfile>(CLIENTS, username).await {
			Ok(profile) => profile,
			Err(StorageError::NotFound) => {
				return Err(EngineError::NotFound(
					"User with the provided username does not exist.".to_string(),
				));
			}
			Err(e) => return Err(EngineError::Storage(e.to_string())),
		};
		if !auth::verify_password(&profile.password, password) {
			return Err(EngineError::Validation(
				"Username and password do not match".to_string(),
			));
		}
		Ok(profile.role)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tailor_storage::implementations::memory::MemoryStorage;

	fn registry() -> ClientRegistry {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		ClientRegistry::new(storage)
	}

	fn registration(username: &str, email: &str) -> ClientRegistration {
		ClientRegistration {
			username: username.into(),
			password: "Str0ng!Pass".into(),
			role: "client".into(),
			firstname: "Ada".into(),
			lastname: "Lovelace".into(),
			phonenumber: "0700000000".into(),
			email: email.into(),
			gender: None,
			birthdate: None,
			bio: None,
		}
	}

	#[tokio::test]
	async fn register_hashes_the_password() {
		let reg = registry();
		let profile = reg
			.register(registration("ada", "ada@example.com"))
			.await
			.unwrap();
		assert_ne!(profile.password, "Str0ng!Pass");
		assert!(auth::verify_password(&profile.password, "Str0ng!Pass"));
	}

	#[tokio::test]
	async fn duplicate_username_is_rejected() {
		let reg = registry();
		reg.register(registration("ada", "ada@example.com"))
			.await
			.unwrap();
		let err = reg
			.register(registration("ada", "other@example.com"))
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Conflict(msg) if msg == "User already exists"));
	}

	#[tokio::test]
	async fn duplicate_email_rolls_back_the_username() {
		let reg = registry();
		reg.register(registration("ada", "shared@example.com"))
			.await
			.unwrap();
		let err = reg
			.register(registration("bob", "shared@example.com"))
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Conflict(msg) if msg == "Email already in use"));

		// The username claim must not linger after the failure.
		reg.register(registration("bob", "bob@example.com"))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn weak_password_is_rejected() {
		let reg = registry();
		let mut weak = registration("ada", "ada@example.com");
		weak.password = "short".into();
		let err = reg.register(weak).await.unwrap_err();
		assert!(matches!(err, EngineError::Validation(_)));
	}

	#[tokio::test]
	async fn verify_credentials_returns_role() {
		let reg = registry();
		let mut admin = registration("boss", "boss@example.com");
		admin.role = "admin".into();
		reg.register(admin).await.unwrap();

		let role = reg.verify_credentials("boss", "Str0ng!Pass").await.unwrap();
		assert_eq!(role, "admin");

		let err = reg.verify_credentials("boss", "Wr0ng!Pass").await.unwrap_err();
		assert!(matches!(err, EngineError::Validation(_)));

		let err = reg.verify_credentials("ghost", "Str0ng!Pass").await.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(_)));
	}

	#[tokio::test]
	async fn lookup_by_email_resolves_through_the_index() {
		let reg = registry();
		reg.register(registration("ada", "ada@example.com"))
			.await
			.unwrap();

		let profile = reg.get_by_email("ada@example.com").await.unwrap();
		assert_eq!(profile.username, "ada");

		let err = reg.get_by_email("ghost@example.com").await.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(msg) if msg == "Email not found"));
	}

	#[tokio::test]
	async fn email_change_keeps_the_index_consistent() {
		let reg = registry();
		reg.register(registration("ada", "ada@example.com"))
			.await
			.unwrap();
		reg.update(
			"ada",
			ClientUpdate {
				email: Some("lovelace@example.com".into()),
				..Default::default()
			},
		)
		.await
		.unwrap();

		// The old address is free again, the new one is taken.
		reg.register(registration("bob", "ada@example.com"))
			.await
			.unwrap();
		let err = reg
			.register(registration("carol", "lovelace@example.com"))
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Conflict(_)));
	}

	#[tokio::test]
	async fn delete_frees_username_and_email() {
		let reg = registry();
		reg.register(registration("ada", "ada@example.com"))
			.await
			.unwrap();
		reg.delete("ada").await.unwrap();

		let err = reg.get("ada").await.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(_)));
		reg.register(registration("ada", "ada@example.com"))
			.await
			.unwrap();
	}
}
