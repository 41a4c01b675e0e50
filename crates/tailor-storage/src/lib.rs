//! Storage module for the tailor-shop backend.
//!
//! This module provides the explicit repository boundary the order state
//! machine calls through, decoupling transition logic from storage
//! technology. Backends are pluggable; in-memory and file-based
//! implementations are provided.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tailor_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// A requested record is not found.
	#[error("Not found")]
	NotFound,
	/// A unique insert collided with an existing key.
	///
	/// This is the hard uniqueness constraint the order-identifier
	/// generator relies on to detect same-day creation races.
	#[error("Already exists")]
	AlreadyExists,
	/// Serialization/deserialization failed.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The storage backend itself failed.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Configuration validation failed.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// Backends store opaque byte values under `namespace:id` keys. Beyond
/// plain key-value operations they must support a uniqueness-enforcing
/// insert and an ordered prefix scan, both of which the identifier
/// generator depends on.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, creating or overwriting.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Stores raw bytes only if the key does not exist yet.
	///
	/// Returns [`StorageError::AlreadyExists`] when the key is taken.
	async fn insert_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns all keys starting with `prefix`, sorted ascending.
	async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations, used by the service to wire the configured backend.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
///
/// Wraps a low-level backend and adds JSON serialization plus the
/// domain-facing operations the engine needs: unique insert, update of an
/// existing record, prefix listing and the highest-key query behind
/// identifier generation.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	fn encode<T: Serialize>(data: &T) -> Result<Vec<u8>, StorageError> {
		serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Stores a serializable value, creating or overwriting.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		self.backend
			.set_bytes(&Self::key(namespace, id), Self::encode(data)?)
			.await
	}

	/// Stores a serializable value only if the id is not taken yet.
	///
	/// Surfaces [`StorageError::AlreadyExists`] so callers can retry with
	/// a freshly computed id.
	pub async fn insert<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		self.backend
			.insert_bytes(&Self::key(namespace, id), Self::encode(data)?)
			.await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Updates an existing value in storage.
	///
	/// Returns [`StorageError::NotFound`] if the record does not exist,
	/// making it semantically different from store() which creates.
	pub async fn update<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = Self::key(namespace, id);
		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}
		self.backend.set_bytes(&key, Self::encode(data)?).await
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}

	/// Returns the ids (namespace prefix stripped) of every record in the
	/// namespace whose id starts with `id_prefix`, sorted ascending.
	pub async fn keys_with_prefix(
		&self,
		namespace: &str,
		id_prefix: &str,
	) -> Result<Vec<String>, StorageError> {
		let full_prefix = Self::key(namespace, id_prefix);
		let keys = self.backend.keys_with_prefix(&full_prefix).await?;
		let strip = format!("{}:", namespace);
		Ok(keys
			.into_iter()
			.filter_map(|k| k.strip_prefix(&strip).map(str::to_string))
			.collect())
	}

	/// Returns the highest id in the namespace sharing `id_prefix`.
	///
	/// Ids within one calendar day share a fixed-width zero-padded suffix,
	/// so the lexicographic maximum equals the numeric maximum.
	pub async fn max_key_with_prefix(
		&self,
		namespace: &str,
		id_prefix: &str,
	) -> Result<Option<String>, StorageError> {
		let mut keys = self.keys_with_prefix(namespace, id_prefix).await?;
		Ok(keys.pop())
	}

	/// Retrieves every record in a namespace.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<T>, StorageError> {
		let ids = self.keys_with_prefix(namespace, "").await?;
		let mut records = Vec::with_capacity(ids.len());
		for id in ids {
			records.push(self.retrieve(namespace, &id).await?);
		}
		Ok(records)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::{Deserialize, Serialize};

	#[derive(Debug, Serialize, Deserialize, PartialEq)]
	struct Rec {
		n: u32,
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn insert_rejects_duplicate_id() {
		let storage = service();
		storage.insert("orders", "A0001", &Rec { n: 1 }).await.unwrap();

		let err = storage.insert("orders", "A0001", &Rec { n: 2 }).await;
		assert!(matches!(err, Err(StorageError::AlreadyExists)));

		// The first record survives the rejected insert.
		let rec: Rec = storage.retrieve("orders", "A0001").await.unwrap();
		assert_eq!(rec, Rec { n: 1 });
	}

	#[tokio::test]
	async fn update_requires_existing_record() {
		let storage = service();
		let err = storage.update("orders", "missing", &Rec { n: 1 }).await;
		assert!(matches!(err, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn max_key_is_lexicographically_last() {
		let storage = service();
		for id in ["JFK010520240002", "JFK010520240010", "JFK010520240001"] {
			storage.insert("orders", id, &Rec { n: 0 }).await.unwrap();
		}
		// A different day prefix must not be picked up.
		storage
			.insert("orders", "JFK020520240099", &Rec { n: 0 })
			.await
			.unwrap();

		let max = storage
			.max_key_with_prefix("orders", "JFK01052024")
			.await
			.unwrap();
		assert_eq!(max.as_deref(), Some("JFK010520240010"));
	}

	#[tokio::test]
	async fn retrieve_all_returns_whole_namespace() {
		let storage = service();
		storage.store("clients", "ada", &Rec { n: 1 }).await.unwrap();
		storage.store("clients", "bob", &Rec { n: 2 }).await.unwrap();
		storage.store("orders", "x", &Rec { n: 3 }).await.unwrap();

		let recs: Vec<Rec> = storage.retrieve_all("clients").await.unwrap();
		assert_eq!(recs.len(), 2);
	}
}
