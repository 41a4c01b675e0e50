//! File-based storage backend.
//!
//! Stores each record as one JSON file under
//! `<base>/<namespace>/<id>.json`, giving simple persistence without an
//! external database. Writes go through a temp file and rename; unique
//! inserts rely on create-new file semantics, so the filesystem itself
//! enforces the identifier uniqueness constraint.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tailor_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Splits a `namespace:id` key into directory and file name.
	///
	/// The id part is sanitized so it cannot escape the namespace
	/// directory. Ids never contain path separators in practice (order
	/// codes, usernames, email addresses, hex digests).
	fn locate(&self, key: &str) -> Result<(PathBuf, PathBuf), StorageError> {
		let (namespace, id) = key
			.split_once(':')
			.ok_or_else(|| StorageError::Backend(format!("Key without namespace: {}", key)))?;
		let safe_id = id.replace(['/', '\\'], "_");
		let dir = self.base_path.join(namespace);
		let file = dir.join(format!("{}.json", safe_id));
		Ok((dir, file))
	}

	async fn keys_in_dir(dir: &Path, namespace: &str) -> Result<Vec<String>, StorageError> {
		let mut keys = Vec::new();
		let mut entries = match fs::read_dir(dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let name = entry.file_name();
			let name = name.to_string_lossy();
			if let Some(stem) = name.strip_suffix(".json") {
				keys.push(format!("{}:{}", namespace, stem));
			}
		}
		Ok(keys)
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let (_, path) = self.locate(key)?;
		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let (dir, path) = self.locate(key)?;
		fs::create_dir_all(&dir)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn insert_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let (dir, path) = self.locate(key)?;
		fs::create_dir_all(&dir)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		// create_new makes the open fail if the file exists, so two racing
		// inserts of the same id cannot both succeed.
		let mut file = match fs::OpenOptions::new()
			.write(true)
			.create_new(true)
			.open(&path)
			.await
		{
			Ok(file) => file,
			Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
				return Err(StorageError::AlreadyExists)
			},
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		file.write_all(&value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		file.flush()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let (_, path) = self.locate(key)?;
		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let (_, path) = self.locate(key)?;
		Ok(path.exists())
	}

	async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		// StorageService always passes "namespace:id_prefix".
		let (namespace, id_prefix) = prefix
			.split_once(':')
			.ok_or_else(|| StorageError::Backend(format!("Prefix without namespace: {}", prefix)))?;

		let dir = self.base_path.join(namespace);
		let mut keys = Self::keys_in_dir(&dir, namespace).await?;
		let full_prefix = format!("{}:{}", namespace, id_prefix);
		keys.retain(|k| k.starts_with(&full_prefix));
		keys.sort();
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![Field::optional("storage_path", FieldType::Str)]).validate(config)
	}
}

/// Implementation registry entry for the file backend.
pub struct Registry;

impl tailor_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage")
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}
