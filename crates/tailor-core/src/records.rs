//! Measurement and biodata registries.
//!
//! Both collections are keyed by username and require the client to
//! exist. Measurements are an upsert: one record per client, with each
//! submission merging its supplied fields over the stored ones.

use std::sync::Arc;
use tailor_storage::{StorageError, StorageService};
use tailor_types::{Biodata, Measurement, StorageKey};

use crate::{clients::ClientRegistry, EngineError};

const MEASUREMENTS: &str = StorageKey::Measurements.as_str();
const BIODATA: &str = StorageKey::Biodata.as_str();

/// Manages per-client measurement and biodata records.
pub struct RecordRegistry {
	storage: Arc<StorageService>,
}

impl RecordRegistry {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Creates or merges the measurement record for a client.
	pub async fn upsert_measurement(
		&self,
		clients: &ClientRegistry,
		patch: Measurement,
	) -> Result<Measurement, EngineError> {
		// Existence check first so the error names the right problem.
		clients.get(&patch.username).await?;

		let username = patch.username.clone();
		let merged = match self
			.storage
			.retrieve::<Measurement>(MEASUREMENTS, &username)
			.await
		{
			Ok(mut existing) => {
				existing.merge(patch);
				existing
			}
			Err(StorageError::NotFound) => patch,
			Err(e) => return Err(EngineError::Storage(e.to_string())),
		};

		self.storage
			.store(MEASUREMENTS, &username, &merged)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		Ok(merged)
	}

	/// Loads a client's measurement record.
	pub async fn get_measurement(&self, username: &str) -> Result<Measurement, EngineError> {
		match self.storage.retrieve(MEASUREMENTS, username).await {
			Ok(m) => Ok(m),
			Err(StorageError::NotFound) => Err(EngineError::NotFound(
				"Measurements not found.".to_string(),
			)),
			Err(e) => Err(EngineError::Storage(e.to_string())),
		}
	}

	/// Stores a biodata entry, replacing any previous one for the client.
	pub async fn put_biodata(
		&self,
		clients: &ClientRegistry,
		biodata: Biodata,
	) -> Result<Biodata, EngineError> {
		clients.get(&biodata.username).await?;
		self.storage
			.store(BIODATA, &biodata.username, &biodata)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		Ok(biodata)
	}

	/// Loads a client's biodata entry.
	pub async fn get_biodata(&self, username: &str) -> Result<Biodata, EngineError> {
		match self.storage.retrieve(BIODATA, username).await {
			Ok(b) => Ok(b),
			Err(StorageError::NotFound) => {
				Err(EngineError::NotFound("Biodata not found.".to_string()))
			}
			Err(e) => Err(EngineError::Storage(e.to_string())),
		}
	}
}
