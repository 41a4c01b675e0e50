//! Order identifier generation.
//!
//! Identifiers take the form `<PREFIX><DDMMYYYY><NNNN>`: a shop prefix,
//! the creation date, and a four-digit sequence that restarts at 0001
//! each day. The next sequence number is derived from the largest
//! identifier already stored for the day, so generation is stateless
//! across restarts. Concurrent callers may derive the same candidate;
//! the caller resolves that through the storage uniqueness constraint
//! and retries.

use chrono::{DateTime, Utc};
use tailor_storage::StorageService;
use tailor_types::StorageKey;

use crate::EngineError;

/// Digits in the daily sequence component.
pub const SEQUENCE_WIDTH: usize = 4;
/// Largest sequence number representable in a day.
pub const MAX_DAILY_SEQUENCE: u32 = 9999;

/// Generates date-scoped sequential order identifiers.
pub struct IdGenerator {
	prefix: String,
}

impl IdGenerator {
	/// Create a generator with the configured shop prefix.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into() }
	}

	/// The identifier prefix shared by every order created on `date`.
	pub fn day_prefix(&self, date: DateTime<Utc>) -> String {
		format!("{}{}", self.prefix, date.format("%d%m%Y"))
	}

	/// Produce the next candidate identifier for `date`.
	///
	/// Scans stored order keys for the day and increments the highest
	/// sequence found. Returns [`EngineError::Generation`] once the
	/// daily sequence is exhausted.
	pub async fn next_id(
		&self,
		storage: &StorageService,
		date: DateTime<Utc>,
	) -> Result<String, EngineError> {
		let day_prefix = self.day_prefix(date);
		let max = storage
			.max_key_with_prefix(StorageKey::Orders.as_str(), &day_prefix)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;

		let next = match max {
			Some(key) => {
				let seq = parse_sequence(&key, &day_prefix).ok_or_else(|| {
					EngineError::Generation(format!(
						"stored identifier {key} has a malformed sequence"
					))
				})?;
				seq + 1
			}
			None => 1,
		};

		if next > MAX_DAILY_SEQUENCE {
			return Err(EngineError::Generation(format!(
				"daily sequence exhausted for prefix {day_prefix}"
			)));
		}

		Ok(format!("{day_prefix}{next:0width$}", width = SEQUENCE_WIDTH))
	}
}

/// Extract the numeric sequence from an identifier with the given day prefix.
fn parse_sequence(key: &str, day_prefix: &str) -> Option<u32> {
	let suffix = key.strip_prefix(day_prefix)?;
	if suffix.len() != SEQUENCE_WIDTH {
		return None;
	}
	suffix.parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use std::sync::Arc;
	use tailor_storage::{implementations::memory::MemoryStorage, StorageService};

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	fn day() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
	}

	#[test]
	fn day_prefix_uses_ddmmyyyy() {
		let gen = IdGenerator::new("JFK");
		assert_eq!(gen.day_prefix(day()), "JFK14032025");
	}

	#[tokio::test]
	async fn first_id_of_the_day_is_0001() {
		let storage = service();
		let gen = IdGenerator::new("JFK");
		let id = gen.next_id(&storage, day()).await.unwrap();
		assert_eq!(id, "JFK140320250001");
	}

	#[tokio::test]
	async fn increments_past_existing_ids() {
		let storage = service();
		let gen = IdGenerator::new("JFK");
		for seq in ["0001", "0002", "0007"] {
			storage
				.store(
					StorageKey::Orders.as_str(),
					&format!("JFK14032025{seq}"),
					&serde_json::json!({}),
				)
				.await
				.unwrap();
		}
		let id = gen.next_id(&storage, day()).await.unwrap();
		assert_eq!(id, "JFK140320250008");
	}

	#[tokio::test]
	async fn other_days_do_not_leak_into_the_sequence() {
		let storage = service();
		let gen = IdGenerator::new("JFK");
		storage
			.store(
				StorageKey::Orders.as_str(),
				"JFK130320250042",
				&serde_json::json!({}),
			)
			.await
			.unwrap();
		let id = gen.next_id(&storage, day()).await.unwrap();
		assert_eq!(id, "JFK140320250001");
	}

	#[tokio::test]
	async fn exhausted_sequence_is_an_error() {
		let storage = service();
		let gen = IdGenerator::new("JFK");
		storage
			.store(
				StorageKey::Orders.as_str(),
				"JFK140320259999",
				&serde_json::json!({}),
			)
			.await
			.unwrap();
		let err = gen.next_id(&storage, day()).await.unwrap_err();
		assert!(matches!(err, EngineError::Generation(_)));
	}

	#[tokio::test]
	async fn shared_service_is_send() {
		// IdGenerator is used behind an Arc from spawned tasks.
		let storage = Arc::new(service());
		let gen = Arc::new(IdGenerator::new("JFK"));
		let s = storage.clone();
		let g = gen.clone();
		let id = tokio::spawn(async move { g.next_id(&s, day()).await })
			.await
			.unwrap()
			.unwrap();
		assert_eq!(id, "JFK140320250001");
	}
}
