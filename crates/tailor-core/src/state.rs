//! Order state machine.
//!
//! Owns every order lifecycle rule: creation with a retried unique
//! identifier, the irreversible confirmation gate, status movement on
//! confirmed orders, draft edits and deletion on unconfirmed ones.
//! Persistence happens before the caller sees the result; notification
//! events are the engine's concern and fire only after the write here
//! has committed.

use chrono::Utc;
use std::sync::Arc;
use tailor_storage::{StorageError, StorageService};
use tailor_types::{Order, OrderDraft, OrderStatus, StorageKey};
use tracing::{debug, info};

use crate::{idgen::IdGenerator, EngineError};

/// Attempts at inserting a freshly generated identifier before giving up.
const CREATE_ATTEMPTS: u32 = 3;

const ORDERS: &str = StorageKey::Orders.as_str();

/// Drives order lifecycle transitions against the storage boundary.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
	idgen: IdGenerator,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>, idgen: IdGenerator) -> Self {
		Self { storage, idgen }
	}

	/// Creates a new unconfirmed order for `client`.
	///
	/// The identifier is regenerated and re-inserted on collision, so two
	/// orders created in the same instant both come out with distinct
	/// sequence numbers.
	pub async fn create(&self, client: &str, draft: OrderDraft) -> Result<Order, EngineError> {
		for attempt in 1..=CREATE_ATTEMPTS {
			let now = Utc::now();
			let id = self.idgen.next_id(&self.storage, now).await?;
			let order = Order::new(id.clone(), client.to_string(), draft.clone(), now);

			match self.storage.insert(ORDERS, &id, &order).await {
				Ok(()) => {
					info!(order_id = %id, client = %client, "order created");
					return Ok(order);
				}
				Err(StorageError::AlreadyExists) => {
					debug!(order_id = %id, attempt, "identifier collision, regenerating");
					continue;
				}
				Err(e) => return Err(EngineError::Storage(e.to_string())),
			}
		}
		Err(EngineError::Generation(format!(
			"could not allocate a unique identifier after {CREATE_ATTEMPTS} attempts"
		)))
	}

	/// Loads an order by identifier.
	pub async fn get(&self, id: &str) -> Result<Order, EngineError> {
		match self.storage.retrieve(ORDERS, id).await {
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => {
				Err(EngineError::NotFound("Order not found.".to_string()))
			}
			Err(e) => Err(EngineError::Storage(e.to_string())),
		}
	}

	/// Lists all orders, optionally restricted to one client's.
	pub async fn list(&self, client: Option<&str>) -> Result<Vec<Order>, EngineError> {
		let orders: Vec<Order> = self
			.storage
			.retrieve_all(ORDERS)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		Ok(match client {
			Some(username) => orders.into_iter().filter(|o| o.client == username).collect(),
			None => orders,
		})
	}

	/// Confirms an order.
	///
	/// Confirmation is irreversible and happens at most once; a second
	/// call is a conflict, not a no-op.
	pub async fn confirm(&self, id: &str) -> Result<Order, EngineError> {
		let mut order = self.get(id).await?;
		if order.is_confirmed {
			return Err(EngineError::Conflict(
				"Order is already confirmed.".to_string(),
			));
		}
		order.is_confirmed = true;
		order.confirmed_at = Some(Utc::now());
		self.persist(&order).await?;
		info!(order_id = %order.id, "order confirmed");
		Ok(order)
	}

	/// Moves a confirmed order to `status`.
	///
	/// Any status may follow any other, including moving back out of
	/// Completed for rework. `completed_at` is stamped only on the first
	/// entry into Completed and survives later transitions.
	pub async fn set_status(&self, id: &str, status: OrderStatus) -> Result<Order, EngineError> {
		let mut order = self.get(id).await?;
		if !order.is_confirmed {
			return Err(EngineError::Conflict(
				"Cannot modify order unless it is confirmed.".to_string(),
			));
		}
		order.status = status;
		if status == OrderStatus::Completed && order.completed_at.is_none() {
			order.completed_at = Some(Utc::now());
		}
		self.persist(&order).await?;
		info!(order_id = %order.id, status = %status, "order status updated");
		Ok(order)
	}

	/// Patches an order's draft attributes.
	///
	/// Only unconfirmed orders are editable.
	pub async fn update_draft(&self, id: &str, patch: OrderDraft) -> Result<Order, EngineError> {
		let mut order = self.get(id).await?;
		if order.is_confirmed {
			return Err(EngineError::Conflict(
				"Cannot modify a confirmed order.".to_string(),
			));
		}
		order.apply_draft(patch);
		self.persist(&order).await?;
		Ok(order)
	}

	/// Deletes an unconfirmed order.
	pub async fn remove(&self, id: &str) -> Result<(), EngineError> {
		let order = self.get(id).await?;
		if order.is_confirmed {
			return Err(EngineError::Conflict(
				"Cannot delete a confirmed order.".to_string(),
			));
		}
		self.storage
			.remove(ORDERS, id)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		info!(order_id = %id, "order deleted");
		Ok(())
	}

	async fn persist(&self, order: &Order) -> Result<(), EngineError> {
		self.storage
			.update(ORDERS, &order.id, order)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tailor_storage::implementations::memory::MemoryStorage;

	fn machine() -> OrderStateMachine {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		OrderStateMachine::new(storage, IdGenerator::new("JFK"))
	}

	#[tokio::test]
	async fn created_orders_get_sequential_ids() {
		let sm = machine();
		let a = sm.create("ada", OrderDraft::default()).await.unwrap();
		let b = sm.create("ada", OrderDraft::default()).await.unwrap();

		assert!(a.id.ends_with("0001"));
		assert!(b.id.ends_with("0002"));
		assert_eq!(a.status, OrderStatus::Pending);
		assert!(!a.is_confirmed);
	}

	#[tokio::test]
	async fn confirm_is_not_idempotent() {
		let sm = machine();
		let order = sm.create("ada", OrderDraft::default()).await.unwrap();

		let confirmed = sm.confirm(&order.id).await.unwrap();
		assert!(confirmed.is_confirmed);
		assert!(confirmed.confirmed_at.is_some());

		let err = sm.confirm(&order.id).await.unwrap_err();
		assert!(matches!(err, EngineError::Conflict(_)));
	}

	#[tokio::test]
	async fn status_requires_confirmation() {
		let sm = machine();
		let order = sm.create("ada", OrderDraft::default()).await.unwrap();

		let err = sm
			.set_status(&order.id, OrderStatus::InProgress)
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Conflict(_)));

		sm.confirm(&order.id).await.unwrap();
		let updated = sm
			.set_status(&order.id, OrderStatus::InProgress)
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::InProgress);
	}

	#[tokio::test]
	async fn completed_at_is_stamped_once() {
		let sm = machine();
		let order = sm.create("ada", OrderDraft::default()).await.unwrap();
		sm.confirm(&order.id).await.unwrap();

		let done = sm
			.set_status(&order.id, OrderStatus::Completed)
			.await
			.unwrap();
		let first_stamp = done.completed_at.unwrap();

		// Rework and complete again; the original timestamp survives.
		sm.set_status(&order.id, OrderStatus::Fitting).await.unwrap();
		let redone = sm
			.set_status(&order.id, OrderStatus::Completed)
			.await
			.unwrap();
		assert_eq!(redone.completed_at.unwrap(), first_stamp);
	}

	#[tokio::test]
	async fn drafts_lock_on_confirmation() {
		let sm = machine();
		let order = sm.create("ada", OrderDraft::default()).await.unwrap();

		let patched = sm
			.update_draft(
				&order.id,
				OrderDraft {
					comments: Some("shorten sleeves".into()),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert_eq!(patched.comments.as_deref(), Some("shorten sleeves"));

		sm.confirm(&order.id).await.unwrap();
		let err = sm
			.update_draft(&order.id, OrderDraft::default())
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Conflict(_)));
	}

	#[tokio::test]
	async fn delete_refuses_confirmed_orders() {
		let sm = machine();
		let order = sm.create("ada", OrderDraft::default()).await.unwrap();
		sm.confirm(&order.id).await.unwrap();

		let err = sm.remove(&order.id).await.unwrap_err();
		assert!(matches!(err, EngineError::Conflict(_)));

		let other = sm.create("ada", OrderDraft::default()).await.unwrap();
		sm.remove(&other.id).await.unwrap();
		let err = sm.get(&other.id).await.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(_)));
	}

	#[tokio::test]
	async fn list_filters_by_client() {
		let sm = machine();
		sm.create("ada", OrderDraft::default()).await.unwrap();
		sm.create("bob", OrderDraft::default()).await.unwrap();
		sm.create("ada", OrderDraft::default()).await.unwrap();

		assert_eq!(sm.list(None).await.unwrap().len(), 3);
		assert_eq!(sm.list(Some("ada")).await.unwrap().len(), 2);
		assert_eq!(sm.list(Some("carol")).await.unwrap().len(), 0);
	}

	#[tokio::test]
	async fn missing_order_is_not_found() {
		let sm = machine();
		let err = sm.get("JFK010120250001").await.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(msg) if msg == "Order not found."));
	}
}
