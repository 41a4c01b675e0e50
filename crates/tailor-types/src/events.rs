//! Event types for post-commit notification dispatch.
//!
//! State transitions are persisted first; the matching event is published
//! on the event bus afterwards. Consumers (the notification loop) react
//! to events without any ability to block or revert the transition that
//! produced them.

use crate::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Main event type published on the engine's event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TailorEvent {
	/// Events produced by order state transitions.
	Order(OrderEvent),
}

/// Events produced by order state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// An order has been confirmed by staff.
	Confirmed { order: Order },
	/// A confirmed order was moved to a new status.
	///
	/// Published for InProgress, Fitting and Completed; re-setting Pending
	/// has no notification defined and emits nothing.
	StatusChanged { order: Order, status: OrderStatus },
}
