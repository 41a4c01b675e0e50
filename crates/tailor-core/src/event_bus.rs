//! Event bus implementation using tokio broadcast channels.
//!
//! Carries post-commit events from the state machine to the
//! notification loop. A send with no live subscriber is not an error;
//! transitions never depend on anyone listening.

use tailor_types::TailorEvent;
use tokio::sync::broadcast;

/// Event bus for distributing engine events to subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<TailorEvent>,
}

impl EventBus {
	/// Creates a new event bus with the specified channel capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Subscribes to receive all events published on this bus.
	pub fn subscribe(&self) -> broadcast::Receiver<TailorEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all subscribers.
	///
	/// Returns the number of subscribers that received the event.
	pub fn publish(&self, event: TailorEvent) -> usize {
		self.sender.send(event).unwrap_or(0)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tailor_types::{Order, OrderDraft, OrderEvent};

	#[tokio::test]
	async fn subscribers_receive_published_events() {
		let bus = EventBus::new(8);
		let mut rx = bus.subscribe();

		let order = Order::new(
			"JFK010120250001".into(),
			"ada".into(),
			OrderDraft::default(),
			chrono::Utc::now(),
		);
		let delivered = bus.publish(TailorEvent::Order(OrderEvent::Confirmed { order }));
		assert_eq!(delivered, 1);

		let event = rx.recv().await.unwrap();
		assert!(matches!(
			event,
			TailorEvent::Order(OrderEvent::Confirmed { .. })
		));
	}

	#[test]
	fn publish_without_subscribers_is_harmless() {
		let bus = EventBus::new(8);
		let order = Order::new(
			"JFK010120250001".into(),
			"ada".into(),
			OrderDraft::default(),
			chrono::Utc::now(),
		);
		let delivered = bus.publish(TailorEvent::Order(OrderEvent::Confirmed { order }));
		assert_eq!(delivered, 0);
	}
}
