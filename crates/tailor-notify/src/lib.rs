//! Notification dispatch module for the tailor-shop backend.
//!
//! Routes outbound messages to the transport configured for each channel
//! and writes an audit record after every attempt. Dispatch is strictly
//! post-commit and fire-and-forget: the state change that triggered a
//! message has already been persisted, and a failed send can never undo
//! or fail it. There is no retry queue.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tailor_storage::StorageService;
use tailor_types::{
	ConfigSchema, ImplementationRegistry, NotificationChannel, NotificationRecord, OutboundMessage,
	StorageKey,
};
use thiserror::Error;

pub mod message;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod webhook;
}

/// Errors that can occur during notification dispatch.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// The transport failed to hand the message off.
	#[error("Transport error: {0}")]
	Transport(String),
	/// No transport is configured for the requested channel.
	#[error("No transport configured for channel {0}")]
	ChannelDisabled(NotificationChannel),
	/// Configuration validation failed.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for notification transports.
///
/// A transport only hands a message off (to a log, a gateway, a
/// provider); policy — which channel, what happens on failure, audit
/// records — lives in [`NotifyService`].
#[async_trait]
pub trait NotifierInterface: Send + Sync {
	/// Returns the configuration schema for this transport implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Attempts to deliver a single message.
	async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError>;
}

/// Type alias for notifier factory functions.
pub type NotifierFactory = fn(&toml::Value) -> Result<Box<dyn NotifierInterface>, NotifyError>;

/// Registry trait for notifier implementations.
pub trait NotifierRegistry: ImplementationRegistry<Factory = NotifierFactory> {}

/// Get all registered notifier implementations.
pub fn get_all_implementations() -> Vec<(&'static str, NotifierFactory)> {
	use implementations::{log, webhook};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(webhook::Registry::NAME, webhook::Registry::factory()),
	]
}

/// Service that routes messages to per-channel transports.
///
/// Channels without a configured transport are disabled; dispatching to
/// them reports [`NotifyError::ChannelDisabled`], which callers on the
/// fire-and-forget path treat like any other delivery failure.
pub struct NotifyService {
	/// Transport for each enabled channel.
	transports: HashMap<NotificationChannel, Box<dyn NotifierInterface>>,
	/// Storage used for the notification audit trail.
	storage: Arc<StorageService>,
}

impl NotifyService {
	/// Creates a new NotifyService with the specified transports.
	pub fn new(
		transports: HashMap<NotificationChannel, Box<dyn NotifierInterface>>,
		storage: Arc<StorageService>,
	) -> Self {
		Self {
			transports,
			storage,
		}
	}

	/// Whether a transport is configured for the channel.
	pub fn channel_enabled(&self, channel: NotificationChannel) -> bool {
		self.transports.contains_key(&channel)
	}

	/// Attempts delivery and records the outcome.
	///
	/// The audit write is itself best-effort; a storage fault there is
	/// logged and dropped so it cannot mask the delivery outcome.
	pub async fn dispatch(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
		let result = match self.transports.get(&message.channel) {
			Some(transport) => transport.send(message).await,
			None => Err(NotifyError::ChannelDisabled(message.channel)),
		};

		let outcome = match &result {
			Ok(()) => "delivered".to_string(),
			Err(e) => format!("failed: {}", e),
		};
		self.record(message, outcome).await;

		result
	}

	async fn record(&self, message: &OutboundMessage, outcome: String) {
		let record = NotificationRecord {
			order_id: message.order_id.clone(),
			channel: message.channel,
			recipient: message.recipient.clone(),
			subject: message.subject.clone(),
			outcome,
			timestamp: Utc::now(),
		};
		let id = uuid::Uuid::new_v4().to_string();
		if let Err(e) = self
			.storage
			.store(StorageKey::Notifications.as_str(), &id, &record)
			.await
		{
			tracing::warn!("Failed to record notification outcome: {}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tailor_storage::implementations::memory::MemoryStorage;

	struct FailingTransport;

	#[async_trait]
	impl NotifierInterface for FailingTransport {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			implementations::log::create_notifier(&toml::Value::Boolean(true))
				.unwrap()
				.config_schema()
		}

		async fn send(&self, _message: &OutboundMessage) -> Result<(), NotifyError> {
			Err(NotifyError::Transport("gateway unreachable".to_string()))
		}
	}

	fn storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	fn sample_message(channel: NotificationChannel) -> OutboundMessage {
		OutboundMessage {
			channel,
			recipient: "ada@example.com".to_string(),
			subject: "Order Confirmed - JFK010520240001".to_string(),
			body: "Your order has been confirmed.".to_string(),
			order_id: Some("JFK010520240001".to_string()),
		}
	}

	#[tokio::test]
	async fn dispatch_records_delivery() {
		let storage = storage();
		let mut transports: HashMap<NotificationChannel, Box<dyn NotifierInterface>> =
			HashMap::new();
		transports.insert(
			NotificationChannel::Email,
			implementations::log::create_notifier(&toml::Value::Boolean(true)).unwrap(),
		);
		let notify = NotifyService::new(transports, Arc::clone(&storage));

		notify
			.dispatch(&sample_message(NotificationChannel::Email))
			.await
			.unwrap();

		let records: Vec<NotificationRecord> = storage
			.retrieve_all(StorageKey::Notifications.as_str())
			.await
			.unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].outcome, "delivered");
	}

	#[tokio::test]
	async fn dispatch_records_failure_and_reports_it() {
		let storage = storage();
		let mut transports: HashMap<NotificationChannel, Box<dyn NotifierInterface>> =
			HashMap::new();
		transports.insert(NotificationChannel::Email, Box::new(FailingTransport));
		let notify = NotifyService::new(transports, Arc::clone(&storage));

		let err = notify
			.dispatch(&sample_message(NotificationChannel::Email))
			.await;
		assert!(matches!(err, Err(NotifyError::Transport(_))));

		let records: Vec<NotificationRecord> = storage
			.retrieve_all(StorageKey::Notifications.as_str())
			.await
			.unwrap();
		assert_eq!(records.len(), 1);
		assert!(records[0].outcome.starts_with("failed:"));
	}

	#[tokio::test]
	async fn disabled_channel_reports_channel_disabled() {
		let notify = NotifyService::new(HashMap::new(), storage());
		let err = notify
			.dispatch(&sample_message(NotificationChannel::Sms))
			.await;
		assert!(matches!(err, Err(NotifyError::ChannelDisabled(_))));
	}
}
