//! Logging notification transport.
//!
//! Emits every message through `tracing` and always reports success.
//! Used in development and tests, and for channels that should be
//! recorded but not actually delivered.

use crate::{NotifierInterface, NotifyError};
use async_trait::async_trait;
use tailor_types::{ConfigSchema, OutboundMessage, Schema, ValidationError};

/// Transport that writes messages to the log instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl NotifierInterface for LogNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotifierSchema)
	}

	async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
		tracing::info!(
			channel = %message.channel,
			recipient = %message.recipient,
			subject = %message.subject,
			"Notification (log transport)"
		);
		Ok(())
	}
}

/// Configuration schema for LogNotifier.
pub struct LogNotifierSchema;

impl ConfigSchema for LogNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The log transport has no required configuration
		Schema::default().validate(config)
	}
}

/// Implementation registry entry for the log transport.
pub struct Registry;

impl tailor_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = crate::NotifierFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifierRegistry for Registry {}

/// Factory function to create a log transport from configuration.
///
/// Configuration parameters:
/// - None required
pub fn create_notifier(_config: &toml::Value) -> Result<Box<dyn NotifierInterface>, NotifyError> {
	Ok(Box::new(LogNotifier))
}
