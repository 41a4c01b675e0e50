//! Webhook notification transport.
//!
//! Hands messages to an external delivery gateway over HTTP. The gateway
//! owns the actual email/SMS transport; this implementation only POSTs
//! the message and reports whether the hand-off was accepted.

use crate::{NotifierInterface, NotifyError};
use async_trait::async_trait;
use std::time::Duration;
use tailor_types::{ConfigSchema, Field, FieldType, OutboundMessage, Schema, ValidationError};

/// Transport that POSTs messages to a configured gateway URL.
pub struct WebhookNotifier {
	url: String,
	client: reqwest::Client,
}

impl WebhookNotifier {
	/// Creates a new WebhookNotifier for the given gateway URL.
	pub fn new(url: String, timeout: Duration) -> Result<Self, NotifyError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| NotifyError::Configuration(e.to_string()))?;
		Ok(Self { url, client })
	}
}

#[async_trait]
impl NotifierInterface for WebhookNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(WebhookNotifierSchema)
	}

	async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
		let response = self
			.client
			.post(&self.url)
			.json(message)
			.send()
			.await
			.map_err(|e| NotifyError::Transport(e.to_string()))?;

		if !response.status().is_success() {
			return Err(NotifyError::Transport(format!(
				"gateway returned {}",
				response.status()
			)));
		}
		Ok(())
	}
}

/// Configuration schema for WebhookNotifier.
pub struct WebhookNotifierSchema;

impl ConfigSchema for WebhookNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![
			Field::required("url", FieldType::Str),
			Field::optional(
				"timeout_seconds",
				FieldType::Int {
					min: Some(1),
					max: Some(300),
				},
			),
		])
		.validate(config)
	}
}

/// Implementation registry entry for the webhook transport.
pub struct Registry;

impl tailor_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "webhook";
	type Factory = crate::NotifierFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifierRegistry for Registry {}

/// Factory function to create a webhook transport from configuration.
///
/// Configuration parameters:
/// - `url`: Gateway endpoint to POST messages to (required)
/// - `timeout_seconds`: Request timeout (default: 30)
pub fn create_notifier(config: &toml::Value) -> Result<Box<dyn NotifierInterface>, NotifyError> {
	WebhookNotifierSchema
		.validate(config)
		.map_err(|e| NotifyError::Configuration(e.to_string()))?;

	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| NotifyError::Configuration("url is required".to_string()))?
		.to_string();
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.unwrap_or(30) as u64;

	Ok(Box::new(WebhookNotifier::new(
		url,
		Duration::from_secs(timeout),
	)?))
}
