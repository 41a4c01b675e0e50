//! Configuration module for the tailor-shop backend.
//!
//! Loads service configuration from TOML files and validates the
//! cross-section references (the configured primary storage backend must
//! actually be one of the configured implementations, every notification
//! channel must point at a configured transport).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tailor_types::NotificationChannel;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Shop identity and order-identifier settings.
	pub shop: ShopConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for notification dispatch.
	pub notify: NotifyConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Shop identity and order-identifier settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopConfig {
	/// Display name used in outbound messages.
	pub name: String,
	/// Fixed prefix of every order identifier.
	#[serde(default = "default_order_prefix")]
	pub order_prefix: String,
	/// Base URL of the frontend's reset-password page.
	#[serde(default = "default_reset_url")]
	pub frontend_reset_url: String,
}

fn default_order_prefix() -> String {
	"JFK".to_string()
}

fn default_reset_url() -> String {
	"http://localhost:3000/reset-password".to_string()
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for notification dispatch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
	/// Which transport implementation carries each channel.
	///
	/// Example: `{ email = "webhook", sms = "log" }`. Channels without an
	/// entry are disabled; dispatch to them is skipped silently.
	pub channels: HashMap<NotificationChannel, String>,
	/// Map of transport implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8080
}

impl Config {
	/// Parses configuration from a TOML string and validates it.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads configuration from a file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		Self::from_toml_str(&raw)
	}

	/// Loads configuration from a file without blocking the runtime.
	pub async fn from_file_async(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path.as_ref()).await?;
		Self::from_toml_str(&raw)
	}

	/// Checks cross-section references.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.shop.order_prefix.is_empty() {
			return Err(ConfigError::Validation(
				"shop.order_prefix must not be empty".to_string(),
			));
		}

		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"storage.primary '{}' has no matching entry in storage.implementations",
				self.storage.primary
			)));
		}

		for (channel, transport) in &self.notify.channels {
			if !self.notify.implementations.contains_key(transport) {
				return Err(ConfigError::Validation(format!(
					"notify channel '{}' references unknown transport '{}'",
					channel, transport
				)));
			}
		}

		Ok(())
	}
}
