//! Main entry point for the tailor-shop service.
//!
//! This binary wires the storage backend, notification transports and
//! business engine from a TOML configuration file, then runs the
//! notification loop and (when enabled) the HTTP API server until
//! interrupted.

use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tailor_config::Config;
use tailor_core::TailorEngine;
use tailor_notify::{NotifierInterface, NotifyService};
use tailor_storage::StorageService;

mod handlers;
mod server;

/// Command-line arguments for the tailor-shop service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	let config = Config::from_file_async(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.shop.name);

	let storage = Arc::new(build_storage(&config)?);
	let notify = Arc::new(build_notify(&config, Arc::clone(&storage))?);
	let engine = Arc::new(TailorEngine::new(&config, storage, notify));

	let api_enabled = config.api.as_ref().is_some_and(|api| api.enabled);

	if api_enabled {
		let api_config = config.api.as_ref().unwrap().clone();
		let api_engine = Arc::clone(&engine);

		tokio::select! {
			_ = engine.run() => {
				tracing::info!("Notification loop finished");
			}
			result = server::start_server(api_config, api_engine) => {
				tracing::info!("API server finished");
				result?;
			}
			_ = tokio::signal::ctrl_c() => {
				tracing::info!("Received shutdown signal");
			}
		}
	} else {
		tracing::info!("API server disabled, running notification loop only");
		tokio::select! {
			_ = engine.run() => {}
			_ = tokio::signal::ctrl_c() => {
				tracing::info!("Received shutdown signal");
			}
		}
	}

	tracing::info!("Stopped service");
	Ok(())
}

/// Builds the configured primary storage backend.
fn build_storage(config: &Config) -> Result<StorageService, Box<dyn std::error::Error>> {
	let primary = &config.storage.primary;
	let backend_config = config
		.storage
		.implementations
		.get(primary)
		.ok_or_else(|| format!("no configuration for storage backend '{}'", primary))?;

	let factory = tailor_storage::get_all_implementations()
		.into_iter()
		.find(|(name, _)| name == primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| format!("unknown storage backend '{}'", primary))?;

	Ok(StorageService::new(factory(backend_config)?))
}

/// Builds the notification service with one transport per enabled channel.
fn build_notify(
	config: &Config,
	storage: Arc<StorageService>,
) -> Result<NotifyService, Box<dyn std::error::Error>> {
	let available: HashMap<_, _> = tailor_notify::get_all_implementations()
		.into_iter()
		.collect();

	let mut transports: HashMap<_, Box<dyn NotifierInterface>> = HashMap::new();
	for (channel, transport_name) in &config.notify.channels {
		let factory = available
			.get(transport_name.as_str())
			.ok_or_else(|| format!("unknown notification transport '{}'", transport_name))?;
		let transport_config = config
			.notify
			.implementations
			.get(transport_name)
			.ok_or_else(|| format!("no configuration for transport '{}'", transport_name))?;
		transports.insert(*channel, factory(transport_config)?);
		tracing::info!(channel = %channel, transport = %transport_name, "notification channel enabled");
	}

	Ok(NotifyService::new(transports, storage))
}
