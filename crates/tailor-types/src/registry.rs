//! Registry trait for self-registering implementations.
//!
//! Storage backends and notifier transports register themselves with the
//! name used to reference them from configuration plus a factory function
//! that builds an instance from the matching TOML section.

/// Base trait for implementation registries.
///
/// Each pluggable module (storage backend, notifier transport) provides a
/// Registry struct implementing this trait so the service binary can wire
/// implementations from configuration by name.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// Matches the key in the TOML configuration, for example "memory" for
	/// storage.implementations.memory or "webhook" for
	/// notify.implementations.webhook.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
