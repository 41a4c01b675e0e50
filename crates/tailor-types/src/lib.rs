//! Common types module for the tailor-shop backend.
//!
//! This module defines the core data types and structures shared by all
//! workspace crates: domain records, events, API request/response shapes,
//! storage namespaces and the configuration validation framework.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Client profile and biodata types.
pub mod client;
/// Event types for post-commit notification dispatch.
pub mod events;
/// Garment measurement types.
pub mod measurement;
/// Notification channel and delivery record types.
pub mod notification;
/// Order and order status types.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Password-reset token types.
pub mod reset;
/// Storage namespace types.
pub mod storage;
/// Configuration validation types.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use client::*;
pub use events::*;
pub use measurement::*;
pub use notification::*;
pub use order::*;
pub use registry::*;
pub use reset::*;
pub use storage::*;
pub use validation::*;
