//! Order types for the tailor-shop backend.
//!
//! This module defines the order record, its production status and the
//! draft-attribute patch applied while an order is still unconfirmed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A client commission tracked through the production lifecycle.
///
/// An order is created as an unconfirmed draft. Draft attributes remain
/// editable until confirmation, which is irreversible and unlocks status
/// progression. The identifier is assigned once at creation and never
/// changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Human-readable identifier, `<PREFIX><DDMMYYYY><NNNN>`.
	pub id: String,
	/// Username of the client who placed the order.
	pub client: String,
	/// Current production status.
	pub status: OrderStatus,
	/// Whether the order has been confirmed by staff.
	pub is_confirmed: bool,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp of confirmation, set exactly once.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub confirmed_at: Option<DateTime<Utc>>,
	/// Timestamp of the first transition into Completed, set exactly once.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub completed_at: Option<DateTime<Utc>>,
	/// Free-form measurement snapshot captured with the order.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub measurements: Option<String>,
	/// Free-form comments from the client or staff.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comments: Option<String>,
	/// Date the client expects the garment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expected_date: Option<NaiveDate>,
	/// Occasion the garment is for (wedding, graduation, ...).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub event_type: Option<String>,
	/// Whether the client supplies their own material.
	#[serde(default)]
	pub material_provided: bool,
	/// Preferred fabric color.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub preferred_color: Option<String>,
}

impl Order {
	/// Creates a new unconfirmed order in Pending status from a draft.
	pub fn new(id: String, client: String, draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
		Self {
			id,
			client,
			status: OrderStatus::Pending,
			is_confirmed: false,
			created_at,
			confirmed_at: None,
			completed_at: None,
			measurements: draft.measurements,
			comments: draft.comments,
			expected_date: draft.expected_date,
			event_type: draft.event_type,
			material_provided: draft.material_provided.unwrap_or(false),
			preferred_color: draft.preferred_color,
		}
	}

	/// Applies a partial draft patch to this order's free-form attributes.
	///
	/// Guard checks (the order must be unconfirmed) are the state
	/// machine's responsibility, not this method's.
	pub fn apply_draft(&mut self, patch: OrderDraft) {
		if let Some(measurements) = patch.measurements {
			self.measurements = Some(measurements);
		}
		if let Some(comments) = patch.comments {
			self.comments = Some(comments);
		}
		if let Some(expected_date) = patch.expected_date {
			self.expected_date = Some(expected_date);
		}
		if let Some(event_type) = patch.event_type {
			self.event_type = Some(event_type);
		}
		if let Some(material_provided) = patch.material_provided {
			self.material_provided = material_provided;
		}
		if let Some(preferred_color) = patch.preferred_color {
			self.preferred_color = Some(preferred_color);
		}
	}
}

/// Partial update of an order's draft attributes.
///
/// Fields left as `None` are not touched. Also used as the free-form
/// payload at creation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
	pub measurements: Option<String>,
	pub comments: Option<String>,
	pub expected_date: Option<NaiveDate>,
	pub event_type: Option<String>,
	pub material_provided: Option<bool>,
	pub preferred_color: Option<String>,
}

/// Production-stage label for an order.
///
/// Wire spellings match what the frontend has always sent: `Pending` and
/// `Completed` are capitalized, `in_progress` and `fitting` are not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
	/// Order is queued, production has not started.
	Pending,
	/// Garment is being cut and stitched.
	#[serde(rename = "in_progress")]
	InProgress,
	/// Garment is ready for a fitting session.
	#[serde(rename = "fitting")]
	Fitting,
	/// Garment is finished and ready for collection.
	Completed,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "Pending"),
			OrderStatus::InProgress => write!(f, "in_progress"),
			OrderStatus::Fitting => write!(f, "fitting"),
			OrderStatus::Completed => write!(f, "Completed"),
		}
	}
}
