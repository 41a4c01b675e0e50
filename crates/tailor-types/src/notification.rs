//! Notification channel and delivery record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery channel for an outbound notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
	Email,
	Sms,
}

impl fmt::Display for NotificationChannel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NotificationChannel::Email => write!(f, "email"),
			NotificationChannel::Sms => write!(f, "sms"),
		}
	}
}

impl FromStr for NotificationChannel {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"email" => Ok(Self::Email),
			"sms" => Ok(Self::Sms),
			_ => Err(()),
		}
	}
}

/// A message handed to a notifier implementation for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
	/// Which channel should carry the message.
	pub channel: NotificationChannel,
	/// Email address or phone number.
	pub recipient: String,
	/// Subject line; ignored by SMS transports.
	pub subject: String,
	/// Message body, plain text.
	pub body: String,
	/// Order the message refers to, when there is one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_id: Option<String>,
}

/// Audit record written after every dispatch attempt.
///
/// Recording is itself best-effort; a failed write is logged and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
	pub order_id: Option<String>,
	pub channel: NotificationChannel,
	pub recipient: String,
	pub subject: String,
	/// "delivered" or "failed: <reason>".
	pub outcome: String,
	pub timestamp: DateTime<Utc>,
}
