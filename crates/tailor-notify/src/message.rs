//! Outbound message builders.
//!
//! One builder per notification-worthy event. Bodies are plain text; the
//! transport decides how to present them. Re-setting an order to Pending
//! has no message defined, so [`status_changed`] returns None for it.

use tailor_types::{NotificationChannel, Order, OrderStatus, OutboundMessage};

/// Builds the confirmation message for a freshly confirmed order.
pub fn order_confirmed(shop_name: &str, order: &Order, client_name: &str) -> (String, String) {
	let subject = format!("Order Confirmed - {}", order.id);
	let body = format!(
		"Hello {},\n\n\
		Your order {} has been confirmed by our team. Our tailors have begun \
		working on your garment{} and we will keep you informed at every stage \
		of production. You can log in to your dashboard at any time to track \
		progress.\n\n\
		Thank you for your patronage.\n{}",
		client_name,
		order.id,
		order
			.event_type
			.as_deref()
			.map(|e| format!(" for your {}", e))
			.unwrap_or_default(),
		shop_name,
	);
	(subject, body)
}

/// Builds the status-update message for a confirmed order, if the target
/// status has one defined.
pub fn status_changed(
	shop_name: &str,
	order: &Order,
	client_name: &str,
	status: OrderStatus,
) -> Option<(String, String)> {
	let (subject, detail) = match status {
		OrderStatus::InProgress => (
			format!("Production Update - Order {} In Progress", order.id),
			"Your garment has entered the production phase. This stage involves \
			cutting, stitching and assembly according to your measurements. We \
			will notify you when your order moves to the next stage.",
		),
		OrderStatus::Fitting => (
			format!("Ready for Fitting - Order {}", order.id),
			"Your garment is ready for a fitting session. Please contact us to \
			schedule a convenient time; minor adjustments are part of our \
			commitment to a perfect fit.",
		),
		OrderStatus::Completed => (
			format!("Order Complete - {} Ready for Collection", order.id),
			"Your order is complete and ready for collection at our office \
			during business hours. Please bring your order confirmation for a \
			smooth collection process.",
		),
		// No message is defined for re-setting Pending.
		OrderStatus::Pending => return None,
	};

	let body = format!(
		"Hello {},\n\n{}\n\nThank you for choosing {}.",
		client_name, detail, shop_name
	);
	Some((subject, body))
}

/// Builds the password-reset email carrying the reset link.
pub fn password_reset(shop_name: &str, firstname: &str, reset_link: &str) -> (String, String) {
	let subject = format!("Reset your {} password", shop_name);
	let body = format!(
		"Hello {},\n\n\
		We received a request to reset the password for your account. Open the \
		link below to choose a new password. The link expires in 1 hour.\n\n\
		{}\n\n\
		If you did not request this, you can safely ignore this email.\n\n\
		Thank you,\n{}",
		firstname, reset_link, shop_name,
	);
	(subject, body)
}

/// Wraps a (subject, body) pair into an [`OutboundMessage`] for a channel.
pub fn for_channel(
	channel: NotificationChannel,
	recipient: &str,
	order_id: Option<&str>,
	content: (String, String),
) -> OutboundMessage {
	OutboundMessage {
		channel,
		recipient: recipient.to_string(),
		subject: content.0,
		body: content.1,
		order_id: order_id.map(str::to_string),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use tailor_types::OrderDraft;

	fn order() -> Order {
		Order::new(
			"JFK010520240001".into(),
			"ada".into(),
			OrderDraft::default(),
			Utc::now(),
		)
	}

	#[test]
	fn pending_has_no_status_message() {
		assert!(status_changed("JFK Tailor Shop", &order(), "Ada Lovelace", OrderStatus::Pending)
			.is_none());
	}

	#[test]
	fn status_subjects_carry_the_order_id() {
		for status in [
			OrderStatus::InProgress,
			OrderStatus::Fitting,
			OrderStatus::Completed,
		] {
			let (subject, _) =
				status_changed("JFK Tailor Shop", &order(), "Ada Lovelace", status).unwrap();
			assert!(subject.contains("JFK010520240001"), "{}", subject);
		}
	}
}
