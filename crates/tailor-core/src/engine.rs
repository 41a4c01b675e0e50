//! Engine orchestration.
//!
//! [`TailorEngine`] is the facade the HTTP layer calls into. It owns the
//! order state machine, the client/measurement registries and the
//! password-reset flow, and runs the notification loop that turns
//! post-commit order events into outbound email and SMS messages.
//!
//! Notification delivery is fire-and-forget everywhere except the
//! password-reset request, where the email is the whole point of the
//! operation and a failed handoff is reported to the caller.

use std::sync::Arc;
use tailor_config::Config;
use tailor_notify::{message, NotifyService};
use tailor_storage::StorageService;
use tailor_types::{
	Biodata, ClientProfile, ClientRegistration, ClientUpdate, Measurement, NotificationChannel,
	Order, OrderDraft, OrderEvent, OrderStatus, TailorEvent,
};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use crate::{
	clients::ClientRegistry, event_bus::EventBus, idgen::IdGenerator, records::RecordRegistry,
	reset::{self, PasswordResetFlow}, state::OrderStateMachine, EngineError,
};

/// Central coordinator for all business operations.
pub struct TailorEngine {
	shop_name: String,
	reset_url: String,
	notify: Arc<NotifyService>,
	state: OrderStateMachine,
	clients: ClientRegistry,
	records: RecordRegistry,
	reset: PasswordResetFlow,
	event_bus: EventBus,
}

impl TailorEngine {
	/// Wires the engine from validated configuration and the storage and
	/// notification services built from it.
	pub fn new(config: &Config, storage: Arc<StorageService>, notify: Arc<NotifyService>) -> Self {
		let idgen = IdGenerator::new(config.shop.order_prefix.clone());
		Self {
			shop_name: config.shop.name.clone(),
			reset_url: config.shop.frontend_reset_url.clone(),
			notify,
			state: OrderStateMachine::new(storage.clone(), idgen),
			clients: ClientRegistry::new(storage.clone()),
			records: RecordRegistry::new(storage.clone()),
			reset: PasswordResetFlow::new(storage),
			event_bus: EventBus::default(),
		}
	}

	/// Subscribes to the engine's post-commit event stream.
	pub fn subscribe(&self) -> broadcast::Receiver<TailorEvent> {
		self.event_bus.subscribe()
	}

	// --- clients ---

	#[instrument(skip(self, registration), fields(username = %registration.username))]
	pub async fn register_client(
		&self,
		registration: ClientRegistration,
	) -> Result<ClientProfile, EngineError> {
		self.clients.register(registration).await
	}

	#[instrument(skip(self))]
	pub async fn get_client(&self, username: &str) -> Result<ClientProfile, EngineError> {
		self.clients.get(username).await
	}

	#[instrument(skip(self))]
	pub async fn list_clients(&self) -> Result<Vec<ClientProfile>, EngineError> {
		self.clients.list().await
	}

	#[instrument(skip(self, patch))]
	pub async fn update_client(
		&self,
		username: &str,
		patch: ClientUpdate,
	) -> Result<ClientProfile, EngineError> {
		self.clients.update(username, patch).await
	}

	#[instrument(skip(self))]
	pub async fn delete_client(&self, username: &str) -> Result<(), EngineError> {
		self.clients.delete(username).await
	}

	/// Checks credentials and returns the client's role.
	#[instrument(skip(self, password))]
	pub async fn verify_credentials(
		&self,
		username: &str,
		password: &str,
	) -> Result<String, EngineError> {
		self.clients.verify_credentials(username, password).await
	}

	// --- measurements and biodata ---

	#[instrument(skip(self, measurement), fields(username = %measurement.username))]
	pub async fn upsert_measurement(
		&self,
		measurement: Measurement,
	) -> Result<Measurement, EngineError> {
		self.records
			.upsert_measurement(&self.clients, measurement)
			.await
	}

	#[instrument(skip(self))]
	pub async fn get_measurement(&self, username: &str) -> Result<Measurement, EngineError> {
		self.records.get_measurement(username).await
	}

	#[instrument(skip(self, biodata), fields(username = %biodata.username))]
	pub async fn put_biodata(&self, biodata: Biodata) -> Result<Biodata, EngineError> {
		self.records.put_biodata(&self.clients, biodata).await
	}

	#[instrument(skip(self))]
	pub async fn get_biodata(&self, username: &str) -> Result<Biodata, EngineError> {
		self.records.get_biodata(username).await
	}

	// --- orders ---

	/// Creates a draft order for a registered client.
	#[instrument(skip(self, draft))]
	pub async fn create_order(
		&self,
		username: &str,
		draft: OrderDraft,
	) -> Result<Order, EngineError> {
		self.clients.get(username).await?;
		self.state.create(username, draft).await
	}

	#[instrument(skip(self))]
	pub async fn get_order(&self, id: &str) -> Result<Order, EngineError> {
		self.state.get(id).await
	}

	#[instrument(skip(self))]
	pub async fn list_orders(&self, client: Option<&str>) -> Result<Vec<Order>, EngineError> {
		self.state.list(client).await
	}

	/// Confirms an order and publishes the matching event.
	///
	/// The event goes out only after the confirmation is persisted, so a
	/// notification can never precede (or outlive a failure of) the state
	/// change it describes.
	#[instrument(skip(self))]
	pub async fn confirm_order(&self, id: &str) -> Result<Order, EngineError> {
		let order = self.state.confirm(id).await?;
		self.event_bus.publish(TailorEvent::Order(OrderEvent::Confirmed {
			order: order.clone(),
		}));
		Ok(order)
	}

	/// Moves a confirmed order to a new status and publishes the event.
	///
	/// Pending has no notification defined, so re-setting it emits no
	/// event.
	#[instrument(skip(self))]
	pub async fn set_order_status(
		&self,
		id: &str,
		status: OrderStatus,
	) -> Result<Order, EngineError> {
		let order = self.state.set_status(id, status).await?;
		if status != OrderStatus::Pending {
			self.event_bus
				.publish(TailorEvent::Order(OrderEvent::StatusChanged {
					order: order.clone(),
					status,
				}));
		}
		Ok(order)
	}

	#[instrument(skip(self, patch))]
	pub async fn update_order(&self, id: &str, patch: OrderDraft) -> Result<Order, EngineError> {
		self.state.update_draft(id, patch).await
	}

	#[instrument(skip(self))]
	pub async fn delete_order(&self, id: &str) -> Result<(), EngineError> {
		self.state.remove(id).await
	}

	// --- password reset ---

	/// Issues a reset token and emails the reset link to the client.
	///
	/// The caller identifies themselves by email address, resolved to a
	/// profile through the email index. Unlike order notifications this
	/// email is the operation itself, so a transport failure surfaces to
	/// the caller.
	#[instrument(skip(self))]
	pub async fn request_password_reset(&self, email: &str) -> Result<(), EngineError> {
		let profile = self.clients.get_by_email(email).await?;

		let token = self.reset.issue(&profile.username).await?;
		let link = format!("{}/{}", self.reset_url.trim_end_matches('/'), token);
		let content = message::password_reset(&self.shop_name, &profile.firstname, &link);
		let outbound =
			message::for_channel(NotificationChannel::Email, &profile.email, None, content);

		self.notify
			.dispatch(&outbound)
			.await
			.map_err(|e| EngineError::Notification(e.to_string()))
	}

	/// Redeems a reset token and sets the new password.
	#[instrument(skip_all)]
	pub async fn confirm_password_reset(
		&self,
		token: &str,
		new_password: &str,
		confirm_password: &str,
	) -> Result<(), EngineError> {
		if new_password != confirm_password {
			return Err(EngineError::Validation(
				"Passwords do not match".to_string(),
			));
		}
		reset::validate_password(new_password)?;
		let username = self.reset.consume(token).await?;
		self.clients.set_password(&username, new_password).await
	}

	// --- notification loop ---

	/// Consumes the event stream and dispatches notifications.
	///
	/// Runs until the caller drops the engine; intended to be driven
	/// inside a `tokio::select!` alongside the HTTP server.
	pub async fn run(&self) {
		let mut events = self.subscribe();
		loop {
			match events.recv().await {
				Ok(TailorEvent::Order(event)) => self.notify_order(event).await,
				Err(broadcast::error::RecvError::Lagged(missed)) => {
					warn!(missed, "notification loop lagged, events dropped");
				}
				Err(broadcast::error::RecvError::Closed) => break,
			}
		}
	}

	async fn notify_order(&self, event: OrderEvent) {
		let (order, content) = match &event {
			OrderEvent::Confirmed { order } => {
				let profile = match self.clients.get(&order.client).await {
					Ok(profile) => profile,
					Err(e) => {
						warn!(order_id = %order.id, error = %e, "client lookup failed, notification skipped");
						return;
					}
				};
				let content =
					message::order_confirmed(&self.shop_name, order, &profile.display_name());
				(order.clone(), (profile, content))
			}
			OrderEvent::StatusChanged { order, status } => {
				let profile = match self.clients.get(&order.client).await {
					Ok(profile) => profile,
					Err(e) => {
						warn!(order_id = %order.id, error = %e, "client lookup failed, notification skipped");
						return;
					}
				};
				match message::status_changed(
					&self.shop_name,
					order,
					&profile.display_name(),
					*status,
				) {
					Some(content) => (order.clone(), (profile, content)),
					None => return,
				}
			}
		};
		let (profile, content) = content;

		for (channel, recipient) in [
			(NotificationChannel::Email, profile.email.as_str()),
			(NotificationChannel::Sms, profile.phonenumber.as_str()),
		] {
			if !self.notify.channel_enabled(channel) {
				debug!(order_id = %order.id, channel = %channel, "channel disabled, skipping");
				continue;
			}
			let outbound =
				message::for_channel(channel, recipient, Some(&order.id), content.clone());
			if let Err(e) = self.notify.dispatch(&outbound).await {
				warn!(order_id = %order.id, channel = %channel, error = %e, "notification delivery failed");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use tailor_notify::{implementations::log, NotifierInterface};
	use tailor_storage::implementations::memory::MemoryStorage;

	fn config() -> Config {
		Config::from_toml_str(
			r#"
			[shop]
			name = "JFK Tailor Shop"

			[storage]
			primary = "memory"

			[storage.implementations.memory]

			[notify.channels]
			email = "log"

			[notify.implementations.log]
		"#,
		)
		.unwrap()
	}

	fn engine_with_channels(channels: &[NotificationChannel]) -> TailorEngine {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let mut transports: HashMap<NotificationChannel, Box<dyn NotifierInterface>> =
			HashMap::new();
		for channel in channels {
			transports.insert(
				*channel,
				log::create_notifier(&toml::Value::Boolean(true)).unwrap(),
			);
		}
		let notify = Arc::new(NotifyService::new(transports, storage.clone()));
		TailorEngine::new(&config(), storage, notify)
	}

	fn engine() -> TailorEngine {
		engine_with_channels(&[NotificationChannel::Email])
	}

	async fn register_ada(engine: &TailorEngine) {
		engine
			.register_client(ClientRegistration {
				username: "ada".into(),
				password: "Str0ng!Pass".into(),
				role: "client".into(),
				firstname: "Ada".into(),
				lastname: "Lovelace".into(),
				phonenumber: "0700000000".into(),
				email: "ada@example.com".into(),
				gender: None,
				birthdate: None,
				bio: None,
			})
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn orders_require_a_registered_client() {
		let engine = engine();
		let err = engine
			.create_order("ghost", OrderDraft::default())
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(_)));
	}

	#[tokio::test]
	async fn confirm_publishes_after_persisting() {
		let engine = engine();
		register_ada(&engine).await;
		let order = engine
			.create_order("ada", OrderDraft::default())
			.await
			.unwrap();

		let mut events = engine.subscribe();
		engine.confirm_order(&order.id).await.unwrap();

		let event = events.recv().await.unwrap();
		let TailorEvent::Order(OrderEvent::Confirmed { order: published }) = event else {
			panic!("expected a confirmation event");
		};
		assert_eq!(published.id, order.id);
		assert!(published.is_confirmed);
	}

	#[tokio::test]
	async fn pending_transition_emits_no_event() {
		let engine = engine();
		register_ada(&engine).await;
		let order = engine
			.create_order("ada", OrderDraft::default())
			.await
			.unwrap();
		engine.confirm_order(&order.id).await.unwrap();

		let mut events = engine.subscribe();
		engine
			.set_order_status(&order.id, OrderStatus::Pending)
			.await
			.unwrap();
		engine
			.set_order_status(&order.id, OrderStatus::Fitting)
			.await
			.unwrap();

		// Only the fitting transition reaches subscribers.
		let event = events.recv().await.unwrap();
		assert!(matches!(
			event,
			TailorEvent::Order(OrderEvent::StatusChanged {
				status: OrderStatus::Fitting,
				..
			})
		));
	}

	#[tokio::test]
	async fn reset_flow_changes_the_password() {
		let engine = engine();
		register_ada(&engine).await;

		engine.request_password_reset("ada@example.com").await.unwrap();

		// The clear token only exists inside the email, so redeem via the
		// flow directly for the round trip.
		let token = engine.reset.issue("ada").await.unwrap();
		engine
			.confirm_password_reset(&token, "N3w!Passw0rd", "N3w!Passw0rd")
			.await
			.unwrap();

		engine
			.verify_credentials("ada", "N3w!Passw0rd")
			.await
			.unwrap();
		let err = engine
			.verify_credentials("ada", "Str0ng!Pass")
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Validation(_)));
	}

	#[tokio::test]
	async fn reset_rejects_mismatched_passwords() {
		let engine = engine();
		register_ada(&engine).await;
		let token = engine.reset.issue("ada").await.unwrap();

		let err = engine
			.confirm_password_reset(&token, "N3w!Passw0rd", "Other!Pass1")
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Validation(msg) if msg == "Passwords do not match"));
	}

	#[tokio::test]
	async fn reset_request_surfaces_transport_failure() {
		// No email transport configured at all.
		let engine = engine_with_channels(&[]);
		register_ada(&engine).await;

		let err = engine
			.request_password_reset("ada@example.com")
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::Notification(_)));
	}

	#[tokio::test]
	async fn reset_request_resolves_the_client_by_email() {
		let engine = engine();
		register_ada(&engine).await;

		// The email address is what a locked-out client still has.
		engine.request_password_reset("ada@example.com").await.unwrap();

		let err = engine
			.request_password_reset("ghost@example.com")
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(msg) if msg == "Email not found"));
	}
}
