//! HTTP server for the tailor-shop API.
//!
//! Builds the axum router over the engine facade and serves it on the
//! configured address. All business rules live in the engine; handlers
//! only translate between HTTP shapes and engine calls.

use axum::{
	routing::{get, post, put},
	Router,
};
use tailor_config::ApiConfig;
use tailor_core::TailorEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine for processing requests.
	pub engine: Arc<TailorEngine>,
}

/// Builds the application router.
pub fn build_router(engine: Arc<TailorEngine>) -> Router {
	let state = AppState { engine };

	Router::new()
		.nest(
			"/api",
			Router::new()
				.route(
					"/clients",
					post(handlers::clients::register).get(handlers::clients::list),
				)
				.route(
					"/clients/{username}",
					get(handlers::clients::get)
						.put(handlers::clients::update)
						.delete(handlers::clients::delete),
				)
				.route("/clients/verify", post(handlers::clients::verify))
				.route("/password/forgot", post(handlers::password::forgot))
				.route("/password/reset", post(handlers::password::reset))
				.route("/measurements", post(handlers::records::upsert_measurement))
				.route(
					"/measurements/{username}",
					get(handlers::records::get_measurement),
				)
				.route("/biodata", post(handlers::records::put_biodata))
				.route("/biodata/{username}", get(handlers::records::get_biodata))
				.route(
					"/orders",
					post(handlers::orders::create).get(handlers::orders::list),
				)
				.route(
					"/orders/{id}",
					get(handlers::orders::get)
						.put(handlers::orders::update)
						.delete(handlers::orders::delete),
				)
				.route("/orders/{id}/confirm", post(handlers::orders::confirm))
				.route("/orders/{id}/status", put(handlers::orders::set_status)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<TailorEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::{header, Method, Request, StatusCode};
	use serde_json::{json, Value};
	use std::collections::HashMap;
	use tailor_config::Config;
	use tailor_notify::{implementations::log, NotifierInterface, NotifyService};
	use tailor_storage::{implementations::memory::MemoryStorage, StorageService};
	use tailor_types::NotificationChannel;
	use tower::ServiceExt;

	fn test_router() -> Router {
		let config = Config::from_toml_str(
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
		.unwrap();

		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let mut transports: HashMap<NotificationChannel, Box<dyn NotifierInterface>> =
			HashMap::new();
		transports.insert(
			NotificationChannel::Email,
			log::create_notifier(&toml::Value::Boolean(true)).unwrap(),
		);
		let notify = Arc::new(NotifyService::new(transports, storage.clone()));
		build_router(Arc::new(TailorEngine::new(&config, storage, notify)))
	}

	fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
		Request::builder()
			.method(method)
			.uri(uri)
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	async fn body_json(response: axum::response::Response) -> Value {
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	fn registration_body() -> Value {
		json!({
			"username": "ada",
			"password": "Str0ng!Pass",
			"role": "client",
			"firstname": "Ada",
			"lastname": "Lovelace",
			"phonenumber": "0700000000",
			"email": "ada@example.com"
		})
	}

	#[tokio::test]
	async fn register_then_create_and_confirm_order() {
		let app = test_router();

		let response = app
			.clone()
			.oneshot(json_request(Method::POST, "/api/clients", registration_body()))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CREATED);
		let profile = body_json(response).await;
		// The password hash never leaves the server.
		assert!(profile.get("password").is_none());

		let response = app
			.clone()
			.oneshot(json_request(
				Method::POST,
				"/api/orders",
				json!({ "username": "ada", "comments": "two-piece suit" }),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CREATED);
		let order = body_json(response).await;
		let id = order["id"].as_str().unwrap().to_string();
		assert_eq!(order["status"], "Pending");

		let confirm_uri = format!("/api/orders/{}/confirm", id);
		let response = app
			.clone()
			.oneshot(json_request(Method::POST, &confirm_uri, json!({})))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);

		// Confirming twice is a conflict, not a repeat success.
		let response = app
			.clone()
			.oneshot(json_request(Method::POST, &confirm_uri, json!({})))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CONFLICT);
	}

	#[tokio::test]
	async fn status_update_before_confirmation_is_a_conflict() {
		let app = test_router();
		app.clone()
			.oneshot(json_request(Method::POST, "/api/clients", registration_body()))
			.await
			.unwrap();
		let response = app
			.clone()
			.oneshot(json_request(
				Method::POST,
				"/api/orders",
				json!({ "username": "ada" }),
			))
			.await
			.unwrap();
		let order = body_json(response).await;
		let id = order["id"].as_str().unwrap();

		let response = app
			.clone()
			.oneshot(json_request(
				Method::PUT,
				&format!("/api/orders/{}/status", id),
				json!({ "status": "in_progress" }),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CONFLICT);
		let body = body_json(response).await;
		assert_eq!(body["message"], "Cannot modify order unless it is confirmed.");
	}

	#[tokio::test]
	async fn missing_order_maps_to_not_found() {
		let app = test_router();
		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/orders/JFK010120250001")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		let body = body_json(response).await;
		assert_eq!(body["error"], "not_found");
		assert_eq!(body["message"], "Order not found.");
	}

	#[tokio::test]
	async fn verify_rejects_a_wrong_password() {
		let app = test_router();
		app.clone()
			.oneshot(json_request(Method::POST, "/api/clients", registration_body()))
			.await
			.unwrap();

		let response = app
			.clone()
			.oneshot(json_request(
				Method::POST,
				"/api/clients/verify",
				json!({ "username": "ada", "password": "Str0ng!Pass" }),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert_eq!(body["role"], "client");

		let response = app
			.oneshot(json_request(
				Method::POST,
				"/api/clients/verify",
				json!({ "username": "ada", "password": "Wr0ng!Pass" }),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}
}
