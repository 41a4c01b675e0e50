//! Order lifecycle endpoints.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
};
use tailor_types::{
	ApiError, CreateOrderRequest, MessageResponse, Order, OrderDraft, OrdersQuery,
	UpdateStatusRequest,
};

use crate::server::AppState;

/// Handles POST /api/orders.
pub async fn create(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	let order = state
		.engine
		.create_order(&request.username, request.draft)
		.await?;
	Ok((StatusCode::CREATED, Json(order)))
}

/// Handles GET /api/orders, optionally filtered by username.
pub async fn list(
	State(state): State<AppState>,
	Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
	Ok(Json(state.engine.list_orders(query.username.as_deref()).await?))
}

/// Handles GET /api/orders/{id}.
pub async fn get(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
	Ok(Json(state.engine.get_order(&id).await?))
}

/// Handles PUT /api/orders/{id}, patching draft attributes.
pub async fn update(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(patch): Json<OrderDraft>,
) -> Result<Json<Order>, ApiError> {
	Ok(Json(state.engine.update_order(&id, patch).await?))
}

/// Handles POST /api/orders/{id}/confirm.
pub async fn confirm(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
	state.engine.confirm_order(&id).await?;
	Ok(Json(MessageResponse::new("Order confirmed successfully.")))
}

/// Handles PUT /api/orders/{id}/status.
pub async fn set_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
	state.engine.set_order_status(&id, request.status).await?;
	Ok(Json(MessageResponse::new(
		"Order status updated successfully.",
	)))
}

/// Handles DELETE /api/orders/{id}.
pub async fn delete(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
	state.engine.delete_order(&id).await?;
	Ok(Json(MessageResponse::new("Order deleted successfully.")))
}
