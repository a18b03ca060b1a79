use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use localshop_core::{Order, OrderId, OrderStatus, OrderWithItems, UserId};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Parsed case-insensitively, e.g. `"packing"`
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/user/{user_id}", get(list_user_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", put(update_status))
}

/// GET /api/orders
/// Every order, newest first
async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_orders().await?))
}

async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_orders_for_user(user_id).await?))
}

async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderWithItems>, AppError> {
    Ok(Json(state.orders.get_order(order_id).await?))
}

/// PUT /api/orders/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let status: OrderStatus = req.status.parse()?;
    let order = state.orders.update_status(order_id, status).await?;
    Ok(Json(order))
}
