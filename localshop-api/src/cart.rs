use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use localshop_core::{ProductId, UserId};
use localshop_order::CartView;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    /// Zero or less removes the line
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct ClearCartResponse {
    pub removed_lines: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart/{user_id}", get(get_cart).delete(clear_cart))
        .route("/api/cart/{user_id}/items", post(add_item))
        .route(
            "/api/cart/{user_id}/items/{product_id}",
            put(update_item).delete(remove_item),
        )
}

async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(state.orders.get_cart(user_id).await?))
}

/// POST /api/cart/{user_id}/items
async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartView>, AppError> {
    let cart = state
        .orders
        .add_to_cart(user_id, req.product_id, req.quantity)
        .await?;
    Ok(Json(cart))
}

async fn update_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, AppError> {
    let cart = state
        .orders
        .update_cart_item(user_id, product_id, req.quantity)
        .await?;
    Ok(Json(cart))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(state.orders.remove_from_cart(user_id, product_id).await?))
}

async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ClearCartResponse>, AppError> {
    let removed_lines = state.orders.clear_cart(user_id).await?;
    Ok(Json(ClearCartResponse { removed_lines }))
}
