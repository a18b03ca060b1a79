use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use localshop_core::{OrderId, UserId};
use localshop_order::{Invoice, PaymentConfirmation, PlacedOrder, Quote, Receipt};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub shipping_address: String,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub order_id: OrderId,
    pub user_id: UserId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkout/quote", post(quote))
        .route("/api/checkout/create", post(create_order))
        .route("/api/checkout/pay", post(pay))
        .route("/api/checkout/invoice/{id}", get(invoice))
        .route("/api/checkout/receipt/{id}", get(receipt))
}

async fn quote(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<Quote>, AppError> {
    let quote = state.orders.quote(req.user_id, &req.shipping_address).await?;
    Ok(Json(quote))
}

/// POST /api/checkout/create
async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>), AppError> {
    let placed = state
        .orders
        .create_order(req.user_id, &req.shipping_address)
        .await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// POST /api/checkout/pay
async fn pay(
    State(state): State<AppState>,
    Json(req): Json<PayRequest>,
) -> Result<Json<PaymentConfirmation>, AppError> {
    let confirmation = state.orders.pay(req.order_id, req.user_id).await?;
    Ok(Json(confirmation))
}

async fn invoice(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(state.orders.invoice(order_id).await?))
}

async fn receipt(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(state.orders.receipt(order_id).await?))
}
