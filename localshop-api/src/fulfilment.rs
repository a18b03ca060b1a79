use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use localshop_core::{OrderId, OrderWithItems};
use localshop_order::{FulfilmentEntry, PackingSlip};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/fulfilment", get(awaiting_fulfilment))
        .route("/api/fulfilment/{id}/slip", get(packing_slip))
        .route("/api/fulfilment/{id}/ship", post(ship))
}

/// GET /api/fulfilment
/// Paid and packing orders, oldest first
async fn awaiting_fulfilment(
    State(state): State<AppState>,
) -> Result<Json<Vec<FulfilmentEntry>>, AppError> {
    Ok(Json(state.orders.awaiting_fulfilment().await?))
}

async fn packing_slip(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<PackingSlip>, AppError> {
    Ok(Json(state.orders.packing_slip(order_id).await?))
}

async fn ship(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderWithItems>, AppError> {
    Ok(Json(state.orders.ship(order_id).await?))
}
