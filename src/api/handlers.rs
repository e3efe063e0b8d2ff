//! HTTP handlers for order intake, lookup, and queue metrics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use uuid::Uuid;

use super::state::AppState;
use super::types::{
    ErrorResponse, ExecuteOrderResponse, HealthResponse, MetricsResponse, OrderResponse,
};
use crate::domain::OrderRequest;
use crate::error::EngineError;

fn internal_error(e: &EngineError) -> Response {
    error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal server error")),
    )
        .into_response()
}

pub async fn execute_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Response {
    match state.service.submit(request).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(ExecuteOrderResponse::accepted(order.id)),
        )
            .into_response(),
        Err(e) if e.is_client_error() => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
        Err(e) => internal_error(&e),
    }
}

pub async fn get_order(State(state): State<AppState>, Path(order_id): Path<Uuid>) -> Response {
    match state.service.get(order_id).await {
        Ok(Some(order)) => (
            StatusCode::OK,
            Json(OrderResponse {
                success: true,
                order,
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Order not found")),
        )
            .into_response(),
        Err(e) => internal_error(&e),
    }
}

pub async fn get_metrics(State(state): State<AppState>) -> Response {
    let metrics = state.queue.counts().await;
    (
        StatusCode::OK,
        Json(MetricsResponse {
            success: true,
            metrics,
        }),
    )
        .into_response()
}

pub async fn health() -> Response {
    (StatusCode::OK, Json(HealthResponse::ok())).into_response()
}
