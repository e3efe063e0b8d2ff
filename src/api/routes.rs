use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState, websocket::websocket_handler};

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Order endpoints
        .route("/api/orders/execute", post(handlers::execute_order))
        .route("/api/orders/metrics", get(handlers::get_metrics))
        .route("/api/orders/ws/:order_id", get(websocket_handler))
        .route("/api/orders/:order_id", get(handlers::get_order))
        // System endpoints
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(cors)
}
