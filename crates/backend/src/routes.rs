use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::shared::app_state::AppState;
use crate::system::middleware::request_logger;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(handlers::a001_order::home))
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A001 ORDER
        // ========================================
        .route("/orders/", get(handlers::a001_order::list_orders))
        .route("/orders/:id/", get(handlers::a001_order::get_by_id))
        .route(
            "/create/",
            get(handlers::a001_order::create_form).post(handlers::a001_order::create),
        )
        .route("/delete/:id/", post(handlers::a001_order::delete))
        .route("/revenue/", get(handlers::a001_order::revenue))
        .route(
            "/update_status/:id/",
            get(handlers::a001_order::status_edit).post(handlers::a001_order::update_status_form),
        )
        .route(
            "/api/update_status/:id/",
            post(handlers::a001_order::update_status_json)
                .get(handlers::a001_order::update_status_invalid_request),
        )
        .with_state(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
}
