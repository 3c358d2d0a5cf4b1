pub mod client;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    make_request_span, metrics_middleware, request_id_middleware, security_headers_middleware,
    REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AssistantConfig, CorsConfig};
use crate::services::AssistantStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AssistantConfig,
    pub store: Arc<dyn AssistantStore>,
}

impl AppState {
    pub fn new(config: AssistantConfig, store: Arc<dyn AssistantStore>) -> Self {
        Self { config, store }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route(
            "/api/assistants",
            get(handlers::list_assistants).post(handlers::upsert_assistant),
        )
        // Literal segment wins over `:name`; an assistant named `health`
        // stays deletable and reachable for messages through these routes.
        .route(
            "/api/assistants/health",
            get(handlers::health_check).delete(handlers::delete_assistant_named_health),
        )
        .route(
            "/api/assistants/health/message",
            post(handlers::send_message_to_health),
        )
        .route(
            "/api/assistants/:name",
            get(handlers::get_assistant).delete(handlers::delete_assistant),
        )
        .route(
            "/api/assistants/:name/message",
            post(handlers::send_message),
        )
        .route("/metrics", get(handlers::metrics))
        // route_layer so the matched route template is available for labels
        .route_layer(from_fn(metrics_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    if cors.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    layer.allow_origin(origins)
}
