use crate::dtos::{HealthDownResponse, HealthResponse};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::collections::BTreeMap;

/// Registry operations advertised by the health endpoint.
const ENDPOINTS: [(&str, &str); 5] = [
    ("createAssistant", "POST /api/assistants"),
    ("sendMessage", "POST /api/assistants/{name}/message"),
    ("getAllAssistants", "GET /api/assistants"),
    ("getAssistant", "GET /api/assistants/{name}"),
    ("deleteAssistant", "DELETE /api/assistants/{name}"),
];

pub async fn health_check(State(state): State<AppState>) -> Response {
    let total = state
        .store
        .health_check()
        .and_then(|_| state.store.count());

    match total {
        Ok(total_assistants) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "UP".to_string(),
                service: state.config.service_name.clone(),
                version: state.config.service_version.clone(),
                total_assistants,
                timestamp: Utc::now(),
                endpoints: ENDPOINTS
                    .iter()
                    .map(|(op, route)| (op.to_string(), route.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Assistant store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthDownResponse {
                    status: "DOWN".to_string(),
                    error: "Health check failed".to_string(),
                    details: e.to_string(),
                    timestamp: Utc::now(),
                }),
            )
                .into_response()
        }
    }
}
