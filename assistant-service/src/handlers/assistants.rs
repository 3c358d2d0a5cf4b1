use crate::dtos::{
    DeleteAssistantResponse, MessageRequest, MessageResponse, UpsertAssistantRequest,
    UpsertAssistantResponse,
};
use crate::services::metrics;
use crate::utils::ValidatedJson;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use service_core::middleware::RequestId;

const RESOURCE: &str = "Assistant";
const HEALTH_SEGMENT: &str = "health";

/// `POST /api/assistants` - create or update by name.
///
/// The store decides created-vs-updated inside its own critical section, so
/// the reported outcome is exact even under concurrent upserts of one name.
pub async fn upsert_assistant(
    State(state): State<AppState>,
    request_id: RequestId,
    ValidatedJson(req): ValidatedJson<UpsertAssistantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let upserted = state
        .store
        .upsert(&req.name, &req.response_text)
        .map_err(|e| {
            tracing::error!(
                request_id = %request_id,
                assistant_name = %req.name,
                error = %e,
                "Failed to upsert assistant"
            );
            e.into_app_error("Error creating/updating assistant")
        })?;

    let operation = upserted.outcome.as_str();
    metrics::record_upsert(upserted.outcome);

    tracing::info!(
        request_id = %request_id,
        assistant_name = %req.name,
        assistant_id = %upserted.assistant.id,
        operation,
        "Assistant saved"
    );

    let status = if upserted.was_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(UpsertAssistantResponse {
            success: true,
            message: format!("Assistant '{}' {} successfully", req.name, operation),
            operation: operation.to_string(),
            assistant: upserted.assistant,
        }),
    ))
}

/// `POST /api/assistants/{name}/message` - reply with the stored text.
pub async fn send_message(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(name): Path<String>,
    ValidatedJson(req): ValidatedJson<MessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state
        .store
        .find_by_name(&name)
        .map_err(|e| e.into_app_error("Error processing message"))?
        .ok_or_else(|| {
            metrics::record_message("unknown_assistant");
            tracing::info!(
                request_id = %request_id,
                assistant_name = %name,
                "Message sent to unknown assistant"
            );
            AppError::not_found(RESOURCE, name.clone())
        })?;

    metrics::record_message("delivered");
    tracing::debug!(
        request_id = %request_id,
        assistant_name = %name,
        message_chars = req.message.chars().count(),
        "Message answered"
    );

    Ok(Json(MessageResponse::new(assistant, req.message)))
}

/// `GET /api/assistants` - newest first; an empty registry is not an error.
pub async fn list_assistants(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let assistants = state
        .store
        .list_all()
        .map_err(|e| e.into_app_error("Error listing assistants"))?;

    Ok(Json(assistants))
}

pub async fn get_assistant(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state
        .store
        .find_by_name(&name)
        .map_err(|e| e.into_app_error("Error retrieving assistant"))?
        .ok_or_else(|| AppError::not_found(RESOURCE, name.clone()))?;

    Ok(Json(assistant))
}

/// `DELETE /api/assistants/{name}` - a second delete of the same name is a 404.
pub async fn delete_assistant(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    remove_assistant(&state, &request_id, name)
}

/// `DELETE /api/assistants/health`. The health route shadows `{name}` for
/// this one name, so it gets its own delete.
pub async fn delete_assistant_named_health(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<impl IntoResponse, AppError> {
    remove_assistant(&state, &request_id, HEALTH_SEGMENT.to_string())
}

/// `POST /api/assistants/health/message`, see [`delete_assistant_named_health`].
pub async fn send_message_to_health(
    state: State<AppState>,
    request_id: RequestId,
    body: ValidatedJson<MessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    send_message(state, request_id, Path(HEALTH_SEGMENT.to_string()), body).await
}

fn remove_assistant(
    state: &AppState,
    request_id: &RequestId,
    name: String,
) -> Result<Json<DeleteAssistantResponse>, AppError> {
    let removed = state
        .store
        .delete_by_name(&name)
        .map_err(|e| e.into_app_error("Error deleting assistant"))?;

    metrics::record_delete();
    tracing::info!(
        request_id = %request_id,
        assistant_name = %removed.name,
        assistant_id = %removed.id,
        "Assistant deleted"
    );

    Ok(Json(DeleteAssistantResponse {
        success: true,
        message: format!("Assistant '{}' deleted successfully", name),
        assistant_name: name,
        timestamp: Utc::now(),
    }))
}
