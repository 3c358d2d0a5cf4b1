#![allow(dead_code)]

use assistant_service::{
    build_router,
    config::AssistantConfig,
    models::{Assistant, Upserted},
    services::{AssistantStore, InMemoryAssistantStore, RegistryError},
    startup::Application,
    AppState,
};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router over a fresh in-memory store.
pub fn test_router() -> Router {
    router_with_store(Arc::new(InMemoryAssistantStore::new()))
}

pub fn router_with_store(store: Arc<dyn AssistantStore>) -> Router {
    build_router(AppState::new(AssistantConfig::for_tests(), store))
}

pub fn router_with_config(config: AssistantConfig) -> Router {
    build_router(AppState::new(
        config,
        Arc::new(InMemoryAssistantStore::new()),
    ))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn call(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn upsert(app: &Router, name: &str, response_text: &str) -> TestResponse {
    call(
        app,
        json_request(
            "POST",
            "/api/assistants",
            serde_json::json!({ "name": name, "responseText": response_text }),
        ),
    )
    .await
}

/// Store whose every operation fails, for exercising error paths.
pub struct FailingStore;

fn offline() -> RegistryError {
    RegistryError::Internal(anyhow::anyhow!("store offline"))
}

impl AssistantStore for FailingStore {
    fn upsert(&self, _name: &str, _response_text: &str) -> Result<Upserted, RegistryError> {
        Err(offline())
    }

    fn find_by_name(&self, _name: &str) -> Result<Option<Assistant>, RegistryError> {
        Err(offline())
    }

    fn exists_by_name(&self, _name: &str) -> Result<bool, RegistryError> {
        Err(offline())
    }

    fn delete_by_name(&self, _name: &str) -> Result<Assistant, RegistryError> {
        Err(offline())
    }

    fn list_all(&self) -> Result<Vec<Assistant>, RegistryError> {
        Err(offline())
    }

    fn count(&self) -> Result<usize, RegistryError> {
        Err(offline())
    }

    fn health_check(&self) -> Result<(), RegistryError> {
        Err(offline())
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Runs the real server on an ephemeral loopback port.
    pub async fn spawn() -> Self {
        let app = Application::build(
            AssistantConfig::for_tests(),
            Arc::new(InMemoryAssistantStore::new()),
        )
        .await
        .expect("Failed to build test application");

        let port = app.port();
        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
        }
    }
}
