// SPDX-License-Identifier: MIT

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::canvas::catalog::{BuiltinCatalog, CapabilityDescriptor, FileCatalog, ToolCatalog};
use crate::canvas::config::ServerConfig;
use crate::canvas::error::CanvasError;
use crate::canvas::workflow::{SubmissionHandler, Verdict};

const SERVICE_NAME: &str = "kinetic-canvas";

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: ToolCatalog,
    pub submissions: SubmissionHandler,
}

impl AppState {
    pub fn new(catalog: ToolCatalog) -> Self {
        Self {
            catalog,
            submissions: SubmissionHandler::new(),
        }
    }
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{id}", get(get_tool))
        .route("/api/workflows", post(submit_workflow))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load the configured catalog
pub async fn load_catalog(config: &ServerConfig) -> Result<ToolCatalog, CanvasError> {
    let catalog = ToolCatalog::new();
    match &config.catalog {
        Some(path) => catalog.load_from(&FileCatalog::new(path)).await?,
        None => catalog.load_from(&BuiltinCatalog).await?,
    };
    Ok(catalog)
}

pub async fn serve(config: ServerConfig) -> Result<(), CanvasError> {
    let catalog = load_catalog(&config).await?;
    let app = router(AppState::new(catalog), config.body_limit);

    let addr = config.addr()?;
    log::info!("Listening on http://{}", addr);
    log::info!("Tools API: http://{}/api/tools", addr);
    log::info!("Workflows API: http://{}/api/workflows", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Kinetic Canvas workflow builder API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tools": "/api/tools",
            "workflows": "/api/workflows",
            "health": "/health"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": SERVICE_NAME
    }))
}

async fn list_tools(State(state): State<AppState>) -> Json<Vec<CapabilityDescriptor>> {
    Json(state.catalog.list().await)
}

async fn get_tool(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.catalog.get(&id).await {
        Some(descriptor) => Json(descriptor).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Tool not found",
                "message": format!("Tool with ID '{}' does not exist", id)
            })),
        )
            .into_response(),
    }
}

/// Validation runs on the blocking pool over the owned request body
async fn submit_workflow(State(state): State<AppState>, body: Bytes) -> Response {
    let handler = state.submissions.clone();
    let verdict = match tokio::task::spawn_blocking(move || handler.submit_bytes(&body)).await {
        Ok(verdict) => verdict,
        Err(e) => {
            log::error!("Workflow processing task failed: {}", e);
            Verdict::internal(e.to_string())
        }
    };

    let status =
        StatusCode::from_u16(verdict.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(verdict)).into_response()
}

async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": format!("Route {} not found", uri)
        })),
    )
}
