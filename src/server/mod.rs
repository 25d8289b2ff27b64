// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface: static page, find-references endpoint, CORS, shutdown.
//!
//! Responses carry permissive CORS headers on every route. Search results
//! are serialized pretty-printed because the page and existing clients
//! display the raw body.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::bootstrap;
use crate::errors::SearchError;
use crate::model::{SearchQuery, Strategy};
use crate::orchestrator::SearchOrchestrator;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<SearchOrchestrator>,
    web_root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(orchestrator: SearchOrchestrator, web_root: PathBuf) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            web_root: Arc::new(web_root),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/index.html", get(index_page))
        .route("/find-references", post(find_references))
        .fallback(fallback)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until an interrupt/termination signal.
///
/// If the discovered port is taken between discovery and bind, discovery is
/// retried from scratch; any other bind error is fatal.
pub async fn serve(
    orchestrator: SearchOrchestrator,
    start_port: u16,
    web_root: PathBuf,
) -> Result<(), SearchError> {
    if bootstrap::pattern_tool_available() {
        tracing::info!("external pattern tool found; fast search path available");
    } else {
        tracing::info!("external pattern tool not found; queries will use fallback strategies");
    }

    let state = AppState::new(orchestrator, web_root);

    loop {
        let port = bootstrap::find_available_port(start_port)?;
        match tokio::net::TcpListener::bind(("127.0.0.1", port)).await {
            Ok(listener) => {
                tracing::info!("listening on http://127.0.0.1:{port}");
                axum::serve(listener, router(state.clone()))
                    .with_graceful_shutdown(shutdown_signal())
                    .await
                    .map_err(|e| SearchError::Internal(anyhow::Error::new(e)))?;
                tracing::info!("server stopped");
                return Ok(());
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                tracing::warn!("port {port} taken between discovery and bind, retrying");
                continue;
            }
            Err(e) => {
                return Err(SearchError::Internal(
                    anyhow::Error::new(e).context("listener bind failed"),
                ));
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining in-flight requests");
}

async fn index_page(State(state): State<AppState>) -> Response {
    let path = state.web_root.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("failed to read {}: {}", path.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to read {}: {e}", path.display()),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct FindReferencesRequest {
    word: Option<String>,
    directory: Option<String>,
    #[serde(rename = "searchStrategy")]
    search_strategy: Option<Strategy>,
}

async fn find_references(State(state): State<AppState>, body: Bytes) -> Response {
    let request: FindReferencesRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                &e.to_string(),
            );
        }
    };

    let Some(word) = request.word.filter(|w| !w.trim().is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required parameter",
            "body must include a non-empty \"word\"",
        );
    };
    let Some(directory) = request.directory.filter(|d| !d.trim().is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required parameter",
            "body must include a non-empty \"directory\"",
        );
    };

    let strategy = request.search_strategy.unwrap_or_default();
    let query = SearchQuery::new(word, &directory, strategy);
    tracing::info!(
        "find-references term={:?} directory={} strategy={}",
        query.term,
        directory,
        strategy
    );

    match state.orchestrator.run(&query).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(rendered) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                rendered,
            )
                .into_response(),
            Err(e) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to serialize result",
                &e.to_string(),
            ),
        },
        Err(err) if err.is_user_error() => {
            error_response(StatusCode::BAD_REQUEST, "Invalid search request", &err.to_string())
        }
        Err(err) => {
            tracing::error!("search failed: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err.to_string(),
            )
        }
    }
}

/// Unknown routes are 404; bare OPTIONS (no preflight headers, so the CORS
/// layer lets it through) answers 200 with an empty body.
async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/json")],
        json!({"error": "Not found"}).to_string(),
    )
        .into_response()
}

fn error_response(status: StatusCode, error: &str, details: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        json!({"error": error, "details": details}).to_string(),
    )
        .into_response()
}
