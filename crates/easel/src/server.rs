//! HTTP boundary.
//!
//! - `POST /compile` takes `{ "snippet": ..., "options": ... }` and returns the
//!   rendered document.
//! - `GET /health` answers 200.
//!
//! The pipeline is CPU-bound and runs on the blocking pool under a timeout.
//! A timed out request stops being awaited; the blocking task finishes on its
//! own.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use easel_atelier::{CompileError, Diagnostic, ErrorKind, Snippet};
use easel_vitrine::RenderOptions;

use crate::pipeline::Pipeline;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
    render_defaults: Arc<RenderOptions>,
    timeout: Duration,
}

/// Body of `POST /compile`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompileRequest {
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    options: Option<RenderOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompileResponse {
    html: String,
    host_runtime_reference: Option<String>,
    fingerprint: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<Vec<Diagnostic>>,
}

impl ErrorResponse {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            diagnostics: None,
        }
    }
}

/// Build the router.
pub fn router(pipeline: Arc<Pipeline>, render_defaults: RenderOptions, timeout: Duration) -> Router {
    let state = AppState {
        pipeline,
        render_defaults: Arc::new(render_defaults),
        timeout,
    };

    Router::new()
        .route("/compile", post(handle_compile))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: &str, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn handle_compile(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CompileRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("validation", format!("Invalid request body: {}", e))),
            )
                .into_response();
        }
    };

    let options = request
        .options
        .unwrap_or_else(|| state.render_defaults.as_ref().clone());
    let pipeline = Arc::clone(&state.pipeline);
    let outcome = run_blocking(state.timeout, move || {
        pipeline.run(request.snippet.as_ref(), &options)
    })
    .await;

    match outcome {
        Ok(Ok(output)) => Json(CompileResponse {
            html: output.rendered.html,
            host_runtime_reference: output.rendered.host_runtime_reference,
            fingerprint: output.fingerprint,
        })
        .into_response(),
        Ok(Err(e)) => compile_error_response(e),
        Err(TaskFailure::Panicked(e)) => {
            error!("Compile task failed: {}", e);
            internal_error()
        }
        Err(TaskFailure::TimedOut) => {
            warn!("Compile request timed out after {:?}", state.timeout);
            timeout_error()
        }
    }
}

/// Why blocking work produced no value.
#[derive(Debug)]
enum TaskFailure {
    TimedOut,
    Panicked(JoinError),
}

/// Run `work` on the blocking pool and stop waiting after `timeout`.
async fn run_blocking<T, F>(timeout: Duration, work: F) -> Result<T, TaskFailure>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TaskFailure::Panicked(e)),
        Err(_) => Err(TaskFailure::TimedOut),
    }
}

fn compile_error_response(e: CompileError) -> Response {
    match e.kind() {
        ErrorKind::Validation => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("validation", e.to_string())),
        )
            .into_response(),
        ErrorKind::Compilation => {
            let message = e.to_string();
            let diagnostics = e.diagnostics().map(|report| report.diagnostics().to_vec());
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    kind: "compilation",
                    message,
                    diagnostics,
                }),
            )
                .into_response()
        }
        ErrorKind::Internal => internal_error(),
    }
}

fn timeout_error() -> Response {
    (
        StatusCode::GATEWAY_TIMEOUT,
        Json(ErrorResponse::new("timeout", "Compilation timed out")),
    )
        .into_response()
}

/// Internal failures never expose details; they were logged where they
/// happened.
fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal", "Internal compiler error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_atelier::CompilerConfig;

    fn state(timeout: Duration) -> AppState {
        AppState {
            pipeline: Arc::new(Pipeline::new(CompilerConfig::default(), 16)),
            render_defaults: Arc::new(RenderOptions::default()),
            timeout,
        }
    }

    async fn call(body: &str) -> (StatusCode, serde_json::Value) {
        let response = handle_compile(
            State(state(Duration::from_secs(30))),
            Bytes::from(body.to_string()),
        )
        .await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_compile_ok() {
        let (status, json) = call(
            r#"{
                "snippet": {
                    "name": "Hello",
                    "script": { "content": "console.log('hi')", "language": "typescript" },
                    "template": { "content": "<div></div>", "language": "html" },
                    "libraries": "jquery\nhttps://unpkg.com/office.js"
                },
                "options": { "inlineJsAndCssIntoIframe": true }
            }"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["html"].as_str().unwrap().contains("console.log(\"hi\")"));
        assert_eq!(json["hostRuntimeReference"], "https://unpkg.com/office.js");
        assert!(json["fingerprint"].as_str().is_some_and(|f| !f.is_empty()));
    }

    #[tokio::test]
    async fn test_compile_diagnostics() {
        let (status, json) = call(
            r#"{"snippet":{"script":{"content":"let x: number = 'a';","language":"typescript"}}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["kind"], "compilation");
        assert_eq!(json["diagnostics"][0]["lineNumber"], 1);
        assert!(json["message"].as_str().unwrap().starts_with("Line #1:"));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (status, json) = call("{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");

        let (status, _) = call(r#"{"snippet":{"script":{"content":"a()"}}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = call("not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");
    }

    #[tokio::test]
    async fn test_slow_work_times_out() {
        let outcome = run_blocking(Duration::from_millis(10), || {
            std::thread::sleep(Duration::from_millis(200));
            1
        })
        .await;
        assert!(matches!(outcome, Err(TaskFailure::TimedOut)));

        let response = timeout_error();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], "timeout");
    }

    #[tokio::test]
    async fn test_blocking_outcomes() {
        let outcome = run_blocking(Duration::from_secs(30), || 7).await;
        assert!(matches!(outcome, Ok(7)));

        let outcome: Result<(), _> =
            run_blocking(Duration::from_secs(30), || panic!("compile task blew up")).await;
        assert!(matches!(outcome, Err(TaskFailure::Panicked(_))));
    }

    #[tokio::test]
    async fn test_health() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
