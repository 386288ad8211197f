//! HTTP API for the Claribot service.
//!
//! This module provides the REST API endpoints for:
//! - Liveness, health and metrics monitoring
//! - PDF upload and financial analysis

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::UploadConfig;
use crate::error::{I18nError, ServiceError};
use crate::i18n::I18n;
use crate::service::AnalysisService;

pub mod analyze;
use analyze::analyze_pdf_handler;

/// Headroom above the file limit for multipart boundaries and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state
pub struct AppState {
    pub service: Arc<AnalysisService>,
    pub i18n: Arc<I18n>,
    pub upload: UploadConfig,
    pub metrics: Option<PrometheusHandle>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        service: Arc<AnalysisService>,
        i18n: Arc<I18n>,
        upload: UploadConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            service,
            i18n,
            upload,
            metrics,
            start_time: Instant::now(),
        }
    }

    /// Create an i18n-aware error from a service error
    pub fn i18n_error(&self, error: ServiceError) -> I18nError {
        I18nError::new(error, self.i18n.clone(), "en")
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body_size = usize::try_from(state.upload.max_file_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/analyze-pdf",
            post(analyze_pdf_handler).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Liveness ===

#[derive(Serialize)]
struct RootResponse {
    message: String,
}

async fn root_handler(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: state.i18n.get("en", "server-running"),
    })
}

// === Health & Metrics ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: state.i18n.get("en", "health-status-ok"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    uptime_seconds: u64,
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{ReadingOrderConfig, RetryConfig};
    use crate::service::tests::{FixedSource, ScriptedBackend, statement_events};

    pub(crate) fn test_state(
        upload: UploadConfig,
        backend: Arc<ScriptedBackend>,
        events: Vec<crate::ingestion::ParserEvent>,
    ) -> Arc<AppState> {
        let service = AnalysisService::new(
            Arc::new(FixedSource(events)),
            backend,
            ReadingOrderConfig::default(),
            RetryConfig {
                max_attempts: 3,
                base_delay_ms: 1,
            },
        );
        Arc::new(AppState::new(
            Arc::new(service),
            Arc::new(I18n::new()),
            upload,
            None,
        ))
    }

    pub(crate) async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn state() -> Arc<AppState> {
        let upload = UploadConfig {
            dir: std::env::temp_dir(),
            max_file_size_bytes: 1024,
        };
        test_state(
            upload,
            Arc::new(ScriptedBackend::new(vec![])),
            statement_events(),
        )
    }

    #[tokio::test]
    async fn test_root_message() {
        let response = router(state())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "PDF Financial Analysis Server is running");
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let response = router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "OK");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_metrics_without_recorder_is_empty() {
        let response = router(state())
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
