//! PDF upload and analysis endpoint.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::AppState;
use crate::analysis::Language;
use crate::error::{I18nError, ServiceError};

/// Multipart field carrying the document.
const FILE_FIELD: &str = "pdfFile";
/// Multipart field carrying the requested response language.
const LANGUAGE_FIELD: &str = "language";
const DEFAULT_LANGUAGE: &str = "english";

/// Successful analysis response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: Value,
    pub filename: String,
    pub text_length: usize,
    pub language: String,
}

struct Upload {
    filename: String,
    data: Bytes,
}

/// Upload a PDF and return its financial analysis
pub async fn analyze_pdf_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, I18nError> {
    let result = analyze(&state, &mut multipart).await;

    let outcome = if result.is_ok() { "success" } else { "error" };
    metrics::counter!("claribot_analyses_total", "outcome" => outcome).increment(1);

    result.map(Json).map_err(|e| {
        warn!(error = %e, "PDF analysis request failed");
        state.i18n_error(e)
    })
}

async fn analyze(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<AnalyzeResponse, ServiceError> {
    let max = state.upload.max_file_size_bytes;
    let mut upload: Option<Upload> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            FILE_FIELD => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !is_pdf(&content_type) {
                    return Err(ServiceError::UnsupportedFormat { content_type });
                }

                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                let data = field.bytes().await.map_err(|e| multipart_error(e, max))?;
                if data.len() as u64 > max {
                    return Err(ServiceError::FileTooLarge { max });
                }

                upload = Some(Upload { filename, data });
            }
            LANGUAGE_FIELD => {
                let value = field.text().await.map_err(|e| multipart_error(e, max))?;
                if !value.is_empty() {
                    language = Some(value);
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(ServiceError::MissingUpload)?;
    let language = language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    info!(
        filename = %upload.filename,
        size = upload.data.len(),
        language = %language,
        "Received PDF for analysis"
    );

    // Removed from disk when dropped at the end of the request.
    let stored = tempfile::Builder::new()
        .prefix(&format!("{}_", chrono::Utc::now().timestamp_millis()))
        .suffix(".pdf")
        .tempfile_in(&state.upload.dir)?;
    tokio::fs::write(stored.path(), &upload.data).await?;

    let outcome = state
        .service
        .analyze(stored.path().to_path_buf(), Language::resolve(&language))
        .await?;

    info!(filename = %upload.filename, "Analysis completed");

    Ok(AnalyzeResponse {
        success: true,
        analysis: outcome.analysis,
        filename: upload.filename,
        text_length: outcome.text_length,
        language,
    })
}

fn is_pdf(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str() == mime::APPLICATION_PDF.essence_str())
        .unwrap_or(false)
}

fn multipart_error(error: MultipartError, max: u64) -> ServiceError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::FileTooLarge { max }
    } else {
        ServiceError::InvalidRequest {
            message: error.body_text(),
        }
    }
}
