use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pdfium_render::prelude::PdfiumError;
use serde::Serialize;
use thiserror::Error;

use crate::i18n::I18n;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("No text could be extracted from the PDF")]
    EmptyExtraction,

    #[error("No PDF file uploaded")]
    MissingUpload,

    #[error("Unsupported file type: {content_type}")]
    UnsupportedFormat { content_type: String },

    #[error("File too large (max {max} bytes)")]
    FileTooLarge { max: u64 },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// Reading-order extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parser failed: {message}")]
    ParseFailure { message: String },

    #[error("PDF parser stopped without signalling end of document")]
    Truncated,

    #[error("Extraction task did not complete")]
    Join(#[source] tokio::task::JoinError),
}

/// PDFium fragment source errors
#[derive(Error, Debug)]
pub enum PdfSourceError {
    #[error("Failed to load PDFium library")]
    Library(#[source] PdfiumError),

    #[error("Failed to load PDF")]
    Load(#[source] PdfiumError),

    #[error("Failed to extract text from page {page}")]
    PageText {
        page: usize,
        #[source]
        source: PdfiumError,
    },
}

/// Analysis backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("Connection failed to analysis backend at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Generation failed (status {status}): {message}")]
    Generation { status: u16, message: String },

    #[error("Invalid response from analysis backend")]
    InvalidResponse {
        #[source]
        source: reqwest::Error,
    },

    #[error("Analysis backend returned no candidates")]
    EmptyCandidate,
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::EmptyExtraction
            | ServiceError::MissingUpload
            | ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServiceError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Extraction(ExtractionError::ParseFailure { .. }) => "parse_failure",
            ServiceError::Extraction(ExtractionError::Truncated) => "parse_truncated",
            ServiceError::Extraction(ExtractionError::Join(_)) => "extraction_aborted",
            ServiceError::Backend(BackendError::MissingApiKey) => "backend_not_configured",
            ServiceError::Backend(BackendError::Connection { .. }) => "backend_connection",
            ServiceError::Backend(BackendError::Generation { .. }) => "backend_generation",
            ServiceError::Backend(BackendError::InvalidResponse { .. }) => {
                "backend_invalid_response"
            }
            ServiceError::Backend(BackendError::EmptyCandidate) => "backend_empty_candidate",
            ServiceError::EmptyExtraction => "empty_extraction",
            ServiceError::MissingUpload => "missing_upload",
            ServiceError::UnsupportedFormat { .. } => "unsupported_format",
            ServiceError::FileTooLarge { .. } => "file_too_large",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Config { .. } => "config_error",
            ServiceError::Io(_) => "io_error",
        }
    }

    /// Get a user-friendly translated message
    pub fn user_message(&self, i18n: &I18n, locale: &str) -> String {
        match self {
            ServiceError::EmptyExtraction => i18n.get(locale, "error-empty-extraction"),
            ServiceError::MissingUpload => i18n.get(locale, "error-missing-upload"),
            ServiceError::UnsupportedFormat { .. } => i18n.get(locale, "error-unsupported-format"),
            ServiceError::FileTooLarge { max } => {
                i18n.format(locale, "error-file-too-large", &[("max", &max.to_string())])
            }
            ServiceError::Extraction(_)
            | ServiceError::Backend(_)
            | ServiceError::Config { .. }
            | ServiceError::Io(_) => i18n.get(locale, "error-analysis-failed"),
            // For other errors, fall back to the technical message
            _ => self.to_string(),
        }
    }

    /// Technical detail shown alongside server-side failures
    fn details(&self) -> Option<String> {
        if self.status_code().is_server_error() {
            Some(format_error_chain(self))
        } else {
            None
        }
    }

    /// Convert to an error response with i18n support
    pub fn into_response_with_i18n(self, i18n: &I18n, locale: &str) -> Response {
        let status = self.status_code();

        let response = ErrorResponse {
            error: self.user_message(i18n, locale),
            code: Some(self.error_code().to_string()),
            details: self.details(),
        };

        (status, Json(response)).into_response()
    }
}

/// Join an error and its sources into one line.
pub fn format_error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error wrapper with i18n support for API responses
pub struct I18nError {
    pub error: ServiceError,
    pub i18n: std::sync::Arc<I18n>,
    pub locale: String,
}

impl I18nError {
    pub fn new(error: ServiceError, i18n: std::sync::Arc<I18n>, locale: impl Into<String>) -> Self {
        Self {
            error,
            i18n,
            locale: locale.into(),
        }
    }
}

impl IntoResponse for I18nError {
    fn into_response(self) -> Response {
        self.error.into_response_with_i18n(&self.i18n, &self.locale)
    }
}
