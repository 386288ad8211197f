//! Analysis pipeline: extraction, prompt, backend call, result parsing.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::analysis::{AnalysisBackend, Language, build_prompt, parse_analysis, retry};
use crate::config::{ReadingOrderConfig, RetryConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::ingestion::{self, FragmentSource};

/// Number of leading characters of extracted text written to the debug log.
const TEXT_PREVIEW_CHARS: usize = 500;

/// Result of analyzing one document
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: Value,
    /// Character count of the extracted document text.
    pub text_length: usize,
}

/// Runs uploaded documents through extraction and the analysis backend
pub struct AnalysisService {
    source: Arc<dyn FragmentSource>,
    backend: Arc<dyn AnalysisBackend>,
    reading_order: ReadingOrderConfig,
    retry: RetryConfig,
}

impl AnalysisService {
    pub fn new(
        source: Arc<dyn FragmentSource>,
        backend: Arc<dyn AnalysisBackend>,
        reading_order: ReadingOrderConfig,
        retry: RetryConfig,
    ) -> Self {
        Self {
            source,
            backend,
            reading_order,
            retry,
        }
    }

    /// Extract a document's text, rejecting documents with no readable text.
    pub async fn extract(&self, path: PathBuf) -> ServiceResult<String> {
        let text =
            ingestion::extract_text(self.source.clone(), path, self.reading_order.clone()).await?;

        if text.trim().is_empty() {
            return Err(ServiceError::EmptyExtraction);
        }

        let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
        debug!(preview = %preview, "Extracted text preview");

        Ok(text)
    }

    /// Analyze a stored PDF in the requested language
    pub async fn analyze(&self, path: PathBuf, language: Language) -> ServiceResult<AnalysisOutcome> {
        info!(language = %language, "Extracting text from PDF");
        let text = self.extract(path).await?;
        let text_length = text.chars().count();
        info!(text_length, "Extracted document text");

        let prompt = build_prompt(language, &text);
        let backend = self.backend.as_ref();
        let prompt = prompt.as_str();
        let reply = retry::with_retry(&self.retry, move |_| backend.generate(prompt)).await?;

        Ok(AnalysisOutcome {
            analysis: parse_analysis(&reply),
            text_length,
        })
    }
}
