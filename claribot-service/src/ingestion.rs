//! Document text ingestion.
//!
//! A [`FragmentSource`] turns a file into parser events; the reading-order
//! reconstructor turns those events into plain text.

pub mod pdf;
pub mod reading_order;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::ReadingOrderConfig;
use crate::error::ExtractionError;

pub use pdf::PdfiumSource;
pub use reading_order::{ParserEvent, RawFragment};

/// A parser that reports positioned text fragments for a document.
///
/// The event sequence must finish with [`ParserEvent::End`] on success or
/// contain a [`ParserEvent::Error`] on failure.
pub trait FragmentSource: Send + Sync {
    fn parse(&self, path: &Path) -> Box<dyn Iterator<Item = ParserEvent> + '_>;
}

/// Extract a document's text in reading order.
///
/// The parse runs on the blocking pool; the returned future resolves once
/// with either the whole text or an error.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn extract_text(
    source: Arc<dyn FragmentSource>,
    path: PathBuf,
    config: ReadingOrderConfig,
) -> Result<String, ExtractionError> {
    let text = tokio::task::spawn_blocking(move || {
        reading_order::reconstruct(source.parse(&path), &config)
    })
    .await
    .map_err(ExtractionError::Join)??;

    debug!(chars = text.chars().count(), "Extracted document text");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Vec<ParserEvent>);

    impl FragmentSource for FixedSource {
        fn parse(&self, _path: &Path) -> Box<dyn Iterator<Item = ParserEvent> + '_> {
            Box::new(self.0.iter().cloned())
        }
    }

    #[tokio::test]
    async fn test_extract_text_orders_fragments() {
        let source = Arc::new(FixedSource(vec![
            ParserEvent::Fragment(RawFragment::new("Liabilities", 0.0, 12.0)),
            ParserEvent::Fragment(RawFragment::new("$1,000", 50.0, 10.0)),
            ParserEvent::Fragment(RawFragment::new("Assets", 0.0, 10.02)),
            ParserEvent::End,
        ]));

        let text = extract_text(source, PathBuf::from("ignored.pdf"), ReadingOrderConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "Assets $1,000\nLiabilities");
    }

    #[tokio::test]
    async fn test_extract_text_propagates_parse_failure() {
        let source = Arc::new(FixedSource(vec![ParserEvent::Error(
            "Failed to load PDF: FormatError".to_string(),
        )]));

        let err = extract_text(source, PathBuf::from("broken.pdf"), ReadingOrderConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ParseFailure { .. }));
    }

    #[tokio::test]
    async fn test_extract_text_empty_document() {
        let source = Arc::new(FixedSource(vec![ParserEvent::End]));

        let text = extract_text(source, PathBuf::from("blank.pdf"), ReadingOrderConfig::default())
            .await
            .unwrap();
        assert!(text.is_empty());
    }
}
