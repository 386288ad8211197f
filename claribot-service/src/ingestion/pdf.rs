//! PDFium-backed fragment source.
//!
//! Each text segment PDFium reports becomes one fragment. PDF user space is
//! bottom-up, so segment positions are flipped against the page height and
//! reported top-down: the default ascending y-axis then reads top to bottom.

use std::path::Path;

use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use super::FragmentSource;
use super::reading_order::{ParserEvent, RawFragment};
use crate::error::{PdfSourceError, format_error_chain};

/// Create a new Pdfium instance (dynamically linked).
///
/// Searches for libpdfium in:
/// 1. Current directory (./libpdfium.so)
/// 2. vendor/pdfium/lib/
/// 3. System library paths
pub fn create_pdfium() -> Result<Pdfium, PdfSourceError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "./vendor/pdfium/lib/",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(PdfSourceError::Library)?;

    Ok(Pdfium::new(bindings))
}

/// Fragment source reading text segments through PDFium
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumSource;

impl PdfiumSource {
    pub fn new() -> Self {
        Self
    }

    fn read_events(path: &Path) -> Result<Vec<ParserEvent>, PdfSourceError> {
        let pdfium = create_pdfium()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(PdfSourceError::Load)?;

        let page_count = document.pages().len();
        info!(pages = page_count, "Reading PDF text segments");

        let mut events = Vec::new();
        for (page_index, page) in document.pages().iter().enumerate() {
            let page_height = page.height().value as f64;
            let text = page.text().map_err(|source| {
                warn!(page = page_index + 1, error = %source, "Failed to get text object for page");
                PdfSourceError::PageText {
                    page: page_index + 1,
                    source,
                }
            })?;

            let before = events.len();
            for segment in text.segments().iter() {
                let bounds = segment.bounds();
                let fragment = RawFragment::new(
                    segment.text().trim(),
                    bounds.left().value as f64,
                    page_height - bounds.bottom().value as f64,
                )
                .on_page(page_index as u32);
                events.push(ParserEvent::Fragment(fragment));
            }

            debug!(
                page = page_index + 1,
                segments = events.len() - before,
                "Collected page segments"
            );
        }

        events.push(ParserEvent::End);
        Ok(events)
    }
}

impl FragmentSource for PdfiumSource {
    fn parse(&self, path: &Path) -> Box<dyn Iterator<Item = ParserEvent> + '_> {
        match Self::read_events(path) {
            Ok(events) => Box::new(events.into_iter()),
            Err(e) => {
                let message = format_error_chain(&e);
                warn!(path = %path.display(), error = %message, "PDF parse failed");
                Box::new(std::iter::once(ParserEvent::Error(message)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_file_yields_single_error_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");

        let events: Vec<ParserEvent> = PdfiumSource::new().parse(&path).collect();

        // Without libpdfium the library fails to bind, otherwise the load fails
        assert_eq!(events.len(), 1);
        match &events[0] {
            ParserEvent::Error(message) => {
                assert!(
                    message.starts_with("Failed to load PDFium library")
                        || message.starts_with("Failed to load PDF"),
                    "{message}"
                );
            }
            other => panic!("expected an error event, got {other:?}"),
        }
    }
}
