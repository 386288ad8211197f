//! Reading-order reconstruction from positioned text fragments.
//!
//! PDF content streams report text in whatever order the producer wrote it,
//! which is rarely the order a person reads it. Fragments are buffered,
//! sorted once by page and position, clustered into lines against a fixed
//! per-line anchor, and joined back into plain text.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::{ReadingOrderConfig, YAxis};
use crate::error::ExtractionError;

/// A fragment as reported by a parser, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    pub text: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub page: u32,
}

impl RawFragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x: Some(x),
            y: Some(y),
            page: 0,
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// One event from a fragment source.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserEvent {
    Fragment(RawFragment),
    /// Extraction finished; nothing after this is read.
    End,
    Error(String),
}

/// A validated, positioned piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    text: String,
    x: f64,
    y: f64,
    page: u32,
}

impl TextFragment {
    /// Validate a raw fragment. Returns `None` for empty text or missing or
    /// non-finite coordinates.
    pub fn from_raw(raw: RawFragment) -> Option<Self> {
        let x = raw.x.filter(|v| v.is_finite())?;
        let y = raw.y.filter(|v| v.is_finite())?;
        if raw.text.is_empty() {
            return None;
        }
        Some(Self {
            text: raw.text,
            x,
            y,
            page: raw.page,
        })
    }
}

/// Fragments of a document buffered until the end of the event stream.
#[derive(Debug, Default)]
pub struct Accumulator {
    fragments: Vec<TextFragment>,
    skipped: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a fragment, or count it as skipped if it is malformed.
    pub fn push(&mut self, raw: RawFragment) {
        match TextFragment::from_raw(raw) {
            Some(fragment) => self.fragments.push(fragment),
            None => self.skipped += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_fragments(self) -> Vec<TextFragment> {
        self.fragments
    }

    /// Drain events until `End` or `Error`.
    ///
    /// A parser error discards everything buffered so far. Running out of
    /// events without an `End` is reported as [`ExtractionError::Truncated`].
    pub fn collect<I>(events: I) -> Result<Self, ExtractionError>
    where
        I: IntoIterator<Item = ParserEvent>,
    {
        let mut acc = Self::new();
        for event in events {
            match event {
                ParserEvent::Fragment(raw) => acc.push(raw),
                ParserEvent::End => return Ok(acc),
                ParserEvent::Error(message) => {
                    return Err(ExtractionError::ParseFailure { message });
                }
            }
        }
        Err(ExtractionError::Truncated)
    }
}

/// Fragments sharing one vertical band, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    anchor_y: f64,
    fragments: Vec<TextFragment>,
}

impl Line {
    fn start(fragment: TextFragment) -> Self {
        Self {
            anchor_y: fragment.y,
            fragments: vec![fragment],
        }
    }

    fn accepts(&self, fragment: &TextFragment, tolerance: f64) -> bool {
        self.fragments[0].page == fragment.page && (fragment.y - self.anchor_y).abs() <= tolerance
    }

    /// Fragment texts joined by a single space.
    pub fn render(&self) -> String {
        let texts: Vec<&str> = self.fragments.iter().map(|f| f.text.as_str()).collect();
        texts.join(" ")
    }
}

fn horizontal_order(a: &TextFragment, b: &TextFragment) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.text.cmp(&b.text))
}

fn reading_order(axis: YAxis) -> impl Fn(&TextFragment, &TextFragment) -> Ordering {
    move |a, b| {
        let vertical = match axis {
            YAxis::Ascending => a.y.total_cmp(&b.y),
            YAxis::Descending => b.y.total_cmp(&a.y),
        };
        a.page
            .cmp(&b.page)
            .then(vertical)
            .then_with(|| horizontal_order(a, b))
    }
}

/// Partition fragments into lines.
///
/// The tolerance is compared against the first fragment of each line, so a
/// slow drift along a row cannot pull in fragments from the row below.
pub fn cluster_lines(mut fragments: Vec<TextFragment>, config: &ReadingOrderConfig) -> Vec<Line> {
    fragments.sort_by(reading_order(config.y_axis));

    let mut lines: Vec<Line> = Vec::new();
    for fragment in fragments {
        match lines.last_mut() {
            Some(line) if line.accepts(&fragment, config.line_tolerance) => {
                line.fragments.push(fragment);
            }
            _ => lines.push(Line::start(fragment)),
        }
    }

    for line in &mut lines {
        line.fragments.sort_by(horizontal_order);
    }

    lines
}

/// Rendered lines joined by newlines.
pub fn assemble(lines: &[Line]) -> String {
    let rendered: Vec<String> = lines.iter().map(Line::render).collect();
    rendered.join("\n")
}

/// Run the full reconstruction over one document's event stream.
pub fn reconstruct<I>(events: I, config: &ReadingOrderConfig) -> Result<String, ExtractionError>
where
    I: IntoIterator<Item = ParserEvent>,
{
    let acc = Accumulator::collect(events)?;
    let skipped = acc.skipped();
    if skipped > 0 {
        metrics::counter!("claribot_fragments_skipped_total").increment(skipped as u64);
    }

    let fragments = acc.into_fragments();
    let fragment_count = fragments.len();
    let lines = cluster_lines(fragments, config);
    metrics::histogram!("claribot_extraction_lines").record(lines.len() as f64);

    debug!(
        fragments = fragment_count,
        skipped,
        lines = lines.len(),
        "Reconstructed reading order"
    );

    Ok(assemble(&lines))
}
