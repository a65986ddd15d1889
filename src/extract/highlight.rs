//! Highlight reconciliation.
//!
//! Highlight annotations carry geometry but no text. The text is recovered
//! by collecting the page words that fall inside the highlight quads.

use serde::Serialize;

use crate::error::Result;
use crate::model::{Annotation, Document, Rect, Word};
use crate::parser::{self, LoadOptions};
use crate::text::clean_text;
use crate::ReportSource;

/// The resolved text of one highlight annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    /// Page number (1-indexed)
    pub page: u32,
    /// Capture rectangles (top-left origin)
    pub quads: Vec<Rect>,
    /// Captured words joined with single spaces, then cleaned
    pub text: String,
    /// Top-left corner of the first captured word
    pub anchor: (f32, f32),
}

/// Resolve the highlights of one page, in `/Annots` order.
///
/// Captured words are read row by row, left to right, and the joined text
/// goes through [`clean_text`]. Highlights that capture no word are
/// dropped.
pub fn reconcile_page(page: u32, words: &[Word], annotations: &[Annotation]) -> Vec<Highlight> {
    annotations
        .iter()
        .filter(|a| a.is_highlight())
        .filter_map(|annot| {
            let quads = annot.capture_rects();
            let captured: Vec<&Word> = words
                .iter()
                .filter(|w| quads.iter().any(|q| q.intersects(&w.rect)))
                .collect();
            let captured = reading_order(captured);
            let first = captured.first()?;

            let joined = captured
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let text = clean_text(&joined);
            if text.trim().is_empty() {
                return None;
            }

            Some(Highlight {
                page,
                anchor: (first.x(), first.y()),
                quads,
                text,
            })
        })
        .collect()
}

/// Vertical centers closer than this fraction of the shorter word height
/// put two words on one visual row.
const ROW_TOLERANCE: f32 = 0.5;

/// Group words into visual rows, top to bottom, each read left to right.
///
/// Words on one row can sit at slightly different heights, for example
/// after a font size change, so rows are formed by center distance rather
/// than exact position.
fn reading_order(mut words: Vec<&Word>) -> Vec<&Word> {
    words.sort_by(|a, b| center(a).total_cmp(&center(b)).then(a.x().total_cmp(&b.x())));

    let mut rows: Vec<Vec<&Word>> = Vec::new();
    for word in words {
        match rows.last_mut() {
            Some(row) if same_row(row[0], word) => row.push(word),
            _ => rows.push(vec![word]),
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.x().total_cmp(&b.x()));
    }
    rows.into_iter().flatten().collect()
}

fn center(word: &Word) -> f32 {
    (word.rect.y0 + word.rect.y1) / 2.0
}

fn same_row(anchor: &Word, word: &Word) -> bool {
    let tolerance = anchor.rect.height().min(word.rect.height()) * ROW_TOLERANCE;
    (center(word) - center(anchor)).abs() <= tolerance
}

/// Resolve every highlight in the document, ordered by page, then
/// vertical position, then horizontal position.
pub fn reconcile_document(doc: &Document) -> Vec<Highlight> {
    let mut highlights: Vec<Highlight> = doc
        .pages
        .iter()
        .flat_map(|page| reconcile_page(page.number, &page.words, &page.annotations))
        .collect();

    highlights.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.anchor.1.total_cmp(&b.anchor.1))
            .then(a.anchor.0.total_cmp(&b.anchor.0))
    });
    log::debug!("Reconciled {} highlights", highlights.len());
    highlights
}

/// Load a report and return its highlight strings in reading order.
///
/// The strings are the same ones the bundle assembler parses.
pub fn extract_highlight_strings<'a>(source: impl Into<ReportSource<'a>>) -> Result<Vec<String>> {
    let doc = parser::load_source(source.into(), LoadOptions::default())?;
    Ok(reconcile_document(&doc)
        .into_iter()
        .map(|h| h.text)
        .collect())
}
