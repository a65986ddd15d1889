//! # unbet
//!
//! Structured data extraction from BET surface-area analysis PDF reports.
//!
//! Instrument reports carry their results as labeled text, highlighted
//! excerpts and undelimited numeric tables. This library loads a report,
//! pulls out the labeled fields, rebuilds the isotherm, multi-point BET,
//! t-plot and BJH tables from the number stream, and writes CSV, PNG and
//! JSON artifacts next to the result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unbet::extract_file;
//!
//! fn main() -> unbet::Result<()> {
//!     let bundle = extract_file("report.pdf", "bet_out")?;
//!
//!     println!("Operator: {}", bundle.general.operator_primary);
//!     if let Some(points) = &bundle.tables.isotherm_points {
//!         println!("{} isotherm points", points.row_count());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Field extraction**: general header, isotherm, multi-point BET and
//!   t-plot summaries
//! - **Table reconstruction**: range-checked rows from raw number streams
//! - **Highlights**: annotation quads resolved to the words under them
//! - **Artifacts**: CSV exports, PNG plots, bundle JSON, Markdown report
//! - **Measurement IDs**: canonical identifiers from report metadata

pub mod bundle;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod nomenclature;
pub mod parser;
pub mod text;

// Re-export commonly used types
pub use bundle::{extract_text_bundle, Artifacts, Bundle, BundleAssembler, ExtractOptions, Tables};
pub use error::{Error, Result};
pub use export::{JsonFormat, PlotLabels, PlotSize};
pub use extract::{extract_highlight_strings, Highlight, TableProfile, TableProfiles};
pub use model::{
    Annotation, AnnotationKind, BjhRow, Document, FieldMap, GeneralFields, IsothermPoint,
    Metadata, MultipointBetRow, Page, Rect, TPlotPoint, Table, TableRow, Word,
};
pub use nomenclature::{build_measurement_id, build_measurement_id_at, MeasurementInputs};
pub use parser::{ErrorMode, LoadOptions, ReportLoader, ReportSource};

use std::path::{Path, PathBuf};

/// Extract a report file and write its artifacts under `out_dir`.
///
/// # Example
///
/// ```no_run
/// let bundle = unbet::extract_file("report.pdf", "bet_out").unwrap();
/// println!("{:?}", bundle.artifacts.csvs);
/// ```
pub fn extract_file<P: AsRef<Path>, O: AsRef<Path>>(path: P, out_dir: O) -> Result<Bundle> {
    Unbet::new()
        .with_out_dir(out_dir.as_ref())
        .extract(path)
}

/// Extract a report held in memory and write its artifacts under `out_dir`.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("report.pdf").unwrap();
/// let bundle = unbet::extract_bytes(&data, "bet_out").unwrap();
/// ```
pub fn extract_bytes<O: AsRef<Path>>(data: &[u8], out_dir: O) -> Result<Bundle> {
    Unbet::new()
        .with_out_dir(out_dir.as_ref())
        .extract_bytes(data)
}

/// Load a report into the document model without extracting anything.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parser::load_file(path)
}

/// Builder for loading and extracting reports.
///
/// # Example
///
/// ```no_run
/// use unbet::Unbet;
///
/// let bundle = Unbet::new()
///     .with_out_dir("bet_out")
///     .with_narrative(true)
///     .with_highlights(true)
///     .extract("report.pdf")?;
/// # Ok::<(), unbet::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unbet {
    load_options: LoadOptions,
    extract_options: ExtractOptions,
}

impl Unbet {
    /// Create a new builder. Nothing is written until an output directory
    /// is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first unreadable page.
    pub fn strict(mut self) -> Self {
        self.load_options = self.load_options.strict();
        self
    }

    /// Skip unreadable pages with a warning.
    pub fn lenient(mut self) -> Self {
        self.load_options = self.load_options.with_error_mode(ErrorMode::Lenient);
        self
    }

    /// Set the horizontal gap, in font sizes, that splits a text line.
    pub fn with_column_gap(mut self, factor: f32) -> Self {
        self.load_options = self.load_options.with_column_gap(factor);
        self
    }

    /// Set the artifact directory.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_options = self.extract_options.with_out_dir(dir);
        self
    }

    /// Enable or disable plots.
    pub fn with_plots(mut self, write: bool) -> Self {
        self.extract_options = self.extract_options.with_plots(write);
        self
    }

    /// Enable or disable CSV exports.
    pub fn with_csvs(mut self, write: bool) -> Self {
        self.extract_options = self.extract_options.with_csvs(write);
        self
    }

    /// Enable or disable the bundle JSON.
    pub fn with_json(mut self, write: bool) -> Self {
        self.extract_options = self.extract_options.with_json(write);
        self
    }

    /// Enable or disable the narrative report.
    pub fn with_narrative(mut self, write: bool) -> Self {
        self.extract_options = self.extract_options.with_narrative(write);
        self
    }

    /// Parse highlighted excerpts. Turns word extraction on when enabled.
    pub fn with_highlights(mut self, parse: bool) -> Self {
        self.extract_options = self.extract_options.with_highlights(parse);
        if parse {
            self.load_options = self.load_options.with_words(true).with_annotations(true);
        }
        self
    }

    /// Set the table profiles.
    pub fn with_profiles(mut self, profiles: TableProfiles) -> Self {
        self.extract_options = self.extract_options.with_profiles(profiles);
        self
    }

    /// Set the plot size in pixels.
    pub fn with_plot_size(mut self, width: u32, height: u32) -> Self {
        self.extract_options = self.extract_options.with_plot_size(width, height);
        self
    }

    /// The assembler these options describe.
    pub fn assembler(&self) -> BundleAssembler {
        BundleAssembler::new(self.extract_options.clone())
    }

    /// Load and extract a report file.
    pub fn extract<P: AsRef<Path>>(self, path: P) -> Result<Bundle> {
        let doc = parser::load_file_with_options(path, self.load_options.clone())?;
        self.assembler().assemble(&doc)
    }

    /// Load and extract a report from bytes.
    pub fn extract_bytes(self, data: &[u8]) -> Result<Bundle> {
        let doc = parser::load_bytes_with_options(data, self.load_options.clone())?;
        self.assembler().assemble(&doc)
    }

    /// Load and extract from either kind of source.
    pub fn extract_source<'a>(self, source: impl Into<ReportSource<'a>>) -> Result<Bundle> {
        let doc = parser::load_source(source.into(), self.load_options.clone())?;
        self.assembler().assemble(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbet_builder() {
        let unbet = Unbet::new()
            .strict()
            .with_out_dir("out")
            .with_narrative(true)
            .with_plots(false);

        assert_eq!(unbet.load_options.error_mode, ErrorMode::Strict);
        assert_eq!(unbet.extract_options.out_dir, Some(PathBuf::from("out")));
        assert!(unbet.extract_options.narrative);
        assert!(!unbet.extract_options.write_plots);
    }

    #[test]
    fn test_unbet_builder_default() {
        let builder = Unbet::default();
        assert_eq!(builder.load_options.error_mode, ErrorMode::Lenient);
        assert!(builder.extract_options.out_dir.is_none());
        assert!(!builder.extract_options.narrative);
        assert!(!builder.extract_options.highlights);
    }

    #[test]
    fn test_highlights_enable_words() {
        let builder = Unbet::new().with_highlights(true);
        assert!(builder.extract_options.highlights);
        assert!(builder.load_options.extract_words);
        assert!(builder.load_options.extract_annotations);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_extract_bytes_empty_data() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_bytes(&[], dir.path());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_extract_bytes_too_short() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_bytes(b"%PDF", dir.path()).is_err());
    }

    #[test]
    fn test_extract_bytes_html() {
        let result = Unbet::new().extract_bytes(b"<!DOCTYPE html><html></html>");
        assert!(result.unwrap_err().is_format_error());
    }

    #[test]
    fn test_extract_missing_file() {
        let result = Unbet::new().extract("/nonexistent/report.pdf");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_text_bundle_without_io() {
        let bundle = extract_text_bundle("Operator: Jane Doe\nOperator: John Roe\n");
        assert_eq!(bundle.general.operators, vec!["Jane Doe", "John Roe"]);
        assert!(bundle.artifacts.json.is_none());
    }
}
