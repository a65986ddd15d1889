//! Error types for unbet library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unbet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading a report or writing artifacts.
///
/// Only loading failures and artifact I/O are fatal. Fields that do not
/// match and tables that fail reconstruction are reported as absent values
/// in the [`Bundle`](crate::Bundle), never as errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The report path does not exist.
    #[error("Report not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error writing a tabular export.
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    /// Error drawing or encoding a plot image.
    #[error("Plot error: {0}")]
    Plot(String),

    /// Error rendering the bundle (JSON, narrative).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether this error means the input could not be read as a PDF report.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::TextExtract("Invalid content stream".into());
        assert_eq!(err.to_string(), "Text extraction error: Invalid content stream");

        let err = Error::NotFound(PathBuf::from("missing.pdf"));
        assert_eq!(err.to_string(), "Report not found: missing.pdf");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_format_error_classification() {
        assert!(Error::UnknownFormat.is_format_error());
        assert!(Error::PdfParse("bad xref".into()).is_format_error());
        assert!(!Error::NotFound(PathBuf::from("x.pdf")).is_format_error());
        assert!(!Error::Render("json".into()).is_format_error());
    }
}
