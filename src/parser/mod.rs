//! Report loading module.

mod annots;
mod layout;
mod loader;
mod options;

pub use annots::extract_page_annotations;
pub use layout::{group_spans_into_lines, LayoutAnalyzer, TextLine, TextSpan};
pub use loader::{
    load_bytes, load_bytes_with_options, load_file, load_file_with_options, load_source,
    sniff_version, ReportLoader, ReportSource,
};
pub use options::{ErrorMode, LoadOptions};
