//! Field, table and highlight extraction over a loaded report.

pub mod fields;
pub mod highlight;
pub mod section;
pub mod tables;

pub use fields::{
    expand_snippets, parse_general, parse_highlights, parse_isotherm_summary,
    parse_multipoint_bet_summary, parse_tplot_summary, FieldPattern, FIELD_CATALOG,
};
pub use highlight::{extract_highlight_strings, reconcile_document, reconcile_page, Highlight};
pub use section::{section, Window};
pub use tables::{
    parse_bjh_table, parse_isotherm_points, parse_multipoint_bet_table, parse_tplot_points,
    scan_region, scan_values, Scan, TableOutcome, TableProfile, TableProfiles, TableState,
};
