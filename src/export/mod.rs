//! Artifact writers: CSV tables, PNG plots, bundle JSON and the Markdown
//! narrative.

mod csv;
mod json;
mod label;
mod plot;
mod report;

pub use self::csv::{table_to_csv, write_table, write_table_csv};
pub use self::json::{to_json, write_json, JsonFormat};
pub use self::plot::{
    bjh_series, isotherm_series, render_plot, tplot_series, write_plot, Marker, PlotLabels,
    PlotSize,
};
pub use self::report::{render_narrative, write_narrative};
