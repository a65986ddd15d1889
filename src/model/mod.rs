//! Document and record model types.
//!
//! The document side (`Document`, `Page`, `Word`, `Annotation`) is what the
//! loader produces. The record side (`FieldMap`, `GeneralFields`, the table
//! rows) is what extraction produces and the bundle carries.

mod annotation;
mod document;
mod fields;
pub mod geometry;
mod page;
mod table;

pub use annotation::{Annotation, AnnotationKind};
pub use document::{Document, Metadata};
pub use fields::{FieldMap, GeneralFields};
pub use geometry::{quads_to_rects, Rect};
pub use page::{Page, Word};
pub use table::{BjhRow, IsothermPoint, MultipointBetRow, TPlotPoint, Table, TableRow};
