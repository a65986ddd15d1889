//! Labeled field maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Label to whitespace-normalized value, in insertion order.
pub type FieldMap = IndexMap<String, String>;

/// Fields from the general (header) part of a report.
///
/// Serializes flat: the list fields sit next to the labeled values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralFields {
    /// Every distinct operator name, in order of first appearance
    #[serde(rename = "Operators")]
    pub operators: Vec<String>,

    /// First operator, or empty
    #[serde(rename = "OperatorPrimary")]
    pub operator_primary: String,

    /// Every date-time match, duplicates included
    #[serde(rename = "Dates")]
    pub dates: Vec<String>,

    /// Remaining labeled values
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl GeneralFields {
    /// Look up a labeled value.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    /// Look up a labeled value that is present and non-empty.
    pub fn non_empty(&self, label: &str) -> Option<&str> {
        self.get(label).filter(|v| !v.is_empty())
    }

    /// First date-time match, if any.
    pub fn first_date(&self) -> Option<&str> {
        self.dates.first().map(String::as_str)
    }
}
