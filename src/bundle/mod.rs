//! The extraction result and its assembler.
//!
//! A [`Bundle`] always has the same shape: every field map exists (possibly
//! empty) and every table slot exists (possibly `None`). Consumers never
//! have to distinguish "not extracted" from "extraction failed".

mod assembler;

pub use assembler::{extract_text_bundle, BundleAssembler, ExtractOptions};

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{
    BjhRow, FieldMap, GeneralFields, IsothermPoint, MultipointBetRow, TPlotPoint, Table,
};

/// General labels carried into [`Bundle::summary_entries`], in order.
pub const SUMMARY_GENERAL_KEYS: &[&str] = &[
    "Operators",
    "Dates",
    "Sample ID",
    "Filename",
    "Sample Description",
    "Comment",
    "Sample weight",
    "Sample Volume",
    "Outgas Time",
    "OutgasTemp",
    "Analysis gas",
    "Bath Temp",
];

/// Everything extracted from one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Header fields, operators and dates
    pub general: GeneralFields,
    /// BET isotherm summary
    pub isotherm_summary: FieldMap,
    /// Multi-point BET summary
    pub multipoint_bet_summary: FieldMap,
    /// t-plot summary
    pub tplot_summary: FieldMap,
    /// Fields parsed from highlighted excerpts
    pub highlight_fields: FieldMap,
    /// Reconstructed tables
    pub tables: Tables,
    /// Files written next to the extraction
    pub artifacts: Artifacts,
}

/// The four report tables. A `None` slot means reconstruction failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    pub isotherm_points: Option<Table<IsothermPoint>>,
    pub multipoint_bet: Option<Table<MultipointBetRow>>,
    pub tplot_points: Option<Table<TPlotPoint>>,
    pub bjh_desorption: Option<Table<BjhRow>>,
}

impl Tables {
    /// Number of tables that were reconstructed.
    pub fn present(&self) -> usize {
        [
            self.isotherm_points.is_some(),
            self.multipoint_bet.is_some(),
            self.tplot_points.is_some(),
            self.bjh_desorption.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count()
    }

    /// Row count per table name, `None` for absent tables.
    pub fn row_counts(&self) -> Vec<(&'static str, Option<usize>)> {
        vec![
            ("isotherm_points", self.isotherm_points.as_ref().map(Table::row_count)),
            ("multipoint_bet", self.multipoint_bet.as_ref().map(Table::row_count)),
            ("tplot_points", self.tplot_points.as_ref().map(Table::row_count)),
            ("bjh_desorption", self.bjh_desorption.as_ref().map(Table::row_count)),
        ]
    }
}

/// Paths of the derived files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifacts {
    /// CSV exports keyed by table (`isotherm`, `multipoint_bet`, `tplot`, `bjh`)
    pub csvs: IndexMap<String, PathBuf>,
    /// Plot images, in writing order
    pub plots: Vec<PathBuf>,
    /// The bundle JSON
    pub json: Option<PathBuf>,
    /// The narrative report, when enabled
    pub narrative: Option<PathBuf>,
}

impl Artifacts {
    /// Every written path.
    pub fn paths(&self) -> Vec<&PathBuf> {
        self.csvs
            .values()
            .chain(self.plots.iter())
            .chain(self.json.iter())
            .chain(self.narrative.iter())
            .collect()
    }
}

impl Bundle {
    /// Flatten the summaries and the key general fields into
    /// `("section:key", value)` pairs. Empty values are left out.
    ///
    /// List-valued general fields are joined with `", "`.
    pub fn summary_entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();

        let sections = [
            ("isotherm_summary", &self.isotherm_summary),
            ("multipoint_bet_summary", &self.multipoint_bet_summary),
            ("tplot_summary", &self.tplot_summary),
        ];
        for (name, map) in sections {
            for (key, value) in map {
                entries.push((format!("{}:{}", name, key), value.clone()));
            }
        }

        for key in SUMMARY_GENERAL_KEYS {
            let value = match *key {
                "Operators" => self.general.operators.join(", "),
                "Dates" => self.general.dates.join(", "),
                _ => self.general.get(key).unwrap_or("").to_string(),
            };
            if !value.is_empty() {
                entries.push((format!("general:{}", key), value));
            }
        }
        entries
    }
}
