//! Numeric table types.
//!
//! Every reconstructed table is a list of fixed-arity rows, sorted ascending
//! by a key column with one row per key value.

use serde::{Deserialize, Serialize};

/// Common behavior of the fixed-arity row shapes.
pub trait TableRow: Clone {
    /// Column names, in export order.
    const COLUMNS: &'static [&'static str];

    /// Value of the key column.
    fn key(&self) -> f64;

    /// All column values, in [`COLUMNS`](Self::COLUMNS) order.
    fn values(&self) -> Vec<f64>;
}

/// A point of the adsorption isotherm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsothermPoint {
    #[serde(rename = "P_over_P0")]
    pub p_over_p0: f64,
    #[serde(rename = "Vol_cc_g_STP")]
    pub volume: f64,
}

impl TableRow for IsothermPoint {
    const COLUMNS: &'static [&'static str] = &["P_over_P0", "Vol_cc_g_STP"];

    fn key(&self) -> f64 {
        self.p_over_p0
    }

    fn values(&self) -> Vec<f64> {
        vec![self.p_over_p0, self.volume]
    }
}

/// A row of the multi-point BET table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultipointBetRow {
    #[serde(rename = "P_over_P0")]
    pub p_over_p0: f64,
    #[serde(rename = "Vol_cc_g_STP")]
    pub volume: f64,
    /// `1 / [W((Po/P) - 1)]`
    #[serde(rename = "BET_transform")]
    pub bet_transform: f64,
}

impl TableRow for MultipointBetRow {
    const COLUMNS: &'static [&'static str] = &["P_over_P0", "Vol_cc_g_STP", "BET_transform"];

    fn key(&self) -> f64 {
        self.p_over_p0
    }

    fn values(&self) -> Vec<f64> {
        vec![self.p_over_p0, self.volume, self.bet_transform]
    }
}

/// A point of the t-plot (statistical thickness vs. adsorbed volume).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TPlotPoint {
    #[serde(rename = "Thickness_nm")]
    pub thickness_nm: f64,
    #[serde(rename = "Volume_cc_g_STP")]
    pub volume: f64,
}

impl TableRow for TPlotPoint {
    const COLUMNS: &'static [&'static str] = &["Thickness_nm", "Volume_cc_g_STP"];

    fn key(&self) -> f64 {
        self.thickness_nm
    }

    fn values(&self) -> Vec<f64> {
        vec![self.thickness_nm, self.volume]
    }
}

/// A row of the BJH desorption pore-size distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BjhRow {
    #[serde(rename = "Diameter_nm")]
    pub diameter_nm: f64,
    #[serde(rename = "PoreVol_ccg")]
    pub pore_volume: f64,
    #[serde(rename = "PoreArea_m2g")]
    pub pore_area: f64,
    #[serde(rename = "dV_d")]
    pub dv_d: f64,
    #[serde(rename = "dS_d")]
    pub ds_d: f64,
    #[serde(rename = "dV_logd")]
    pub dv_logd: f64,
    #[serde(rename = "dS_logd")]
    pub ds_logd: f64,
}

impl BjhRow {
    /// Build a row from a 7-value chunk in column order.
    pub fn from_slice(v: &[f64]) -> Option<Self> {
        match *v {
            [diameter_nm, pore_volume, pore_area, dv_d, ds_d, dv_logd, ds_logd] => Some(Self {
                diameter_nm,
                pore_volume,
                pore_area,
                dv_d,
                ds_d,
                dv_logd,
                ds_logd,
            }),
            _ => None,
        }
    }
}

impl TableRow for BjhRow {
    const COLUMNS: &'static [&'static str] = &[
        "Diameter_nm",
        "PoreVol_ccg",
        "PoreArea_m2g",
        "dV_d",
        "dS_d",
        "dV_logd",
        "dS_logd",
    ];

    fn key(&self) -> f64 {
        self.diameter_nm
    }

    fn values(&self) -> Vec<f64> {
        vec![
            self.diameter_nm,
            self.pore_volume,
            self.pore_area,
            self.dv_d,
            self.ds_d,
            self.dv_logd,
            self.ds_logd,
        ]
    }
}

/// A reconstructed table: sorted ascending by key, one row per key value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R: TableRow> Table<R> {
    /// Build a table from candidate rows in discovery order.
    ///
    /// Rows are stably sorted by key; within a run of equal keys the
    /// last-discovered row is kept.
    pub fn from_candidates(mut candidates: Vec<R>) -> Self {
        candidates.sort_by(|a, b| a.key().total_cmp(&b.key()));

        let mut rows: Vec<R> = Vec::with_capacity(candidates.len());
        for row in candidates {
            match rows.last_mut() {
                Some(last) if last.key() == row.key() => *last = row,
                _ => rows.push(row),
            }
        }
        Self { rows }
    }

    /// Rows in ascending key order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names of this table's row shape.
    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    /// Key column values in order.
    pub fn keys(&self) -> Vec<f64> {
        self.rows.iter().map(TableRow::key).collect()
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}
