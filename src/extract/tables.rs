//! Numeric table reconstruction.
//!
//! Report tables come out of the PDF as an undelimited stream of numbers.
//! Each table is rebuilt by cutting its region's numeric tokens into
//! fixed-size tuples and keeping only tuples whose every column lies in a
//! plausible range. A rejected tuple is dropped whole; the stream is never
//! shifted to realign it.
//!
//! Every pass moves `Seeking -> Scanning -> RowsFound | Failed`. A failed
//! pass yields no table and never an error.

use serde::{Deserialize, Serialize};

use crate::model::{BjhRow, IsothermPoint, MultipointBetRow, TPlotPoint, Table, TableRow};
use crate::text::{number_tokens, numeric_line};

use super::section::{
    ISOTHERM_TABLE, ISOTHERM_TABLE_FALLBACK, MBET_TABLE, TPLOT_SUMMARY, TPLOT_TABLE,
};

/// Header line that opens the BJH desorption table.
const BJH_HEADER: &str = "Pore Diameter (nm)";
/// How far below the header to look for bracketed unit lines.
const BJH_UNIT_LOOKAHEAD: usize = 200;
/// How many lines to scan for values.
const BJH_SCAN_LIMIT: usize = 800;

/// Progress of one table pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    /// Looking for the table region
    Seeking,
    /// Reading numeric tokens from the region
    Scanning,
    /// Enough valid rows were found
    RowsFound,
    /// Region missing or too few valid rows
    Failed,
}

/// Result of one table pass.
#[derive(Debug, Clone)]
pub struct TableOutcome<R> {
    /// Terminal state of the pass
    pub state: TableState,
    /// Every state the pass went through, starting with `Seeking`
    pub transitions: Vec<TableState>,
    /// The table, present only when `state` is `RowsFound`
    pub table: Option<Table<R>>,
    /// Tuples that passed the range check
    pub accepted: usize,
    /// Tuples dropped by the range check
    pub rejected: usize,
}

impl<R: TableRow> TableOutcome<R> {
    /// Take the table, if reconstruction succeeded.
    pub fn into_table(self) -> Option<Table<R>> {
        self.table
    }

    /// Whether the pass found its region and read values from it.
    pub fn scanned(&self) -> bool {
        self.transitions.contains(&TableState::Scanning)
    }
}

/// State tracking for one table pass.
struct TablePass {
    name: &'static str,
    transitions: Vec<TableState>,
}

impl TablePass {
    fn seek(name: &'static str) -> Self {
        log::debug!("Table {}: seeking", name);
        Self {
            name,
            transitions: vec![TableState::Seeking],
        }
    }

    fn enter(&mut self, state: TableState) {
        log::debug!("Table {}: {:?} -> {:?}", self.name, self.current(), state);
        self.transitions.push(state);
    }

    fn current(&self) -> TableState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(TableState::Seeking)
    }

    fn scanning(&mut self) {
        self.enter(TableState::Scanning);
    }

    fn failed<R: TableRow>(mut self, accepted: usize, rejected: usize) -> TableOutcome<R> {
        self.enter(TableState::Failed);
        TableOutcome {
            state: TableState::Failed,
            transitions: self.transitions,
            table: None,
            accepted,
            rejected,
        }
    }

    /// Project accepted tuples, sort, de-duplicate, and apply the row
    /// threshold.
    fn finish<R: TableRow>(
        mut self,
        scan: Scan,
        profile: &TableProfile,
        project: impl Fn(&[f64]) -> Option<R>,
    ) -> TableOutcome<R> {
        let accepted = scan.accepted.len();
        let rejected = scan.rejected;
        let rows: Vec<R> = scan.accepted.iter().filter_map(|t| project(t.as_slice())).collect();
        let table = Table::from_candidates(rows);

        log::debug!(
            "Table {}: {} accepted, {} rejected, {} rows after de-duplication",
            self.name,
            accepted,
            rejected,
            table.row_count()
        );

        if table.row_count() < profile.min_rows.max(1) {
            log::debug!("Table {} absent (minimum {} rows)", self.name, profile.min_rows);
            return self.failed(accepted, rejected);
        }
        self.enter(TableState::RowsFound);
        TableOutcome {
            state: TableState::RowsFound,
            transitions: self.transitions,
            table: Some(table),
            accepted,
            rejected,
        }
    }
}

/// Column ranges and row threshold for one table.
///
/// The thresholds are tuned to typical instrument output magnitudes. They
/// are plausibility filters, not physical limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    /// Inclusive `(min, max)` per scanned column; its length is the arity
    pub ranges: Vec<(f64, f64)>,
    /// Fewer rows than this means the table is absent
    pub min_rows: usize,
}

impl TableProfile {
    pub fn new(ranges: Vec<(f64, f64)>, min_rows: usize) -> Self {
        Self { ranges, min_rows }
    }

    /// Isotherm: P/Po in [0, 1.2], volume in [5, 2000], at least one row.
    pub fn default_isotherm() -> Self {
        Self::new(vec![(0.0, 1.2), (5.0, 2000.0)], 1)
    }

    /// Multi-point BET: P/Po in [0.05, 0.8], volume in [20, 1500],
    /// transform in [0.05, 10], at least three rows.
    pub fn default_multipoint_bet() -> Self {
        Self::new(vec![(0.05, 0.8), (20.0, 1500.0), (0.05, 10.0)], 3)
    }

    /// t-plot triples: P/Po in [0.05, 0.7], thickness in [0.2, 1.5] nm,
    /// volume in [50, 1500], at least three rows.
    pub fn default_tplot() -> Self {
        Self::new(vec![(0.05, 0.7), (0.2, 1.5), (50.0, 1500.0)], 3)
    }

    /// BJH: seven finite columns, at least one row.
    pub fn default_bjh() -> Self {
        Self::new(vec![(f64::MIN, f64::MAX); BjhRow::COLUMNS.len()], 1)
    }

    /// Set the row threshold.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Number of values per scanned tuple.
    pub fn arity(&self) -> usize {
        self.ranges.len()
    }

    /// Check every column of a tuple against its range.
    pub fn accepts(&self, tuple: &[f64]) -> bool {
        tuple.len() == self.arity()
            && tuple
                .iter()
                .zip(&self.ranges)
                .all(|(v, (lo, hi))| *lo <= *v && *v <= *hi)
    }
}

/// Profiles for the four report tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfiles {
    pub isotherm: TableProfile,
    pub multipoint_bet: TableProfile,
    pub tplot: TableProfile,
    pub bjh: TableProfile,
}

impl Default for TableProfiles {
    fn default() -> Self {
        Self {
            isotherm: TableProfile::default_isotherm(),
            multipoint_bet: TableProfile::default_multipoint_bet(),
            tplot: TableProfile::default_tplot(),
            bjh: TableProfile::default_bjh(),
        }
    }
}

/// Tuples cut from a value stream, split by the range check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    pub accepted: Vec<Vec<f64>>,
    pub rejected: usize,
}

/// Cut values into exact tuples of the profile's arity and range-check them.
///
/// A trailing partial tuple is ignored.
pub fn scan_values(values: &[f64], profile: &TableProfile) -> Scan {
    let mut scan = Scan::default();
    if profile.arity() == 0 {
        return scan;
    }
    for tuple in values.chunks_exact(profile.arity()) {
        if profile.accepts(tuple) {
            scan.accepted.push(tuple.to_vec());
        } else {
            scan.rejected += 1;
        }
    }
    scan
}

/// Scan every numeric token of a text region.
pub fn scan_region(region: &str, profile: &TableProfile) -> Scan {
    scan_values(&number_tokens(region), profile)
}

/// Isotherm points: (P/Po, volume) pairs.
pub fn parse_isotherm_points(text: &str, profile: &TableProfile) -> TableOutcome<IsothermPoint> {
    let mut pass = TablePass::seek("isotherm_points");
    let mut region = ISOTHERM_TABLE.slice(text);
    if region.is_empty() {
        region = ISOTHERM_TABLE_FALLBACK.slice(text);
    }
    if region.is_empty() {
        return pass.failed(0, 0);
    }

    pass.scanning();
    pass.finish(scan_region(region, profile), profile, |t| match *t {
        [p_over_p0, volume] => Some(IsothermPoint { p_over_p0, volume }),
        _ => None,
    })
}

/// Multi-point BET table: (P/Po, volume, BET transform) triples.
pub fn parse_multipoint_bet_table(
    text: &str,
    profile: &TableProfile,
) -> TableOutcome<MultipointBetRow> {
    let mut pass = TablePass::seek("multipoint_bet");
    let region = MBET_TABLE.slice(text);
    if region.is_empty() {
        return pass.failed(0, 0);
    }

    pass.scanning();
    pass.finish(scan_region(region, profile), profile, |t| match *t {
        [p_over_p0, volume, bet_transform] => Some(MultipointBetRow {
            p_over_p0,
            volume,
            bet_transform,
        }),
        _ => None,
    })
}

/// t-plot points. The report lists (P/Po, thickness, volume) triples; the
/// pressure column only serves the range check and is dropped.
pub fn parse_tplot_points(text: &str, profile: &TableProfile) -> TableOutcome<TPlotPoint> {
    let mut pass = TablePass::seek("tplot_points");
    let mut region = TPLOT_TABLE.slice(text);
    if region.is_empty() {
        region = TPLOT_SUMMARY.slice_or_all(text);
    }

    pass.scanning();
    pass.finish(scan_region(region, profile), profile, |t| match *t {
        [_, thickness_nm, volume] => Some(TPlotPoint {
            thickness_nm,
            volume,
        }),
        _ => None,
    })
}

/// BJH desorption table, laid out one value per line under its header.
///
/// The scan starts below the last bracketed unit line (such as `[cc/g]`)
/// within the lookahead window of the header, or right below the header
/// when there is none. Blank lines are skipped. Numeric lines are
/// collected until a non-numeric line appears after at least one full
/// row's worth of values.
pub fn parse_bjh_table(text: &str, profile: &TableProfile) -> TableOutcome<BjhRow> {
    let mut pass = TablePass::seek("bjh_desorption");
    let lines: Vec<&str> = text.lines().collect();

    let Some(start) = lines.iter().position(|l| l.contains(BJH_HEADER)) else {
        log::debug!("Table bjh_desorption: header not found");
        return pass.failed(0, 0);
    };
    let unit_end = lines.len().min(start + BJH_UNIT_LOOKAHEAD);
    let scan_start = (start..unit_end)
        .rev()
        .find(|&i| is_unit_line(lines[i]))
        .map_or(start + 1, |i| i + 1);

    pass.scanning();
    let arity = profile.arity();
    let mut values: Vec<f64> = Vec::new();
    for line in lines.iter().skip(scan_start).take(BJH_SCAN_LIMIT) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match numeric_line(line) {
            Some(v) => values.push(v),
            None if values.len() >= arity => break,
            None => {}
        }
    }

    pass.finish(scan_values(&values, profile), profile, BjhRow::from_slice)
}

fn is_unit_line(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 2 && line.starts_with('[') && line.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_stream_rejects_whole_tuples() {
        let scan = scan_region(
            "0.05 120.0 0.90 0.30 1900.0 1.1",
            &TableProfile::default_multipoint_bet(),
        );
        assert_eq!(scan.accepted, vec![vec![0.05, 120.0, 0.90]]);
        assert_eq!(scan.rejected, 1);
    }

    #[test]
    fn test_single_valid_row_is_below_mbet_minimum() {
        let text = "Multi-Point BET Plot\n0.05 120.0 0.90 0.30 1900.0 1.1\nt-plot";
        let outcome = parse_multipoint_bet_table(text, &TableProfile::default_multipoint_bet());
        assert_eq!(outcome.state, TableState::Failed);
        assert!(outcome.table.is_none());
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.rejected, 1);
    }

    #[test]
    fn test_mbet_minimum_row_gate() {
        let profile = TableProfile::default_multipoint_bet();
        let two = "Multi-Point BET Plot\n0.10 100 1.0\n0.20 110 2.0\nt-plot";
        assert!(parse_multipoint_bet_table(two, &profile).table.is_none());

        let three = "Multi-Point BET Plot\n0.10 100 1.0\n0.20 110 2.0\n0.30 120 3.0\nt-plot";
        let outcome = parse_multipoint_bet_table(three, &profile);
        assert_eq!(outcome.state, TableState::RowsFound);
        assert_eq!(outcome.table.map(|t| t.row_count()), Some(3));
    }

    #[test]
    fn test_mbet_absent_without_region() {
        let outcome = parse_multipoint_bet_table(
            "0.10 100 1.0\n0.20 110 2.0\n0.30 120 3.0",
            &TableProfile::default_multipoint_bet(),
        );
        assert_eq!(outcome.state, TableState::Failed);
    }

    #[test]
    fn test_pass_transitions() {
        use TableState::*;
        let profile = TableProfile::default_multipoint_bet();

        let missing = parse_multipoint_bet_table("0.10 100 1.0", &profile);
        assert_eq!(missing.transitions, vec![Seeking, Failed]);
        assert!(!missing.scanned());

        let text = "Multi-Point BET Plot\n0.10 100 1.0\nt-plot";
        let short = parse_multipoint_bet_table(text, &profile);
        assert_eq!(short.transitions, vec![Seeking, Scanning, Failed]);
        assert!(short.scanned());

        let text = "Multi-Point BET Plot\n0.10 100 1.0\n0.20 110 2.0\n0.30 120 3.0\nt-plot";
        let found = parse_multipoint_bet_table(text, &profile);
        assert_eq!(found.transitions, vec![Seeking, Scanning, RowsFound]);
        assert_eq!(found.transitions.last(), Some(&found.state));
    }

    #[test]
    fn test_bjh_missing_header_never_scans() {
        let outcome = parse_bjh_table("3.5\n0.01\n12.1", &TableProfile::default_bjh());
        assert_eq!(outcome.transitions, vec![TableState::Seeking, TableState::Failed]);
    }

    #[test]
    fn test_isotherm_sorted_and_last_wins() {
        let text = "Relative Pressure, P/Po\n0.30 150.0\n0.10 100.0\n0.30 155.0\n\
                    Isotherm\nSlope = 1.0";
        let table = parse_isotherm_points(text, &TableProfile::default_isotherm())
            .into_table()
            .unwrap();
        assert_eq!(table.keys(), vec![0.10, 0.30]);
        assert_eq!(table.rows()[1].volume, 155.0);
    }

    #[test]
    fn test_isotherm_region_closed_by_slope() {
        let text = "Relative Pressure, P/Po\n0.10 100.0\nIsotherm\nSlope = 0.5\n0.20 300.0";
        let table = parse_isotherm_points(text, &TableProfile::default_isotherm())
            .into_table()
            .unwrap();
        assert_eq!(table.keys(), vec![0.10]);
    }

    #[test]
    fn test_isotherm_absent_without_header() {
        let outcome = parse_isotherm_points("0.10 100.0", &TableProfile::default_isotherm());
        assert_eq!(outcome.state, TableState::Failed);
    }

    #[test]
    fn test_isotherm_values_in_range() {
        let text = "Relative Pressure, P/Po\n0.10 100.0\n1.50 100.0\n0.20 4.0\n0.40 2000.0";
        let profile = TableProfile::default_isotherm();
        let table = parse_isotherm_points(text, &profile).into_table().unwrap();
        for row in table.rows() {
            assert!(profile.accepts(&row.values()));
        }
        assert_eq!(table.keys(), vec![0.10, 0.40]);
    }

    #[test]
    fn test_tplot_drops_pressure_column() {
        let text = "t-plot\nStatistical Thickness (nm)\n\
                    0.10 0.35 80.0\n0.15 0.40 90.0\n0.20 0.45 100.0\nBJH desorption";
        let table = parse_tplot_points(text, &TableProfile::default_tplot())
            .into_table()
            .unwrap();
        assert_eq!(table.keys(), vec![0.35, 0.40, 0.45]);
        assert_eq!(table.rows()[0].volume, 80.0);
    }

    #[test]
    fn test_tplot_falls_back_to_summary_window() {
        let text = "t-plot\n0.10 0.35 80.0\n0.15 0.40 90.0\n0.20 0.45 100.0\nBJH";
        let outcome = parse_tplot_points(text, &TableProfile::default_tplot());
        assert_eq!(outcome.state, TableState::RowsFound);
    }

    fn bjh_text(values: &[&str], tail: &str) -> String {
        let mut text =
            String::from("BJH desorption\nPore Diameter (nm)\nPore Volume\n[nm]\n[cc/g]\n\n");
        for v in values {
            text.push_str(v);
            text.push('\n');
        }
        text.push_str(tail);
        text
    }

    #[test]
    fn test_bjh_seven_value_rows() {
        let values = [
            "3.5", "0.010", "12.1", "0.002", "0.50", "0.020", "9.0", //
            "2.1", "0.020", "20.3", "0.004", "0.90", "0.040", "17.0", //
            "9.9",
        ];
        let text = bjh_text(&values, "Page 3 of 3\n1.0\n");
        let table = parse_bjh_table(&text, &TableProfile::default_bjh())
            .into_table()
            .unwrap();
        assert_eq!(table.keys(), vec![2.1, 3.5]);
        assert_eq!(table.rows()[1].ds_logd, 9.0);
    }

    #[test]
    fn test_bjh_missing_header() {
        let outcome = parse_bjh_table("1\n2\n3\n4\n5\n6\n7\n", &TableProfile::default_bjh());
        assert_eq!(outcome.state, TableState::Failed);
    }

    #[test]
    fn test_bjh_incomplete_row_is_absent() {
        let text = bjh_text(&["1.0", "2.0", "3.0"], "");
        let outcome = parse_bjh_table(&text, &TableProfile::default_bjh());
        assert!(outcome.table.is_none());
    }

    #[test]
    fn test_bjh_text_before_enough_values_is_skipped() {
        let values = ["Desorption", "3.5", "0.01", "12.1", "0.002", "0.5", "0.02", "9.0"];
        let outcome = parse_bjh_table(&bjh_text(&values, "end\n"), &TableProfile::default_bjh());
        assert_eq!(outcome.table.map(|t| t.row_count()), Some(1));
    }

    #[test]
    fn test_unit_line() {
        assert!(is_unit_line("  [cc/g] "));
        assert!(!is_unit_line("[cc/g] 1.0"));
        assert!(!is_unit_line("["));
    }
}
