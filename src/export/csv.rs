//! CSV export of reconstructed tables.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Table, TableRow};

/// Write a table as CSV: one header line with the column names, then one
/// line per row.
pub fn write_table<R, W>(table: &Table<R>, writer: W) -> Result<()>
where
    R: TableRow + Serialize,
    W: Write,
{
    let mut csv = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(R::COLUMNS)?;
    for row in table.rows() {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Render a table as a CSV string.
pub fn table_to_csv<R: TableRow + Serialize>(table: &Table<R>) -> Result<String> {
    let mut buf = Vec::new();
    write_table(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Render(format!("CSV is not UTF-8: {}", e)))
}

/// Write a table to a CSV file, replacing any existing file.
pub fn write_table_csv<R: TableRow + Serialize>(table: &Table<R>, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_table(table, file)?;
    log::info!("Wrote {} rows to {}", table.row_count(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BjhRow, MultipointBetRow};

    #[test]
    fn test_header_and_rows() {
        let table = Table::from_candidates(vec![
            MultipointBetRow {
                p_over_p0: 0.2,
                volume: 110.0,
                bet_transform: 2.5,
            },
            MultipointBetRow {
                p_over_p0: 0.1,
                volume: 100.0,
                bet_transform: 1.0,
            },
        ]);

        let csv = table_to_csv(&table).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "P_over_P0,Vol_cc_g_STP,BET_transform");
        assert_eq!(lines[1], "0.1,100.0,1.0");
        assert_eq!(lines[2], "0.2,110.0,2.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_bjh_header() {
        let table = Table::from_candidates(vec![BjhRow::from_slice(&[
            3.5, 0.01, 12.0, 0.002, 0.5, 0.02, 9.0,
        ])
        .unwrap()]);
        let csv = table_to_csv(&table).unwrap();
        let header = "Diameter_nm,PoreVol_ccg,PoreArea_m2g,dV_d,dS_d,dV_logd,dS_logd\n";
        assert!(csv.starts_with(header));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multipoint_bet.csv");
        let table: Table<MultipointBetRow> = Table::from_candidates(Vec::new());
        write_table_csv(&table, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "P_over_P0,Vol_cc_g_STP,BET_transform\n"
        );
    }
}
