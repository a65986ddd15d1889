//! End-to-end extraction over synthetic report PDFs.

mod common;

use std::fs;

use common::{build_report_pdf, report_pdf, REPORT_LINES};
use unbet::{
    extract_bytes, extract_file, extract_highlight_strings, load_file, Bundle, Error, JsonFormat,
    Unbet,
};

#[test]
fn test_load_report_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    fs::write(&path, report_pdf()).unwrap();

    let doc = load_file(&path).unwrap();
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.highlight_count(), 3);

    let text = doc.full_text();
    assert!(text.contains("Operator: Jane Doe"));
    assert!(text.contains("Pore Diameter (nm)"));
    let first = text.find("Operator: Jane Doe").unwrap();
    let last = text.find("Operator: John Roe").unwrap();
    assert!(first < last);
}

#[test]
fn test_extract_bytes_fills_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = extract_bytes(&report_pdf(), dir.path()).unwrap();

    assert_eq!(bundle.general.operators, vec!["Jane Doe", "John Roe"]);
    assert_eq!(bundle.general.operator_primary, "Jane Doe");
    assert_eq!(bundle.general.dates, vec!["2021-06-12 14:26:26"]);
    assert_eq!(bundle.general.fields["Sample ID"], "0021-0008");
    assert_eq!(bundle.general.fields["Instrument"], "Autosorb iQ");

    assert_eq!(bundle.tables.present(), 4);
    let isotherm = bundle.tables.isotherm_points.as_ref().unwrap();
    assert_eq!(isotherm.row_count(), 2);
    assert_eq!(bundle.tables.multipoint_bet.as_ref().unwrap().row_count(), 3);
    assert_eq!(bundle.tables.tplot_points.as_ref().unwrap().row_count(), 3);
    assert_eq!(bundle.tables.bjh_desorption.as_ref().unwrap().row_count(), 1);
}

#[test]
fn test_extract_file_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    fs::write(&path, report_pdf()).unwrap();
    let out = dir.path().join("out");

    let bundle = extract_file(&path, &out).unwrap();

    let csv_keys: Vec<&str> = bundle.artifacts.csvs.keys().map(String::as_str).collect();
    assert_eq!(csv_keys, vec!["isotherm", "multipoint_bet", "tplot", "bjh"]);
    assert_eq!(bundle.artifacts.plots.len(), 3);
    assert!(bundle.artifacts.narrative.is_none());
    for path in bundle.artifacts.paths() {
        assert!(path.exists(), "missing artifact {}", path.display());
    }

    let isotherm_csv = fs::read_to_string(&bundle.artifacts.csvs["isotherm"]).unwrap();
    let mut lines = isotherm_csv.lines();
    assert_eq!(lines.next().unwrap().split(',').count(), 2);
    assert_eq!(lines.count(), 2);

    let json_path = bundle.artifacts.json.as_ref().unwrap();
    let saved: Bundle = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(saved, bundle);
}

#[test]
fn test_narrative_written_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = Unbet::new()
        .with_out_dir(dir.path())
        .with_narrative(true)
        .with_plots(false)
        .extract_bytes(&report_pdf())
        .unwrap();

    assert!(bundle.artifacts.plots.is_empty());
    let narrative = bundle.artifacts.narrative.as_ref().unwrap();
    let md = fs::read_to_string(narrative).unwrap();
    assert!(md.starts_with("# BET Analysis Report (Auto-Extracted)"));
    assert!(md.contains("Jane Doe"));
    assert!(!md.contains("## Plots"));
}

#[test]
fn test_highlight_strings_in_reading_order() {
    let highlights = extract_highlight_strings(report_pdf().as_slice()).unwrap();
    assert_eq!(
        highlights,
        vec![
            "Operator: Jane Doe",
            "Sample ID: 0021-0008",
            "Operator: John Roe",
        ]
    );
}

#[test]
fn test_highlight_fields_parsed() {
    let bundle = Unbet::new()
        .with_highlights(true)
        .extract_bytes(&report_pdf())
        .unwrap();

    assert_eq!(bundle.highlight_fields["Operator"], "Jane Doe");
    assert_eq!(bundle.highlight_fields["Sample ID"], "0021-0008");
    assert!(bundle.artifacts.paths().is_empty());
}

#[test]
fn test_highlights_skipped_by_default() {
    let bundle = Unbet::new().extract_bytes(&report_pdf()).unwrap();
    assert!(bundle.highlight_fields.is_empty());
}

#[test]
fn test_extraction_is_deterministic() {
    let data = report_pdf();
    let first = Unbet::new().with_highlights(true).extract_bytes(&data).unwrap();
    let second = Unbet::new().with_highlights(true).extract_bytes(&data).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        unbet::export::to_json(&first, JsonFormat::Compact).unwrap(),
        unbet::export::to_json(&second, JsonFormat::Compact).unwrap()
    );
}

#[test]
fn test_report_without_tables() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_report_pdf(&REPORT_LINES[..5], &[]);
    let bundle = extract_bytes(&data, dir.path()).unwrap();

    assert_eq!(bundle.general.operator_primary, "Jane Doe");
    assert_eq!(bundle.tables.present(), 0);
    assert!(bundle.artifacts.csvs.is_empty());
    assert!(bundle.artifacts.plots.is_empty());
    assert!(bundle.artifacts.json.as_ref().unwrap().exists());
}

#[test]
fn test_measurement_id_from_extracted_bundle() {
    let bundle = Unbet::new().extract_bytes(&report_pdf()).unwrap();
    let inputs = unbet::MeasurementInputs::from_bundle(3, "", &bundle);
    assert_eq!(
        unbet::build_measurement_id(&inputs),
        "Jane_0021-0008_Autosorb_BET01_0003_20210612-142626.dat"
    );
}

#[test]
fn test_non_pdf_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    fs::write(&path, "Operator: Jane Doe\n").unwrap();

    let err = extract_file(&path, dir.path().join("out")).unwrap_err();
    assert!(err.is_format_error());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_report() {
    let dir = tempfile::tempdir().unwrap();
    let err = extract_file(dir.path().join("absent.pdf"), dir.path()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
