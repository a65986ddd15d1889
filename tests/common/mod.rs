//! Synthetic report PDFs for integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub const PAGE_TOP: i64 = 750;
pub const LINE_HEIGHT: i64 = 14;
pub const LEFT: i64 = 72;

/// A report covering the header, every summary and every table.
pub const REPORT_LINES: &[&str] = &[
    "Operator: Jane Doe",
    "Date: 2021-06-12 14:26:26",
    "Sample ID: 0021-0008",
    "Filename: 0021-0008.qps",
    "Instrument: Autosorb iQ",
    "Relative Pressure, P/Po",
    "0.10 100.0",
    "0.20 110.0",
    "Isotherm",
    "Slope = 15.2",
    "Intercept = 0.12",
    "MBET summary",
    "Multi-Point BET Plot",
    "0.10 100.0 1.1",
    "0.20 110.0 2.3",
    "0.30 120.0 3.6",
    "Multi-Point BET",
    "Slope = 14.9",
    "t-plot",
    "Statistical Thickness (nm)",
    "0.10 0.35 80.0",
    "0.15 0.40 90.0",
    "0.20 0.45 100.0",
    "BJH desorption",
    "Pore Diameter (nm)",
    "[nm]",
    "3.5",
    "0.01",
    "12.1",
    "0.002",
    "0.5",
    "0.02",
    "9.0",
    "Operator: John Roe",
    "End of report",
];

/// Baseline of the line at `index`, in PDF coordinates.
pub fn baseline(index: usize) -> i64 {
    PAGE_TOP - LINE_HEIGHT * index as i64
}

/// Build a one-page PDF with one text line per entry, and a highlight
/// annotation over each line listed in `highlighted`.
pub fn build_report_pdf(lines: &[&str], highlighted: &[usize]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
        operations.push(Operation::new("Td", vec![LEFT.into(), baseline(i).into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("content encodes"),
    ));

    let annots: Vec<Object> = highlighted
        .iter()
        .map(|&i| {
            let y = baseline(i);
            doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Highlight",
                "Rect" => vec![60.into(), (y - 3).into(), 400.into(), (y + 9).into()],
                "QuadPoints" => vec![
                    60.into(), (y + 9).into(), 400.into(), (y + 9).into(),
                    60.into(), (y - 3).into(), 400.into(), (y - 3).into(),
                ],
            })
            .into()
        })
        .collect();

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
        "Annots" => annots,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("document saves");
    buf
}

/// The full report with highlights over the operator, sample and
/// second-operator lines.
pub fn report_pdf() -> Vec<u8> {
    build_report_pdf(REPORT_LINES, &[33, 0, 2])
}
