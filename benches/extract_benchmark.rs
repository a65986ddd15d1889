//! Benchmarks for unbet extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the extraction passes over synthetic report data.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Builds report text with `points` rows in each table.
fn create_report_text(points: usize) -> String {
    let mut text = String::new();
    text.push_str("Operator: Jane Doe\nDate: 2021-06-12 14:26:26\nSample ID: 0021-0008\n");

    text.push_str("Relative Pressure, P/Po\n");
    for i in 0..points {
        let p = 0.01 + 0.9 * i as f64 / points as f64;
        text.push_str(&format!("{:.4} {:.2}\n", p, 80.0 + 100.0 * p));
    }
    text.push_str("Isotherm\nSlope = 15.2\nIntercept = 0.12\nC constant = 120\n");

    text.push_str("MBET summary\nMulti-Point BET Plot\n");
    for i in 0..points {
        let p = 0.05 + 0.25 * i as f64 / points as f64;
        text.push_str(&format!("{:.4} {:.2} {:.4}\n", p, 100.0 + 50.0 * p, 1.0 + 5.0 * p));
    }
    text.push_str("Multi-Point BET\nSlope = 14.9\n");

    text.push_str("t-plot\nStatistical Thickness (nm)\n");
    for i in 0..points {
        let p = 0.1 + 0.5 * i as f64 / points as f64;
        text.push_str(&format!("{:.4} {:.4} {:.2}\n", p, 0.3 + p, 80.0 + 100.0 * p));
    }

    text.push_str("BJH desorption\nPore Diameter (nm)\n[nm]\n");
    for i in 0..points {
        let d = 3.0 + i as f64;
        text.push_str(&format!("{:.2}\n0.01\n{:.2}\n0.002\n0.5\n0.02\n9.0\n", d, 12.0 + d));
    }
    text.push_str("End of report\n");
    text
}

/// Builds a one-page PDF showing `lines`, one text object per line.
fn create_test_pdf(lines: &[&str]) -> Vec<u8> {
    let mut stream = String::new();
    for (i, line) in lines.iter().enumerate() {
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        stream.push_str(&format!(
            "BT /F1 10 Tf 72 {} Td ({}) Tj ET\n",
            760 - 12 * i as i64,
            escaped
        ));
    }

    let mut content = String::new();
    content.push_str("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    content.push_str("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    content.push_str(
        "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>\nendobj\n",
    );
    content.push_str(&format!(
        "4 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
        stream.len(),
        stream
    ));
    content.push_str(
        "5 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n",
    );

    // Placeholder offsets; lopdf rebuilds the table when it does not match
    let xref_offset = content.len();
    content.push_str("xref\n0 6\n0000000000 65535 f \n");
    for _ in 1..6 {
        content.push_str("0000000000 00000 n \n");
    }
    content.push_str(&format!(
        "trailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        xref_offset
    ));

    content.into_bytes()
}

/// Benchmark the text passes at various table sizes.
fn bench_text_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_extraction");

    for points in [10, 50, 200].iter() {
        let text = create_report_text(*points);

        group.bench_function(format!("{}_points", points), |b| {
            b.iter(|| unbet::extract_text_bundle(black_box(&text)));
        });
    }

    group.finish();
}

/// Benchmark loading and extracting a report PDF without writing artifacts.
fn bench_pdf_extraction(c: &mut Criterion) {
    let text = create_report_text(20);
    let lines: Vec<&str> = text.lines().collect();
    let data = create_test_pdf(&lines);

    c.bench_function("pdf_extraction", |b| {
        b.iter(|| {
            // Synthetic PDFs may not be fully valid
            let _ = unbet::Unbet::new().lenient().extract_bytes(black_box(&data));
        });
    });
}

/// Benchmark measurement ID synthesis.
fn bench_measurement_id(c: &mut Criterion) {
    let inputs = unbet::MeasurementInputs {
        index: 7,
        file_name: "0021-0008.qps".to_string(),
        date: "2021-06-12".to_string(),
        time: "14:26:26".to_string(),
        operator: "Jane Doe".to_string(),
        instrument: "Autosorb iQ".to_string(),
        ..unbet::MeasurementInputs::new(7)
    };

    c.bench_function("measurement_id", |b| {
        b.iter(|| unbet::build_measurement_id(black_box(&inputs)));
    });
}

criterion_group!(
    benches,
    bench_text_extraction,
    bench_pdf_extraction,
    bench_measurement_id,
);
criterion_main!(benches);
