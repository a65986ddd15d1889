//! Measurement ID synthesis.
//!
//! A measurement ID looks like
//! `11TDR_0021-0008_CBE01_BET01_0001_20210612-142626.dat`: operator code,
//! sample identifier, device code, run code, zero-padded index and a compact
//! timestamp. Every component has a fallback, so building an ID never fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;

const FALLBACK_OPERATOR: &str = "SCIENT";
const FALLBACK_SAMPLE: &str = "0000-0000";
const FALLBACK_DEVICE: &str = "DEV01";
const RUN_CODE: &str = "BET01";
const FALLBACK_FILE_NAME: &str = "BET_PDF_Report.pdf";

/// Formats tried in order against `"{date} {time}"`.
const TIMESTAMP_FORMATS: &[TimestampFormat] = &[
    TimestampFormat::DateTime("%Y-%m-%d %H:%M:%S"),
    TimestampFormat::DateTime("%Y-%m-%d %H:%M"),
    TimestampFormat::Date("%Y-%m-%d"),
    TimestampFormat::DateTime("%d.%m.%Y %H:%M:%S"),
    TimestampFormat::Date("%d.%m.%Y"),
];

/// A date-only format parses to midnight.
enum TimestampFormat {
    DateTime(&'static str),
    Date(&'static str),
}

impl TimestampFormat {
    fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt).ok(),
            Self::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }
}

static OPERATOR_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]{3,}").unwrap());
static SAMPLE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{4}").unwrap());

/// The metadata an ID is built from. Empty strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInputs {
    pub index: i64,
    pub file_name: String,
    pub date: String,
    pub time: String,
    pub operator: String,
    pub instrument: String,
    pub serial_number: String,
    pub comment1: String,
    pub comment3: String,
}

impl MeasurementInputs {
    /// Inputs with only the sequence index set.
    pub fn new(index: i64) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Project the ID inputs out of an extraction bundle.
    ///
    /// `file_name` is the uploaded report's name. When it is empty the
    /// instrument's own measurement file name stands in.
    pub fn from_bundle(index: i64, file_name: &str, bundle: &Bundle) -> Self {
        let general = &bundle.general;

        let measurement_file = general
            .non_empty("Filename")
            .or_else(|| general.non_empty("Sample ID"))
            .unwrap_or("");
        let file_name = [file_name, measurement_file]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(FALLBACK_FILE_NAME);

        let (date, time) = general
            .first_date()
            .map(split_date_time)
            .unwrap_or_default();

        let operator = if general.operator_primary.is_empty() {
            general.operators.first().cloned().unwrap_or_default()
        } else {
            general.operator_primary.clone()
        };

        let comment1 = if measurement_file.is_empty() {
            general.get("Comment").unwrap_or("")
        } else {
            measurement_file
        };

        let pretreatment: Vec<&str> = ["OutgasTemp", "Outgas Time", "Analysis gas"]
            .iter()
            .filter_map(|label| general.non_empty(label))
            .collect();

        Self {
            index,
            file_name: file_name.to_string(),
            date,
            time,
            operator,
            instrument: general.get("Instrument").unwrap_or("").to_string(),
            serial_number: String::new(),
            comment1: comment1.to_string(),
            comment3: pretreatment.join(", "),
        }
    }
}

fn split_date_time(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let date = parts.next().unwrap_or("").to_string();
    let time = parts.next().unwrap_or("").to_string();
    (date, time)
}

/// Build a measurement ID, using the current UTC time when the inputs hold
/// no parseable date.
pub fn build_measurement_id(inputs: &MeasurementInputs) -> String {
    build_measurement_id_at(inputs, Utc::now())
}

/// Build a measurement ID with an explicit fallback clock.
pub fn build_measurement_id_at(inputs: &MeasurementInputs, now: DateTime<Utc>) -> String {
    let op = operator_code(&inputs.operator);
    let sample = sample_id(&[&inputs.file_name, &inputs.comment1, &inputs.comment3])
        .unwrap_or(FALLBACK_SAMPLE);
    let device = device_code(&inputs.serial_number, &inputs.instrument);
    let ts = parse_timestamp(&inputs.date, &inputs.time)
        .unwrap_or_else(|| now.naive_utc())
        .format("%Y%m%d-%H%M%S");

    format!(
        "{}_{}_{}_{}_{:04}_{}.dat",
        op, sample, device, RUN_CODE, inputs.index, ts
    )
}

/// First run of three or more alphanumerics, else the first token.
fn operator_code(operator: &str) -> String {
    let operator = operator.trim();
    if operator.is_empty() {
        return FALLBACK_OPERATOR.to_string();
    }
    if let Some(m) = OPERATOR_CODE_RE.find(operator) {
        return m.as_str().to_string();
    }
    operator
        .split_whitespace()
        .next()
        .unwrap_or(FALLBACK_OPERATOR)
        .to_string()
}

/// First `NNNN-NNNN` found, searching the sources in order.
fn sample_id<'a>(sources: &[&'a str]) -> Option<&'a str> {
    sources
        .iter()
        .find_map(|s| SAMPLE_ID_RE.find(s).map(|m| m.as_str()))
}

/// Serial number wins over the instrument label when present.
fn device_code(serial_number: &str, instrument: &str) -> String {
    let source = if serial_number.trim().is_empty() {
        instrument
    } else {
        serial_number
    };
    let code: String = source
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if code.is_empty() {
        FALLBACK_DEVICE.to_string()
    } else {
        code
    }
}

fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combo = format!("{} {}", date.trim(), time.trim());
    let combo = combo.trim();
    if combo.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS.iter().find_map(|fmt| fmt.parse(combo))
}
