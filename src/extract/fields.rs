//! Labeled field extraction.
//!
//! The label catalog is plain data: an ordered array of [`FieldPattern`]
//! records. Full-text passes and the highlight path both read from it.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::model::{FieldMap, GeneralFields};
use crate::text::normalize_spaces;

use super::section::{ISOTHERM_SUMMARY, MBET_SUMMARY, TPLOT_SUMMARY};

/// A label and the patterns that can fill it, tried in order.
///
/// Every pattern captures the value in its first group.
#[derive(Debug, Clone, Copy)]
pub struct FieldPattern {
    pub label: &'static str,
    pub patterns: &'static [&'static str],
}

const fn field(label: &'static str, patterns: &'static [&'static str]) -> FieldPattern {
    FieldPattern { label, patterns }
}

/// Catalog for highlight fragments, in precedence order.
pub const FIELD_CATALOG: &[FieldPattern] = &[
    field("Operator", &[r"\bOperator:\s*([^\n]+)"]),
    field("Date", &[r"\bDate:\s*([0-9/\-:. ]+)"]),
    field("Sample ID", &[r"\bSample ID:\s*([^\n]+)"]),
    field("Filename", &[r"\bFilename:\s*([^\n]+)"]),
    field("Sample Description", &[r"\bSample Desc:\s*([^\n]+)"]),
    field("Comment", &[r"\bComment:\s*([^\n]+)"]),
    field("Sample weight", &[r"\bSample weight:\s*([^\n]+)"]),
    field("Sample Volume", &[r"\bSample Volume:\s*([^\n]+)"]),
    field("Outgas Time", &[r"\bOutgas Time:\s*([^\n]+)"]),
    field("OutgasTemp", &[r"\bOutgasTemp:\s*([^\n]+)"]),
    field("Analysis gas", &[r"\bAnalysis gas:\s*([^\n]+)"]),
    field("Bath Temp", &[r"\bBath Temp:\s*([^\n]+)"]),
    field("Press. Tolerance", &[r"\bPress\. Tolerance:\s*([^\n]+)"]),
    field("Equil time", &[r"\bEquil time:\s*([^\n]+)"]),
    field("Equil timeout", &[r"\bEquil timeout:\s*([^\n]+)"]),
    field("Analysis Time", &[r"\bAnalysis Time:\s*([^\n]+)"]),
    field("End of run", &[r"\bEnd of run:\s*([^\n]+)"]),
    field("Instrument (verbatim)", &[r"\bInstrument:\s*([^\n]+)"]),
    field("Cell ID", &[r"\bCell ID:\s*([^\n]+)"]),
    field("Isotherm Slope", &[r"\bSlope\s*=\s*([^\s]+)"]),
    field("Isotherm Intercept", &[r"\bIntercept\s*=\s*([^\s]+)"]),
    field("Isotherm r", &[r"\bCorrelation coefficient,\s*r\s*=\s*([^\s]+)"]),
    field("C constant", &[r"\bC constant\s*=\s*([^\s]+)"]),
    field("Surface Area", &[r"\bSurface Area\s*=\s*([^\n]+)"]),
    field("Thickness method", &[r"\bThickness method:\s*([^\n]+)"]),
    field("Multi-Point BET Slope", &[r"\bMulti-Point BET.*?Slope\s*=\s*([^\s]+)"]),
    field("Multi-Point BET Intercept", &[r"\bMulti-Point BET.*?Intercept\s*=\s*([^\s]+)"]),
    field("Multi-Point BET r", &[r"\bMulti-Point BET.*?r\s*=\s*([^\s]+)"]),
    field("Micropore volume", &[r"\bMicropore volume\s*=\s*([^\n]+)"]),
    field("Micropore area", &[r"\bMicropore area\s*=\s*([^\n]+)"]),
    field("External surface area", &[r"\bExternal surface area\s*=\s*([^\n]+)"]),
    field("t-Plot Surface Area", &[r"\bSurface Area\s*=\s*([^\n]+)"]),
    field("Pore Volume", &[r"\bPore Volume\s*=\s*([^\n]+)"]),
    field("Pore Diameter Dv(d)", &[r"\bPore Diameter Dv\(d\)\s*=\s*([^\n]+)"]),
    field("BJH Avg Pore Diameter", &[r"\bAverage Pore Diameter\s*[:=]\s*([^\n]+)"]),
    field("BJH Pore Volume", &[r"\bBJH Pore Volume\s*[:=]\s*([^\n]+)"]),
    field("BJH Pore Surface Area", &[r"\bPore Surface Area\s*[:=]\s*([^\n]+)"]),
];

const ISOTHERM_FIELDS: &[FieldPattern] = &[
    field("Isotherm Slope", &[r"Slope\s*=\s*([^\s]+)"]),
    field("Isotherm Intercept", &[r"Intercept\s*=\s*([^\s]+)"]),
    field("Isotherm r", &[r"Correlation coefficient,\s*r\s*=\s*([^\s]+)"]),
    field("C constant", &[r"C constant\s*=\s*([^\s]+)"]),
    field(
        "Surface Area",
        &[r"Surface Area\s*=\s*([0-9.+\-eE ]+(?:m²|mÂ²|m2)/g)"],
    ),
];

const MBET_FIELDS: &[FieldPattern] = &[
    field("Thickness method", &[r"Thickness method:\s*([^\n]+)"]),
    field("Multi-Point BET Slope", &[r"Slope\s*=\s*([^\s]+)"]),
    field("Multi-Point BET Intercept", &[r"Intercept\s*=\s*([^\s]+)"]),
    field("Multi-Point BET r", &[r"Correlation coefficient,\s*r\s*=\s*([^\s]+)"]),
    field("Micropore volume", &[r"Micropore volume\s*=\s*([^\n]+)"]),
    field("Micropore area", &[r"Micropore area\s*=\s*([^\n]+)"]),
    field("External surface area", &[r"External surface area\s*=\s*([^\n]+)"]),
];

const TPLOT_FIELDS: &[FieldPattern] = &[
    field("t-Plot Surface Area", &[r"Surface Area\s*=\s*([^\n]+)"]),
    field("Pore Volume", &[r"Pore Volume\s*=\s*([^\n]+)"]),
    field("Pore Diameter Dv(d)", &[r"Pore Diameter Dv\(d\)\s*=\s*([^\n]+)"]),
];

/// Labels grabbed by the general pass, and the key each is stored under.
const GENERAL_LABELS: &[(&str, &str)] = &[
    ("Sample ID", "Sample ID"),
    ("Filename", "Filename"),
    ("Sample Desc", "Sample Description"),
    ("Comment", "Comment"),
    ("Sample weight", "Sample weight"),
    ("Sample Volume", "Sample Volume"),
    ("Outgas Time", "Outgas Time"),
    ("OutgasTemp", "OutgasTemp"),
    ("Analysis gas", "Analysis gas"),
    ("Bath Temp", "Bath Temp"),
    ("Press. Tolerance", "Press. Tolerance"),
    ("Equil time", "Equil time"),
    ("Equil timeout", "Equil timeout"),
    ("Analysis Time", "Analysis Time"),
    ("End of run", "End of run"),
    ("Instrument", "Instrument"),
    ("Cell ID", "Cell ID"),
];

/// Tokens that start a new label inside a highlight string.
const LABEL_BREAKS: &[&str] = &[
    " Operator:",
    " Sample ",
    " Analysis ",
    " Surface Area",
    " Slope =",
    " Intercept =",
    " C constant=",
    " Correlation coefficient",
    " Thickness method:",
];

/// A catalog entry with compiled patterns.
struct CompiledField {
    label: &'static str,
    regexes: Vec<Regex>,
}

fn compile(catalog: &[FieldPattern]) -> Vec<CompiledField> {
    catalog
        .iter()
        .map(|entry| CompiledField {
            label: entry.label,
            regexes: entry.patterns.iter().map(|p| case_insensitive(p)).collect(),
        })
        .collect()
}

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

static COMPILED_CATALOG: Lazy<Vec<CompiledField>> = Lazy::new(|| compile(FIELD_CATALOG));
static COMPILED_ISOTHERM: Lazy<Vec<CompiledField>> = Lazy::new(|| compile(ISOTHERM_FIELDS));
static COMPILED_MBET: Lazy<Vec<CompiledField>> = Lazy::new(|| compile(MBET_FIELDS));
static COMPILED_TPLOT: Lazy<Vec<CompiledField>> = Lazy::new(|| compile(TPLOT_FIELDS));

static OPERATOR_RE: Lazy<Regex> = Lazy::new(|| case_insensitive(r"\bOperator:\s*([^\n]+)"));
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    case_insensitive(r"\bDate[: ]\s*([0-9]{4}[/\-][0-9]{2}[/\-][0-9]{2}(?:\s[0-9:]+)?)")
});
static GENERAL_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    GENERAL_LABELS
        .iter()
        .map(|(label, key)| {
            let pattern = format!(r"\b{}:\s*([^\n]*)", regex::escape(label));
            (*key, case_insensitive(&pattern))
        })
        .collect()
});

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Break highlight strings into label:value fragments.
///
/// Each string is cut on runs of two or more whitespace characters, then
/// normalized, then cut again before every known label token.
pub fn expand_snippets(snippets: &[String]) -> Vec<String> {
    let mut fragments = Vec::new();
    for snippet in snippets {
        for piece in MULTI_SPACE_RE.split(snippet) {
            let piece = normalize_spaces(piece);
            split_before_labels(&piece, &mut fragments);
        }
    }
    fragments
}

fn split_before_labels(piece: &str, out: &mut Vec<String>) {
    let mut cuts: Vec<usize> = piece
        .match_indices(' ')
        .map(|(i, _)| i)
        .filter(|&i| i > 0 && LABEL_BREAKS.iter().any(|t| piece[i..].starts_with(t)))
        .collect();
    cuts.push(piece.len());

    let mut start = 0;
    for cut in cuts {
        let fragment = piece[start..cut].trim();
        if !fragment.is_empty() {
            out.push(fragment.to_string());
        }
        start = cut;
    }
}

/// Turn highlight strings into a field map.
///
/// Fragments are tested against [`FIELD_CATALOG`] in order. A label that
/// already holds a value longer than two characters is skipped. The first
/// matching pattern consumes the fragment: it fills an absent label, or
/// replaces a short (two characters or less) value with a longer one.
/// A fragment no pattern matches but that contains a colon becomes an
/// ad-hoc `label: value` pair when both sides are non-empty and the label
/// is new.
pub fn parse_highlights(highlights: &[String]) -> FieldMap {
    let mut data = FieldMap::new();

    for fragment in expand_snippets(highlights) {
        if !apply_catalog(&fragment, &mut data) {
            add_ad_hoc(&fragment, &mut data);
        }
    }
    data
}

fn apply_catalog(fragment: &str, data: &mut FieldMap) -> bool {
    for entry in COMPILED_CATALOG.iter() {
        if data.get(entry.label).is_some_and(|v| is_substantial(v)) {
            continue;
        }
        for re in &entry.regexes {
            let Some(caps) = re.captures(fragment) else {
                continue;
            };
            let value = caps.get(1).map(|m| normalize_spaces(m.as_str())).unwrap_or_default();
            // Only placeholders reach this point, so a substantial value replaces them
            let fill = !data.contains_key(entry.label) || is_substantial(&value);
            if fill {
                data.insert(entry.label.to_string(), value);
            }
            return true;
        }
    }
    false
}

fn add_ad_hoc(fragment: &str, data: &mut FieldMap) {
    let Some((key, value)) = fragment.split_once(':') else {
        return;
    };
    let (key, value) = (key.trim(), value.trim());
    if !key.is_empty() && !value.is_empty() && !data.contains_key(key) {
        data.insert(key.to_string(), normalize_spaces(value));
    }
}

/// Values of two characters or less count as placeholders.
fn is_substantial(value: &str) -> bool {
    value.chars().count() > 2
}

/// Fields from the report header.
pub fn parse_general(text: &str) -> GeneralFields {
    let mut operators: Vec<String> = Vec::new();
    for caps in OPERATOR_RE.captures_iter(text) {
        let name = normalize_spaces(&caps[1]);
        if name.is_empty() {
            continue;
        }
        let folded = name.to_lowercase();
        if !operators.iter().any(|o| o.to_lowercase() == folded) {
            operators.push(name);
        }
    }
    let operator_primary = operators.first().cloned().unwrap_or_default();

    let dates = DATE_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect();

    let mut fields = FieldMap::new();
    for (key, re) in GENERAL_RES.iter() {
        if let Some(caps) = re.captures(text) {
            fields.insert(key.to_string(), normalize_spaces(&caps[1]));
        }
    }

    GeneralFields {
        operators,
        operator_primary,
        dates,
        fields,
    }
}

fn parse_window(block: &str, fields: &[CompiledField]) -> FieldMap {
    let mut out = FieldMap::new();
    for entry in fields {
        let value = entry
            .regexes
            .iter()
            .find_map(|re| re.captures(block))
            .and_then(|caps| caps.get(1).map(|m| normalize_spaces(m.as_str())));
        if let Some(value) = value {
            out.insert(entry.label.to_string(), value);
        }
    }
    out
}

/// BET isotherm summary (slope, intercept, r, C constant, surface area).
pub fn parse_isotherm_summary(text: &str) -> FieldMap {
    parse_window(ISOTHERM_SUMMARY.slice_or_all(text), &COMPILED_ISOTHERM)
}

/// Multi-point BET summary, including the micropore figures.
pub fn parse_multipoint_bet_summary(text: &str) -> FieldMap {
    parse_window(MBET_SUMMARY.slice_or_all(text), &COMPILED_MBET)
}

/// t-plot summary.
pub fn parse_tplot_summary(text: &str) -> FieldMap {
    parse_window(TPLOT_SUMMARY.slice_or_all(text), &COMPILED_TPLOT)
}
