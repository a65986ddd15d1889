//! Text normalization and numeric token scanning.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Floating-point literal: optional sign, optional fraction, optional exponent.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[-+]?[0-9]+(?:\.[0-9]+)?(?:e[+-]?[0-9]+)?").unwrap());

/// A line that holds exactly one numeric literal.
static NUMERIC_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*[-+]?[0-9]+(?:\.[0-9]+)?(?:e[+-]?[0-9]+)?\s*$").unwrap());

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Clean extracted page text without changing its line structure.
///
/// Applies Unicode NFC, folds typographic ligatures, drops the replacement
/// character and non-breaking spaces, and trims trailing blanks per line.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        match c {
            '\u{FFFD}' => {}
            '\u{00A0}' => out.push(' '),
            _ => match LIGATURES.iter().find(|(lig, _)| *lig == c) {
                Some((_, replacement)) => out.push_str(replacement),
                None => out.push(c),
            },
        }
    }
    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize_spaces(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

/// Every numeric literal in the text, in order of appearance.
pub fn number_tokens(text: &str) -> Vec<f64> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Parse a line holding a single standalone numeric literal.
pub fn numeric_line(line: &str) -> Option<f64> {
    if NUMERIC_LINE_RE.is_match(line) {
        line.trim().parse::<f64>().ok()
    } else {
        None
    }
}
