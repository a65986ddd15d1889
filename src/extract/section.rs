//! Section windows over the report text.
//!
//! The same label can appear in several report sections (`Surface Area`
//! shows up under the isotherm and again under the t-plot). Each section
//! pass therefore works on the slice of text between a start marker and
//! the next end marker.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// A start/end marker pair delimiting one report section.
#[derive(Debug, Clone)]
pub struct Window {
    start: Regex,
    end: Option<Regex>,
}

impl Window {
    /// Compile a window. Markers match case-insensitively and `.` spans lines.
    pub fn new(start: &str, end: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            start: marker(start)?,
            end: end.map(marker).transpose()?,
        })
    }

    /// The text of this section, or `""` when the start marker is absent.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        section(text, &self.start, self.end.as_ref())
    }

    /// Like [`slice`](Self::slice), but falls back to the whole text when
    /// the window is empty.
    pub fn slice_or_all<'t>(&self, text: &'t str) -> &'t str {
        let window = self.slice(text);
        if window.is_empty() {
            text
        } else {
            window
        }
    }
}

fn marker(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

/// Text after the first `start` match, up to the first `end` match that
/// begins at or after that point.
///
/// Without an end match the section runs to the end of the text. Without a
/// start match the section is empty.
pub fn section<'t>(text: &'t str, start: &Regex, end: Option<&Regex>) -> &'t str {
    let Some(m) = start.find(text) else {
        return "";
    };
    let from = m.end();
    let to = end
        .and_then(|re| re.find_at(text, from))
        .map(|e| e.start())
        .unwrap_or(text.len());

    let window = &text[from..to];
    log::debug!(
        "Section /{}/ spans bytes {}..{} ({} bytes)",
        start.as_str(),
        from,
        to,
        window.len()
    );
    window
}

macro_rules! window {
    ($start:expr, $end:expr) => {
        Lazy::new(|| Window::new($start, $end).unwrap())
    };
}

/// Isotherm summary: slope, intercept, C constant, surface area.
pub static ISOTHERM_SUMMARY: Lazy<Window> =
    window!(r"\bIsotherm\b", Some(r"\bMBET summary\b|Page 2 of"));

/// Multi-point BET summary.
pub static MBET_SUMMARY: Lazy<Window> = window!(r"Multi-Point BET", Some(r"t plot|t-plot"));

/// t-plot summary.
pub static TPLOT_SUMMARY: Lazy<Window> =
    window!(r"\bt plot\b|\bt-plot\b", Some(r"BJH|BJH desorption"));

/// Isotherm point table, closed by the isotherm slope line.
pub static ISOTHERM_TABLE: Lazy<Window> =
    window!(r"Relative Pressure, P/Po", Some(r"Isotherm\s*[\r\n ]*Slope"));

/// Isotherm point table, closed by the next section.
pub static ISOTHERM_TABLE_FALLBACK: Lazy<Window> =
    window!(r"Relative Pressure, P/Po", Some(r"MBET summary|Page 2 of"));

/// Multi-point BET data table.
pub static MBET_TABLE: Lazy<Window> =
    window!(r"Multi-Point BET Plot", Some(r"Multi-Point BET|t plot|t-plot"));

/// t-plot data table.
pub static TPLOT_TABLE: Lazy<Window> =
    window!(r"Statistical Thickness \(nm\)", Some(r"BJH|BJH desorption"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_between_markers() {
        let w = Window::new("START", Some("END")).unwrap();
        assert_eq!(w.slice("intro START body END tail"), " body ");
    }

    #[test]
    fn test_section_without_end_runs_to_text_end() {
        let w = Window::new("start", Some("never")).unwrap();
        assert_eq!(w.slice("a START b c"), " b c");
    }

    #[test]
    fn test_section_without_start_is_empty() {
        let w = Window::new("missing", None).unwrap();
        assert_eq!(w.slice("some text"), "");
        assert_eq!(w.slice_or_all("some text"), "some text");
    }

    #[test]
    fn test_end_marker_before_start_is_ignored() {
        let w = Window::new("Multi-Point BET", Some("t-plot")).unwrap();
        let text = "t-plot preview\nMulti-Point BET\nSlope = 1.0\nt-plot\nrest";
        assert_eq!(w.slice(text), "\nSlope = 1.0\n");
    }

    #[test]
    fn test_isotherm_summary_window() {
        let text = "Isotherm\nSlope = 3.1\nMBET summary\nSlope = 9.9";
        assert_eq!(ISOTHERM_SUMMARY.slice(text), "\nSlope = 3.1\n");
    }

    #[test]
    fn test_isotherm_table_end_spans_lines() {
        let text = "Relative Pressure, P/Po\n0.1 50\nIsotherm\nSlope = 1";
        assert_eq!(ISOTHERM_TABLE.slice(text), "\n0.1 50\n");
    }
}
