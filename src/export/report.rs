//! Markdown narrative report for an extraction bundle.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::bundle::Bundle;
use crate::error::Result;
use crate::model::FieldMap;

const TITLE: &str = "BET Analysis Report (Auto-Extracted)";

/// Render the narrative report.
///
/// Sections without values are left out. Plots are linked by file name,
/// since the report is written next to them.
pub fn render_narrative(bundle: &Bundle, generated: NaiveDateTime) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", TITLE));
    output.push_str(&format!(
        "*Generated: {}*\n\n",
        generated.format("%Y-%m-%d %H:%M:%S")
    ));

    let general = general_entries(bundle);
    render_section(&mut output, "General", &general);

    let summaries = [
        ("BET Isotherm Summary", &bundle.isotherm_summary),
        ("Multi-Point BET Summary", &bundle.multipoint_bet_summary),
        ("t-Plot Summary", &bundle.tplot_summary),
    ];
    for (title, map) in summaries {
        let entries: Vec<(String, String)> =
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        render_section(&mut output, title, &entries);
    }

    if !bundle.artifacts.plots.is_empty() {
        output.push_str("## Plots\n\n");
        for path in &bundle.artifacts.plots {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let alt = name.trim_end_matches(".png");
            output.push_str(&format!("![{}]({})\n\n", alt, name));
        }
    }

    format!("{}\n", output.trim_end())
}

/// Render the report with the current local time and write it.
pub fn write_narrative(bundle: &Bundle, path: &Path) -> Result<()> {
    let content = render_narrative(bundle, Local::now().naive_local());
    fs::write(path, content)?;
    log::info!("Wrote narrative report to {}", path.display());
    Ok(())
}

fn general_entries(bundle: &Bundle) -> Vec<(String, String)> {
    let general = &bundle.general;
    let mut entries = Vec::new();
    if !general.operators.is_empty() {
        entries.push(("Operators".to_string(), general.operators.join(", ")));
    }
    if !general.operator_primary.is_empty() {
        entries.push(("OperatorPrimary".to_string(), general.operator_primary.clone()));
    }
    if !general.dates.is_empty() {
        entries.push(("Dates".to_string(), general.dates.join(", ")));
    }
    entries.extend(non_empty(&general.fields));
    entries
}

fn non_empty(map: &FieldMap) -> impl Iterator<Item = (String, String)> + '_ {
    map.iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
}

fn render_section(output: &mut String, title: &str, entries: &[(String, String)]) {
    if entries.is_empty() {
        return;
    }
    output.push_str(&format!("## {}\n\n", title));
    for (key, value) in entries {
        output.push_str(&format!(
            "- **{}**: {}\n",
            escape_markdown(key),
            escape_markdown(value)
        ));
    }
    output.push('\n');
}

fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
