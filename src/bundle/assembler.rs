//! Bundle assembly: extraction plus artifact writing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::export::{self, JsonFormat, Marker, PlotLabels, PlotSize};
use crate::extract::{self, TableProfiles};
use crate::model::Document;
use crate::text::clean_text;

use super::Bundle;

pub const ISOTHERM_CSV: &str = "isotherm_points.csv";
pub const MBET_CSV: &str = "multipoint_bet.csv";
pub const TPLOT_CSV: &str = "tplot_points.csv";
pub const BJH_CSV: &str = "bjh_desorption.csv";
pub const ISOTHERM_PNG: &str = "isotherm.png";
pub const TPLOT_PNG: &str = "tplot.png";
pub const BJH_PNG: &str = "bjh_distribution.png";
pub const BUNDLE_JSON: &str = "bet_full_extract.json";
pub const NARRATIVE_MD: &str = "BET_Full_Extract_Report.md";

/// Options for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Where artifacts go. Without a directory nothing is written.
    pub out_dir: Option<PathBuf>,

    /// Write one CSV per present table
    pub write_csvs: bool,

    /// Write PNG plots
    pub write_plots: bool,

    /// Write the bundle as JSON
    pub write_json: bool,

    /// Write the Markdown narrative report
    pub narrative: bool,

    /// Parse highlighted excerpts into `highlight_fields`
    pub highlights: bool,

    /// Table ranges and row thresholds
    pub profiles: TableProfiles,

    /// Plot image size
    pub plot_size: PlotSize,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the artifact directory.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Enable or disable CSV exports.
    pub fn with_csvs(mut self, write: bool) -> Self {
        self.write_csvs = write;
        self
    }

    /// Enable or disable plots.
    pub fn with_plots(mut self, write: bool) -> Self {
        self.write_plots = write;
        self
    }

    /// Enable or disable the bundle JSON.
    pub fn with_json(mut self, write: bool) -> Self {
        self.write_json = write;
        self
    }

    /// Enable or disable the narrative report.
    pub fn with_narrative(mut self, write: bool) -> Self {
        self.narrative = write;
        self
    }

    /// Enable or disable highlight parsing.
    pub fn with_highlights(mut self, parse: bool) -> Self {
        self.highlights = parse;
        self
    }

    /// Set the table profiles.
    pub fn with_profiles(mut self, profiles: TableProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    /// Set the plot size in pixels.
    pub fn with_plot_size(mut self, width: u32, height: u32) -> Self {
        self.plot_size = PlotSize::new(width, height);
        self
    }

    /// Disable every artifact.
    pub fn no_artifacts(mut self) -> Self {
        self.out_dir = None;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            out_dir: None,
            write_csvs: true,
            write_plots: true,
            write_json: true,
            narrative: false,
            highlights: false,
            profiles: TableProfiles::default(),
            plot_size: PlotSize::default(),
        }
    }
}

/// Turns a loaded report into a [`Bundle`] and writes its artifacts.
#[derive(Debug, Clone, Default)]
pub struct BundleAssembler {
    options: ExtractOptions,
}

impl BundleAssembler {
    /// Create an assembler.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// The options this assembler runs with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract fields and tables from report text. No I/O.
    pub fn extract_text(&self, text: &str) -> Bundle {
        let profiles = &self.options.profiles;
        let mut bundle = Bundle {
            general: extract::parse_general(text),
            isotherm_summary: extract::parse_isotherm_summary(text),
            multipoint_bet_summary: extract::parse_multipoint_bet_summary(text),
            tplot_summary: extract::parse_tplot_summary(text),
            ..Bundle::default()
        };

        let tables = &mut bundle.tables;
        tables.isotherm_points =
            extract::parse_isotherm_points(text, &profiles.isotherm).into_table();
        tables.multipoint_bet =
            extract::parse_multipoint_bet_table(text, &profiles.multipoint_bet).into_table();
        tables.tplot_points = extract::parse_tplot_points(text, &profiles.tplot).into_table();
        tables.bjh_desorption = extract::parse_bjh_table(text, &profiles.bjh).into_table();

        log::debug!(
            "Extracted {} general fields, {}/4 tables",
            bundle.general.fields.len(),
            bundle.tables.present()
        );
        bundle
    }

    /// Extract a loaded document and write the configured artifacts.
    pub fn assemble(&self, doc: &Document) -> Result<Bundle> {
        let text = clean_text(&doc.full_text());
        let mut bundle = self.extract_text(&text);

        if self.options.highlights {
            let snippets: Vec<String> = extract::reconcile_document(doc)
                .into_iter()
                .map(|h| h.text)
                .collect();
            bundle.highlight_fields = extract::parse_highlights(&snippets);
        }

        if let Some(dir) = &self.options.out_dir {
            self.write_artifacts(&mut bundle, dir)?;
        }
        Ok(bundle)
    }

    /// Write CSVs, plots, the narrative and the bundle JSON under `dir`,
    /// recording each path in the bundle.
    ///
    /// The JSON is written last so that it lists every other artifact.
    pub fn write_artifacts(&self, bundle: &mut Bundle, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let options = &self.options;

        if options.write_csvs {
            let tables = &bundle.tables;
            let csvs = &mut bundle.artifacts.csvs;
            if let Some(table) = &tables.isotherm_points {
                csvs.insert("isotherm".into(), write_csv(table, dir, ISOTHERM_CSV)?);
            }
            if let Some(table) = &tables.multipoint_bet {
                csvs.insert("multipoint_bet".into(), write_csv(table, dir, MBET_CSV)?);
            }
            if let Some(table) = &tables.tplot_points {
                csvs.insert("tplot".into(), write_csv(table, dir, TPLOT_CSV)?);
            }
            if let Some(table) = &tables.bjh_desorption {
                csvs.insert("bjh".into(), write_csv(table, dir, BJH_CSV)?);
            }
        }

        if options.write_plots {
            let tables = &bundle.tables;
            let series = [
                (
                    tables.isotherm_points.as_ref().map(export::isotherm_series),
                    Marker::Dot,
                    PlotLabels::isotherm(),
                    ISOTHERM_PNG,
                ),
                (
                    tables.tplot_points.as_ref().map(export::tplot_series),
                    Marker::Square,
                    PlotLabels::tplot(),
                    TPLOT_PNG,
                ),
                (
                    tables.bjh_desorption.as_ref().map(export::bjh_series),
                    Marker::Circle,
                    PlotLabels::bjh(),
                    BJH_PNG,
                ),
            ];
            for (points, marker, labels, name) in series {
                let Some(points) = points.filter(|p| !p.is_empty()) else {
                    continue;
                };
                let path = dir.join(name);
                export::write_plot(&points, marker, &labels, options.plot_size, &path)?;
                bundle.artifacts.plots.push(path);
            }
        }

        if options.narrative {
            let path = dir.join(NARRATIVE_MD);
            export::write_narrative(bundle, &path)?;
            bundle.artifacts.narrative = Some(path);
        }

        if options.write_json {
            let path = dir.join(BUNDLE_JSON);
            bundle.artifacts.json = Some(path.clone());
            export::write_json(bundle, JsonFormat::Pretty, &path)?;
        }

        log::info!(
            "Wrote {} artifacts to {}",
            bundle.artifacts.paths().len(),
            dir.display()
        );
        Ok(())
    }
}

fn write_csv<R>(table: &crate::model::Table<R>, dir: &Path, name: &str) -> Result<PathBuf>
where
    R: crate::model::TableRow + serde::Serialize,
{
    let path = dir.join(name);
    export::write_table_csv(table, &path)?;
    Ok(path)
}

/// Extract fields and tables from already materialized report text.
pub fn extract_text_bundle(text: &str) -> Bundle {
    BundleAssembler::default().extract_text(text)
}
