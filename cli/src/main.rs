//! unbet CLI - BET report extraction tool

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use unbet::{
    build_measurement_id, extract_highlight_strings, Bundle, LoadOptions, MeasurementInputs,
    ReportLoader, Unbet,
};

#[derive(Parser)]
#[command(name = "unbet")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Extract fields, tables and plots from BET analysis PDF reports",
    long_about = None
)]
struct Cli {
    /// Input PDF report
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields and tables, and write CSV, plots and JSON
    Extract {
        /// Input PDF report
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "UNBET_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Also write the Markdown narrative report
        #[arg(long)]
        narrative: bool,

        /// Skip the PNG plots
        #[arg(long)]
        no_plots: bool,

        /// Parse highlighted excerpts too
        #[arg(long)]
        highlights: bool,

        /// Fail on the first unreadable page
        #[arg(long)]
        strict: bool,
    },

    /// Print the extracted field maps as JSON
    Fields {
        /// Input PDF report
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the highlighted excerpts in reading order
    Highlights {
        /// Input PDF report
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Build a measurement ID
    Id {
        /// Sequence index
        #[arg(long)]
        index: i64,

        #[arg(long, default_value = "")]
        file_name: String,

        /// Measurement date (e.g. 2021-06-12)
        #[arg(long, default_value = "")]
        date: String,

        /// Measurement time (e.g. 14:26:26)
        #[arg(long, default_value = "")]
        time: String,

        #[arg(long, default_value = "")]
        operator: String,

        #[arg(long, default_value = "")]
        instrument: String,

        #[arg(long, default_value = "")]
        serial: String,

        #[arg(long, default_value = "")]
        comment1: String,

        #[arg(long, default_value = "")]
        comment3: String,
    },

    /// Show report information
    Info {
        /// Input PDF report
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            narrative,
            no_plots,
            highlights,
            strict,
        }) => cmd_extract(
            &input,
            output.as_deref(),
            ExtractFlags {
                narrative,
                plots: !no_plots,
                highlights,
                strict,
            },
        ),
        Some(Commands::Fields { input, compact }) => cmd_fields(&input, compact),
        Some(Commands::Highlights { input }) => cmd_highlights(&input),
        Some(Commands::Id {
            index,
            file_name,
            date,
            time,
            operator,
            instrument,
            serial,
            comment1,
            comment3,
        }) => {
            let inputs = MeasurementInputs {
                index,
                file_name,
                date,
                time,
                operator,
                instrument,
                serial_number: serial,
                comment1,
                comment3,
            };
            println!("{}", build_measurement_id(&inputs));
            Ok(())
        }
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract if input is provided
            if let Some(input) = cli.input {
                cmd_extract(&input, cli.output.as_deref(), ExtractFlags::default())
            } else {
                println!("{}", "Usage: unbet <FILE> [OUTPUT]".yellow());
                println!("       unbet --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct ExtractFlags {
    narrative: bool,
    plots: bool,
    highlights: bool,
    strict: bool,
}

impl Default for ExtractFlags {
    fn default() -> Self {
        Self {
            narrative: false,
            plots: true,
            highlights: false,
            strict: false,
        }
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    flags: ExtractFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_bet", stem))
    });
    log::debug!("Writing artifacts to {}", output_dir.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting report...");

    let mut builder = Unbet::new()
        .with_out_dir(&output_dir)
        .with_narrative(flags.narrative)
        .with_plots(flags.plots)
        .with_highlights(flags.highlights);
    if flags.strict {
        builder = builder.strict();
    }
    let bundle = builder.extract(input)?;

    pb.finish_with_message("Done!");
    print_summary(&bundle, &output_dir);
    Ok(())
}

fn print_summary(bundle: &Bundle, output_dir: &Path) {
    println!("\n{}", "Tables:".green().bold());
    for (name, rows) in bundle.tables.row_counts() {
        match rows {
            Some(n) => println!("  {} {} ({} rows)", "✓".green(), name, n),
            None => println!("  {} {} {}", "✗".red(), name, "(absent)".dimmed()),
        }
    }

    let paths = bundle.artifacts.paths();
    println!("\n{} {}", "Output files in".green().bold(), output_dir.display());
    for (i, path) in paths.iter().enumerate() {
        let branch = if i + 1 == paths.len() { "└─" } else { "├─" };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {} {}", branch.dimmed(), name);
    }
}

fn cmd_fields(input: &Path, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = Unbet::new().with_highlights(true).extract(input)?;

    let value = json!({
        "general": bundle.general,
        "isotherm_summary": bundle.isotherm_summary,
        "multipoint_bet_summary": bundle.multipoint_bet_summary,
        "tplot_summary": bundle.tplot_summary,
        "highlight_fields": bundle.highlight_fields,
    });
    let text = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{}", text);
    Ok(())
}

fn cmd_highlights(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let highlights = extract_highlight_strings(input)?;
    if highlights.is_empty() {
        println!("{}", "No highlights found".yellow());
    }
    for (i, text) in highlights.iter().enumerate() {
        println!("{} {}", format!("[{}]", i + 1).dimmed(), text);
    }
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let loader = ReportLoader::open_with_options(input, LoadOptions::new())?;
    let doc = loader.load()?;

    println!("{}", "Report Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref creator) = doc.metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.full_text();
    println!("{}: {}", "Lines".bold(), text.lines().count());
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Highlights".bold(), doc.highlight_count());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unbet".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("BET report extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unbet".dimmed());
    println!("License: MIT");
}
