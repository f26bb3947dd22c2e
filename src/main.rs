#![forbid(unsafe_code)]
//! # topic_pulse CLI
//!
//! Command-line front end for the `topic_pulse` aggregation engine: point it
//! at a delimited dataset (local file or http(s) URL), get the ranked topic
//! report, optionally drill into one topic and export the summaries.
//!
//! ## Example
//! ```bash
//! cargo run --release -- dataset.csv --select 3 --export-format json
//! ```
//!
//! See `--help` for all available options.

use std::path::Path;
use std::process;

use clap::{Parser, ValueEnum};
use log::error;
use topic_pulse::{
    ExportFormat, Labels, analyze_csv_with, export_summaries, read_source, render_report,
    render_selection,
};

/// Built-in display-label tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LabelSet {
    Es,
    En,
}

impl LabelSet {
    fn table(self) -> Labels {
        match self {
            LabelSet::Es => Labels::spanish(),
            LabelSet::En => Labels::english(),
        }
    }
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Dataset to analyze: a CSV file path or an http(s) URL
    input: String,

    /// Topic key to drill into after aggregation
    #[arg(long)]
    select: Option<String>,

    /// Display-label language for topic names
    #[arg(long, default_value = "es")]
    labels: LabelSet,

    /// Output format for export (txt, csv, tsv, json)
    #[arg(long, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory to write the export file into; also enables export for txt
    #[arg(long)]
    out_dir: Option<String>,

    /// Field delimiter of the input table
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if !cli.delimiter.is_ascii() {
        error!("Delimiter must be a single ASCII character");
        process::exit(1);
    }

    let text = match read_source(&cli.input) {
        Ok(text) => text,
        Err(e) => {
            error!("Error reading {}: {}", cli.input, e);
            process::exit(1);
        }
    };

    let labels = cli.labels.table();
    let mut session = analyze_csv_with(&text, &labels, cli.delimiter as u8);

    println!("{}", render_report(&session));

    if let Some(ref key) = cli.select {
        match session.select_raw(key) {
            Some(detail) => println!("{}", render_selection(&detail)),
            // Normal state: the detail view is simply not shown.
            None => println!("No topic matching key {key:?}"),
        }
    }

    // txt goes to stdout by default; any other format (or an explicit
    // --out-dir) also writes a file.
    if cli.export_format != ExportFormat::Txt || cli.out_dir.is_some() {
        let dir = cli.out_dir.as_deref().unwrap_or(".");
        match export_summaries(&session, cli.export_format, Path::new(dir)) {
            Ok(path) => println!("Exported results to {}", path.display()),
            Err(e) => {
                error!("Error writing export to {}: {}", dir, e);
                process::exit(1);
            }
        }
    }
}
