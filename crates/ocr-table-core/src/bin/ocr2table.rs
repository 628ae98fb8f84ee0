use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use ocr_table_core::{
    OutputFormat, ReconstructOptions, TableReconstruction, read_detections, reconstruct_file,
    reconstruct_table, render,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ocr2table",
    version,
    about = "Rebuild table rows and columns from OCR text detections"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconstruct a table from a detections JSON file.
    Reconstruct(ReconstructArgs),
}

#[derive(Debug, Args)]
struct ReconstructArgs {
    /// Input detections JSON path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path; prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv, tsv, json or text.
    #[arg(long, default_value = "csv")]
    format: String,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Row threshold as a fraction of the median block height.
    #[arg(long, default_value_t = ocr_table_core::DEFAULT_ROW_THRESHOLD_RATIO)]
    row_ratio: f64,

    /// Column gap threshold as a fraction of the median block width.
    #[arg(long, default_value_t = ocr_table_core::DEFAULT_GAP_THRESHOLD_RATIO)]
    gap_ratio: f64,

    /// Keep recognized text exactly as detected.
    #[arg(long)]
    no_respace: bool,

    /// Print the run diagnostics to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ReconstructArgs) -> Result<(ReconstructOptions, OutputFormat)> {
    let format = OutputFormat::from_str(&args.format)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --format")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let options = ReconstructOptions {
        row_threshold_ratio: args.row_ratio,
        gap_threshold_ratio: args.gap_ratio,
        respace_text: !args.no_respace,
        delimiter: args.delimiter as u8,
        ..ReconstructOptions::default()
    };
    options.validate()?;

    Ok((options, format))
}

fn log_report(table: &TableReconstruction, verbose: bool) {
    eprintln!(
        "reconstructed {} row(s) x {} column(s) from {} block(s), average confidence {:.4}",
        table.row_count(),
        table.column_count,
        table.block_count(),
        table.average_confidence
    );
    if verbose {
        for line in table.diagnostics.lines() {
            eprintln!("  - {line}");
        }
    }
}

fn run_reconstruct(args: &ReconstructArgs) -> Result<TableReconstruction> {
    let (options, format) = parse_options(args)?;

    if let Some(output) = &args.output {
        return reconstruct_file(&args.input, output, format, &options).with_context(|| {
            format!("failed to reconstruct table from '{}'", args.input.display())
        });
    }

    let detections = read_detections(&args.input)
        .with_context(|| format!("failed to read detections from '{}'", args.input.display()))?;
    let table = reconstruct_table(&detections, &options);
    let rendered = render(&table, format, options.delimiter)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(table)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ocr_table_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Reconstruct(args) => match run_reconstruct(&args) {
            Ok(table) => {
                log_report(&table, args.verbose);
                if table.row_count() > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
