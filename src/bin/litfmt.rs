//! litfmt CLI binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use litfmt::{
    default_output_path, run_pipeline, CommandFormatter, ErrorEnvelope, LitfmtError,
    PipelineOptions, DEFAULT_FORMATTER, DEFAULT_MARKER,
};

/// Reformats marker-tagged template literals embedded in TypeScript sources.
#[derive(Parser)]
#[command(name = "litfmt")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input source file
    input: PathBuf,

    /// Output file (default: <stem>.fmt.<ext> beside the input)
    #[arg(value_name = "OUTPUT")]
    output_pos: Option<PathBuf>,

    /// Output file, as a flag alternative to the positional form
    #[arg(short, long, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Marker token looked for in the tagging comment
    #[arg(long, default_value = DEFAULT_MARKER)]
    marker: String,

    /// Formatter command line; region text is piped through its stdin
    #[arg(long, default_value = DEFAULT_FORMATTER)]
    formatter: String,

    /// Per-region formatter timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Print a JSON report to stdout
    #[arg(long)]
    json: bool,

    /// Format without writing; exit 1 if the output would differ
    #[arg(long)]
    check: bool,

    /// Verbose logging (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let formatter = match CommandFormatter::from_command_line(&cli.formatter) {
        Ok(formatter) => Arc::new(formatter),
        Err(err) => return fail(&err, cli.json),
    };

    let output = cli
        .output
        .clone()
        .or_else(|| cli.output_pos.clone())
        .unwrap_or_else(|| default_output_path(&cli.input));
    let opts = PipelineOptions {
        marker: cli.marker.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        check: cli.check,
    };

    match run_pipeline(&cli.input, &output, formatter, &opts).await {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        return fail(&LitfmtError::internal(err.to_string()), false);
                    }
                }
            } else if cli.check {
                if report.changed {
                    println!(
                        "{}: {} region(s) would be reformatted",
                        cli.input.display(),
                        report.region_count
                    );
                } else {
                    println!("{}: already formatted", cli.input.display());
                }
            } else {
                println!(
                    "{}: {} region(s) formatted -> {}",
                    cli.input.display(),
                    report.region_count,
                    output.display()
                );
            }
            if cli.check && report.changed {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => fail(&err, cli.json),
    }
}

fn fail(err: &LitfmtError, json: bool) -> ExitCode {
    if json {
        let envelope = ErrorEnvelope::from_error(err);
        match serde_json::to_string(&envelope) {
            Ok(out) => eprintln!("{out}"),
            Err(_) => eprintln!("litfmt: error: {err}"),
        }
    } else {
        eprintln!("litfmt: error: {err}");
    }
    ExitCode::from(err.error_code().code())
}
