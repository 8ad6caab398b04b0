//! Binary to generate `RestKit` mappings and object classes from a schema file.
//!
//! Usage: `manticom [-f] [-o <project-dir>] <file>`
//!
//! Writes `Objects/*.{h,m}` and `Machine/MachineDataModel.{h,m}` below the
//! project directory.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use manticom::{GenerateSettings, WriteReport, generate_from_file};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "manticom", about = "Generate RestKit mappings from a JSON schema", version)]
struct Cli {
    /// Schema file with `urls` and `objects`
    file: PathBuf,

    /// Overwrite existing files in Objects/
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Project directory receiving Objects/ and Machine/
    #[arg(short = 'o', long = "project-dir", default_value = ".")]
    project_dir: PathBuf,

    /// Fail when the schema has any error-severity issue
    #[arg(long)]
    strict: bool,

    /// Increase verbosity (-v DEBUG, -vv TRACE)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let base_filter: String = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    });
    let filter: EnvFilter =
        EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = GenerateSettings {
        force_overwrite: cli.force,
        deny_errors: cli.strict,
    };
    let report: WriteReport = match generate_from_file(&cli.file, &cli.project_dir, &settings) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    tracing::info!(
        added = report.added.len(),
        overwritten = report.overwritten.len(),
        skipped = report.skipped.len(),
        deleted = report.deleted.len(),
        "done"
    );
}
