//! xldump CLI - XLSX structure inspection tool
//!
//! Dumps the shared string table, the sheet manifest and the first rows of
//! every worksheet in an XLSX package.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use xldump::container::Archive;
use xldump::render::JsonFormat;
use xldump::DumpOptions;

/// Diagnostic dumps of XLSX internals
#[derive(Parser)]
#[command(
    name = "xldump",
    author = "iyulab",
    version,
    about = "Inspect the internals of an XLSX package",
    long_about = "xldump - XLSX structure inspection tool.\n\n\
                  Prints the shared string table, the sheets declared in the workbook\n\
                  manifest and the first rows of every worksheet entry."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump shared strings, sheets and worksheet rows
    Dump {
        /// Input file path
        #[arg(env = "XLDUMP_PATH")]
        input: PathBuf,

        /// Rows considered per worksheet
        #[arg(short, long, default_value_t = xldump::xlsx::DEFAULT_ROW_LIMIT)]
        rows: usize,

        /// Emit a JSON report instead of console lines
        #[arg(long)]
        json: bool,

        /// Output compact JSON (no indentation)
        #[arg(long, requires = "json")]
        compact: bool,
    },

    /// Show sheet names and the header row of each worksheet
    Headers {
        /// Input file path
        #[arg(env = "XLDUMP_PATH")]
        input: PathBuf,
    },

    /// List the shared string table with indices
    Strings {
        /// Input file path
        #[arg(env = "XLDUMP_PATH")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Dump {
            input,
            rows,
            json,
            compact,
        } => {
            let options = DumpOptions::new().with_row_limit(rows);

            if json {
                let pb = create_spinner("Reading workbook...");
                let report = xldump::inspect_file(&input, &options);
                pb.finish_and_clear();

                let format = if compact {
                    JsonFormat::Compact
                } else {
                    JsonFormat::Pretty
                };
                let json = xldump::render::to_json(&report?, format)?;
                writeln!(out, "{}", json)?;
            } else {
                xldump::dump_file(&input, &options, &mut out)?;
            }
        }

        Commands::Headers { input } => {
            let archive = Archive::open(&input)?;
            writeln!(
                out,
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            )?;
            xldump::write_headers(&archive, &DumpOptions::default(), &mut out)?;
        }

        Commands::Strings { input } => {
            let archive = Archive::open(&input)?;
            xldump::write_shared_strings(&archive, &mut out)?;
        }

        Commands::Version => {
            print_version();
        }
    }

    out.flush()?;
    Ok(())
}

fn print_version() {
    println!("{} {}", "xldump".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Diagnostic dumps of XLSX shared strings, sheets and worksheet rows");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
