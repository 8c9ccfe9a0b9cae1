//! CLI application for Italian FIR waste-form OCR.

mod config;
mod process;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// FIR OCR - Extract registry fields from scanned Italian waste forms
#[derive(Parser)]
#[command(name = "fir")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file (scanned PDF or image)
    input: PathBuf,

    /// Output JSON file
    output: PathBuf,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Write the normalized page and region crops as PNG into this directory
    #[arg(long)]
    dump_crops: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            // Running without arguments only prints usage
            println!("{}", Cli::command().render_help());
            return Ok(());
        }
        Err(e) => e.exit(),
    };

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    process::run(cli)
}
