//! Signhere CLI
//!
//! Usage:
//!   signhere [OPTIONS] --job <FILE> <INPUT> -o <OUTPUT>
//!
//! Options:
//!   -j, --job <FILE>         Job file with settings, text, images and anchors (TOML)
//!   -o, --output <FILE>      Where to write the stamped document
//!       --only <REGEX>       Only place anchors whose name matches
//!       --pages <N,...>      Only place anchors on these pages (1-based)
//!       --strict-categories  Reject categories missing from the settings
//!   -h, --help               Print help

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::info;

use signhere::{place_all, Job, PlacementOptions, UnknownCategoryPolicy};

#[derive(Parser)]
#[command(name = "signhere")]
#[command(about = "Stamp signature images and dynamic text onto PDF anchor points")]
struct Cli {
    /// Template PDF
    input: PathBuf,

    /// Job file (TOML)
    #[arg(short, long)]
    job: PathBuf,

    /// Output PDF
    #[arg(short, long)]
    output: PathBuf,

    /// Only place anchors whose name matches this regular expression
    #[arg(long, value_name = "REGEX")]
    only: Option<String>,

    /// Only place anchors on these 1-based pages
    #[arg(long, value_name = "N,...", value_delimiter = ',')]
    pages: Vec<u32>,

    /// Reject anchors whose category is not in the settings
    #[arg(long)]
    strict_categories: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let job = match Job::from_file(&cli.job) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("Error loading job '{}': {}", cli.job.display(), e);
            process::exit(1);
        }
    };

    let template = match fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    let mut options = PlacementOptions::new().with_page_filter(cli.pages);
    if cli.strict_categories {
        options = options.with_unknown_category(UnknownCategoryPolicy::Reject);
    }
    if let Some(pattern) = &cli.only {
        options = match options.with_name_pattern(pattern) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };
    }

    let stamped = match place_all(
        &template,
        &job.pages,
        &job.loader,
        &job.text,
        &job.settings,
        &options,
    ) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = fs::write(&cli.output, stamped) {
        eprintln!("Error writing file '{}': {}", cli.output.display(), e);
        process::exit(1);
    }
    info!("wrote {}", cli.output.display());
}
