//! epubslim CLI - shrink image-heavy EPUB files

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate jobs argument (must be at least 1)
fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("jobs must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// Parse and validate JPEG quality (1-100)
fn parse_quality(s: &str) -> Result<u8, String> {
    let q: u8 = s.parse().map_err(|_| format!("'{}' is not a valid quality", s))?;
    if (1..=100).contains(&q) {
        Ok(q)
    } else {
        Err("quality must be between 1 and 100".to_string())
    }
}

/// Parse and validate a target size in megabytes (must be positive)
fn parse_megabytes(s: &str) -> Result<f64, String> {
    let mb: f64 = s.parse().map_err(|_| format!("'{}' is not a valid size", s))?;
    if mb.is_finite() && mb > 0.0 {
        Ok(mb)
    } else {
        Err("target size must be greater than 0".to_string())
    }
}

#[derive(Parser)]
#[command(name = "epubslim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Image policy and naming overrides shared by compress and batch
#[derive(Args, Clone, Default)]
pub struct TuningArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum image width in pixels
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum image height in pixels
    #[arg(long)]
    pub max_height: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(short, long, value_parser = parse_quality)]
    pub quality: Option<u8>,

    /// Keep original image file names instead of switching to .jpg
    #[arg(long)]
    pub keep_names: bool,

    /// Drop __MACOSX/ and .DS_Store entries
    #[arg(long)]
    pub drop_os_metadata: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress the images of an EPUB file
    Compress {
        /// Input EPUB path
        input: PathBuf,

        /// Output path (default: <input>_compressed.epub)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target size in megabytes; repeats with stricter settings until met
        #[arg(short, long, value_parser = parse_megabytes)]
        target_mb: Option<f64>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display the image and entry breakdown of an EPUB file
    Info {
        /// Input file path
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compress every EPUB in a directory
    Batch {
        /// Input directory
        input_dir: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Number of parallel jobs (must be at least 1)
        #[arg(short, long, default_value = "4", value_parser = parse_jobs)]
        jobs: usize,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "epubslim_cli=debug,epubslim_core=debug"
    } else {
        "epubslim_cli=info,epubslim_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Compress {
            input,
            output,
            target_mb,
            tuning,
            json,
        } => commands::compress(&input, output.as_deref(), target_mb, &tuning, json),

        Commands::Info { input, json } => commands::info(&input, json),

        Commands::Batch {
            input_dir,
            output_dir,
            jobs,
            tuning,
        } => commands::batch(&input_dir, &output_dir, jobs, &tuning),
    }
}
