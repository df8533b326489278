//! Lectern CLI - Command-line interface for the chapter content engine

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lectern_core::ReaderConfig;
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

#[derive(Parser)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reader configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// A stored chapter file, optionally with its format forced
#[derive(Args)]
pub struct ChapterArgs {
    /// Chapter file path
    pub input: String,

    /// Skip detection and parse as this format (tree, markup, text)
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected format and canonical blocks of a chapter
    Inspect {
        #[command(flatten)]
        chapter: ChapterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a chapter to addressable markup
    Render {
        #[command(flatten)]
        chapter: ChapterArgs,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Wrap the markup in a complete document with the reader stylesheet
        #[arg(long)]
        standalone: bool,
    },

    /// Split a chapter into pages for page-flip reading
    Paginate {
        #[command(flatten)]
        chapter: ChapterArgs,

        /// Maximum words per page (overrides the configuration)
        #[arg(short, long)]
        budget: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Highlight a word range of one block
    Highlight {
        #[command(flatten)]
        chapter: ChapterArgs,

        /// Block index
        #[arg(long)]
        block: usize,

        /// First highlighted word
        #[arg(long)]
        start: usize,

        /// One past the last highlighted word
        #[arg(long)]
        end: usize,

        /// Print the whole chapter instead of the highlighted element
        #[arg(long)]
        full: bool,
    },

    /// Batch render every chapter in a directory
    Batch {
        /// Input directory
        input_dir: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: String,

        /// Wrap each chapter in a complete document
        #[arg(long)]
        standalone: bool,

        /// Number of parallel jobs (must be at least 1)
        #[arg(short, long, default_value = "4", value_parser = parse_jobs)]
        jobs: usize,
    },
}

/// Load the reader configuration from `--config`, then `LECTERN_CONFIG`
fn load_config(path: Option<String>) -> Result<ReaderConfig> {
    match path.or_else(|| std::env::var("LECTERN_CONFIG").ok()) {
        Some(path) => ReaderConfig::from_path(&path)
            .with_context(|| format!("Failed to load configuration from {}", path)),
        None => Ok(ReaderConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "lectern_cli=debug,lectern_core=debug"
    } else {
        "lectern_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Inspect { chapter, json } => commands::inspect(&chapter, json, &config).await,

        Commands::Render {
            chapter,
            output,
            standalone,
        } => commands::render(&chapter, output.as_deref(), standalone, &config).await,

        Commands::Paginate {
            chapter,
            budget,
            json,
        } => commands::paginate(&chapter, budget, json, config).await,

        Commands::Highlight {
            chapter,
            block,
            start,
            end,
            full,
        } => commands::highlight(&chapter, block, start, end, full, config).await,

        Commands::Batch {
            input_dir,
            output_dir,
            standalone,
            jobs,
        } => commands::batch(&input_dir, &output_dir, standalone, jobs, &config),
    }
}
