use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "media-ocr-etl")]
#[command(about = "Collect image links from an account's posts and OCR the images")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "etl-config.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    pub monitor: Option<bool>,

    /// Override progress bar setting from config
    #[arg(long)]
    pub progress: Option<bool>,

    /// Validate configuration and show what would run, without network access
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub job: Job,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Job {
    /// Scrape the account timeline and write the first image link of each post
    Links,
    /// Download each linked image and write the recognized text
    Ocr,
}
