use clap::{Parser, Subcommand};
use convertlink::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convertlink")]
#[command(author, version, about = "Session client for a remote media conversion service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a conversion against an in-process simulated service
    Simulate {
        /// Source URL to convert
        #[arg(long, required = true)]
        url: String,

        /// Output format (defaults to session.default_format)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Make the simulated service fail the job with this message
        #[arg(long)]
        fail: Option<String>,

        /// Delay between simulated progress frames
        #[arg(long, default_value = "50")]
        step_delay_ms: u64,

        /// Give up if the job has not finished after this long
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    ShowConfig,

    /// Write a default configuration file
    InitConfig {
        /// Where to write the file
        #[arg(required = true)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}
