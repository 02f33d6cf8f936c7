//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use profile_finder_core::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, OutputFormat};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Find social media profiles for a username or email.
///
/// Guesses profile URLs on dozens of known platforms, fetches them politely
/// and collects contact hints into JSON/CSV and HTML reports. Run without a
/// subcommand for the interactive menu.
#[derive(Parser, Debug)]
#[command(name = "profile-finder")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum concurrent profile fetches (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Maximum attempts per URL for transient failures (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Report format written next to the HTML report (json or csv)
    #[arg(short = 'f', long, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Folder for report files [default: output]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds (1-300)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Do not fall back to a web search when a platform blocks the request
    #[arg(long)]
    pub no_fallback: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Non-interactive modes.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scan every known platform for one or more email addresses
    Email {
        /// Email addresses to search for
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Scan every known platform for one or more usernames
    Username {
        /// Usernames to probe
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Look up one Instagram profile through a logged-in session
    Instagram {
        /// Netscape cookie file exported from a logged-in browser
        #[arg(long)]
        session_file: PathBuf,

        /// Target username
        target: String,
    },
}
