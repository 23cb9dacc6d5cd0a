//! CLI argument parsing using clap

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::time::Duration;
use zerobounce_client::{ApiVersion, Status};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// One aligned line per result
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

/// ZeroBounce email validation from the command line
#[derive(Parser, Debug)]
#[command(name = "zerobounce", about = "Validate email addresses with ZeroBounce", version)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand
#[derive(ClapArgs, Debug, Default)]
pub struct GlobalArgs {
    /// API key (defaults to ZEROBOUNCE_API_KEY)
    #[arg(long, global = true, conflicts_with = "prompt_key")]
    pub api_key: Option<String>,

    /// Read the API key from the terminal without echo
    #[arg(long, global = true)]
    pub prompt_key: bool,

    /// API host (defaults to ZEROBOUNCE_HOST or https://api.zerobounce.net)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// API version: v1 or v2 (defaults to ZEROBOUNCE_API_VERSION or v2)
    #[arg(long, global = true, value_parser = parse_api_version)]
    pub api_version: Option<ApiVersion>,

    /// Status counted as valid, repeatable (replaces the default valid and catch_all)
    #[arg(long = "valid-status", global = true, value_parser = parse_status)]
    pub valid_statuses: Vec<Status>,

    /// Request timeout, e.g. "10s" or "1m 30s"
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Number of threads for batch validation
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Quiet mode - only output results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one or more email addresses
    Validate {
        /// Email addresses to validate
        #[arg(required = true)]
        emails: Vec<String>,

        /// IP address the emails were submitted from
        #[arg(long)]
        ip_address: Option<String>,
    },
    /// Check a single email, exiting 0 when valid and 2 when not
    Check {
        /// Email address to check
        email: String,
    },
    /// Show the remaining credits
    Credits,
}

fn parse_api_version(s: &str) -> Result<ApiVersion, String> {
    s.parse().map_err(|e: zerobounce_client::Error| e.to_string())
}

fn parse_status(s: &str) -> Result<Status, String> {
    Status::from_token(s).ok_or_else(|| "status cannot be empty".to_string())
}
