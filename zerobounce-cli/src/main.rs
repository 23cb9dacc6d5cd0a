//! ZeroBounce CLI - Command-line interface for the ZeroBounce email validation API

mod cli;
mod config;
mod error;
mod executor;
mod logging;
mod output;

use clap::Parser;
use cli::{Args, Command};
use config::Config;
use error::CliError;
use executor::Executor;
use output::OutputFormatter;
use zerobounce_client::Params;

/// Exit code of `check` for an address that is not valid
const EXIT_INVALID: i32 = 2;

fn main() {
    // Missing .env is fine
    dotenv::dotenv().ok();

    let args = Args::parse();
    logging::init(args.global.verbose);

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn run(args: Args) -> Result<i32, CliError> {
    let config = Config::from_args(args.global)?;
    let formatter = OutputFormatter::new(config.format, config.quiet);
    let client = config.build_client()?;

    match args.command {
        Command::Validate { emails, ip_address } => {
            let executor = Executor::new(client, config.thread_count)?;
            let results = executor.validate_all(&emails, ip_address.as_deref());

            for result in &results {
                formatter.print_result(result)?;
            }
            formatter.print_summary(&results);

            let failed = results.iter().any(|r| r.result.is_err());
            Ok(if failed { 1 } else { 0 })
        }
        Command::Check { email } => {
            let validation = client.validate(&Params::new(&email))?;
            formatter.print_check(&email, &validation)?;
            Ok(if validation.is_valid() { 0 } else { EXIT_INVALID })
        }
        Command::Credits => {
            let credits = client.credits(&Params::default())?;
            formatter.print_credits(credits)?;
            Ok(0)
        }
    }
}
