//! Error types for the CLI

use thiserror::Error;

/// Main CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// ZeroBounce client error
    #[error("ZeroBounce error: {0}")]
    Client(#[from] zerobounce_client::Error),

    /// Thread pool creation failed
    #[error("Thread pool creation failed: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Output serialization failed
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error
    ///
    /// Exit code 2 is reserved for an invalid address in `check`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 3,
            _ => 1,
        }
    }
}
