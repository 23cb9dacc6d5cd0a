//! Parallel executor for batch validation

use crate::error::CliError;
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::time::{Duration, Instant};
use zerobounce_client::{Client, Error, Params, Transport, ValidationResult};

/// Outcome of validating one address
pub struct EmailResult {
    pub email: String,
    pub result: Result<ValidationResult, Error>,
    pub duration: Duration,
    pub finished_at: DateTime<Local>,
}

/// Runs validations on a dedicated thread pool
pub struct Executor<T = zerobounce_client::ReqwestTransport> {
    client: Client<T>,
    thread_pool: rayon::ThreadPool,
}

impl<T: Transport + Sync> Executor<T> {
    /// Create an executor with `thread_count` workers
    pub fn new(client: Client<T>, thread_count: usize) -> Result<Self, CliError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()?;
        Ok(Self {
            client,
            thread_pool,
        })
    }

    /// Validate every email, results in input order
    ///
    /// A failure for one address does not stop the others.
    pub fn validate_all(&self, emails: &[String], ip_address: Option<&str>) -> Vec<EmailResult> {
        tracing::info!(count = emails.len(), "validating batch");
        let client = &self.client;

        self.thread_pool.install(|| {
            emails
                .par_iter()
                .map(|email| validate_one(client, email, ip_address))
                .collect()
        })
    }
}

fn validate_one<T: Transport>(
    client: &Client<T>,
    email: &str,
    ip_address: Option<&str>,
) -> EmailResult {
    let mut params = Params::new(email);
    if let Some(ip) = ip_address {
        params = params.with_ip_address(ip);
    }

    let start = Instant::now();
    let result = client.validate(&params);
    let duration = start.elapsed();

    if let Err(e) = &result {
        tracing::info!(email, error = %e, "validation failed");
    }

    EmailResult {
        email: email.to_string(),
        result,
        duration,
        finished_at: Local::now(),
    }
}
