//! Basic usage example for the ZeroBounce client
//!
//! This example demonstrates how to:
//! - Configure the process-wide defaults
//! - Create a client with its own configuration and HTTP settings
//! - Validate an email, with and without an IP address
//! - Check remaining credits
//!
//! Note: This example requires a ZeroBounce API key in ZEROBOUNCE_API_KEY.

use std::time::Duration;
use zerobounce_client::{ApiVersion, Client, Configuration, Error, Params, Status};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let email = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "valid@example.com".to_string());

    // Example 1: Global configuration
    println!("=== Example 1: Global Configuration ===");
    zerobounce_client::configure(|config| {
        config.valid_statuses.insert(Status::Unknown);
    });
    let result = zerobounce_client::validate(&Params::new(&email))?;
    println!("{} -> {:?} (valid: {})", email, result.status(), result.is_valid());

    // Example 2: A client with its own configuration and timeout
    println!("\n=== Example 2: Dedicated Client ===");
    let mut config = Configuration::from_env()?;
    config.api_version = ApiVersion::V1;
    let client = Client::builder()
        .configuration(config.shared())
        .client_builder(
            reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .use_rustls_tls(),
        )
        .build()?;

    let params = Params::new(&email).with_ip_address("99.123.12.122");
    match client.validate(&params) {
        Ok(result) => {
            println!("Status:     {:?}", result.status());
            println!("Sub status: {:?}", result.sub_status());
            println!("City:       {:?}", result.city());
            println!("Processed:  {:?}", result.processed_at());
        }
        Err(Error::ApiError { .. }) => println!("The API rejected the request"),
        Err(e) => return Err(e.into()),
    }

    // Example 3: Credits
    println!("\n=== Example 3: Credits ===");
    match client.credits(&Params::default())? {
        Some(-1) => println!("The API key is not valid"),
        Some(credits) => println!("{} credits left", credits),
        None => println!("No credit information returned"),
    }

    Ok(())
}
