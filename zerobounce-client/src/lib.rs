//! ZeroBounce Email Validation Client
//!
//! A blocking client for the ZeroBounce email validation API, covering both
//! the older (`v1`) and the current (`v2`) dialect.
//!
//! # Features
//!
//! - Single email validation, with optional IP address geolocation
//! - Remaining credit lookup
//! - Responses normalized into one [`ValidationResult`] shape for either API version
//! - Configurable set of statuses that count as valid
//! - Secure TLS using rustls (no OpenSSL dependencies)
//! - Well-typed errors using thiserror
//!
//! # Example
//!
//! ```no_run
//! use zerobounce_client::{ApiVersion, Params, Status};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Configure once at start-up. The key defaults to ZEROBOUNCE_API_KEY.
//! zerobounce_client::configure(|config| {
//!     config.set_api_key("your_api_key_here");
//!     config.api_version = ApiVersion::V2;
//!     config.valid_statuses.insert(Status::Unknown);
//! });
//!
//! let result = zerobounce_client::validate(&Params::new("someone@example.com"))?;
//! println!("{:?} / {:?}", result.status(), result.sub_status());
//!
//! if zerobounce_client::is_invalid("someone@example.com")? {
//!     println!("Do not send");
//! }
//!
//! println!("Credits: {:?}", zerobounce_client::credits(&Params::default())?);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod params;
mod response;
mod status;
mod transport;

pub use client::{Client, ClientBuilder};
pub use config::{
    API_KEY_ENV, API_VERSION_ENV, ApiVersion, Configuration, DEFAULT_HOST, HOST_ENV,
    SharedConfiguration, configuration, configure,
};
pub use error::{Error, classify};
pub use params::Params;
pub use response::{Details, V1Details, V2Details, ValidationResult};
pub use status::{Status, SubStatus, underscore};
pub use transport::{RawResponse, ReqwestTransport, Transport};

/// Validate an email with a client on the process-wide configuration
///
/// See [`Client::validate`].
pub fn validate(params: &Params) -> Result<ValidationResult, Error> {
    Client::new()?.validate(params)
}

/// Validate an email and geolocate its IP address with the process-wide configuration
///
/// See [`Client::validate_with_ip`].
pub fn validate_with_ip(params: &Params) -> Result<ValidationResult, Error> {
    Client::new()?.validate_with_ip(params)
}

/// Remaining credits, using the process-wide configuration
pub fn credits(params: &Params) -> Result<Option<i64>, Error> {
    Client::new()?.credits(params)
}

/// Whether `email` has one of the configured valid statuses
pub fn is_valid(email: &str) -> Result<bool, Error> {
    Client::new()?.is_valid(email)
}

/// Whether `email` does not have one of the configured valid statuses
pub fn is_invalid(email: &str) -> Result<bool, Error> {
    Client::new()?.is_invalid(email)
}
