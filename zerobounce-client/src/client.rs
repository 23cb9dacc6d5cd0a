//! ZeroBounce HTTP client implementation

use crate::config::{self, ApiVersion, SharedConfiguration};
use crate::error::{Error, classify};
use crate::params::{Params, Query};
use crate::response::ValidationResult;
use crate::transport::{ReqwestTransport, Transport};
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use zeroize::{Zeroize, Zeroizing};

/// The main ZeroBounce client
///
/// Every call takes a snapshot of the shared configuration, applies the
/// per-call overrides from [`Params`], sends exactly one GET request and
/// classifies the response before decoding it. There are no retries.
///
/// # Example
///
/// ```no_run
/// use zerobounce_client::{Client, Params};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new()?;
///
/// let result = client.validate(&Params::new("someone@example.com"))?;
/// if result.is_valid() {
///     println!("{} is deliverable", result.address().unwrap_or_default());
/// }
///
/// let credits = client.credits(&Params::default())?;
/// println!("Credits left: {:?}", credits);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client<T = ReqwestTransport> {
    transport: T,
    config: SharedConfiguration,
}

/// Settings resolved for one call
struct CallSettings {
    host: String,
    headers: BTreeMap<String, String>,
    api_key: Zeroizing<String>,
    version: ApiVersion,
}

impl Client<ReqwestTransport> {
    /// Create a client using the process-wide configuration and a default rustls transport
    ///
    /// # Errors
    ///
    /// Returns `Error::ClientInit` if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport> Client<T> {
    /// Create a client on top of any transport
    pub fn with_transport(transport: T, config: SharedConfiguration) -> Self {
        Self { transport, config }
    }

    /// The configuration handle this client reads, and its results consult
    pub fn configuration(&self) -> &SharedConfiguration {
        &self.config
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate an email address
    ///
    /// With API version 1 a request carrying an IP address goes to
    /// `validatewithip`, otherwise to `validate`. Version 2 always uses
    /// `validate`. A missing email is not checked locally; the API rejects it.
    ///
    /// # Errors
    ///
    /// * `Error::Request` - Network error
    /// * `Error::MissingParameter` / `Error::InternalServerError` - The API answered 500
    /// * `Error::ApiError` - The API reported an error such as an invalid key
    /// * `Error::UnknownError` - Any other unexpected status
    /// * `Error::Decode` - The response body is not JSON
    pub fn validate(&self, params: &Params) -> Result<ValidationResult, Error> {
        let settings = self.settings(params);
        let endpoint = settings.version.validate_endpoint(params);
        let query = settings.version.validate_query(params, &settings.api_key);

        let body = self.get(&settings, endpoint, query)?;
        Ok(ValidationResult::new(
            body,
            settings.version,
            self.config.clone(),
        ))
    }

    /// Validate an email address and look up geolocation for the IP address
    ///
    /// Version 1 always uses the `validatewithip` endpoint here. Version 2 has
    /// a single endpoint, so this is the same as [`validate`](Self::validate).
    pub fn validate_with_ip(&self, params: &Params) -> Result<ValidationResult, Error> {
        let settings = self.settings(params);
        let endpoint = match settings.version {
            ApiVersion::V1 => "validatewithip",
            ApiVersion::V2 => settings.version.validate_endpoint(params),
        };
        let query = settings.version.validate_query(params, &settings.api_key);

        let body = self.get(&settings, endpoint, query)?;
        Ok(ValidationResult::new(
            body,
            settings.version,
            self.config.clone(),
        ))
    }

    /// Number of credits left on the account
    ///
    /// Returns `Ok(None)` when the response has no readable `Credits` field.
    /// The API answers `-1` for an invalid key rather than failing.
    pub fn credits(&self, params: &Params) -> Result<Option<i64>, Error> {
        let settings = self.settings(params);
        let query = settings.version.credits_query(&settings.api_key);

        let body = self.get(&settings, settings.version.credits_endpoint(), query)?;
        Ok(parse_credits(&body))
    }

    /// Whether `email` has one of the configured valid statuses
    pub fn is_valid(&self, email: &str) -> Result<bool, Error> {
        Ok(self.validate(&Params::new(email))?.is_valid())
    }

    /// Whether `email` does not have one of the configured valid statuses
    pub fn is_invalid(&self, email: &str) -> Result<bool, Error> {
        Ok(self.validate(&Params::new(email))?.is_invalid())
    }

    /// Snapshot the configuration with the call's overrides applied
    ///
    /// The lock is released before any network traffic.
    fn settings(&self, params: &Params) -> CallSettings {
        let config = config::read(&self.config);
        CallSettings {
            host: params.host().unwrap_or(&config.host).to_string(),
            headers: params.headers().unwrap_or(&config.headers).clone(),
            api_key: Zeroizing::new(params.api_key().unwrap_or(config.api_key()).to_string()),
            version: config.api_version,
        }
    }

    /// Send one GET and turn the outcome into a decoded body or a classified error
    fn get(
        &self,
        settings: &CallSettings,
        endpoint: &'static str,
        mut query: Query,
    ) -> Result<Map<String, Value>, Error> {
        let url = endpoint_url(&settings.host, settings.version, endpoint)?;
        let headers = header_map(&settings.headers)?;

        tracing::debug!(version = %settings.version, endpoint, host = %settings.host, "sending request");
        let response = self.transport.get(url, &headers, &query);

        // The key was copied into the query
        for (_, value) in query.iter_mut() {
            value.zeroize();
        }

        let response = response?;
        tracing::debug!(status = %response.status, endpoint, "received response");

        if let Some(err) = classify(&response) {
            tracing::warn!(status = %response.status, endpoint, error = %err, "request failed");
            return Err(err);
        }

        response.decode_body()
    }
}

/// `{host}/{version}/{endpoint}`, keeping any path already on the host
fn endpoint_url(host: &str, version: ApiVersion, endpoint: &str) -> Result<Url, Error> {
    let mut url =
        Url::parse(host).map_err(|e| Error::InvalidHost(format!("{}: {}", host, e)))?;

    url.path_segments_mut()
        .map_err(|_| Error::InvalidHost(format!("{} cannot be used as a base URL", host)))?
        .pop_if_empty()
        .extend([version.as_str(), endpoint]);

    Ok(url)
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || Error::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn parse_credits(body: &Map<String, Value>) -> Option<i64> {
    let credits = match body.get("credits")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if credits.is_none() {
        tracing::debug!(value = ?body.get("credits"), "unreadable credits field");
    }
    credits
}

/// Builder for configuring a ZeroBounce client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use zerobounce_client::{ApiVersion, Client, Configuration};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Configuration::default();
/// config.set_api_key("my-api-key");
/// config.api_version = ApiVersion::V1;
///
/// let client = Client::builder()
///     .configuration(config.shared())
///     .client_builder(
///         reqwest::blocking::Client::builder()
///             .timeout(Duration::from_secs(10))
///     )
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: Option<SharedConfiguration>,
    client_builder: Option<reqwest::blocking::ClientBuilder>,
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration instead of the process-wide one
    pub fn configuration(mut self, config: SharedConfiguration) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom HTTP client builder (timeouts, proxies, ...)
    pub fn client_builder(mut self, builder: reqwest::blocking::ClientBuilder) -> Self {
        self.client_builder = Some(builder);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `Error::ClientInit` if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<Client<ReqwestTransport>, Error> {
        let transport = match self.client_builder {
            Some(builder) => ReqwestTransport::from_builder(builder)?,
            None => ReqwestTransport::new()?,
        };
        let config = self.config.unwrap_or_else(config::configuration);

        Ok(Client { transport, config })
    }
}
