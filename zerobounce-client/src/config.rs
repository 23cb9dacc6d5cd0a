//! Client configuration and the process-wide default instance

use crate::error::Error;
use crate::status::Status;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard};
use zeroize::Zeroizing;

/// Default API host
pub const DEFAULT_HOST: &str = "https://api.zerobounce.net";

/// Environment variable holding the default API key
pub const API_KEY_ENV: &str = "ZEROBOUNCE_API_KEY";

/// Environment variable overriding the host in [`Configuration::from_env`]
pub const HOST_ENV: &str = "ZEROBOUNCE_HOST";

/// Environment variable selecting the API version in [`Configuration::from_env`]
pub const API_VERSION_ENV: &str = "ZEROBOUNCE_API_VERSION";

/// Version of the remote API, which decides endpoint paths, parameter names
/// and the response vocabulary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// The older API (`/v1/...`, `apikey`, PascalCase statuses)
    V1,
    /// The current API (`/v2/...`, `api_key`, snake_case statuses)
    #[default]
    V2,
}

impl ApiVersion {
    /// Path segment used for this version
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            _ => Err(Error::InvalidApiVersion(s.to_string())),
        }
    }
}

/// Settings shared by every request
///
/// No value is validated when set. An empty API key or an unusable host is
/// only discovered when a request is made.
#[derive(Clone)]
pub struct Configuration {
    /// API host, e.g. `https://api.zerobounce.net`
    pub host: String,
    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Statuses that [`ValidationResult::is_valid`](crate::ValidationResult::is_valid) accepts
    pub valid_statuses: HashSet<Status>,
    /// API version used to build requests and read responses
    pub api_version: ApiVersion,
    api_key: Zeroizing<String>,
}

impl Configuration {
    /// Default configuration with the host and API version also read from the environment
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidApiVersion` if `ZEROBOUNCE_API_VERSION` is set to
    /// something other than `v1` or `v2`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(env_var)
    }

    /// [`from_env`](Self::from_env) reading variables through `get`
    ///
    /// Blank values count as unset.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::defaults_from(&get);
        if let Some(host) = non_blank(get(HOST_ENV)) {
            config.host = host;
        }
        if let Some(version) = non_blank(get(API_VERSION_ENV)) {
            config.api_version = version.parse()?;
        }
        Ok(config)
    }

    /// Built-in defaults with the API key taken from `get`
    fn defaults_from(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "user-agent".to_string(),
            format!("ZerobounceRustClient/{}", env!("CARGO_PKG_VERSION")),
        );

        Self {
            host: DEFAULT_HOST.to_string(),
            headers,
            valid_statuses: HashSet::from([Status::Valid, Status::CatchAll]),
            api_version: ApiVersion::default(),
            api_key: Zeroizing::new(get(API_KEY_ENV).unwrap_or_default()),
        }
    }

    /// The API key, empty when unset
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Replace the API key
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Zeroizing::new(api_key.into());
    }

    /// Wrap into a handle that clients and results can share
    pub fn shared(self) -> SharedConfiguration {
        Arc::new(RwLock::new(self))
    }
}

impl Default for Configuration {
    /// Host [`DEFAULT_HOST`], API key from `ZEROBOUNCE_API_KEY`, valid statuses
    /// `valid` and `catch_all`, API version 2.
    fn default() -> Self {
        Self::defaults_from(env_var)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Configuration")
            .field("host", &self.host)
            .field("headers", &self.headers)
            .field("valid_statuses", &self.valid_statuses)
            .field("api_version", &self.api_version)
            .field("api_key", &api_key)
            .finish()
    }
}

/// Configuration handle shared between a client and the results it produced
///
/// Results consult it each time validity is asked, so mutating it changes the
/// answer for results that already exist.
pub type SharedConfiguration = Arc<RwLock<Configuration>>;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Read a shared configuration, ignoring poisoning
pub(crate) fn read(config: &SharedConfiguration) -> RwLockReadGuard<'_, Configuration> {
    config.read().unwrap_or_else(PoisonError::into_inner)
}

static DEFAULT_CONFIGURATION: OnceLock<SharedConfiguration> = OnceLock::new();

/// The process-wide configuration, created from [`Configuration::default`] on first use
pub fn configuration() -> SharedConfiguration {
    DEFAULT_CONFIGURATION
        .get_or_init(|| Configuration::default().shared())
        .clone()
}

/// Mutate the process-wide configuration
///
/// Meant for start-up. Results created earlier see the change.
///
/// `f` runs while the write lock is held. From inside `f`, calling
/// [`ValidationResult::is_valid`](crate::ValidationResult::is_valid) on a
/// result or making any client call that uses the process-wide configuration
/// deadlocks.
///
/// # Example
///
/// ```
/// zerobounce_client::configure(|config| {
///     config.set_api_key("my-api-key");
///     config.api_version = zerobounce_client::ApiVersion::V1;
/// });
/// assert_eq!(
///     zerobounce_client::configuration().read().unwrap().api_key(),
///     "my-api-key"
/// );
/// ```
pub fn configure<F>(f: F)
where
    F: FnOnce(&mut Configuration),
{
    let shared = configuration();
    let mut guard = shared.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
}
