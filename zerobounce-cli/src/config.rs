//! Configuration resolution from the environment and CLI args

use crate::cli::{GlobalArgs, OutputFormat};
use crate::error::CliError;
use std::collections::HashSet;
use std::time::Duration;
use zerobounce_client::{Client, Configuration};
use zeroize::Zeroizing;

/// Resolved runtime configuration
pub struct Config {
    /// Client configuration, after env and flag overrides
    pub client: Configuration,
    /// Request timeout (None = reqwest default)
    pub timeout: Option<Duration>,
    /// Number of threads for batch validation
    pub thread_count: usize,
    /// Output format
    pub format: OutputFormat,
    /// Quiet mode
    pub quiet: bool,
}

impl Config {
    /// Build config from CLI args on top of the environment
    ///
    /// Precedence is flags, then environment variables (including a `.env`
    /// file loaded earlier), then built-in defaults.
    pub fn from_args(args: GlobalArgs) -> Result<Self, CliError> {
        let base = Configuration::from_env()?;
        let prompted = if args.prompt_key {
            Some(prompt_api_key()?)
        } else {
            None
        };
        Ok(Self::resolve(args, base, prompted))
    }

    /// Apply flags to a base configuration
    fn resolve(
        args: GlobalArgs,
        mut client: Configuration,
        prompted: Option<Zeroizing<String>>,
    ) -> Self {
        let api_key = prompted
            .as_ref()
            .map(|key| key.as_str())
            .or(args.api_key.as_deref());
        if let Some(key) = api_key {
            client.set_api_key(key);
        }
        if let Some(host) = args.host {
            client.host = host;
        }
        if let Some(version) = args.api_version {
            client.api_version = version;
        }
        if !args.valid_statuses.is_empty() {
            client.valid_statuses = args.valid_statuses.into_iter().collect::<HashSet<_>>();
        }

        if client.api_key().is_empty() {
            tracing::warn!("no API key configured, requests will be rejected");
        }

        Config {
            client,
            timeout: args.timeout,
            thread_count: args.threads.unwrap_or_else(num_cpus),
            format: args.format,
            quiet: args.quiet,
        }
    }

    /// Build a client on this configuration
    pub fn build_client(&self) -> Result<Client, CliError> {
        let mut http = reqwest::blocking::Client::builder().use_rustls_tls();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        let client = Client::builder()
            .configuration(self.client.clone().shared())
            .client_builder(http)
            .build()?;
        Ok(client)
    }
}

/// Get number of CPUs
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Prompt user for the API key
fn prompt_api_key() -> Result<Zeroizing<String>, CliError> {
    let key = rpassword::prompt_password("Enter ZeroBounce API key: ")
        .map_err(|e| CliError::Config(format!("Failed to read API key: {}", e)))?;
    if key.is_empty() {
        return Err(CliError::Config("API key is required.".to_string()));
    }
    Ok(Zeroizing::new(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerobounce_client::{ApiVersion, Status};

    fn base() -> Configuration {
        let mut config = Configuration::default();
        config.set_api_key("env-key");
        config
    }

    #[test]
    fn test_defaults_are_kept_without_flags() {
        let config = Config::resolve(GlobalArgs::default(), base(), None);
        assert_eq!(config.client.api_key(), "env-key");
        assert_eq!(config.client.host, "https://api.zerobounce.net");
        assert_eq!(config.client.api_version, ApiVersion::V2);
        assert!(config.client.valid_statuses.contains(&Status::CatchAll));
        assert!(config.thread_count >= 1);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_flags_override_environment() {
        let args = GlobalArgs {
            api_key: Some("flag-key".to_string()),
            host: Some("http://localhost:8080".to_string()),
            api_version: Some(ApiVersion::V1),
            valid_statuses: vec![Status::Valid, Status::Unknown],
            threads: Some(3),
            timeout: Some(Duration::from_secs(5)),
            ..GlobalArgs::default()
        };
        let config = Config::resolve(args, base(), None);

        assert_eq!(config.client.api_key(), "flag-key");
        assert_eq!(config.client.host, "http://localhost:8080");
        assert_eq!(config.client.api_version, ApiVersion::V1);
        assert_eq!(
            config.client.valid_statuses,
            HashSet::from([Status::Valid, Status::Unknown])
        );
        assert_eq!(config.thread_count, 3);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_prompted_key_wins() {
        let args = GlobalArgs {
            api_key: Some("flag-key".to_string()),
            ..GlobalArgs::default()
        };
        let config = Config::resolve(args, base(), Some(Zeroizing::new("typed".to_string())));
        assert_eq!(config.client.api_key(), "typed");
    }

    #[test]
    fn test_build_client_uses_resolved_configuration() {
        let args = GlobalArgs {
            api_version: Some(ApiVersion::V1),
            timeout: Some(Duration::from_secs(2)),
            ..GlobalArgs::default()
        };
        let config = Config::resolve(args, base(), None);
        let client = config.build_client().unwrap();
        let shared = client.configuration().read().unwrap();
        assert_eq!(shared.api_version, ApiVersion::V1);
        assert_eq!(shared.api_key(), "env-key");
    }
}
