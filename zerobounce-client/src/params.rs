//! Call parameters and their version-specific query encoding

use crate::config::ApiVersion;
use std::collections::BTreeMap;
use std::fmt;
use zeroize::Zeroizing;

/// Parameters for a single call
///
/// Anything left unset falls back to the client's [`Configuration`](crate::Configuration).
/// Overrides apply to this call only and never touch the shared configuration.
///
/// # Example
///
/// ```
/// use zerobounce_client::Params;
///
/// let params = Params::new("someone@example.com")
///     .with_ip_address("203.0.113.7")
///     .with_api_key("override-key");
/// assert_eq!(params.email(), Some("someone@example.com"));
/// assert_eq!(params.ip_address(), Some("203.0.113.7"));
/// ```
#[derive(Clone, Default)]
pub struct Params {
    email: Option<String>,
    ip_address: Option<String>,
    api_key: Option<Zeroizing<String>>,
    host: Option<String>,
    headers: Option<BTreeMap<String, String>>,
}

impl Params {
    /// Parameters validating `email`
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Build parameters from loosely named key/value pairs
    ///
    /// Keys are matched ignoring case and underscores, so `ip_address`,
    /// `ipaddress` and `ipAddress` are the same parameter, as are `api_key`,
    /// `apikey` and `apiKey`. Keys that name no parameter are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use zerobounce_client::Params;
    ///
    /// let params = Params::from_pairs([
    ///     ("email", "someone@example.com"),
    ///     ("ip_address", "203.0.113.7"),
    ///     ("favourite_colour", "green"),
    /// ]);
    /// assert_eq!(params.ip_address(), Some("203.0.113.7"));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            match normalize_key(key).as_str() {
                "email" => params.email = Some(value.into()),
                "ipaddress" => params.ip_address = Some(value.into()),
                "apikey" => params.api_key = Some(Zeroizing::new(value.into())),
                "host" => params.host = Some(value.into()),
                _ => tracing::trace!(key, "dropping unrecognized parameter"),
            }
        }
        params
    }

    /// Set the email address to validate
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the IP address the email was submitted from
    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Use this API key instead of the configured one
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Zeroizing::new(api_key.into()));
        self
    }

    /// Send this call to another host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Replace the configured headers for this call with `headers`
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Email address, if set
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// IP address, if set
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// API key override, if set
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.as_str())
    }

    /// Host override, if set
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Header override, if set
    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("email", &self.email)
            .field("ip_address", &self.ip_address)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("headers", &self.headers)
            .finish()
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Query pairs in the order they are sent
pub(crate) type Query = Vec<(&'static str, String)>;

impl ApiVersion {
    /// Endpoint for a validation call
    ///
    /// Version 1 has a separate endpoint when an IP address is supplied,
    /// version 2 handles both on `validate`.
    pub(crate) fn validate_endpoint(self, params: &Params) -> &'static str {
        match self {
            Self::V1 if params.ip_address.is_some() => "validatewithip",
            Self::V1 | Self::V2 => "validate",
        }
    }

    /// Endpoint for the remaining credits
    pub(crate) fn credits_endpoint(self) -> &'static str {
        "getcredits"
    }

    /// Name of the API key query parameter
    pub(crate) fn api_key_param(self) -> &'static str {
        match self {
            Self::V1 => "apikey",
            Self::V2 => "api_key",
        }
    }

    /// Name of the IP address query parameter
    pub(crate) fn ip_address_param(self) -> &'static str {
        match self {
            Self::V1 => "ipaddress",
            Self::V2 => "ip_address",
        }
    }

    /// Query for a validation call
    ///
    /// Only the key, the email and the IP address are ever sent. Version 2
    /// rejects requests without an `ip_address` key, so it is always present
    /// there, empty when unset.
    pub(crate) fn validate_query(self, params: &Params, api_key: &str) -> Query {
        let mut query = vec![(self.api_key_param(), api_key.to_string())];

        if let Some(email) = &params.email {
            query.push(("email", email.clone()));
        }

        match (self, &params.ip_address) {
            (_, Some(ip_address)) => query.push((self.ip_address_param(), ip_address.clone())),
            (Self::V2, None) => query.push((self.ip_address_param(), String::new())),
            (Self::V1, None) => {}
        }

        query
    }

    /// Query for the credits call
    pub(crate) fn credits_query(self, api_key: &str) -> Query {
        vec![(self.api_key_param(), api_key.to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(query: &Query) -> Vec<&'static str> {
        query.iter().map(|(k, _)| *k).collect()
    }

    fn value<'a>(query: &'a Query, key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_from_pairs_normalizes_aliases() {
        for key in ["ip_address", "ipaddress", "ipAddress", "IP_ADDRESS"] {
            let params = Params::from_pairs([(key, "127.0.0.1")]);
            assert_eq!(params.ip_address(), Some("127.0.0.1"), "alias {key}");
        }
        for key in ["api_key", "apikey", "apiKey"] {
            let params = Params::from_pairs([(key, "secret")]);
            assert_eq!(params.api_key(), Some("secret"), "alias {key}");
        }
    }

    #[test]
    fn test_from_pairs_drops_unknown_keys() {
        let params = Params::from_pairs([("foo", "foo"), ("bar", "bar")]);
        assert!(params.email().is_none());
        assert!(params.ip_address().is_none());
        assert!(params.api_key().is_none());
        assert!(params.host().is_none());

        let query = ApiVersion::V1.validate_query(&params, "");
        assert_eq!(keys(&query), vec!["apikey"]);
    }

    #[test]
    fn test_v1_routing() {
        let plain = Params::new("a@example.com");
        assert_eq!(ApiVersion::V1.validate_endpoint(&plain), "validate");

        let with_ip = Params::from_pairs([("email", "a@example.com"), ("ip_address", "127.0.0.1")]);
        assert_eq!(ApiVersion::V1.validate_endpoint(&with_ip), "validatewithip");

        let with_ip = Params::from_pairs([("email", "a@example.com"), ("ipaddress", "127.0.0.1")]);
        assert_eq!(ApiVersion::V1.validate_endpoint(&with_ip), "validatewithip");
    }

    #[test]
    fn test_v2_routing_ignores_ip() {
        let plain = Params::new("a@example.com");
        let with_ip = plain.clone().with_ip_address("127.0.0.1");
        assert_eq!(ApiVersion::V2.validate_endpoint(&plain), "validate");
        assert_eq!(ApiVersion::V2.validate_endpoint(&with_ip), "validate");
    }

    #[test]
    fn test_v1_query_names() {
        let params = Params::new("a@example.com").with_ip_address("127.0.0.1");
        let query = ApiVersion::V1.validate_query(&params, "key");
        assert_eq!(keys(&query), vec!["apikey", "email", "ipaddress"]);
        assert_eq!(value(&query, "apikey"), Some("key"));
        assert_eq!(value(&query, "ipaddress"), Some("127.0.0.1"));
    }

    #[test]
    fn test_v1_query_omits_absent_ip() {
        let query = ApiVersion::V1.validate_query(&Params::new("a@example.com"), "key");
        assert_eq!(keys(&query), vec!["apikey", "email"]);
    }

    #[test]
    fn test_v2_query_always_sends_ip() {
        let query = ApiVersion::V2.validate_query(&Params::new("a@example.com"), "key");
        assert_eq!(keys(&query), vec!["api_key", "email", "ip_address"]);
        assert_eq!(value(&query, "ip_address"), Some(""));
    }

    #[test]
    fn test_missing_email_is_forwarded_as_absent() {
        let query = ApiVersion::V2.validate_query(&Params::default(), "key");
        assert_eq!(keys(&query), vec!["api_key", "ip_address"]);
    }

    #[test]
    fn test_credits_query() {
        assert_eq!(ApiVersion::V1.credits_query("k"), vec![("apikey", "k".to_string())]);
        assert_eq!(ApiVersion::V2.credits_query("k"), vec![("api_key", "k".to_string())]);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let params = Params::new("a@example.com").with_api_key("super-secret");
        let debug = format!("{:?}", params);
        assert!(!debug.contains("super-secret"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_v2_query_has_ip_address_key(
            email in "[a-z]{1,10}@[a-z]{1,10}\\.com",
            ip in prop::option::of("[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}"),
        ) {
            let mut params = Params::new(email.clone());
            if let Some(ip) = &ip {
                params = params.with_ip_address(ip.clone());
            }
            let query = ApiVersion::V2.validate_query(&params, "key");
            prop_assert_eq!(value(&query, "ip_address"), Some(ip.as_deref().unwrap_or("")));
            prop_assert_eq!(value(&query, "email"), Some(email.as_str()));
            prop_assert_eq!(ApiVersion::V2.validate_endpoint(&params), "validate");
        }
    }
}
