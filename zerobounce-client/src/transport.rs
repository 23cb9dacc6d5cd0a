//! HTTP transport seam
//!
//! The client only needs one capability from the network layer: a GET with
//! headers and query parameters that yields a status, headers and a body.
//! [`ReqwestTransport`] is the default implementation.

use crate::error::Error;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};

/// Raw outcome of a completed HTTP call, before classification
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Undecoded response body
    pub body: String,
}

impl RawResponse {
    /// Build a response with no headers
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Decode the body as a JSON object with lowercased keys
    ///
    /// The API mixes `Credits`, `processedat` and `sub_status` style keys, so
    /// lookups are made case-insensitive by folding keys once here. A blank body
    /// decodes to an empty object.
    pub fn decode_body(&self) -> Result<Map<String, Value>, Error> {
        if self.body.trim().is_empty() {
            return Ok(Map::new());
        }

        let value: Value = serde_json::from_str(&self.body).map_err(|source| Error::Decode {
            source,
            body: self.body.clone(),
        })?;

        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect()),
            _ => Err(Error::UnexpectedBody {
                body: self.body.clone(),
            }),
        }
    }
}

/// A blocking HTTP GET capability
pub trait Transport {
    /// Send a GET request and return the raw response
    ///
    /// Implementations report network failures as errors but must return any
    /// completed response as `Ok`, whatever its status. Classification is the
    /// caller's job.
    fn get(
        &self,
        url: Url,
        headers: &HeaderMap,
        query: &[(&'static str, String)],
    ) -> Result<RawResponse, Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(
        &self,
        url: Url,
        headers: &HeaderMap,
        query: &[(&'static str, String)],
    ) -> Result<RawResponse, Error> {
        (**self).get(url, headers, query)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(
        &self,
        url: Url,
        headers: &HeaderMap,
        query: &[(&'static str, String)],
    ) -> Result<RawResponse, Error> {
        (**self).get(url, headers, query)
    }
}

/// Transport backed by a blocking reqwest client using rustls
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default rustls client
    ///
    /// # Errors
    ///
    /// Returns `Error::ClientInit` if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, Error> {
        Self::from_builder(reqwest::blocking::Client::builder().use_rustls_tls())
    }

    /// Create a transport from a customized client builder (timeouts, proxies, ...)
    pub fn from_builder(builder: reqwest::blocking::ClientBuilder) -> Result<Self, Error> {
        let client = builder
            .build()
            .map_err(|e| Error::ClientInit(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already built client
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn get(
        &self,
        url: Url,
        headers: &HeaderMap,
        query: &[(&'static str, String)],
    ) -> Result<RawResponse, Error> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .query(query)
            .send()?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text()?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lowercases_keys() {
        let raw = RawResponse::new(StatusCode::OK, r#"{"Credits":"42","processedAt":"x"}"#);
        let body = raw.decode_body().unwrap();
        assert_eq!(body.get("credits"), Some(&Value::String("42".into())));
        assert!(body.contains_key("processedat"));
        assert!(!body.contains_key("Credits"));
    }

    #[test]
    fn test_decode_blank_body_is_empty_object() {
        let raw = RawResponse::new(StatusCode::OK, "  \n");
        assert!(raw.decode_body().unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let raw = RawResponse::new(StatusCode::OK, "<html></html>");
        assert!(matches!(raw.decode_body(), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_decode_rejects_non_object_json() {
        let raw = RawResponse::new(StatusCode::OK, "[1, 2, 3]");
        assert!(matches!(raw.decode_body(), Err(Error::UnexpectedBody { .. })));
    }

    #[test]
    fn test_reqwest_transport_sends_headers_and_query() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v2/validate")
            .match_header("user-agent", "test-agent")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("api_key".into(), "secret".into()),
                mockito::Matcher::UrlEncoded("ip_address".into(), "".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"valid"}"#)
            .expect(1)
            .create();

        let transport = ReqwestTransport::new().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", "test-agent".parse().unwrap());
        let url = Url::parse(&format!("{}/v2/validate", server.url())).unwrap();
        let query = [("api_key", "secret".to_string()), ("ip_address", String::new())];

        let raw = transport.get(url, &headers, &query).unwrap();

        mock.assert();
        assert_eq!(raw.status, StatusCode::OK);
        assert_eq!(raw.body, r#"{"status":"valid"}"#);
        assert_eq!(
            raw.headers.get("content-type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_reqwest_transport_returns_error_statuses_as_ok() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/getcredits")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("Missing parameter: apikey")
            .create();

        let transport = ReqwestTransport::new().unwrap();
        let url = Url::parse(&format!("{}/v1/getcredits", server.url())).unwrap();

        let raw = transport.get(url, &HeaderMap::new(), &[]).unwrap();

        mock.assert();
        assert_eq!(raw.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(raw.body, "Missing parameter: apikey");
    }
}
