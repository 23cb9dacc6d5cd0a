//! Error types for the ZeroBounce client and the response classifier

use crate::transport::RawResponse;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when using the ZeroBounce client
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered 500 with a generic body
    #[error("internal server error: {body}")]
    InternalServerError {
        /// The status code that was received
        status: StatusCode,
        /// The raw response body
        body: String,
    },

    /// The server answered 500 because a required parameter was missing, usually the API key
    #[error("{body}")]
    MissingParameter {
        /// The status code that was received
        status: StatusCode,
        /// The raw response body
        body: String,
    },

    /// The server answered 200 but the body describes an application error
    /// such as an invalid key or an exhausted account
    #[error("{}", api_error_message(.body))]
    ApiError {
        /// The status code that was received
        status: StatusCode,
        /// The raw response body
        body: String,
    },

    /// The status code is not one the API is documented to return
    #[error("unexpected HTTP status {status}: {body}")]
    UnknownError {
        /// The status code that was received
        status: StatusCode,
        /// The raw response body
        body: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A successful response could not be decoded as JSON
    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// The raw response body
        body: String,
    },

    /// A successful response decoded to JSON that is not an object
    #[error("response body is not a JSON object: {body}")]
    UnexpectedBody {
        /// The raw response body
        body: String,
    },

    /// A configured header name or value is not valid HTTP
    #[error("invalid header {name:?}")]
    InvalidHeader {
        /// The offending header name
        name: String,
    },

    /// The configured host cannot be used as a base URL
    #[error("invalid host: {0}")]
    InvalidHost(String),

    /// An API version string was neither `v1` nor `v2`
    #[error("unknown API version {0:?}, expected v1 or v2")]
    InvalidApiVersion(String),

    /// Client initialization failed
    #[error("Client initialization failed: {0}")]
    ClientInit(String),
}

impl Error {
    /// The HTTP status the error was classified from, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::InternalServerError { status, .. }
            | Self::MissingParameter { status, .. }
            | Self::ApiError { status, .. }
            | Self::UnknownError { status, .. } => Some(*status),
            Self::Request(e) => e.status(),
            _ => None,
        }
    }

    /// The raw response body the error was built from, if any
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::InternalServerError { body, .. }
            | Self::MissingParameter { body, .. }
            | Self::ApiError { body, .. }
            | Self::UnknownError { body, .. }
            | Self::Decode { body, .. }
            | Self::UnexpectedBody { body } => Some(body),
            _ => None,
        }
    }

    /// Human readable message
    ///
    /// For [`Error::ApiError`] the message is read from the body's `"error"` field
    /// each time it is requested. A body that does not parse yields the raw body.
    pub fn message(&self) -> String {
        match self {
            Self::ApiError { body, .. } => api_error_message(body),
            Self::InternalServerError { body, .. } | Self::MissingParameter { body, .. } => {
                body.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Decide whether a completed response is a failure
///
/// The API reports bad or exhausted keys with a 200 and an error-shaped body,
/// so the body is inspected even on success, as a prefix test on the raw text.
///
/// Statuses other than 200 and 500 are reported as [`Error::UnknownError`].
pub fn classify(response: &RawResponse) -> Option<Error> {
    let status = response.status;
    let body = || response.body.clone();

    match status {
        StatusCode::INTERNAL_SERVER_ERROR => {
            if response.body.starts_with("Missing parameter") {
                Some(Error::MissingParameter {
                    status,
                    body: body(),
                })
            } else {
                Some(Error::InternalServerError {
                    status,
                    body: body(),
                })
            }
        }
        StatusCode::OK => is_error_shaped(&response.body).then(|| Error::ApiError {
            status,
            body: body(),
        }),
        _ => Some(Error::UnknownError {
            status,
            body: body(),
        }),
    }
}

/// `{"error": ...` with optional whitespace between the tokens
fn is_error_shaped(body: &str) -> bool {
    let Some(rest) = body.trim_start().strip_prefix('{') else {
        return false;
    };
    let Some(rest) = rest.trim_start().strip_prefix("\"error\"") else {
        return false;
    };
    rest.trim_start().starts_with(':')
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("error")? {
            Value::String(message) => Some(message.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.to_string())
}
