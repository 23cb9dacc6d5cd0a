//! Normalized validation results

use crate::config::{self, ApiVersion, SharedConfiguration};
use crate::status::{Status, SubStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Timestamp layouts the API has used, all without a zone and read as UTC
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

/// Result of validating one address
///
/// Every field is decoded once, when the result is built. Validity is the
/// exception: [`is_valid`](Self::is_valid) checks the status against the
/// configuration's valid statuses each time it is called, so changing the
/// configuration later changes the answer.
#[derive(Clone)]
pub struct ValidationResult {
    fields: Fields,
    body: Map<String, Value>,
    config: SharedConfiguration,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Fields {
    status: Option<Status>,
    sub_status: Option<SubStatus>,
    address: Option<String>,
    account: Option<String>,
    domain: Option<String>,
    firstname: Option<String>,
    lastname: Option<String>,
    gender: Option<String>,
    disposable: bool,
    toxic: bool,
    #[serde(flatten)]
    details: Details,
}

/// Fields that only one API version returns
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "api_version", rename_all = "lowercase")]
pub enum Details {
    /// Version 1 fields
    V1(V1Details),
    /// Version 2 fields
    V2(V2Details),
}

/// Location and date fields returned by version 1
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct V1Details {
    /// Location of the owner, when known
    pub location: Option<String>,
    /// Country of the supplied IP address
    pub country: Option<String>,
    /// Region or state of the supplied IP address
    pub region: Option<String>,
    /// City of the supplied IP address
    pub city: Option<String>,
    /// Zip code of the supplied IP address
    pub zipcode: Option<String>,
    /// When the address was validated
    pub processed_at: Option<DateTime<Utc>>,
    /// When the address was created, when known
    pub creation_date: Option<DateTime<Utc>>,
}

/// Domain and mail server fields returned by version 2
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct V2Details {
    /// When the address was validated
    pub processed_at: Option<DateTime<Utc>>,
    /// Age of the domain in days
    pub domain_age_days: Option<i64>,
    /// Mail provider behind the domain
    pub smtp_provider: Option<String>,
    /// Suggested correction for a mistyped address
    pub did_you_mean: Option<String>,
    /// Preferred MX record of the domain
    pub mx_record: Option<String>,
    /// Whether the domain has an MX record
    pub mx_found: bool,
    /// Whether the address belongs to a free mail provider
    pub free_email: bool,
}

impl ValidationResult {
    /// Normalize a decoded response body
    ///
    /// `body` keys are expected lowercased, as produced by
    /// [`RawResponse::decode_body`](crate::RawResponse::decode_body).
    pub fn new(body: Map<String, Value>, version: ApiVersion, config: SharedConfiguration) -> Self {
        let fields = version.normalize(&body);
        Self {
            fields,
            body,
            config,
        }
    }

    /// Primary deliverability status
    pub fn status(&self) -> Option<&Status> {
        self.fields.status.as_ref()
    }

    /// Secondary status explaining the primary one
    pub fn sub_status(&self) -> Option<&SubStatus> {
        self.fields.sub_status.as_ref()
    }

    /// The validated address
    pub fn address(&self) -> Option<&str> {
        self.fields.address.as_deref()
    }

    /// The part of the address before the `@`
    pub fn account(&self) -> Option<&str> {
        self.fields.account.as_deref()
    }

    /// The part of the address after the `@`
    pub fn domain(&self) -> Option<&str> {
        self.fields.domain.as_deref()
    }

    /// First name of the owner, when known
    pub fn firstname(&self) -> Option<&str> {
        self.fields.firstname.as_deref()
    }

    /// Last name of the owner, when known
    pub fn lastname(&self) -> Option<&str> {
        self.fields.lastname.as_deref()
    }

    /// Gender of the owner, when known
    pub fn gender(&self) -> Option<&str> {
        self.fields.gender.as_deref()
    }

    /// Whether the domain is a throwaway mail provider
    ///
    /// Do not mail these even when the status is valid.
    pub fn is_disposable(&self) -> bool {
        self.fields.disposable
    }

    /// Whether the domain is known for abuse, spam or bot sign-ups
    ///
    /// Do not mail these even when the status is valid.
    pub fn is_toxic(&self) -> bool {
        self.fields.toxic
    }

    /// Whether the status is in the configuration's valid statuses
    ///
    /// A result without a status is never valid.
    pub fn is_valid(&self) -> bool {
        match &self.fields.status {
            Some(status) => config::read(&self.config).valid_statuses.contains(status),
            None => false,
        }
    }

    /// The negation of [`is_valid`](Self::is_valid)
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// API version that produced this result
    pub fn api_version(&self) -> ApiVersion {
        match self.fields.details {
            Details::V1(_) => ApiVersion::V1,
            Details::V2(_) => ApiVersion::V2,
        }
    }

    /// Version-specific fields
    pub fn details(&self) -> &Details {
        &self.fields.details
    }

    /// When the address was validated
    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        match &self.fields.details {
            Details::V1(v1) => v1.processed_at,
            Details::V2(v2) => v2.processed_at,
        }
    }

    /// When the address was created (version 1 only)
    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        self.v1().and_then(|v1| v1.creation_date)
    }

    /// Location of the owner (version 1 only)
    pub fn location(&self) -> Option<&str> {
        self.v1().and_then(|v1| v1.location.as_deref())
    }

    /// Country of the supplied IP address (version 1 only)
    pub fn country(&self) -> Option<&str> {
        self.v1().and_then(|v1| v1.country.as_deref())
    }

    /// Region of the supplied IP address (version 1 only)
    pub fn region(&self) -> Option<&str> {
        self.v1().and_then(|v1| v1.region.as_deref())
    }

    /// City of the supplied IP address (version 1 only)
    pub fn city(&self) -> Option<&str> {
        self.v1().and_then(|v1| v1.city.as_deref())
    }

    /// Zip code of the supplied IP address (version 1 only)
    pub fn zipcode(&self) -> Option<&str> {
        self.v1().and_then(|v1| v1.zipcode.as_deref())
    }

    /// Age of the domain in days (version 2 only)
    pub fn domain_age_days(&self) -> Option<i64> {
        self.v2().and_then(|v2| v2.domain_age_days)
    }

    /// Mail provider behind the domain (version 2 only)
    pub fn smtp_provider(&self) -> Option<&str> {
        self.v2().and_then(|v2| v2.smtp_provider.as_deref())
    }

    /// Suggested correction for a mistyped address (version 2 only)
    pub fn did_you_mean(&self) -> Option<&str> {
        self.v2().and_then(|v2| v2.did_you_mean.as_deref())
    }

    /// Preferred MX record of the domain (version 2 only)
    pub fn mx_record(&self) -> Option<&str> {
        self.v2().and_then(|v2| v2.mx_record.as_deref())
    }

    /// Whether the domain has an MX record (version 2 only, false otherwise)
    pub fn is_mx_found(&self) -> bool {
        self.v2().is_some_and(|v2| v2.mx_found)
    }

    /// Whether the address belongs to a free provider (version 2 only, false otherwise)
    pub fn is_free_email(&self) -> bool {
        self.v2().is_some_and(|v2| v2.free_email)
    }

    /// The decoded body the result was built from, keys lowercased
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Normalized fields as a JSON object
    ///
    /// Contains the decoded fields, `api_version`, and `valid`/`invalid` as of
    /// this call. The raw body and the configuration are not included.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = match serde_json::to_value(&self.fields) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let valid = self.is_valid();
        map.insert("valid".to_string(), Value::Bool(valid));
        map.insert("invalid".to_string(), Value::Bool(!valid));
        map
    }

    fn v1(&self) -> Option<&V1Details> {
        match &self.fields.details {
            Details::V1(v1) => Some(v1),
            Details::V2(_) => None,
        }
    }

    fn v2(&self) -> Option<&V2Details> {
        match &self.fields.details {
            Details::V2(v2) => Some(v2),
            Details::V1(_) => None,
        }
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationResult")
            .field("address", &self.fields.address)
            .field("status", &self.fields.status)
            .field("sub_status", &self.fields.sub_status)
            .field("api_version", &self.api_version())
            .finish_non_exhaustive()
    }
}

impl ApiVersion {
    fn normalize(self, body: &Map<String, Value>) -> Fields {
        let status = text(body, "status").and_then(|s| Status::from_token(&s));
        let sub_status = text(body, "sub_status").and_then(|s| SubStatus::from_token(&s));

        let (disposable, toxic, details) = match self {
            Self::V1 => (
                flag(body, "disposable"),
                flag(body, "toxic"),
                Details::V1(V1Details {
                    location: text(body, "location"),
                    country: text(body, "country"),
                    region: text(body, "region"),
                    city: text(body, "city"),
                    zipcode: text(body, "zipcode"),
                    processed_at: timestamp(body, "processedat"),
                    creation_date: timestamp(body, "creationdate"),
                }),
            ),
            // v2 reports these through the sub status
            Self::V2 => (
                sub_status == Some(SubStatus::Disposable) || flag(body, "disposable"),
                sub_status == Some(SubStatus::Toxic) || flag(body, "toxic"),
                Details::V2(V2Details {
                    processed_at: timestamp(body, "processed_at"),
                    domain_age_days: integer(body, "domain_age_days"),
                    smtp_provider: text(body, "smtp_provider"),
                    did_you_mean: text(body, "did_you_mean"),
                    mx_record: text(body, "mx_record"),
                    mx_found: flag(body, "mx_found"),
                    free_email: flag(body, "free_email"),
                }),
            ),
        };

        Fields {
            status,
            sub_status,
            address: text(body, "address"),
            account: text(body, "account"),
            domain: text(body, "domain"),
            firstname: text(body, "firstname"),
            lastname: text(body, "lastname"),
            gender: text(body, "gender"),
            disposable,
            toxic,
            details,
        }
    }
}

/// Non-empty string field; numbers are rendered as text
fn text(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Boolean field, false when absent; the API sometimes sends `"true"`
fn flag(body: &Map<String, Value>, key: &str) -> bool {
    match body.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn integer(body: &Map<String, Value>, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn timestamp(body: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = text(body, key)?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        tracing::debug!(field = key, value = %raw, "ignoring unparseable timestamp");
    }
    parsed
}

/// Parse an API timestamp, reading it as UTC when it carries no zone
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
