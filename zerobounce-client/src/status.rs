//! Deliverability status vocabularies and token normalization

use regex::Regex;
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static ACRONYM_BOUNDARY: OnceLock<Regex> = OnceLock::new();
static WORD_BOUNDARY: OnceLock<Regex> = OnceLock::new();

/// Convert a camel or Pascal case API token to lower snake case
///
/// Acronym runs stay together: `HTTPResponse` becomes `http_response`.
/// Hyphens become underscores, so `catch-all` becomes `catch_all`.
///
/// # Example
///
/// ```
/// use zerobounce_client::underscore;
///
/// assert_eq!(underscore("DoNotMail"), "do_not_mail");
/// assert_eq!(underscore("HTTPResponse"), "http_response");
/// assert_eq!(underscore("catch-all"), "catch_all");
/// ```
pub fn underscore(word: &str) -> String {
    let acronym = ACRONYM_BOUNDARY
        .get_or_init(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid acronym regex"));
    let word_boundary = WORD_BOUNDARY
        .get_or_init(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid word boundary regex"));

    let word = acronym.replace_all(word, "${1}_${2}");
    let word = word_boundary.replace_all(&word, "${1}_${2}");
    word.to_lowercase().replace('-', "_")
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $token:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$variant_meta])* $variant, )+
            /// A token this client does not know, kept in normalized form
            Other(String),
        }

        impl $name {
            /// Every known value, in declaration order
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            /// Canonical lower snake case token
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $token, )+
                    Self::Other(token) => token.as_str(),
                }
            }

            /// Normalize a raw API token, `None` for a blank one
            pub fn from_token(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                if raw.is_empty() {
                    return None;
                }
                Some(Self::from_normalized(underscore(raw)))
            }

            fn from_normalized(token: String) -> Self {
                match token.as_str() {
                    $( $token => Self::$variant, )+
                    _ => Self::Other(token),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from_normalized(underscore(s.trim())))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

token_enum! {
    /// Primary deliverability status
    pub enum Status {
        /// The address is deliverable
        Valid => "valid",
        /// The address is not deliverable
        Invalid => "invalid",
        /// The domain accepts all mail, so the mailbox cannot be verified
        CatchAll => "catch_all",
        /// The server could not be reached or gave no clear answer
        Unknown => "unknown",
        /// The address is believed to be a spam trap
        Spamtrap => "spamtrap",
        /// The owner is known to report messages as abuse
        Abuse => "abuse",
        /// The address is valid but should not be mailed
        DoNotMail => "do_not_mail",
    }
}

token_enum! {
    /// Secondary status explaining the primary one
    ///
    /// Version 1 sends PascalCase tokens, version 2 sends snake case. Both
    /// normalize to the same values.
    pub enum SubStatus {
        AntispamSystem => "antispam_system",
        Greylisted => "greylisted",
        MailServerTemporaryError => "mail_server_temporary_error",
        ForcibleDisconnect => "forcible_disconnect",
        MailServerDidNotRespond => "mail_server_did_not_respond",
        TimeoutExceeded => "timeout_exceeded",
        FailedSmtpConnection => "failed_smtp_connection",
        MailboxQuotaExceeded => "mailbox_quota_exceeded",
        ExceptionOccurred => "exception_occurred",
        PossibleTraps => "possible_traps",
        RoleBased => "role_based",
        GlobalSuppression => "global_suppression",
        MailboxNotFound => "mailbox_not_found",
        NoDnsEntries => "no_dns_entries",
        FailedSyntaxCheck => "failed_syntax_check",
        PossibleTypo => "possible_typo",
        UnroutableIpAddress => "unroutable_ip_address",
        LeadingPeriodRemoved => "leading_period_removed",
        DoesNotAcceptMail => "does_not_accept_mail",
        AliasAddress => "alias_address",
        Unknown => "unknown",
        /// Version 2 only
        RoleBasedCatchAll => "role_based_catch_all",
        /// Version 2 only, the domain is a throwaway mail provider
        Disposable => "disposable",
        /// Version 2 only, the domain is known for abuse or bots
        Toxic => "toxic",
        /// Version 2 only
        MxForward => "mx_forward",
        /// Version 2 only
        Alternate => "alternate",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_underscore_pascal_case() {
        assert_eq!(underscore("DoNotMail"), "do_not_mail");
        assert_eq!(underscore("MailboxNotFound"), "mailbox_not_found");
        assert_eq!(underscore("Valid"), "valid");
    }

    #[test]
    fn test_underscore_acronym_runs() {
        assert_eq!(underscore("HTTPResponse"), "http_response");
        assert_eq!(underscore("NoDNSEntries"), "no_dns_entries");
        assert_eq!(underscore("FailedSMTPConnection"), "failed_smtp_connection");
    }

    #[test]
    fn test_underscore_leaves_snake_case_alone() {
        assert_eq!(underscore("do_not_mail"), "do_not_mail");
        assert_eq!(underscore("catch-all"), "catch_all");
    }

    #[test]
    fn test_status_from_token() {
        assert_eq!(Status::from_token("DoNotMail"), Some(Status::DoNotMail));
        assert_eq!(Status::from_token("catch-all"), Some(Status::CatchAll));
        assert_eq!(Status::from_token("Valid"), Some(Status::Valid));
        assert_eq!(Status::from_token(""), None);
        assert_eq!(Status::from_token("   "), None);
    }

    #[test]
    fn test_unknown_tokens_are_kept() {
        assert_eq!(
            Status::from_token("BrandNewStatus"),
            Some(Status::Other("brand_new_status".to_string()))
        );
        assert_eq!(
            SubStatus::from_token("accept_all").map(|s| s.to_string()),
            Some("accept_all".to_string())
        );
    }

    #[test]
    fn test_sub_status_versions_agree() {
        assert_eq!(
            SubStatus::from_token("GlobalSuppression"),
            SubStatus::from_token("global_suppression")
        );
        assert_eq!(
            SubStatus::from_token("NoDNSEntries"),
            Some(SubStatus::NoDnsEntries)
        );
    }

    #[test]
    fn test_status_serializes_as_token() {
        let value = serde_json::to_value(Status::DoNotMail).unwrap();
        assert_eq!(value, serde_json::json!("do_not_mail"));
    }

    #[test]
    fn test_from_str_is_lenient() {
        assert_eq!("CatchAll".parse::<Status>().unwrap(), Status::CatchAll);
        assert_eq!("do_not_mail".parse::<Status>().unwrap(), Status::DoNotMail);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_pascal_case_words_join_with_underscores(
            words in prop::collection::vec("[A-Z][a-z]{1,8}", 1..5),
        ) {
            let pascal: String = words.concat();
            let expected = words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("_");
            prop_assert_eq!(underscore(&pascal), expected);
        }

        #[test]
        fn prop_known_tokens_round_trip(index in 0usize..Status::KNOWN.len()) {
            let status = &Status::KNOWN[index];
            let parsed = Status::from_token(status.as_str());
            prop_assert_eq!(parsed.as_ref(), Some(status));
        }
    }
}
