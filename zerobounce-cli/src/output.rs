//! Output formatting for validation results

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::executor::EmailResult;
use serde_json::{Value, json};
use std::time::Duration;
use zerobounce_client::{Error, ValidationResult};

/// A rendered line and the stream it belongs on
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Stdout(String),
    Stderr(String),
}

impl Line {
    fn print(self) {
        match self {
            Line::Stdout(s) => println!("{}", s),
            Line::Stderr(s) => eprintln!("{}", s),
        }
    }
}

/// Output formatter for results
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
    start_time: std::time::Instant,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self {
            format,
            quiet,
            start_time: std::time::Instant::now(),
        }
    }

    /// Format and print a single batch result
    pub fn print_result(&self, result: &EmailResult) -> Result<(), CliError> {
        self.render_result(result)?.print();
        Ok(())
    }

    /// Render a batch result
    pub fn render_result(&self, result: &EmailResult) -> Result<Line, CliError> {
        match (self.format, &result.result) {
            (OutputFormat::Json, Ok(validation)) => {
                let mut map = validation.to_map();
                map.insert("email".to_string(), json!(result.email));
                map.insert(
                    "duration_ms".to_string(),
                    json!(result.duration.as_millis() as u64),
                );
                Ok(Line::Stdout(serde_json::to_string(&map)?))
            }
            (OutputFormat::Json, Err(e)) => {
                let value = error_json(&result.email, e);
                Ok(Line::Stdout(serde_json::to_string(&value)?))
            }
            (OutputFormat::Human, Ok(validation)) if self.quiet => Ok(Line::Stdout(format!(
                "{}\t{}",
                result.email,
                verdict(validation)
            ))),
            (OutputFormat::Human, Ok(validation)) => Ok(Line::Stdout(format!(
                "{}: {} ({}, {})",
                result.email,
                describe(validation),
                format_duration(result.duration),
                result.finished_at.format("%H:%M:%S")
            ))),
            (OutputFormat::Human, Err(e)) => {
                Ok(Line::Stderr(format!("{}: Error - {}", result.email, e)))
            }
        }
    }

    /// Print the result of `check`
    pub fn print_check(&self, email: &str, validation: &ValidationResult) -> Result<(), CliError> {
        let line = match self.format {
            OutputFormat::Json => {
                let mut map = validation.to_map();
                map.insert("email".to_string(), json!(email));
                serde_json::to_string(&map)?
            }
            OutputFormat::Human if self.quiet => verdict(validation).to_string(),
            OutputFormat::Human => format!("{}: {}", email, describe(validation)),
        };
        println!("{}", line);
        Ok(())
    }

    /// Print the remaining credits
    pub fn print_credits(&self, credits: Option<i64>) -> Result<(), CliError> {
        println!("{}", self.render_credits(credits)?);
        Ok(())
    }

    fn render_credits(&self, credits: Option<i64>) -> Result<String, CliError> {
        Ok(match (self.format, credits) {
            (OutputFormat::Json, _) => serde_json::to_string(&json!({ "credits": credits }))?,
            (OutputFormat::Human, Some(-1)) => "-1 (the API key was not accepted)".to_string(),
            (OutputFormat::Human, Some(n)) => n.to_string(),
            (OutputFormat::Human, None) => "unknown".to_string(),
        })
    }

    /// Print a summary after a batch
    pub fn print_summary(&self, results: &[EmailResult]) {
        if self.quiet || self.format == OutputFormat::Json {
            return;
        }

        let summary = Summary::from_results(results);
        println!();
        println!("--- Summary ---");
        println!(
            "Emails: {} valid, {} invalid, {} failed",
            summary.valid, summary.invalid, summary.failed
        );
        println!("Total request time: {}", format_duration(summary.request_time));
        println!(
            "Elapsed wall-clock time: {}",
            format_duration(self.start_time.elapsed())
        );
    }
}

/// Counts over a batch
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub valid: usize,
    pub invalid: usize,
    pub failed: usize,
    pub request_time: Duration,
}

impl Summary {
    pub fn from_results(results: &[EmailResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match &r.result {
                Ok(v) if v.is_valid() => acc.valid += 1,
                Ok(_) => acc.invalid += 1,
                Err(_) => acc.failed += 1,
            }
            acc.request_time += r.duration;
            acc
        })
    }
}

fn verdict(validation: &ValidationResult) -> &'static str {
    if validation.is_valid() {
        "valid"
    } else {
        "invalid"
    }
}

/// `valid [valid]`, `invalid [do_not_mail/role_based, toxic]`
fn describe(validation: &ValidationResult) -> String {
    let mut detail = validation
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "no status".to_string());
    if let Some(sub_status) = validation.sub_status() {
        detail = format!("{}/{}", detail, sub_status);
    }
    if validation.is_disposable() {
        detail.push_str(", disposable");
    }
    if validation.is_toxic() {
        detail.push_str(", toxic");
    }
    if let Some(suggestion) = validation.did_you_mean() {
        detail = format!("{}, did you mean {}?", detail, suggestion);
    }
    format!("{} [{}]", verdict(validation), detail)
}

fn error_json(email: &str, error: &Error) -> Value {
    json!({
        "email": email,
        "error": error.message(),
        "http_status": error.status().map(|s| s.as_u16()),
    })
}

/// Format a Duration for display
fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.2}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use reqwest::StatusCode;
    use serde_json::Map;
    use zerobounce_client::{ApiVersion, Configuration};

    fn validation(body: Value, version: ApiVersion) -> ValidationResult {
        let Value::Object(map) = body else {
            panic!("object expected")
        };
        ValidationResult::new(map, version, Configuration::default().shared())
    }

    fn email_result(email: &str, result: Result<ValidationResult, Error>) -> EmailResult {
        EmailResult {
            email: email.to_string(),
            result,
            duration: Duration::from_millis(12),
            finished_at: Local::now(),
        }
    }

    #[test]
    fn test_human_line() {
        let formatter = OutputFormatter::new(OutputFormat::Human, false);
        let v = validation(
            json!({"status": "DoNotMail", "sub_status": "RoleBased", "toxic": true}),
            ApiVersion::V1,
        );
        let Line::Stdout(line) = formatter
            .render_result(&email_result("a@example.com", Ok(v)))
            .unwrap()
        else {
            panic!("expected stdout")
        };
        assert!(line.starts_with("a@example.com: invalid [do_not_mail/role_based, toxic]"));
        assert!(line.contains("12.00ms"));
    }

    #[test]
    fn test_quiet_line() {
        let formatter = OutputFormatter::new(OutputFormat::Human, true);
        let v = validation(json!({"status": "valid"}), ApiVersion::V2);
        assert_eq!(
            formatter
                .render_result(&email_result("a@example.com", Ok(v)))
                .unwrap(),
            Line::Stdout("a@example.com\tvalid".to_string())
        );
    }

    #[test]
    fn test_human_error_goes_to_stderr() {
        let formatter = OutputFormatter::new(OutputFormat::Human, false);
        let err = Error::UnknownError {
            status: StatusCode::BAD_GATEWAY,
            body: "bad gateway".to_string(),
        };
        let line = formatter
            .render_result(&email_result("a@example.com", Err(err)))
            .unwrap();
        assert!(matches!(line, Line::Stderr(s) if s.starts_with("a@example.com: Error - ")));
    }

    #[test]
    fn test_json_line() {
        let formatter = OutputFormatter::new(OutputFormat::Json, false);
        let v = validation(
            json!({"address": "a@example.com", "status": "valid", "free_email": true}),
            ApiVersion::V2,
        );
        let Line::Stdout(line) = formatter
            .render_result(&email_result("a@example.com", Ok(v)))
            .unwrap()
        else {
            panic!("expected stdout")
        };
        let parsed: Map<String, Value> = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["email"], json!("a@example.com"));
        assert_eq!(parsed["valid"], json!(true));
        assert_eq!(parsed["status"], json!("valid"));
        assert_eq!(parsed["duration_ms"], json!(12));
    }

    #[test]
    fn test_json_error_line() {
        let formatter = OutputFormatter::new(OutputFormat::Json, false);
        let err = Error::ApiError {
            status: StatusCode::OK,
            body: r#"{"error":"Invalid API Key"}"#.to_string(),
        };
        let Line::Stdout(line) = formatter
            .render_result(&email_result("a@example.com", Err(err)))
            .unwrap()
        else {
            panic!("expected stdout")
        };
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["error"], json!("Invalid API Key"));
        assert_eq!(parsed["http_status"], json!(200));
    }

    #[test]
    fn test_credits_rendering() {
        let human = OutputFormatter::new(OutputFormat::Human, false);
        assert_eq!(human.render_credits(Some(42)).unwrap(), "42");
        assert_eq!(human.render_credits(None).unwrap(), "unknown");
        assert!(human.render_credits(Some(-1)).unwrap().starts_with("-1"));

        let json = OutputFormatter::new(OutputFormat::Json, false);
        assert_eq!(json.render_credits(Some(42)).unwrap(), r#"{"credits":42}"#);
        assert_eq!(json.render_credits(None).unwrap(), r#"{"credits":null}"#);
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            email_result(
                "a@example.com",
                Ok(validation(json!({"status": "valid"}), ApiVersion::V2)),
            ),
            email_result(
                "b@example.com",
                Ok(validation(json!({"status": "invalid"}), ApiVersion::V2)),
            ),
            email_result(
                "c@example.com",
                Err(Error::UnexpectedBody {
                    body: "[]".to_string(),
                }),
            ),
        ];
        let summary = Summary::from_results(&results);
        assert_eq!(
            summary,
            Summary {
                valid: 1,
                invalid: 1,
                failed: 1,
                request_time: Duration::from_millis(36),
            }
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(500)), "500µs");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
    }
}
