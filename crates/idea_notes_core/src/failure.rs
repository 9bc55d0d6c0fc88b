//! Best-effort classification of failure messages for display.
//!
//! Store state only ever holds a message string. Front ends use [`classify`] to
//! pick friendlier wording; nothing should branch on the result for control flow.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Carries the retry hint from the message, e.g. "30 minutes", when present.
    RateLimited { retry_after: Option<String> },
    Timeout,
    ServiceUnavailable,
    ContentTooLong,
    NotFound,
    Authentication,
    Other,
}

impl FailureKind {
    /// The text to show the user in place of the raw message.
    pub fn describe(&self, raw: &str) -> String {
        match self {
            FailureKind::RateLimited {
                retry_after: Some(wait),
            } => format!("Rate limit reached. Try again in {wait}."),
            FailureKind::RateLimited { retry_after: None } => {
                "Rate limit reached. Please wait a while and try again.".to_string()
            }
            FailureKind::Timeout => {
                "The request timed out. Select fewer notes or try again later.".to_string()
            }
            FailureKind::ServiceUnavailable => {
                "The AI service is temporarily unavailable. Please try again shortly.".to_string()
            }
            FailureKind::ContentTooLong => {
                "The selected notes are too long. Select fewer notes.".to_string()
            }
            FailureKind::NotFound => {
                "Some selected notes could not be found. Refresh your notes.".to_string()
            }
            FailureKind::Authentication => {
                "Authentication failed. Please log in again.".to_string()
            }
            FailureKind::Other if raw.trim().is_empty() => {
                "Something went wrong. Please try again.".to_string()
            }
            FailureKind::Other => raw.to_string(),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::RateLimited { .. } => "rate limited",
            FailureKind::Timeout => "timeout",
            FailureKind::ServiceUnavailable => "service unavailable",
            FailureKind::ContentTooLong => "content too long",
            FailureKind::NotFound => "not found",
            FailureKind::Authentication => "authentication",
            FailureKind::Other => "other",
        };
        f.write_str(label)
    }
}

// The backend reports AI failures in Japanese, so both languages are matched.
const TIMEOUT_PATTERNS: &[&str] = &["timeout", "timed out", "タイムアウト"];
const UNAVAILABLE_PATTERNS: &[&str] = &["503", "service unavailable", "temporarily unavailable", "利用できません"];
const TOO_LONG_PATTERNS: &[&str] = &["token", "too long", "長すぎます"];
const NOT_FOUND_PATTERNS: &[&str] = &["404", "not found", "見つかりません"];
const AUTH_PATTERNS: &[&str] = &["401", "unauthorized", "credentials", "認証"];

static RETRY_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*(?:seconds?|minutes?|hours?|秒|分|時間)").unwrap());

/// Classifies a failure message by keyword. Checks run in a fixed order, so a
/// message mentioning both a rate limit and a timeout counts as a rate limit.
pub fn classify(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    let contains_any = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

    if lower.contains("429") || lower.contains("rate limit") {
        let retry_after = RETRY_HINT_RE.find(message).map(|m| m.as_str().to_string());
        return FailureKind::RateLimited { retry_after };
    }
    if contains_any(TIMEOUT_PATTERNS) {
        return FailureKind::Timeout;
    }
    if contains_any(UNAVAILABLE_PATTERNS) {
        return FailureKind::ServiceUnavailable;
    }
    if contains_any(TOO_LONG_PATTERNS) {
        return FailureKind::ContentTooLong;
    }
    if contains_any(NOT_FOUND_PATTERNS) {
        return FailureKind::NotFound;
    }
    if contains_any(AUTH_PATTERNS) {
        return FailureKind::Authentication;
    }
    FailureKind::Other
}
