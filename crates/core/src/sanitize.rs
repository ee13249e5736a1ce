//! Turn raw persistence errors into messages that are safe to show clients.
//!
//! Database drivers put constraint names, offending values and SQL text into
//! their error strings. None of that may reach an HTTP response.

use std::sync::LazyLock;

use regex::Regex;

use crate::forms::MISSING_REQUIRED_FIELDS;

pub const MSG_DUPLICATE: &str = "A record with that value already exists";
pub const MSG_FOREIGN_KEY: &str = "A referenced record does not exist";
pub const MSG_TOO_LONG: &str = "A value is too long";
pub const MSG_BAD_FORMAT: &str = "A value has an invalid format";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred";

/// Maximum length (in characters) of a sanitized message.
pub const MAX_MESSAGE_CHARS: usize = 200;

static DETAIL_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\b(DETAIL|HINT|CONTEXT|SQL|WHERE|LINE \d+):.*$").expect("valid regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Known failure phrases, checked case-insensitively in order.
const PHRASES: &[(&str, &str)] = &[
    ("duplicate key", MSG_DUPLICATE),
    ("unique constraint", MSG_DUPLICATE),
    ("foreign key constraint", MSG_FOREIGN_KEY),
    ("violates not-null constraint", MISSING_REQUIRED_FIELDS),
    ("null value in column", MISSING_REQUIRED_FIELDS),
    ("value too long", MSG_TOO_LONG),
    ("invalid input syntax", MSG_BAD_FORMAT),
];

/// Map a PostgreSQL SQLSTATE code to a client-safe message.
pub fn sanitize_pg_code(code: &str) -> Option<&'static str> {
    match code {
        "23505" => Some(MSG_DUPLICATE),
        "23503" => Some(MSG_FOREIGN_KEY),
        "23502" => Some(MISSING_REQUIRED_FIELDS),
        "22001" => Some(MSG_TOO_LONG),
        "22P02" | "22007" | "22008" => Some(MSG_BAD_FORMAT),
        _ => None,
    }
}

/// Sanitize a raw error string for display.
pub fn sanitize_error_message(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if let Some((_, msg)) = PHRASES.iter().find(|(phrase, _)| lower.contains(phrase)) {
        return (*msg).to_string();
    }

    let stripped = DETAIL_MARKER_RE.replace(raw, "");
    let collapsed = WHITESPACE_RE.replace_all(stripped.trim(), " ");
    let collapsed = collapsed.trim();

    if collapsed.is_empty() {
        return MSG_UNEXPECTED.to_string();
    }

    truncate_chars(collapsed, MAX_MESSAGE_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
