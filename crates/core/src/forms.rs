//! Lenient field coercion for admin payloads.
//!
//! Admin DTOs are deserialized from JSON bodies *and* from urlencoded HTML
//! forms, where every value arrives as a string. The helpers here are used
//! with `#[serde(default, deserialize_with = "...")]` so one DTO accepts both:
//! blank strings become `None`, numeric strings become numbers, checkbox
//! values become booleans, and comma-separated strings become lists.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

use crate::types::DbId;

/// Message returned whenever a required field is absent or blank.
pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";

/// Validation error code used by [`non_blank`].
pub const CODE_REQUIRED: &str = "required";

// ---------------------------------------------------------------------------
// Deserializers
// ---------------------------------------------------------------------------

/// Deserialize an optional string, trimming it and mapping blanks to `None`.
///
/// Numbers and booleans are accepted and stringified.
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_empty(&s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, got {}",
            kind(&other)
        ))),
    }
}

/// Deserialize a required string, trimmed.
///
/// A missing or `null` value becomes an empty string so that the
/// [`non_blank`] validator reports it as a missing required field instead of
/// the deserializer rejecting the whole body.
pub fn trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_as_none(deserializer)?.unwrap_or_default())
}

/// Deserialize a required string verbatim; `null` becomes an empty string.
///
/// Unlike [`trimmed_string`] the value is kept as sent, for secrets where
/// surrounding whitespace is significant.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an optional integer from a JSON number or a numeric string.
pub fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {n}"))),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected an integer, got '{trimmed}'")))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected an integer, got {}",
            kind(&other)
        ))),
    }
}

/// Deserialize an optional boolean from a JSON bool or an HTML checkbox value.
pub fn optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(D::Error::custom(format!("expected a boolean, got {n}"))),
        },
        Some(Value::String(s)) => parse_bool(&s)
            .map_err(|_| D::Error::custom(format!("expected a boolean, got '{}'", s.trim()))),
        Some(other) => Err(D::Error::custom(format!(
            "expected a boolean, got {}",
            kind(&other)
        ))),
    }
}

/// Deserialize a list of strings from a JSON array or a comma-separated string.
///
/// Items are trimmed, blanks dropped and duplicates removed (first wins).
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(D::Error::custom(format!(
                    "expected a list of strings, found {}",
                    kind(&other)
                ))),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a list, got {}",
                kind(&other)
            )))
        }
    };

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        if let Some(item) = non_empty(&item) {
            if !out.contains(&item) {
                out.push(item);
            }
        }
    }
    Ok(out)
}

/// Deserialize a list of ids from a JSON array or a comma-separated string.
pub fn id_list<'de, D>(deserializer: D) -> Result<Vec<DbId>, D::Error>
where
    D: Deserializer<'de>,
{
    string_list(deserializer)?
        .into_iter()
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| D::Error::custom(format!("expected an id, got '{s}'")))
        })
        .collect()
}

/// Like [`string_list`], but an absent field stays `None` so partial updates
/// can leave the column untouched.
pub fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    string_list(deserializer).map(Some)
}

/// Like [`id_list`], but an absent field stays `None`.
pub fn optional_id_list<'de, D>(deserializer: D) -> Result<Option<Vec<DbId>>, D::Error>
where
    D: Deserializer<'de>,
{
    id_list(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// `validator` custom check: the value must contain non-whitespace text.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new(CODE_REQUIRED);
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Flatten `validator` errors into a single client-facing message.
///
/// Any missing required field short-circuits to [`MISSING_REQUIRED_FIELDS`].
/// Otherwise the result lists `field: message` pairs sorted by field name.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();

    if field_errors
        .values()
        .any(|errs| errs.iter().any(|e| e.code == CODE_REQUIRED))
    {
        return MISSING_REQUIRED_FIELDS.to_string();
    }

    let mut parts: Vec<String> = field_errors
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {msg}")
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(s: &str) -> Result<Option<bool>, ()> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "on" | "1" | "yes" => Ok(Some(true)),
        "false" | "off" | "0" | "no" => Ok(Some(false)),
        _ => Err(()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use validator::Validate;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[serde(default, deserialize_with = "trimmed_string")]
        #[validate(custom(function = "non_blank"), length(max = 10))]
        name: String,
        #[serde(default, deserialize_with = "empty_as_none")]
        note: Option<String>,
        #[serde(default, deserialize_with = "optional_i64")]
        rank: Option<i64>,
        #[serde(default, deserialize_with = "optional_bool")]
        visible: Option<bool>,
        #[serde(default, deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "id_list")]
        ids: Vec<DbId>,
    }

    fn parse(value: serde_json::Value) -> Sample {
        serde_json::from_value(value).expect("sample should deserialize")
    }

    #[test]
    fn blank_optional_string_becomes_none() {
        let s = parse(json!({ "name": "a", "note": "   " }));
        assert_eq!(s.note, None);
    }

    #[test]
    fn optional_string_is_trimmed() {
        let s = parse(json!({ "name": "a", "note": "  hello " }));
        assert_eq!(s.note.as_deref(), Some("hello"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s = parse(json!({}));
        assert_eq!(s.name, "");
        assert_eq!(s.rank, None);
        assert_eq!(s.visible, None);
        assert!(s.tags.is_empty());
        assert!(s.ids.is_empty());
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let s = parse(json!({ "name": "a", "rank": " 42 " }));
        assert_eq!(s.rank, Some(42));
        let s = parse(json!({ "name": "a", "rank": 7 }));
        assert_eq!(s.rank, Some(7));
        let s = parse(json!({ "name": "a", "rank": "" }));
        assert_eq!(s.rank, None);
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let result: Result<Sample, _> = serde_json::from_value(json!({ "rank": "abc" }));
        assert!(result.is_err());
    }

    #[test]
    fn checkbox_values_are_coerced() {
        assert_eq!(parse(json!({ "visible": "on" })).visible, Some(true));
        assert_eq!(parse(json!({ "visible": "false" })).visible, Some(false));
        assert_eq!(parse(json!({ "visible": true })).visible, Some(true));
        assert_eq!(parse(json!({ "visible": "" })).visible, None);
    }

    #[test]
    fn comma_separated_list_is_split_and_deduplicated() {
        let s = parse(json!({ "tags": "elf, mage,, elf ,bard" }));
        assert_eq!(s.tags, vec!["elf", "mage", "bard"]);
    }

    #[test]
    fn array_list_is_accepted() {
        let s = parse(json!({ "tags": [" a ", "b", ""], "ids": [3, "4"] }));
        assert_eq!(s.tags, vec!["a", "b"]);
        assert_eq!(s.ids, vec![3, 4]);
    }

    #[test]
    fn bad_id_is_rejected() {
        let result: Result<Sample, _> = serde_json::from_value(json!({ "ids": "1,x" }));
        assert!(result.is_err());
    }

    #[test]
    fn blank_required_field_reports_missing_required_fields() {
        let s = parse(json!({ "name": "   " }));
        let errors = s.validate().expect_err("blank name must fail");
        assert_eq!(validation_message(&errors), MISSING_REQUIRED_FIELDS);
    }

    #[test]
    fn other_errors_list_field_and_message() {
        let s = parse(json!({ "name": "much too long a name" }));
        let errors = s.validate().expect_err("long name must fail");
        let msg = validation_message(&errors);
        assert!(msg.starts_with("name: "), "unexpected message: {msg}");
    }

    #[derive(Debug, Deserialize)]
    struct Secret {
        #[serde(default, deserialize_with = "null_as_empty")]
        value: String,
    }

    #[test]
    fn null_secret_is_empty_and_untrimmed_otherwise() {
        let s: Secret = serde_json::from_value(json!({ "value": null })).unwrap();
        assert_eq!(s.value, "");
        let s: Secret = serde_json::from_value(json!({})).unwrap();
        assert_eq!(s.value, "");
        let s: Secret = serde_json::from_value(json!({ "value": "  x  " })).unwrap();
        assert_eq!(s.value, "  x  ");
    }

    #[test]
    fn valid_sample_passes() {
        let s = parse(json!({ "name": "Aria" }));
        assert!(s.validate().is_ok());
    }
}
