//! Request validation helpers shared by the DTOs.

use crate::service::match_status::IntoMatchTime;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// A single rejected field, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        let path = if path.is_empty() {
            Vec::new()
        } else {
            vec![path.to_string()]
        };
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Flatten `validator` errors into client-facing issues.
///
/// Field names are reported in camelCase to match the JSON payloads.
pub fn collect_issues(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let field: &str = field.as_ref();
            let path = to_camel_case(field);
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", path));
                ValidationIssue::new(&path, message)
            })
        })
        .collect();

    issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));
    issues
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `validator` custom rule: the value must parse as an ISO date.
pub fn validate_iso_timestamp(value: &str) -> Result<(), ValidationError> {
    if value.to_match_time().is_some() {
        return Ok(());
    }
    Err(ValidationError::new("iso_timestamp")
        .with_message(Cow::Borrowed("must be a valid ISO date string")))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

fn coerce_i32<E: de::Error>(raw: NumberOrString) -> Result<i32, E> {
    let value = match raw {
        NumberOrString::Int(v) => v,
        NumberOrString::Float(v) if v.fract() == 0.0 && v.is_finite() => v as i64,
        NumberOrString::Float(v) => {
            return Err(E::custom(format!("expected an integer, got {}", v)));
        }
        NumberOrString::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| E::custom(format!("expected an integer, got \"{}\"", s)))?,
    };
    i32::try_from(value).map_err(|_| E::custom(format!("integer {} is out of range", value)))
}

/// Deserialize an integer given either as a JSON number or a numeric string.
pub fn coerce_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    coerce_i32(NumberOrString::deserialize(deserializer)?)
}

/// Optional variant of [`coerce_int`]; `null` maps to `None`.
pub fn coerce_optional_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(coerce_i32)
        .transpose()
}
