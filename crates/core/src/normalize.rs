//! Turns the backend's assorted error bodies into one display string.
//!
//! The REST backend reports failures in several shapes depending on which
//! layer rejected the request: a formatted `errors` map, a top-level
//! `message`, framework-level `non_field_errors`, or a raw field map. Each
//! function here checks those shapes in a fixed priority order.

use serde_json::Value;

/// Display string for a failed `login/` or `register/` call.
///
/// Priority: `errors` field map, `message`, `non_field_errors`, then the
/// first value of the body. Falls back to `fallback` when nothing usable is
/// present.
#[must_use]
pub fn normalize_auth_error(body: Option<&Value>, fallback: &str) -> String {
    let Some(body) = body.filter(|value| is_present(value)) else {
        return fallback.to_string();
    };

    if let Some(errors) = body.get("errors").filter(|value| is_present(value)) {
        return match errors {
            Value::Object(fields) => fields
                .iter()
                .map(|(field, value)| format!("{}: {}", field_label(field), plain_text(value)))
                .collect::<Vec<_>>()
                .join(", "),
            other => plain_text(other),
        };
    }

    if let Some(message) = body.get("message").filter(|value| is_present(value)) {
        return plain_text(message);
    }

    if let Some(non_field) = body.get("non_field_errors").filter(|value| is_present(value)) {
        return match non_field {
            Value::Array(items) => items.first().map_or_else(|| fallback.to_string(), plain_text),
            other => plain_text(other),
        };
    }

    match body {
        Value::Object(fields) => match fields.values().next() {
            Some(Value::Array(items)) => items
                .first()
                .map_or_else(|| fallback.to_string(), plain_text),
            Some(Value::String(text)) => text.clone(),
            _ => fallback.to_string(),
        },
        Value::String(text) => text.clone(),
        _ => fallback.to_string(),
    }
}

/// Display string for a failed `quizzes/{id}/submit/` call.
///
/// Priority: `answers` field error, `quiz_id` field error, `detail`,
/// `message`, then the compact JSON of the whole body.
#[must_use]
pub fn normalize_submit_error(body: Option<&Value>, fallback: &str) -> String {
    let Some(body) = body.filter(|value| is_present(value)) else {
        return fallback.to_string();
    };

    if let Some(answers) = body.get("answers").filter(|value| is_present(value)) {
        return format!("Invalid answers format: {}", compact_json(answers));
    }
    if let Some(quiz_id) = body.get("quiz_id").filter(|value| is_present(value)) {
        return format!("Invalid quiz ID: {}", compact_json(quiz_id));
    }
    if let Some(detail) = body.get("detail").filter(|value| is_present(value)) {
        return plain_text(detail);
    }
    if let Some(message) = body.get("message").filter(|value| is_present(value)) {
        return plain_text(message);
    }

    compact_json(body)
}

/// `detail` or `message` from an error body, when the backend sent one.
#[must_use]
pub fn detail_message(body: Option<&Value>) -> Option<String> {
    let body = body?;
    ["detail", "message"]
        .iter()
        .find_map(|key| body.get(*key).filter(|value| is_present(value)))
        .map(plain_text)
}

/// `email_address` -> `Email address`.
fn field_label(field: &str) -> String {
    let spaced = field.replacen('_', " ", 1);
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(plain_text).collect::<Vec<_>>().join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compact_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => true,
    }
}
