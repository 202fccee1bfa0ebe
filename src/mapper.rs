//! Error mapping for provider responses.
//!
//! [`classify`] is a pure function of the HTTP status and the decoded body.
//! Each provider signals errors in its own way; the shape is fixed per
//! provider when the [`Api`](crate::Api) is built.
//!
//! When both an HTTP error status and a body-embedded error are present, the
//! body decides the kind and message. The status alone decides whether the
//! bearer-refresh path runs (see [`Api`](crate::Api)).

use serde_json::Value;

use crate::error::{ErrorKind, ProviderFailure};

/// How a provider reports failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    /// HTTP status plus a nested `error` object with `id`, `code` and `message`.
    StatusAndNestedField,
    /// Top-level `code`/`message` pair where code `0` means success.
    TopLevelCodeMessage,
}

/// Result of classifying a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(ProviderFailure),
}

impl Outcome {
    /// Check if the response was classified as a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Classify a response.
pub fn classify(shape: ErrorShape, status: u16, body: &Value) -> Outcome {
    match shape {
        ErrorShape::StatusAndNestedField => classify_nested(status, body),
        ErrorShape::TopLevelCodeMessage => classify_top_level(status, body),
    }
}

fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

fn classify_nested(status: u16, body: &Value) -> Outcome {
    if let Some(error) = body.get("error") {
        let id = error.get("id").and_then(scalar_to_string);
        let code = error.get("code").and_then(scalar_to_string).or_else(|| id.clone());
        let kind = id
            .as_deref()
            .and_then(|id| id.trim().parse::<u16>().ok())
            .map(ErrorKind::from_status)
            .unwrap_or_else(|| ErrorKind::from_status(status));
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| error.as_str().map(str::to_string))
            .unwrap_or_else(|| fallback_message(status, code.as_deref()));
        return Outcome::Failure(ProviderFailure::new(kind, code, message, status));
    }

    if is_success_status(status) {
        return Outcome::Success;
    }

    Outcome::Failure(ProviderFailure::new(
        ErrorKind::from_status(status),
        None,
        raw_message(status, body),
        status,
    ))
}

fn classify_top_level(status: u16, body: &Value) -> Outcome {
    let code = body.get("code").and_then(Value::as_i64);
    let message = body.get("message").and_then(Value::as_str).filter(|m| !m.is_empty());

    match code {
        Some(0) if is_success_status(status) => Outcome::Success,
        Some(0) => Outcome::Failure(ProviderFailure::new(
            unknown_or_unauthorized(status),
            Some("0".to_string()),
            message
                .map(str::to_string)
                .unwrap_or_else(|| fallback_message(status, None)),
            status,
        )),
        Some(code) => {
            let code = code.to_string();
            let message = message
                .map(str::to_string)
                .unwrap_or_else(|| fallback_message(status, Some(&code)));
            Outcome::Failure(ProviderFailure::new(
                ErrorKind::BusinessError,
                Some(code),
                message,
                status,
            ))
        }
        None => Outcome::Failure(ProviderFailure::new(
            unknown_or_unauthorized(status),
            None,
            message
                .map(str::to_string)
                .unwrap_or_else(|| raw_message(status, body)),
            status,
        )),
    }
}

fn unknown_or_unauthorized(status: u16) -> ErrorKind {
    if status == 401 {
        ErrorKind::Unauthorized
    } else {
        ErrorKind::Unknown
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn raw_message(status: u16, body: &Value) -> String {
    match body {
        Value::String(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => fallback_message(status, None),
    }
}

fn fallback_message(status: u16, code: Option<&str>) -> String {
    match code {
        Some(code) => format!("Provider error {} (HTTP {})", code, status),
        None => format!("Provider error (HTTP {})", status),
    }
}
