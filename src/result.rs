//! Decoded response document with dot-path lookup.

use serde_json::Value;

use crate::error::{Error, Result};

/// A successfully decoded provider response.
///
/// The tree is a [`serde_json::Value`]: objects, arrays and scalars.
/// [`search`](Self::search) walks nested objects only.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    document: Value,
}

impl ApiResult {
    /// Wrap a decoded document.
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Resolve a dot-delimited path such as `"response.customer_uid"`.
    ///
    /// Returns `Ok(None)` if any segment is missing or an intermediate value
    /// is not an object. Fails only for malformed paths (empty path or an
    /// empty segment).
    pub fn search(&self, path: &str) -> Result<Option<&Value>> {
        if path.is_empty() {
            return Err(Error::validation("Search path must not be empty"));
        }

        let mut current = &self.document;
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(Error::validation(format!(
                    "Malformed search path '{}': empty segment",
                    path
                )));
            }
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(next) => current = next,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Resolve a path to a string leaf.
    pub fn search_str(&self, path: &str) -> Result<Option<&str>> {
        Ok(self.search(path)?.and_then(Value::as_str))
    }

    /// Resolve a path to an integer leaf. Numeric strings are accepted.
    pub fn search_i64(&self, path: &str) -> Result<Option<i64>> {
        Ok(self.search(path)?.and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }))
    }

    /// Direct JSON-pointer access, for paths that index into arrays.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.document.pointer(pointer)
    }

    /// Borrow the whole document.
    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Take the whole document.
    pub fn into_value(self) -> Value {
        self.document
    }
}

impl From<Value> for ApiResult {
    fn from(document: Value) -> Self {
        Self::new(document)
    }
}
