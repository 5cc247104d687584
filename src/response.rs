use crate::codec;
use crate::error::{MediaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body the read API sends when a lookup matched nothing.
pub const NULL_SENTINEL: &str = "NULL";

/// Pagination metadata reported alongside a read result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
    pub total_count: Option<i64>,
}

impl PageMeta {
    fn from_payload(payload: &Value) -> Self {
        let field = |key: &str| payload.get(key).and_then(as_count);
        PageMeta {
            page_number: field("page_number"),
            page_size: field("page_size"),
            total_count: field("total_count"),
        }
    }
}

// Counts may arrive as strings once protected by the codec.
fn as_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// A decoded read result.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// The API answered `NULL`: no matching item
    Empty,
    /// A single item
    Single(Value),
    /// A bare list of items
    List(Vec<Value>),
    /// A page of items with its pagination metadata
    Page { items: Vec<Value>, meta: PageMeta },
}

impl ApiResponse {
    /// Items carried by the response; a single item counts as one.
    pub fn items(&self) -> &[Value] {
        match self {
            ApiResponse::Empty => &[],
            ApiResponse::Single(item) => std::slice::from_ref(item),
            ApiResponse::List(items) | ApiResponse::Page { items, .. } => items,
        }
    }

    /// Consume the response and return its items
    pub fn into_items(self) -> Vec<Value> {
        match self {
            ApiResponse::Empty => Vec::new(),
            ApiResponse::Single(item) => vec![item],
            ApiResponse::List(items) | ApiResponse::Page { items, .. } => items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Unmarshal the result into the provided type
    pub fn apply<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = match self {
            ApiResponse::Empty => Value::Null,
            ApiResponse::Single(item) => item.clone(),
            ApiResponse::List(items) | ApiResponse::Page { items, .. } => Value::Array(items.clone()),
        };
        serde_json::from_value(value)
            .map_err(|e| MediaError::read_failed("unexpected result shape", Some(Box::new(e))))
    }

    /// Get a value from a single-item result by a slash-separated path,
    /// e.g. `"customFields/genre"` or `"renditions/0/url"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = match self {
            ApiResponse::Single(item) => item,
            _ => return None,
        };
        for part in path.split('/').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get a string value from a single-item result by path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

fn error_text(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(error.to_string())),
        other => Some(other.to_string()),
    }
}

fn check_error(payload: &Value) -> Result<()> {
    match payload.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(error) => Err(MediaError::Api(error_text(error))),
    }
}

/// Decode the body of a read call.
///
/// Returns the result together with the pagination metadata found in the
/// payload; the metadata fields are `None` when absent.
pub fn decode_read(raw: &str) -> Result<(ApiResponse, PageMeta)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MediaError::read_failed("empty response", None));
    }
    if raw == NULL_SENTINEL {
        return Ok((ApiResponse::Empty, PageMeta::default()));
    }

    let payload = codec::decode(raw)
        .map_err(|e| MediaError::read_failed("response is not valid JSON", Some(Box::new(e))))?;
    check_error(&payload)?;

    let meta = PageMeta::from_payload(&payload);
    let response = match payload {
        Value::Object(mut map) if map.contains_key("items") => {
            let items = match map.remove("items") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![other],
            };
            ApiResponse::Page { items, meta }
        }
        Value::Array(items) => ApiResponse::List(items),
        Value::Null => ApiResponse::Empty,
        other => ApiResponse::Single(other),
    };
    Ok((response, meta))
}

/// Decode the body of a write call and unwrap its `result` field.
///
/// With `require_result`, a missing or falsy result is an API error.
pub fn decode_write(raw: &str, require_result: bool) -> Result<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MediaError::write_failed("empty response", None));
    }

    let payload = codec::decode(raw)
        .map_err(|e| MediaError::write_failed("response is not valid JSON", Some(Box::new(e))))?;
    check_error(&payload)?;

    let result = payload.get("result").cloned().unwrap_or(Value::Null);
    if require_result && is_falsy(&result) {
        return Err(MediaError::Api(None));
    }
    Ok(result)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}
