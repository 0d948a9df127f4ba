//! Lookups into the service's `{data: {...}}` response envelope.
//!
//! Paths are written dotted (`data.user.email`) and converted to JSON
//! pointers. A missing key yields `None`, never a panic.

use serde_json::Value;

use super::ProbeError;

pub const USER_ID: &str = "data.user.id";
pub const USER_EMAIL: &str = "data.user.email";
pub const USER_ROLE: &str = "data.user.role";
pub const ACCESS_TOKEN: &str = "data.tokens.accessToken";

/// Resolve a dotted path (or a `/`-prefixed JSON pointer)
pub fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    let pointer = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path.replace('.', "/"))
    };
    body.pointer(&pointer)
}

/// Resolve a path that must hold a string
pub fn lookup_str<'a>(body: &'a Value, path: &str) -> Option<&'a str> {
    lookup(body, path).and_then(Value::as_str)
}

/// Resolve a path and render it for display; strings lose their quotes
pub fn lookup_display(body: &Value, path: &str) -> Option<String> {
    lookup(body, path).filter(|v| !v.is_null()).map(|val| {
        if let Some(s) = val.as_str() {
            s.to_string()
        } else {
            val.to_string()
        }
    })
}

/// Like [`lookup_str`] but reports the missing path
pub fn require_str<'a>(body: &'a Value, path: &str) -> Result<&'a str, ProbeError> {
    lookup_str(body, path).ok_or_else(|| ProbeError::MissingField {
        path: path.to_string(),
    })
}

/// Error text the service put in a failure body: `message`, else `error`
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| lookup_display(body, key))
}
