///! Query string builder for the weather API
///!
///! Serializes an insertion-ordered option map into `base?k=v&k=v...`.
///! Arrays are emitted as repeated keys.

use serde_json::{Map, Value};

/// Render a scalar the way it should appear in a query string.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build `base?…` from `options`.
///
/// Numbers and strings are emitted as `key=value`; arrays emit one pair per
/// scalar element in order; anything else is skipped. The first pair has no
/// leading `&`.
pub fn build_url(base: &str, options: &Map<String, Value>) -> String {
    let mut url = format!("{}?", base);
    let mut first = true;

    let mut push = |key: &str, value: &str| {
        if !first {
            url.push('&');
        }
        first = false;
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    };

    for (key, value) in options {
        match value {
            Value::Array(items) => {
                for item in items.iter().filter_map(scalar_to_string) {
                    push(key, &item);
                }
            }
            other => {
                if let Some(scalar) = scalar_to_string(other) {
                    push(key, &scalar);
                }
            }
        }
    }

    url
}
