//! Query string parsing and building.
//!
//! Bracketed keys nest: `routeParams[id]=7` parses to `{"routeParams": {"id": "7"}}`
//! and `tags[]=a&tags[]=b` to `{"tags": ["a", "b"]}`. Building is the inverse,
//! null values are skipped.
//!
//! Nesting stops after [`MAX_NESTING`] bracket levels; the rest of the key is
//! kept verbatim as the innermost segment.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Maximum number of bracketed levels below a top-level key.
pub const MAX_NESTING: usize = 64;

/// Parses a raw query string (without the leading `?`).
pub fn parse_query(query: &str) -> Map<String, Value> {
    let mut params = Map::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let path = split_key(&key);
        if path.is_empty() {
            continue;
        }
        insert_path(&mut params, &path, Value::String(value.into_owned()));
    }
    params
}

/// Builds a query string (without the leading `?`), keeping the key order of `params`.
pub fn build_query(params: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        append_value(&mut serializer, key, value);
    }
    serializer.finish()
}

/// Returns `params` ordered by key, recursively.
pub fn sorted(params: &Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<(&String, &Value)> = params.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) => Value::Object(sorted(nested)),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// String form of a scalar parameter; `None` for null, arrays and objects.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn split_key(key: &str) -> Vec<String> {
    if key.is_empty() {
        return Vec::new();
    }
    match key.find('[') {
        Some(pos) if pos > 0 && key.ends_with(']') => {
            let mut parts = vec![key[..pos].to_string()];
            let inner = &key[pos + 1..key.len() - 1];
            parts.extend(inner.splitn(MAX_NESTING, "][").map(str::to_string));
            parts
        }
        _ => vec![key.to_string()],
    }
}

fn insert_path(target: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        target.insert(head.clone(), value);
        return;
    }
    let slot = target
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    insert_nested(slot, rest, value);
}

fn insert_nested(slot: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };

    if head.is_empty() {
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            if rest.is_empty() {
                items.push(value);
            } else {
                let mut child = Value::Object(Map::new());
                insert_nested(&mut child, rest, value);
                items.push(child);
            }
        }
        return;
    }

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        insert_path(map, path, value);
    }
}

fn append_value(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                append_value(serializer, &format!("{key}[{i}]"), item);
            }
        }
        Value::Object(map) => {
            for (nested, item) in map {
                append_value(serializer, &format!("{key}[{nested}]"), item);
            }
        }
        scalar => {
            if let Some(text) = scalar_to_string(scalar) {
                serializer.append_pair(key, &text);
            }
        }
    }
}
