//! Defensive accessors over loosely-typed upstream JSON.

use serde_json::Value;

/// Walks `keys` from `v`, returning `None` at the first missing step.
pub fn lookup<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(v, |cur, key| cur.get(*key))
}

/// Text form of a scalar at `keys`; empty when absent or null.
pub fn text_at(v: &Value, keys: &[&str]) -> String {
    lookup(v, keys).map(scalar_text).unwrap_or_default()
}

pub fn bool_at(v: &Value, keys: &[&str]) -> bool {
    lookup(v, keys).and_then(as_bool_any).unwrap_or(false)
}

pub fn array_at<'a>(v: &'a Value, key: &str) -> &'a [Value] {
    v.get(key)
        .and_then(|x| x.as_array())
        .map(|arr| arr.as_slice())
        .unwrap_or_default()
}

pub fn scalar_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn as_u64_any(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    if let Some(f) = v.as_f64() {
        return whole_count(f);
    }
    let raw = v.as_str()?.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(whole_count))
}

/// Non-negative finite float truncated to a count, e.g. `2.0` or `2.5` to 2.
fn whole_count(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then(|| f as u64)
}

fn as_bool_any(v: &Value) -> Option<bool> {
    if let Some(b) = v.as_bool() {
        return Some(b);
    }
    match v.as_str()?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
