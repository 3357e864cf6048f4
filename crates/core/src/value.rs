//! Lenient coercion of loosely typed JSON scalars sent by the player.
//!
//! The player serializes numbers as JSON numbers or strings depending on the
//! data model element. Coercion never fails: a value that does not fit the
//! target type becomes `None` and is stored as NULL.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a request body that must be a JSON object.
///
/// Empty bodies, invalid JSON and non-object documents yield `None`; the
/// player's beacons are best effort and never fail on bad input.
#[must_use]
pub fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(len = body.len(), error = %e, "ignoring non-JSON body");
            return None;
        },
    };
    if !value.is_object() {
        tracing::debug!("ignoring JSON body that is not an object");
        return None;
    }
    serde_json::from_value(value)
        .map_err(|e| tracing::debug!(error = %e, "ignoring undecodable body"))
        .ok()
}

/// Coerce to an integer. Floats are truncated toward zero.
#[must_use]
pub fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::String(s) => parse_int_str(s),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce to a float.
#[must_use]
pub fn float_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce to text. Strings are kept verbatim (including empty ones), other
/// scalars and containers are rendered as their JSON text.
#[must_use]
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Like [`text_value`] but treats the empty string as absent.
#[must_use]
pub fn non_empty_text(value: &Value) -> Option<String> {
    text_value(value).filter(|s| !s.is_empty())
}

/// Normalized key used to match payload-local ids across tables.
///
/// `1`, `1.0` and `"1"` all address the same interaction.
#[must_use]
pub fn local_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => {
            let trimmed = s.trim();
            let exact = trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(exact_int));
            Some(exact.map_or_else(|| s.clone(), |n| n.to_string()))
        },
        Value::Number(n) => Some(
            n.as_i64()
                .or_else(|| n.as_f64().and_then(exact_int))
                .map_or_else(|| n.to_string(), |i| i.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

fn parse_int_str(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    trimmed.parse::<i64>().ok().or_else(|| trimmed.parse::<f64>().ok().and_then(truncate_f64))
}

#[expect(clippy::cast_possible_truncation, reason = "range checked before the cast")]
fn truncate_f64(f: f64) -> Option<i64> {
    let t = f.trunc();
    (t.is_finite() && t >= i64::MIN as f64 && t <= i64::MAX as f64).then_some(t as i64)
}

fn exact_int(f: f64) -> Option<i64> {
    (f.fract() == 0.0).then(|| truncate_f64(f)).flatten()
}
