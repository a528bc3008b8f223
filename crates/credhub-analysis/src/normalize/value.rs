//! Lenient readers for loosely typed webhook fields.

use credhub_core::Indicators;
use serde_json::{Map, Value};

use crate::error::NormalizeError;

/// Placeholder for textual fields the webhook left out.
pub(super) const NOT_AVAILABLE: &str = "N/A";

/// Reads a number, accepting numeric strings with either decimal separator.
pub(super) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Reads a non-negative integer count; fractional values are truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let n = number(value)?;
    (0.0..=f64::from(u32::MAX)).contains(&n).then_some(n as u32)
}

/// Renders a scalar as display text. Blank strings count as absent.
pub(super) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(super) fn text_or_na(value: Option<&Value>) -> String {
    value
        .and_then(text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

/// Reads an indicator table. Absent or `null` yields an empty table.
///
/// # Errors
///
/// [`NormalizeError::InvalidField`] if the field holds something other than an
/// object.
pub(super) fn indicators(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Indicators, NormalizeError> {
    match value {
        None | Some(Value::Null) => Ok(Indicators::new()),
        Some(Value::Object(map)) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Some(_) => Err(NormalizeError::InvalidField { field }),
    }
}

/// Reads a list of recommendations; a lone string becomes a one-item list.
pub(super) fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::Array(items) => Some(items.iter().filter_map(text).collect()),
        other => text(other).map(|s| vec![s]),
    }
}

/// First value found under any of `keys`, searching each map in order.
pub(super) fn first_of<'a>(maps: &[Option<&'a Map<String, Value>>], keys: &[&str]) -> Option<&'a Value> {
    maps.iter()
        .flatten()
        .flat_map(|map| keys.iter().filter_map(|key| map.get(*key)))
        .find(|v| !v.is_null())
}
