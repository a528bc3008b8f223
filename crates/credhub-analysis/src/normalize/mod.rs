//! Normalization of analysis webhook replies into an [`AnalysisRecord`].
//!
//! The webhook has answered in several shapes over time. Each reply is
//! classified into a [`ResponseShape`] and converted by the matching reader,
//! in priority order:
//!
//! 1. an object with `score` (primary vocabulary, light remap);
//! 2. an object with `score_credito` (nested vocabulary, flattened);
//! 3. a one-element list wrapping `{ "output": "<text>" }`, whose text may
//!    carry a fenced JSON block, a bare `{...}` span, or only prose.
//!
//! Normalization fails closed: a reply without a numeric score yields a
//! [`NormalizeError`] and no record.

mod canonical;
mod embedded;
mod income;
mod nested;
mod prose;
mod value;

use credhub_core::{AnalysisRecord, IncomeEstimate};
use serde_json::{Map, Value};

use crate::error::NormalizeError;

/// The structural variants a webhook reply can take.
#[derive(Debug, Clone, Copy)]
pub enum ResponseShape<'a> {
    Canonical(&'a Map<String, Value>),
    Nested(&'a Map<String, Value>),
    Wrapped(&'a str),
}

impl<'a> ResponseShape<'a> {
    /// Classifies `value`, or returns `None` if it matches no known shape.
    ///
    /// A bare `{ "output": "..." }` object is accepted as well as the
    /// list-wrapped form.
    #[must_use]
    pub fn detect(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Self::detect_object(map),
            Value::Array(items) if items.len() == 1 => {
                items[0].get("output").and_then(Value::as_str).map(Self::Wrapped)
            }
            _ => None,
        }
    }

    fn detect_object(map: &'a Map<String, Value>) -> Option<Self> {
        if map.contains_key("score") {
            Some(Self::Canonical(map))
        } else if map.contains_key("score_credito") {
            Some(Self::Nested(map))
        } else {
            map.get("output").and_then(Value::as_str).map(Self::Wrapped)
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Canonical(_) => "canonical",
            Self::Nested(_) => "nested",
            Self::Wrapped(_) => "wrapped",
        }
    }
}

/// Normalizes a parsed webhook reply.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the reply matches no known shape or carries
/// no numeric score. The raw reply is logged at `warn` level.
pub fn normalize(raw: &Value) -> Result<AnalysisRecord, NormalizeError> {
    let result = normalize_value(raw);
    if let Err(err) = &result {
        tracing::warn!(error = %err, raw = %raw, "webhook response could not be normalized");
    }
    result
}

/// Normalizes a raw webhook response body.
///
/// Bodies that are not JSON are treated as free text and mined like the
/// `output` of a wrapped reply.
///
/// # Errors
///
/// Same as [`normalize`].
pub fn normalize_body(body: &str) -> Result<AnalysisRecord, NormalizeError> {
    let result = match serde_json::from_str::<Value>(body) {
        Ok(value) => normalize_value(&value),
        Err(_) => {
            tracing::debug!(len = body.len(), "webhook body is not JSON, reading as text");
            normalize_output(body)
        }
    };
    if let Err(err) = &result {
        tracing::warn!(error = %err, raw = %body, "webhook response could not be normalized");
    }
    result
}

/// Reads an income-estimate webhook body.
///
/// Accepts a flat object, a one-element list around one, or JSON embedded in
/// an `output` string. Non-JSON bodies are searched for embedded JSON only.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingIncome`] when no income figure is present
/// and [`NormalizeError::UnrecognizedShape`] for other JSON shapes. The raw
/// body is logged at `warn` level.
pub fn normalize_income_body(body: &str) -> Result<IncomeEstimate, NormalizeError> {
    let result = match serde_json::from_str::<Value>(body) {
        Ok(value) => income::from_value(&value),
        Err(_) => income::from_text(body),
    };
    if let Err(err) = &result {
        tracing::warn!(error = %err, raw = %body, "income response could not be normalized");
    }
    result
}

fn normalize_value(value: &Value) -> Result<AnalysisRecord, NormalizeError> {
    let shape = ResponseShape::detect(value)
        .ok_or(NormalizeError::UnrecognizedShape("expected an object or a one-element list"))?;
    tracing::debug!(shape = shape.name(), "normalizing webhook response");

    match shape {
        ResponseShape::Canonical(map) => canonical::from_canonical(map),
        ResponseShape::Nested(map) => nested::from_nested(map),
        ResponseShape::Wrapped(text) => normalize_output(text),
    }
}

/// Only the two object shapes are accepted from embedded JSON, so a reply
/// can never recurse into another wrapped layer.
fn structured(value: &Value) -> Option<Result<AnalysisRecord, NormalizeError>> {
    match ResponseShape::detect(value)? {
        ResponseShape::Canonical(map) => Some(canonical::from_canonical(map)),
        ResponseShape::Nested(map) => Some(nested::from_nested(map)),
        ResponseShape::Wrapped(_) => None,
    }
}

fn normalize_output(text: &str) -> Result<AnalysisRecord, NormalizeError> {
    if let Some(result) = embedded::fenced_json(text).as_ref().and_then(structured) {
        tracing::debug!("using fenced JSON block from webhook output");
        return result;
    }
    if let Some(result) = embedded::braced_json(text).as_ref().and_then(structured) {
        tracing::debug!("using brace-delimited JSON from webhook output");
        return result;
    }
    tracing::debug!("no embedded JSON in webhook output, mining prose");
    prose::mine(text)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
