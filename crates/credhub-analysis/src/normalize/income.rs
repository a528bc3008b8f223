//! Income-estimate replies.
//!
//! The income webhook answers with a flat object carrying `rendaPresumida`,
//! `confiabilidade` and an optional `detalhes` text, sometimes inside a
//! one-element list or as JSON embedded in an `output` string. A reply
//! without an income figure is rejected; no default income is ever filled in.

use credhub_core::form::format_brl;
use credhub_core::IncomeEstimate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::embedded;
use super::value::{first_of, text, NOT_AVAILABLE};
use crate::error::NormalizeError;

const INCOME_KEYS: &[&str] = &["rendaPresumida", "renda_presumida"];
const CONFIDENCE_KEYS: &[&str] = &["confiabilidade", "confianca"];
const DETAILS_KEYS: &[&str] = &["detalhes", "observacoes"];

/// The object that carries the estimate, unwrapping a one-element list.
fn payload(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) if items.len() == 1 => items[0].as_object(),
        _ => None,
    }
}

/// Amounts sent as bare numbers are rendered as BRL.
fn income_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok().map(format_brl),
        other => text(other),
    }
}

fn confidence_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(format!("{n}%")),
        other => text(other),
    }
}

fn from_map(map: &Map<String, Value>) -> Result<IncomeEstimate, NormalizeError> {
    let maps = [Some(map)];
    let estimated_income = first_of(&maps, INCOME_KEYS)
        .and_then(income_text)
        .ok_or(NormalizeError::MissingIncome)?;
    let confidence = first_of(&maps, CONFIDENCE_KEYS)
        .and_then(confidence_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned());
    let details = first_of(&maps, DETAILS_KEYS).and_then(text);

    Ok(IncomeEstimate {
        estimated_income,
        confidence,
        details,
    })
}

pub(super) fn from_text(output: &str) -> Result<IncomeEstimate, NormalizeError> {
    let embedded = embedded::fenced_json(output).or_else(|| embedded::braced_json(output));
    match embedded.as_ref().and_then(payload) {
        Some(map) => from_map(map),
        None => Err(NormalizeError::MissingIncome),
    }
}

pub(super) fn from_value(value: &Value) -> Result<IncomeEstimate, NormalizeError> {
    let map = payload(value)
        .ok_or(NormalizeError::UnrecognizedShape("expected an object or a one-element list"))?;

    let has_income = INCOME_KEYS.iter().any(|key| map.contains_key(*key));
    match map.get("output").and_then(Value::as_str) {
        Some(output) if !has_income => from_text(output),
        _ => from_map(map),
    }
}
