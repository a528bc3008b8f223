//! Last-resort mining of natural-language replies.
//!
//! Recovers a score, classification, company identity and a few payment
//! figures with regexes. A reply without a recognizable score is rejected;
//! no score is ever invented.

use std::sync::LazyLock;

use credhub_core::{AnalysisRecord, Indicators};
use regex::Regex;
use serde_json::Value;

use super::value::{number, NOT_AVAILABLE};
use crate::band::ScoreBand;
use crate::error::NormalizeError;

const BRL: &str = r"R\$\s?\d{1,3}(?:\.\d{3})*(?:,\d{2})?";

const SCORE_MAX: f64 = 100.0;

/// `Score de crédito (0-100): 74`: the number right after a `:` or `=`.
static LABELLED_SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:score|pontua[çc][ãa]o)\b[^\n:=]{0,40}?[:=]\s*\**\s*(\d{1,3}(?:[.,]\d+)?)\b")
        .expect("valid regex")
});
/// `Pontuação final 58`: only words between the keyword and the number.
static WORDED_SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:score|pontua[çc][ãa]o)\b[\p{L}\s]{0,30}?(\d{1,3}(?:[.,]\d+)?)\b")
        .expect("valid regex")
});
static CLASSIFICATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)classifica[çc][ãa]o\s*(?:de\s+risco\s*)?[:\-]?\s*\**\s*(excelente|[óo]timo|bom|boa|regular|ruim|baixo|m[ée]dio|alto)")
        .expect("valid regex")
});
static CNPJ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}").expect("valid regex"));
static COMPANY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:empresa|raz[ãa]o\s+social)\s*:\s*\**\s*([^\n;*]+)").expect("valid regex")
});
static DOWN_PAYMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)entrada[^\n]{{0,40}}?({BRL})")).expect("valid regex")
});
static INSTALLMENT_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:parcelas?|presta[çc](?:ão|ões|ao|oes))[^\n]{{0,40}}?({BRL})"
    ))
    .expect("valid regex")
});
static INSTALLMENT_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*(?:x\b|parcelas\b|presta[çc](?:ões|oes)\b|meses\b)")
        .expect("valid regex")
});
static INTEREST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)juros[^\n%]{0,40}?(\d{1,2}(?:[.,]\d{1,2})?)\s?%").expect("valid regex")
});

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
}

/// Capitalizes a mined classification word (`"bom"` -> `"Bom"`).
fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Last in-range score mentioned in `text`. Labelled mentions take
/// precedence; numbers outside 0-100 are never a score.
fn mine_score(text: &str) -> Option<f64> {
    [&*LABELLED_SCORE_RE, &*WORDED_SCORE_RE]
        .into_iter()
        .find_map(|re| {
            re.captures_iter(text)
                .filter_map(|cap| cap.get(1))
                .filter_map(|m| number(&Value::String(m.as_str().to_owned())))
                .filter(|score| (0.0..=SCORE_MAX).contains(score))
                .last()
        })
}

fn or_na(found: Option<&str>) -> String {
    found.unwrap_or(NOT_AVAILABLE).to_owned()
}

pub(super) fn mine(text: &str) -> Result<AnalysisRecord, NormalizeError> {
    let score = mine_score(text).ok_or(NormalizeError::MissingScore)?;

    let classification = capture(&CLASSIFICATION_RE, text).map_or_else(
        || ScoreBand::from_score(score).label().to_owned(),
        title_case,
    );

    let mut registration = Indicators::new();
    if let Some(company) = capture(&COMPANY_RE, text) {
        registration.insert("razao_social".to_owned(), Value::String(company.to_owned()));
    }
    if let Some(cnpj) = CNPJ_RE.find(text) {
        registration.insert("cnpj".to_owned(), Value::String(cnpj.as_str().to_owned()));
    }

    let installment_count = capture(&INSTALLMENT_COUNT_RE, text)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0);
    let interest = capture(&INTEREST_RE, text).map(|rate| format!("{rate}%"));

    Ok(AnalysisRecord {
        score,
        classification,
        reason: NOT_AVAILABLE.to_owned(),
        suggested_down_payment: or_na(capture(&DOWN_PAYMENT_RE, text)),
        installment_count,
        installment_value: or_na(capture(&INSTALLMENT_VALUE_RE, text)),
        monthly_interest_rate: interest.unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
        registration_indicators: registration,
        financial_indicators: Indicators::new(),
        operational_indicators: Indicators::new(),
        final_recommendation: None,
        interpretive_analysis: Some(text.trim().to_owned()),
        recommendations: None,
    })
}
