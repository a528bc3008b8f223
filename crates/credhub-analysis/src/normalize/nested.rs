//! Replies using the nested vocabulary: `score_credito`, `condicoes_pagamento`,
//! `simulacao_financiamento` and `analise_empresa`.
//!
//! Payment terms are read from `condicoes_pagamento` first and fall back to
//! `simulacao_financiamento`. Missing text fields become `"N/A"`.

use credhub_core::AnalysisRecord;
use serde_json::{Map, Value};

use super::value::{count, first_of, indicators, number, string_list, text, text_or_na};
use crate::band::ScoreBand;
use crate::error::NormalizeError;

pub(super) fn from_nested(map: &Map<String, Value>) -> Result<AnalysisRecord, NormalizeError> {
    let credit = map.get("score_credito");
    let credit_map = credit.and_then(Value::as_object);

    // `score_credito` is either `{ "valor": 72, ... }` or the bare number.
    let score = match credit {
        Some(Value::Object(inner)) => inner.get("valor").and_then(number),
        Some(other) => number(other),
        None => None,
    }
    .ok_or(NormalizeError::MissingScore)?;

    let top = Some(map);
    let payment = map.get("condicoes_pagamento").and_then(Value::as_object);
    let simulation = map.get("simulacao_financiamento").and_then(Value::as_object);
    let terms = [payment, simulation];
    let company = map.get("analise_empresa").and_then(Value::as_object);

    let classification = first_of(&[credit_map, top], &["classificacao"])
        .and_then(text)
        .unwrap_or_else(|| ScoreBand::from_score(score).label().to_owned());

    let reason = text_or_na(first_of(
        &[credit_map, top],
        &["motivo", "justificativa"],
    ));

    let indicator = |key: &'static str| indicators(first_of(&[company, top], &[key]), key);

    Ok(AnalysisRecord {
        score,
        classification,
        reason,
        suggested_down_payment: text_or_na(first_of(&terms, &["entrada_sugerida", "entrada"])),
        installment_count: first_of(&terms, &["numero_parcelas", "parcelas", "prazo_meses"])
            .and_then(count)
            .unwrap_or(0),
        installment_value: text_or_na(first_of(&terms, &["valor_parcela"])),
        monthly_interest_rate: text_or_na(first_of(
            &terms,
            &["taxa_juros_mensal", "taxa_juros"],
        )),
        registration_indicators: indicator("indicadores_cadastrais")?,
        financial_indicators: indicator("indicadores_financeiros")?,
        operational_indicators: indicator("indicadores_operacionais")?,
        final_recommendation: map.get("recomendacao_final").and_then(text),
        interpretive_analysis: map.get("analise_interpretativa").and_then(text),
        recommendations: string_list(map.get("recomendacoes")),
    })
}
