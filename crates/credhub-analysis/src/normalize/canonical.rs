//! Replies already keyed with the primary vocabulary (`score`, `classificacao`, ...).

use credhub_core::AnalysisRecord;
use serde_json::{Map, Value};

use super::value::{count, indicators, number, string_list, text, text_or_na};
use crate::band::ScoreBand;
use crate::error::NormalizeError;

pub(super) fn from_canonical(map: &Map<String, Value>) -> Result<AnalysisRecord, NormalizeError> {
    let score = map
        .get("score")
        .and_then(number)
        .ok_or(NormalizeError::MissingScore)?;

    let classification = map
        .get("classificacao")
        .and_then(text)
        .unwrap_or_else(|| ScoreBand::from_score(score).label().to_owned());

    Ok(AnalysisRecord {
        score,
        classification,
        reason: text_or_na(map.get("motivo")),
        suggested_down_payment: text_or_na(map.get("entrada_sugerida")),
        installment_count: map.get("numero_parcelas").and_then(count).unwrap_or(0),
        installment_value: text_or_na(map.get("valor_parcela")),
        monthly_interest_rate: text_or_na(map.get("taxa_juros_mensal")),
        registration_indicators: indicators(
            map.get("indicadores_cadastrais"),
            "indicadores_cadastrais",
        )?,
        financial_indicators: indicators(
            map.get("indicadores_financeiros"),
            "indicadores_financeiros",
        )?,
        operational_indicators: indicators(
            map.get("indicadores_operacionais"),
            "indicadores_operacionais",
        )?,
        final_recommendation: map.get("recomendacao_final").and_then(text),
        interpretive_analysis: map.get("analise_interpretativa").and_then(text),
        recommendations: string_list(map.get("recomendacoes")),
    })
}
