//! The canonical analysis record rendered by the report layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form indicator table (`name -> value`) as returned by the webhook.
pub type Indicators = BTreeMap<String, serde_json::Value>;

/// Canonical credit analysis.
///
/// Serialized with the webhook's primary field vocabulary (`classificacao`,
/// `motivo`, ...), so a serialized record is itself a valid webhook reply.
/// Built once by the response normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub score: f64,
    #[serde(rename = "classificacao")]
    pub classification: String,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "entrada_sugerida")]
    pub suggested_down_payment: String,
    #[serde(rename = "numero_parcelas")]
    pub installment_count: u32,
    #[serde(rename = "valor_parcela")]
    pub installment_value: String,
    #[serde(rename = "taxa_juros_mensal")]
    pub monthly_interest_rate: String,
    #[serde(rename = "indicadores_cadastrais", default)]
    pub registration_indicators: Indicators,
    #[serde(rename = "indicadores_financeiros", default)]
    pub financial_indicators: Indicators,
    #[serde(rename = "indicadores_operacionais", default)]
    pub operational_indicators: Indicators,
    #[serde(
        rename = "recomendacao_final",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub final_recommendation: Option<String>,
    #[serde(
        rename = "analise_interpretativa",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub interpretive_analysis: Option<String>,
    #[serde(
        rename = "recomendacoes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recommendations: Option<Vec<String>>,
}

/// Presumed monthly income read from a payslip.
///
/// Serialized with the income webhook's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEstimate {
    #[serde(rename = "rendaPresumida")]
    pub estimated_income: String,
    #[serde(rename = "confiabilidade")]
    pub confidence: String,
    #[serde(rename = "detalhes", default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
