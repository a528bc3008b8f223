//! Plain-text rendering of an analysis record.

use std::fmt;

use credhub_analysis::ScoreBand;
use credhub_core::{AnalysisRecord, IncomeEstimate, Indicators};

const GAUGE_WIDTH: usize = 20;

/// `[###############-----] 78/100` for a 0-100 score.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn gauge(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {score}/100",
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled)
    )
}

fn indicator_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_indicators(f: &mut fmt::Formatter<'_>, title: &str, indicators: &Indicators) -> fmt::Result {
    if indicators.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n{title}")?;
    for (name, value) in indicators {
        writeln!(f, "  {:<28}{}", name.replace('_', " "), indicator_value(value))?;
    }
    Ok(())
}

struct Report<'a>(&'a AnalysisRecord);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        let band = ScoreBand::from_score(record.score);

        writeln!(f, "CREDIT SCORE")?;
        writeln!(f, "  {}", gauge(record.score))?;
        writeln!(f, "  Classification: {} (band: {band})", record.classification)?;
        writeln!(f, "  Reason: {}", record.reason)?;

        writeln!(f, "\nPAYMENT SIMULATION")?;
        writeln!(f, "  Suggested down payment: {}", record.suggested_down_payment)?;
        writeln!(
            f,
            "  Installments: {} x {}",
            record.installment_count, record.installment_value
        )?;
        writeln!(f, "  Monthly interest: {}", record.monthly_interest_rate)?;

        write_indicators(f, "REGISTRATION INDICATORS", &record.registration_indicators)?;
        write_indicators(f, "FINANCIAL INDICATORS", &record.financial_indicators)?;
        write_indicators(f, "OPERATIONAL INDICATORS", &record.operational_indicators)?;

        if let Some(text) = &record.interpretive_analysis {
            writeln!(f, "\nANALYSIS\n  {text}")?;
        }
        if let Some(text) = &record.final_recommendation {
            writeln!(f, "\nFINAL RECOMMENDATION\n  {text}")?;
        }
        if let Some(items) = record.recommendations.as_ref().filter(|r| !r.is_empty()) {
            writeln!(f, "\nRECOMMENDATIONS")?;
            for item in items {
                writeln!(f, "  - {item}")?;
            }
        }
        Ok(())
    }
}

pub(crate) fn render_report(record: &AnalysisRecord) -> String {
    Report(record).to_string()
}

struct IncomeReport<'a>(&'a IncomeEstimate);

impl fmt::Display for IncomeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let estimate = self.0;
        writeln!(f, "PRESUMED INCOME")?;
        writeln!(f, "  Monthly estimate: {}", estimate.estimated_income)?;
        writeln!(f, "  Confidence: {}", estimate.confidence)?;
        if let Some(details) = &estimate.details {
            writeln!(f, "\nDETAILS\n  {details}")?;
        }
        Ok(())
    }
}

pub(crate) fn render_income_report(estimate: &IncomeEstimate) -> String {
    IncomeReport(estimate).to_string()
}
