//! Batch result writers: full-fidelity JSON plus a flat CSV summary.
//! Both writes replace the whole file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use plg_core::{
    normalize_growth, BigTechThreat, CategoryStage, CompanyInput, ConfidenceLevel, DataTier,
    Verdict, VerdictOutcome,
};

use crate::error::Result;

/// Flattened row for one analyzed company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedCompany {
    pub ticker: String,
    pub name: String,
    pub verdict: Verdict,
    pub confidence: ConfidenceLevel,
    pub confidence_score: f64,
    pub data_tier: DataTier,
    pub ndr: Option<f64>,
    pub revenue_growth_yoy: Option<f64>,
    pub market_cap: Option<f64>,
    pub big_tech_threat: BigTechThreat,
    pub category_stage: CategoryStage,
    pub entry_signals: u32,
    pub exit_signals: u32,
    pub rationale: String,
    pub staleness_warning: bool,
    pub research_recommendations: Vec<String>,
}

impl AnalyzedCompany {
    /// The saved row keeps at most the top two research
    /// recommendations; the full list stays in memory for the console.
    pub fn from_parts(company: &CompanyInput, outcome: &VerdictOutcome) -> Self {
        Self {
            ticker: company.ticker.clone(),
            name: company.name.clone(),
            verdict: outcome.verdict,
            confidence: outcome.confidence,
            confidence_score: outcome.confidence_score,
            data_tier: outcome.data_tier,
            ndr: company.ndr,
            revenue_growth_yoy: company.revenue_growth_yoy,
            market_cap: company.market_cap,
            big_tech_threat: company.big_tech_threat,
            category_stage: company.category_stage,
            entry_signals: outcome.entry_signals_met,
            exit_signals: outcome.exit_signals_triggered,
            rationale: outcome.rationale.clone(),
            staleness_warning: outcome.staleness_warning,
            research_recommendations: outcome
                .research_recommendations
                .iter()
                .take(2)
                .cloned()
                .collect(),
        }
    }
}

/// Verdict tallies for the saved report header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_analyzed: usize,
    pub verdict_counts: std::collections::BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn from_rows(rows: &[AnalyzedCompany]) -> Self {
        let mut verdict_counts = std::collections::BTreeMap::new();
        for row in rows {
            *verdict_counts
                .entry(row.verdict.as_str().to_string())
                .or_insert(0) += 1;
        }
        Self {
            total_analyzed: rows.len(),
            verdict_counts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub analyzed_at: String,
    pub summary: BatchSummary,
    pub results: Vec<AnalyzedCompany>,
}

pub fn write_results_json(path: impl AsRef<Path>, report: &BatchReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}

const CSV_HEADER: &str =
    "ticker,name,verdict,confidence,data_tier,ndr,growth_pct,market_cap,big_tech_threat,category_stage";

/// Spreadsheet view with normalized growth. No CSV crate in the
/// stack; fields are escaped by hand.
pub fn write_summary_csv(path: impl AsRef<Path>, rows: &[AnalyzedCompany]) -> Result<()> {
    let mut out = String::with_capacity(rows.len() * 80 + CSV_HEADER.len());
    out.push_str(CSV_HEADER);
    out.push('\n');

    for row in rows {
        let growth_pct = normalize_growth(row.revenue_growth_yoy)
            .map(|g| format!("{:.1}", g))
            .unwrap_or_default();
        let fields = [
            csv_escape(&row.ticker),
            csv_escape(&row.name),
            row.verdict.as_str().to_string(),
            row.confidence.as_str().to_string(),
            row.data_tier.as_u8().to_string(),
            row.ndr.map(|v| v.to_string()).unwrap_or_default(),
            growth_pct,
            row.market_cap.map(|v| v.to_string()).unwrap_or_default(),
            row.big_tech_threat.as_str().to_string(),
            row.category_stage.as_str().to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    std::fs::write(path, out)?;
    Ok(())
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
