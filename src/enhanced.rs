//! Valuation overlay pass: price history per company, opportunity
//! ranking, and the enhanced_analysis.json output.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use plg_data::YahooFinanceClient;
use plg_valuation::{
    analyze_valuation, combine_with_valuation, compute_price_snapshot, EnhancedVerdict,
    PriceSnapshot,
};

use crate::batch::BatchItem;

const ENHANCED_PATH: &str = "enhanced_analysis.json";

#[derive(Debug, Serialize)]
struct EnhancedRow {
    name: String,
    #[serde(flatten)]
    verdict: EnhancedVerdict,
}

#[derive(Debug, Serialize)]
struct EnhancedReport {
    analyzed_at: String,
    results: Vec<EnhancedRow>,
}

/// Run the overlay for every analyzed company and write the ranked
/// report. Missing price history leaves a company on fundamentals
/// alone.
pub async fn run_enhanced(items: &[BatchItem], yahoo: Option<&YahooFinanceClient>) -> Result<()> {
    let today = Utc::now().date_naive();
    let mut rows = Vec::with_capacity(items.len());

    for item in items {
        let ticker = &item.company.ticker;
        let snapshot = match yahoo {
            Some(client) => match client.fetch_price_history(ticker).await {
                Ok(history) => compute_price_snapshot(
                    &history.timestamps,
                    &history.closes,
                    &history.highs,
                    &history.lows,
                    item.live.price_to_sales,
                    item.live.forward_pe,
                    today,
                ),
                Err(e) => {
                    warn!("Could not fetch price history for {}: {}", ticker, e);
                    PriceSnapshot {
                        price_to_sales: item.live.price_to_sales,
                        forward_pe: item.live.forward_pe,
                        ..Default::default()
                    }
                }
            },
            None => PriceSnapshot {
                price_to_sales: item.live.price_to_sales,
                forward_pe: item.live.forward_pe,
                ..Default::default()
            },
        };

        let valuation = analyze_valuation(
            item.outcome.verdict,
            item.company.ndr,
            item.company.revenue_growth_yoy,
            &snapshot,
        );
        let verdict = combine_with_valuation(
            &item.outcome,
            &valuation,
            item.company.ndr,
            item.company.revenue_growth_yoy,
        );
        rows.push(EnhancedRow {
            name: item.company.name.clone(),
            verdict,
        });
    }

    rows.sort_by(|a, b| {
        b.verdict
            .opportunity_score
            .total_cmp(&a.verdict.opportunity_score)
    });

    println!();
    println!("OPPORTUNITY RANKING:");
    println!(
        "  {:<6} {:<28} {:>5}  {:<14} {}",
        "TICKER", "NAME", "SCORE", "VALUATION", "RECOMMENDATION"
    );
    for row in &rows {
        println!(
            "  {:<6} {:<28} {:>5.0}  {:<14} {}",
            row.verdict.ticker,
            row.name,
            row.verdict.opportunity_score,
            row.verdict.valuation_tier.as_str(),
            row.verdict.final_recommendation
        );
    }

    let report = EnhancedReport {
        analyzed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        results: rows,
    };
    let content = serde_json::to_string_pretty(&report)?;
    std::fs::write(ENHANCED_PATH, content)
        .with_context(|| format!("could not write {}", ENHANCED_PATH))?;
    info!("Enhanced analysis saved to {}", ENHANCED_PATH);

    Ok(())
}
