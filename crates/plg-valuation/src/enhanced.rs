//! Combines the fundamental verdict with the valuation overlay into a
//! single actionable recommendation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use plg_core::format::format_verdict;
use plg_core::{normalize_growth, ConfidenceLevel, Verdict, VerdictOutcome};

use crate::valuation::{TimingSignal, ValuationSignal, ValuationTier};

/// Fundamental verdict plus valuation context. `fundamental_verdict`
/// is always the engine's output untouched; only `combined_verdict`
/// moves with price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedVerdict {
    pub ticker: String,
    pub fundamental_verdict: Verdict,
    pub combined_verdict: Verdict,
    pub confidence: ConfidenceLevel,
    pub valuation_tier: ValuationTier,
    pub opportunity_score: f64,
    pub timing: TimingSignal,
    pub final_recommendation: String,
    pub rationale: String,
}

/// Fold a valuation signal into the fundamental outcome.
pub fn combine_with_valuation(
    outcome: &VerdictOutcome,
    valuation: &ValuationSignal,
    ndr: Option<f64>,
    revenue_growth: Option<f64>,
) -> EnhancedVerdict {
    let fundamental = outcome.verdict;
    let mut combined = fundamental;
    let mut timing = valuation.timing;

    if fundamental == Verdict::Buy
        && valuation.tier == ValuationTier::Cheap
        && valuation.opportunity_score >= 80.0
    {
        // Strong fundamentals at a discount upgrade the call
        combined = Verdict::StrongBuy;
        timing = TimingSignal::BuyNow;
    } else if fundamental.is_buyish() && valuation.tier == ValuationTier::VeryExpensive {
        // Great company, terrible price
        combined = Verdict::Watch;
        timing = TimingSignal::WaitForPullback;
    } else if matches!(fundamental, Verdict::Sell | Verdict::Avoid)
        && valuation.tier == ValuationTier::Cheap
    {
        // Cheap for a reason
        timing = TimingSignal::ValueTrap;
    }

    let final_recommendation = match timing {
        TimingSignal::BuyNow => format!("{} NOW", format_verdict(combined)),
        TimingSignal::Accumulate => format!("{} (Accumulate)", format_verdict(combined)),
        TimingSignal::WaitForPullback => {
            format!("{} (Wait for Pullback)", format_verdict(fundamental))
        }
        TimingSignal::MonitorClosely | TimingSignal::Monitor => {
            "WATCH (Monitor for Entry)".to_string()
        }
        TimingSignal::SellRally => "SELL (Exit on Rally)".to_string(),
        TimingSignal::ValueTrap => format!("{} (Value Trap)", format_verdict(fundamental)),
        TimingSignal::Avoid => "AVOID".to_string(),
    };

    let ndr_str = match ndr {
        Some(n) => format!("NDR {:.0}%", n),
        None => "NDR N/A".to_string(),
    };
    let growth_str = normalize_growth(revenue_growth)
        .map(|g| format!("{:.0}%", g))
        .unwrap_or_else(|| "N/A".to_string());
    let rationale = format!("{}, {} growth. {}", ndr_str, growth_str, valuation.rationale);

    debug!(
        ticker = %outcome.ticker,
        fundamental = fundamental.as_str(),
        combined = combined.as_str(),
        timing = timing.as_str(),
        "combined verdict with valuation"
    );

    EnhancedVerdict {
        ticker: outcome.ticker.clone(),
        fundamental_verdict: fundamental,
        combined_verdict: combined,
        confidence: outcome.confidence,
        valuation_tier: valuation.tier,
        opportunity_score: valuation.opportunity_score,
        timing,
        final_recommendation,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plg_core::{
        BigTechThreat, CategoryStage, CompanyInput, NdrTier, SwitchingCost, VerdictEngine,
    };

    fn buyish_outcome(ndr: f64, growth: f64) -> VerdictOutcome {
        let company = CompanyInput {
            ndr: Some(ndr),
            ndr_tier: NdrTier::Direct,
            revenue_growth_yoy: Some(growth),
            category_stage: CategoryStage::EarlyGrowth,
            big_tech_threat: BigTechThreat::Medium,
            switching_cost: SwitchingCost::Medium,
            ..CompanyInput::new("TEST", "Test Co")
        };
        VerdictEngine::default().compute_verdict(&company)
    }

    fn sell_outcome() -> VerdictOutcome {
        let company = CompanyInput {
            ndr: Some(85.0),
            ndr_tier: NdrTier::Direct,
            revenue_growth_yoy: Some(-0.02),
            revenue_decel_3q: Some(true),
            ..CompanyInput::new("TEST", "Test Co")
        };
        VerdictEngine::default().compute_verdict(&company)
    }

    fn signal(tier: ValuationTier, score: f64, timing: TimingSignal) -> ValuationSignal {
        ValuationSignal {
            tier,
            opportunity_score: score,
            rationale: "P/S 8.0x vs 29% growth (cheap). Stock -35% from 52w high.".to_string(),
            timing,
        }
    }

    #[test]
    fn test_cheap_high_score_buy_upgrades_to_strong_buy() {
        let outcome = buyish_outcome(115.0, 0.26);
        assert_eq!(outcome.verdict, Verdict::Buy);

        let valuation = signal(ValuationTier::Cheap, 85.0, TimingSignal::Accumulate);
        let enhanced = combine_with_valuation(&outcome, &valuation, Some(115.0), Some(0.26));
        assert_eq!(enhanced.combined_verdict, Verdict::StrongBuy);
        assert_eq!(enhanced.timing, TimingSignal::BuyNow);
        assert_eq!(enhanced.final_recommendation, "STRONG BUY NOW");
    }

    #[test]
    fn test_very_expensive_downgrades_to_watch() {
        let outcome = buyish_outcome(127.0, 0.32);
        assert_eq!(outcome.verdict, Verdict::StrongBuy);

        let valuation = signal(ValuationTier::VeryExpensive, 35.0, TimingSignal::WaitForPullback);
        let enhanced = combine_with_valuation(&outcome, &valuation, Some(127.0), Some(0.32));
        assert_eq!(enhanced.combined_verdict, Verdict::Watch);
        assert_eq!(enhanced.timing, TimingSignal::WaitForPullback);
        assert_eq!(
            enhanced.final_recommendation,
            "STRONG BUY (Wait for Pullback)"
        );
    }

    #[test]
    fn test_cheap_sell_is_a_value_trap() {
        let outcome = sell_outcome();
        assert_eq!(outcome.verdict, Verdict::Sell);

        let valuation = signal(ValuationTier::Cheap, 40.0, TimingSignal::Avoid);
        let enhanced = combine_with_valuation(&outcome, &valuation, Some(85.0), Some(-0.02));
        assert_eq!(enhanced.combined_verdict, Verdict::Sell);
        assert_eq!(enhanced.timing, TimingSignal::ValueTrap);
        assert_eq!(enhanced.final_recommendation, "SELL (Value Trap)");
    }

    #[test]
    fn test_fundamental_verdict_never_mutates() {
        let outcome = buyish_outcome(115.0, 0.26);
        let valuation = signal(ValuationTier::Cheap, 85.0, TimingSignal::Accumulate);
        let enhanced = combine_with_valuation(&outcome, &valuation, Some(115.0), Some(0.26));
        assert_eq!(enhanced.fundamental_verdict, outcome.verdict);
        assert_ne!(enhanced.combined_verdict, enhanced.fundamental_verdict);
    }

    #[test]
    fn test_rationale_handles_missing_ndr() {
        let outcome = buyish_outcome(115.0, 0.26);
        let valuation = signal(ValuationTier::Fair, 60.0, TimingSignal::Accumulate);
        let enhanced = combine_with_valuation(&outcome, &valuation, None, Some(0.26));
        assert!(enhanced.rationale.starts_with("NDR N/A, 26% growth."));
        assert_eq!(enhanced.final_recommendation, "BUY (Accumulate)");
    }

    #[test]
    fn test_monitor_timing_reads_as_watch_entry() {
        let outcome = buyish_outcome(115.0, 0.26);
        let valuation = signal(ValuationTier::Unknown, 50.0, TimingSignal::Monitor);
        let enhanced = combine_with_valuation(&outcome, &valuation, Some(115.0), Some(0.26));
        assert_eq!(enhanced.final_recommendation, "WATCH (Monitor for Entry)");
    }
}
