//! Tier 2 scorer: variant retention metrics (GR, DBNE, large-customer NDR).
//!
//! More conservative than Tier 1: the ceiling here is BUY, and weak
//! retention from any single metric forces SELL.

use crate::company::{BigTechThreat, CategoryStage, CompanyInput, NdrTier};
use crate::normalize::{normalize_growth, normalize_retention};
use crate::thresholds::VerdictThresholds;
use crate::verdict::{RetentionSignal, TierAssessment, TierSignals, Verdict};

/// Collapse whatever variant metrics are present into one bucket.
/// Weak from any metric dominates; otherwise the most optimistic wins.
pub(crate) fn interpret_retention_signal(
    data: &CompanyInput,
    t: &VerdictThresholds,
) -> RetentionSignal {
    let mut signals = Vec::new();

    if let Some(dbne) = normalize_retention(data.dbne) {
        signals.push(bucket(dbne, t.dbne_strong, t.dbne_healthy, t.dbne_acceptable));
    }

    if let Some(gr) = normalize_retention(data.gross_retention) {
        signals.push(bucket(gr, t.gr_strong, t.gr_healthy, t.gr_acceptable));
    }

    if let Some(lc) = normalize_retention(data.large_customer_ndr) {
        signals.push(bucket(
            lc,
            t.large_cust_ndr_strong,
            t.large_cust_ndr_healthy,
            t.large_cust_ndr_acceptable,
        ));
    }

    // Approximate NDR carried at tier 2 quality
    if data.ndr_tier == NdrTier::Variant {
        if let Some(ndr) = data.ndr {
            signals.push(bucket(ndr, t.ndr_elite, t.ndr_entry, t.tier2_ndr_acceptable));
        }
    }

    if signals.is_empty() {
        return RetentionSignal::Unknown;
    }
    if signals.contains(&RetentionSignal::Weak) {
        return RetentionSignal::Weak;
    }
    if signals.contains(&RetentionSignal::Strong) {
        return RetentionSignal::Strong;
    }
    if signals.contains(&RetentionSignal::Healthy) {
        return RetentionSignal::Healthy;
    }
    RetentionSignal::Acceptable
}

fn bucket(value: f64, strong: f64, healthy: f64, acceptable: f64) -> RetentionSignal {
    if value >= strong {
        RetentionSignal::Strong
    } else if value >= healthy {
        RetentionSignal::Healthy
    } else if value >= acceptable {
        RetentionSignal::Acceptable
    } else {
        RetentionSignal::Weak
    }
}

pub(crate) fn assess(data: &CompanyInput, t: &VerdictThresholds) -> TierAssessment {
    let mut missing = Vec::new();
    let growth = normalize_growth(data.revenue_growth_yoy);
    let retention = interpret_retention_signal(data, t);

    let mut details: Vec<String> = Vec::new();
    if let Some(dbne) = normalize_retention(data.dbne) {
        details.push(format!("DBNE {:.0}%", dbne));
    }
    if let Some(gr) = normalize_retention(data.gross_retention) {
        details.push(format!("GR {:.0}%", gr));
    }
    if let Some(lc) = normalize_retention(data.large_customer_ndr) {
        details.push(format!("Large Cust NDR {:.0}%", lc));
    }
    if data.ndr_tier == NdrTier::Variant {
        if let Some(ndr) = data.ndr {
            details.push(format!("NDR ~{}% (approximate)", ndr));
        }
    }

    // Weak retention is an immediate exit
    if retention == RetentionSignal::Weak {
        return TierAssessment {
            verdict: Verdict::Sell,
            rationale: format!("Tier 2: Weak retention ({})", details.join("; ")),
            missing,
            entry: 0.0,
            exit: 1.0,
            signals: TierSignals::Tier2 {
                retention,
                entry: 0.0,
                exit: 1.0,
            },
        };
    }

    // Exit signals, minus the Tier 1 NDR floor rule
    let mut exit = 0.0;
    let mut exit_reasons: Vec<String> = Vec::new();

    if data.revenue_decel_3q == Some(true) {
        exit += 1.0;
        exit_reasons.push("Revenue decelerating 3+ quarters".to_string());
    }
    if data.big_tech_announced {
        exit += 1.0;
        exit_reasons.push("Big Tech bundled competitor announced".to_string());
    }
    match data.category_stage {
        CategoryStage::Commoditizing => {
            exit += 1.0;
            exit_reasons.push("Category commoditizing".to_string());
        }
        CategoryStage::Mature => {
            exit += 0.5;
            exit_reasons.push("Category mature (partial)".to_string());
        }
        _ => {}
    }
    if matches!(
        data.big_tech_threat,
        BigTechThreat::High | BigTechThreat::VeryHigh
    ) {
        exit += 0.5;
        exit_reasons.push(format!("Big Tech threat: {}", data.big_tech_threat.as_str()));
    }

    if exit >= t.exit_sell {
        return TierAssessment {
            verdict: Verdict::Sell,
            rationale: format!(
                "Tier 2: Exit signals ({:.1}): {}",
                exit,
                exit_reasons.join("; ")
            ),
            missing,
            entry: 0.0,
            exit,
            signals: TierSignals::Tier2 {
                retention,
                entry: 0.0,
                exit,
            },
        };
    }

    // Entry logic
    if growth.is_none() {
        missing.push("Revenue growth".to_string());
    }

    let mut entry = 0.0;
    if matches!(retention, RetentionSignal::Strong | RetentionSignal::Healthy) {
        entry += 1.0;
    }
    match growth {
        Some(g) if g >= t.growth_entry => entry += 1.0,
        Some(g) if g >= t.growth_partial => entry += 0.5,
        _ => {}
    }

    let growth_str = growth
        .map(|g| format!(", growth {:.0}%", g))
        .unwrap_or_default();

    let (verdict, rationale) = match (retention, growth) {
        (RetentionSignal::Strong, Some(g)) if g >= t.growth_entry => (
            Verdict::Buy,
            format!(
                "Tier 2: Strong retention + {:.0}% growth. {}",
                g,
                details.join("; ")
            ),
        ),
        (RetentionSignal::Healthy | RetentionSignal::Strong, Some(g))
            if g >= t.growth_partial =>
        {
            (
                Verdict::Watch,
                format!(
                    "Tier 2: {} retention{}. {}. Verify with Tier 1 data.",
                    retention.title(),
                    growth_str,
                    details.join("; ")
                ),
            )
        }
        _ => {
            missing.push("Direct NDR for higher confidence".to_string());
            (
                Verdict::Watch,
                format!(
                    "Tier 2: {} retention{}. Incomplete data, manual research recommended.",
                    retention.title(),
                    growth_str
                ),
            )
        }
    };

    TierAssessment {
        verdict,
        rationale,
        missing,
        entry,
        exit,
        signals: TierSignals::Tier2 {
            retention,
            entry,
            exit,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_company() -> CompanyInput {
        CompanyInput::new("TEST", "Test Co")
    }

    #[test]
    fn test_weak_dbne_is_immediate_sell() {
        let mut data = make_company();
        data.dbne = Some(95.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Sell);
        assert_eq!(a.exit, 1.0);
        assert!(a.rationale.contains("Weak retention"));
    }

    #[test]
    fn test_weak_dominates_strong() {
        // Strong GR but weak large-customer NDR: weak wins
        let mut data = make_company();
        data.gross_retention = Some(0.98);
        data.large_customer_ndr = Some(100.0);
        assert_eq!(
            interpret_retention_signal(&data, &VerdictThresholds::default()),
            RetentionSignal::Weak
        );
    }

    #[test]
    fn test_strong_retention_plus_growth_is_buy() {
        let mut data = make_company();
        data.dbne = Some(125.0);
        data.revenue_growth_yoy = Some(0.28);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Buy);
        assert_eq!(a.entry, 2.0);
    }

    #[test]
    fn test_healthy_retention_partial_growth_is_watch() {
        let mut data = make_company();
        data.gross_retention = Some(94.0);
        data.revenue_growth_yoy = Some(22.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert!(a.rationale.contains("Verify with Tier 1 data"));
    }

    #[test]
    fn test_no_growth_is_watch_with_missing() {
        let mut data = make_company();
        data.dbne = Some(125.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert!(a.missing.contains(&"Revenue growth".to_string()));
        assert!(a
            .missing
            .contains(&"Direct NDR for higher confidence".to_string()));
    }

    #[test]
    fn test_exit_signals_force_sell_despite_healthy_retention() {
        let mut data = make_company();
        data.dbne = Some(115.0);
        data.revenue_decel_3q = Some(true);
        data.big_tech_announced = true;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Sell);
        assert!(a.rationale.contains("Exit signals"));
    }

    #[test]
    fn test_variant_ndr_buckets() {
        let t = VerdictThresholds::default();
        let mut data = make_company();
        data.ndr = Some(121.0);
        data.ndr_tier = crate::company::NdrTier::Variant;
        assert_eq!(
            interpret_retention_signal(&data, &t),
            RetentionSignal::Strong
        );
        data.ndr = Some(104.0);
        assert_eq!(
            interpret_retention_signal(&data, &t),
            RetentionSignal::Acceptable
        );
        data.ndr = Some(99.0);
        assert_eq!(interpret_retention_signal(&data, &t), RetentionSignal::Weak);
    }

    #[test]
    fn test_decimal_inputs_normalize() {
        let mut data = make_company();
        data.gross_retention = Some(0.97);
        assert_eq!(
            interpret_retention_signal(&data, &VerdictThresholds::default()),
            RetentionSignal::Strong
        );
    }
}
