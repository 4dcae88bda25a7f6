//! Tier 1 scorer: direct NDR disclosure.

use crate::company::{BigTechThreat, CategoryStage, CompanyInput, SwitchingCost};
use crate::normalize::normalize_growth;
use crate::thresholds::VerdictThresholds;
use crate::verdict::{TierAssessment, TierSignals, Verdict};

/// Entry signals (5 total): NDR >= 110%, growth >= 25%, category
/// emerging/early_growth, Big Tech threat low/medium, switching cost
/// high. Exit: any 2 = SELL. Elite NDR >= 120% and growth >= 30% =
/// STRONG_BUY.
pub(crate) fn assess(data: &CompanyInput, t: &VerdictThresholds) -> TierAssessment {
    let mut missing = Vec::new();
    let growth = normalize_growth(data.revenue_growth_yoy);

    // --- Exit signals ---
    let mut exit = 0.0;
    let mut exit_reasons: Vec<String> = Vec::new();

    // NDR compared raw here; Tier 1 disclosures are already percentages.
    if let Some(ndr) = data.ndr {
        if ndr < t.ndr_entry {
            exit += 1.0;
            exit_reasons.push(format!("NDR {}% < {}%", ndr, t.ndr_entry));
        }
    }

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

    // --- Entry signals ---
    let mut entry = 0.0;
    let mut entry_details: Vec<String> = Vec::new();

    // 1. NDR >= 110%
    match data.ndr {
        Some(ndr) => {
            if ndr >= t.ndr_entry {
                entry += 1.0;
                entry_details.push(format!("NDR {}%", ndr));
            }
        }
        None => missing.push("NDR".to_string()),
    }

    // 2. Revenue growth >= 25%
    match growth {
        Some(g) => {
            if g >= t.growth_entry {
                entry += 1.0;
                entry_details.push(format!("Growth {:.0}%", g));
            } else if g >= t.growth_partial {
                entry += 0.5;
                entry_details.push(format!("Growth {:.0}% (partial)", g));
            }
        }
        None => missing.push("Revenue growth".to_string()),
    }

    // 3. Category stage
    match data.category_stage {
        CategoryStage::Emerging | CategoryStage::EarlyGrowth => {
            entry += 1.0;
            entry_details.push(format!("Category: {}", data.category_stage.as_str()));
        }
        CategoryStage::MidGrowth => {
            entry += 0.5;
            entry_details.push("Category: mid_growth (partial)".to_string());
        }
        CategoryStage::Unknown => missing.push("Category stage".to_string()),
        _ => {}
    }

    // 4. Big Tech threat
    match data.big_tech_threat {
        BigTechThreat::Low | BigTechThreat::Medium => {
            entry += 1.0;
            entry_details.push(format!("Big Tech threat: {}", data.big_tech_threat.as_str()));
        }
        BigTechThreat::Unknown => missing.push("Big Tech threat assessment".to_string()),
        _ => {}
    }

    // 5. Switching costs
    match data.switching_cost {
        SwitchingCost::High => {
            entry += 1.0;
            entry_details.push("High switching costs".to_string());
        }
        SwitchingCost::Medium => {
            entry += 0.5;
            entry_details.push("Medium switching costs (partial)".to_string());
        }
        SwitchingCost::Unknown => missing.push("Switching cost assessment".to_string()),
        _ => {}
    }

    // --- Verdict ---
    let elite = matches!(data.ndr, Some(ndr) if ndr >= t.ndr_elite)
        && matches!(growth, Some(g) if g >= t.growth_elite);

    let (verdict, rationale) = if exit >= t.exit_sell {
        (
            Verdict::Sell,
            format!("Exit signals ({:.1}): {}", exit, exit_reasons.join("; ")),
        )
    } else if exit >= t.exit_watch {
        (
            Verdict::Watch,
            format!("Warning ({:.1} exit signals): {}", exit, exit_reasons.join("; ")),
        )
    } else if elite {
        (
            Verdict::StrongBuy,
            format!(
                "Elite: NDR {}%, growth {:.0}%. Entry {:.1}/5: {}",
                data.ndr.unwrap_or_default(),
                growth.unwrap_or_default(),
                entry,
                entry_details.join("; ")
            ),
        )
    } else if entry >= t.entry_strong_buy {
        (
            Verdict::StrongBuy,
            format!("All 5 entry signals: {}", entry_details.join("; ")),
        )
    } else if entry >= t.entry_buy {
        (
            Verdict::Buy,
            format!("Entry {:.1}/5: {}", entry, entry_details.join("; ")),
        )
    } else if entry >= t.entry_watch {
        (
            Verdict::Watch,
            format!("Entry {:.1}/5: {}", entry, entry_details.join("; ")),
        )
    } else {
        let detail = if entry_details.is_empty() {
            "none".to_string()
        } else {
            entry_details.join("; ")
        };
        (
            Verdict::Avoid,
            format!("Only {:.1}/5 entry signals: {}", entry, detail),
        )
    };

    TierAssessment {
        verdict,
        rationale,
        missing,
        entry,
        exit,
        signals: TierSignals::Tier1 { entry, exit },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::NdrTier;

    fn make_company(ndr: f64, growth: f64) -> CompanyInput {
        CompanyInput {
            ndr: Some(ndr),
            ndr_tier: NdrTier::Direct,
            revenue_growth_yoy: Some(growth),
            category_stage: CategoryStage::EarlyGrowth,
            big_tech_threat: BigTechThreat::Medium,
            switching_cost: SwitchingCost::High,
            ..CompanyInput::new("TEST", "Test Co")
        }
    }

    #[test]
    fn test_elite_is_strong_buy() {
        let data = make_company(127.0, 0.29);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::StrongBuy);
        assert!(a.rationale.starts_with("Elite:"));
    }

    #[test]
    fn test_all_five_signals_is_strong_buy() {
        let data = make_company(115.0, 26.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::StrongBuy);
        assert_eq!(a.entry, 5.0);
    }

    #[test]
    fn test_four_signals_is_buy() {
        let mut data = make_company(115.0, 26.0);
        data.switching_cost = SwitchingCost::Low;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Buy);
        assert_eq!(a.entry, 4.0);
    }

    #[test]
    fn test_partial_credit_half_steps() {
        // Growth 22% (0.5) + medium switching (0.5) + NDR + category + threat
        let mut data = make_company(115.0, 22.0);
        data.switching_cost = SwitchingCost::Medium;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.entry, 4.0);
        assert_eq!(a.verdict, Verdict::Buy);
    }

    #[test]
    fn test_two_exit_signals_is_sell() {
        let mut data = make_company(87.0, -0.01);
        data.big_tech_threat = BigTechThreat::VeryHigh;
        data.category_stage = CategoryStage::Commoditizing;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Sell);
        assert!(a.exit >= 2.0);
        assert!(a.rationale.starts_with("Exit signals"));
    }

    #[test]
    fn test_one_exit_signal_is_watch() {
        let mut data = make_company(125.0, 35.0);
        data.revenue_decel_3q = Some(true);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert!(a.rationale.starts_with("Warning"));
    }

    #[test]
    fn test_exit_outranks_elite() {
        // Elite numbers but decel + announced bundle: exit wins
        let mut data = make_company(125.0, 35.0);
        data.revenue_decel_3q = Some(true);
        data.big_tech_announced = true;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Sell);
    }

    #[test]
    fn test_sparse_input_is_avoid_with_missing_list() {
        let data = CompanyInput {
            ndr: Some(112.0),
            ndr_tier: NdrTier::Direct,
            ..CompanyInput::new("TEST", "Test Co")
        };
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Avoid);
        assert!(a.missing.contains(&"Revenue growth".to_string()));
        assert!(a.missing.contains(&"Category stage".to_string()));
        assert!(a.missing.contains(&"Big Tech threat assessment".to_string()));
        assert!(a.missing.contains(&"Switching cost assessment".to_string()));
    }

    #[test]
    fn test_low_ndr_alone_is_watch_not_sell() {
        let mut data = make_company(105.0, 30.0);
        data.category_stage = CategoryStage::MidGrowth;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert_eq!(a.exit, 1.0);
    }
}
