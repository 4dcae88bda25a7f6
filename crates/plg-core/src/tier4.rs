//! Tier 4 scorer: non-SaaS business models and retention-blind SaaS.

use crate::company::{BigTechThreat, BusinessModel, CategoryStage, CompanyInput, SwitchingCost, TakeRateTrend};
use crate::normalize::normalize_growth;
use crate::thresholds::VerdictThresholds;
use crate::verdict::{Tier4Branch, TierAssessment, TierSignals, Verdict};

pub(crate) fn assess(data: &CompanyInput, t: &VerdictThresholds) -> TierAssessment {
    let growth = normalize_growth(data.revenue_growth_yoy);

    match data.business_model {
        BusinessModel::Consumer => assess_consumer(data, growth, t),
        BusinessModel::Marketplace => assess_marketplace(data, growth, t),
        BusinessModel::TransactionBased => assess_transaction(data, growth, t),
        _ => assess_insufficient(data, growth, t),
    }
}

fn outcome(
    branch: Tier4Branch,
    verdict: Verdict,
    rationale: String,
    missing: Vec<String>,
    entry: f64,
    exit: f64,
) -> TierAssessment {
    TierAssessment {
        verdict,
        rationale,
        missing,
        entry,
        exit,
        signals: TierSignals::Tier4 { branch, entry, exit },
    }
}

/// Consumer model: ARPU growth plus active user growth.
fn assess_consumer(
    data: &CompanyInput,
    growth: Option<f64>,
    t: &VerdictThresholds,
) -> TierAssessment {
    let mut details = Vec::new();
    let mut missing = Vec::new();
    let arpu = normalize_growth(data.arpu_growth_yoy);
    let users = normalize_growth(data.active_user_growth_yoy);

    match arpu {
        Some(a) => details.push(format!("ARPU growth: {:.0}%", a)),
        None => missing.push("ARPU growth".to_string()),
    }
    match users {
        Some(u) => details.push(format!("User growth: {:.0}%", u)),
        None => missing.push("Active user growth".to_string()),
    }
    if let Some(g) = growth {
        details.push(format!("Revenue growth: {:.0}%", g));
    }

    // Declining ARPU means monetization pressure
    if let Some(a) = arpu {
        if a < 0.0 {
            return outcome(
                Tier4Branch::Consumer,
                Verdict::Sell,
                format!(
                    "Tier 4 Consumer: ARPU declining ({:.0}%). Monetization pressure. {}",
                    a,
                    details.join("; ")
                ),
                missing,
                0.0,
                1.0,
            );
        }
    }

    if let (Some(a), Some(u)) = (arpu, users) {
        if a > t.consumer_arpu_growth_buy && u > t.consumer_user_growth_buy {
            return outcome(
                Tier4Branch::Consumer,
                Verdict::Buy,
                format!(
                    "Tier 4 Consumer: Strong ARPU + user growth. {}",
                    details.join("; ")
                ),
                missing,
                2.0,
                0.0,
            );
        }
    }

    if let Some(g) = growth {
        if g > t.consumer_revenue_growth_watch {
            return outcome(
                Tier4Branch::Consumer,
                Verdict::Watch,
                format!(
                    "Tier 4 Consumer: Strong revenue growth ({:.0}%), verify unit economics. {}",
                    g,
                    details.join("; ")
                ),
                missing,
                1.0,
                0.0,
            );
        }
    }

    let detail = if details.is_empty() {
        "No details".to_string()
    } else {
        details.join("; ")
    };
    outcome(
        Tier4Branch::Consumer,
        Verdict::Watch,
        format!("Tier 4 Consumer: Insufficient consumer metrics. {}", detail),
        missing,
        0.0,
        0.0,
    )
}

/// Marketplace model: GMV growth plus take-rate trend.
fn assess_marketplace(
    data: &CompanyInput,
    growth: Option<f64>,
    t: &VerdictThresholds,
) -> TierAssessment {
    let mut details = Vec::new();
    let mut missing = Vec::new();
    let gmv = normalize_growth(data.gmv_growth_yoy);

    match gmv {
        Some(g) => details.push(format!("GMV growth: {:.0}%", g)),
        None => missing.push("GMV growth".to_string()),
    }
    if let Some(rate) = data.take_rate {
        details.push(format!("Take rate: {:.1}%", rate));
    }
    match data.take_rate_trend {
        Some(trend) => details.push(format!("Take rate trend: {}", trend.as_str())),
        None => missing.push("Take rate trend".to_string()),
    }
    if let Some(g) = growth {
        details.push(format!("Revenue growth: {:.0}%", g));
    }

    if data.take_rate_trend == Some(TakeRateTrend::Decreasing) {
        return outcome(
            Tier4Branch::Marketplace,
            Verdict::Watch,
            format!(
                "Tier 4 Marketplace: Take rate decreasing (commoditization risk). {}",
                details.join("; ")
            ),
            missing,
            0.0,
            1.0,
        );
    }

    if let Some(g) = gmv {
        if g > t.marketplace_gmv_growth_buy {
            return outcome(
                Tier4Branch::Marketplace,
                Verdict::Buy,
                format!(
                    "Tier 4 Marketplace: Strong GMV growth with stable/growing take rate. {}",
                    details.join("; ")
                ),
                missing,
                2.0,
                0.0,
            );
        }
    }

    let detail = if details.is_empty() {
        "No details".to_string()
    } else {
        details.join("; ")
    };
    outcome(
        Tier4Branch::Marketplace,
        Verdict::Watch,
        format!("Tier 4 Marketplace: Insufficient marketplace metrics. {}", detail),
        missing,
        0.0,
        0.0,
    )
}

/// Transaction model: gross profit growth against TPV growth.
fn assess_transaction(
    data: &CompanyInput,
    growth: Option<f64>,
    t: &VerdictThresholds,
) -> TierAssessment {
    let mut details = Vec::new();
    let mut missing = Vec::new();
    let gp = normalize_growth(data.gross_profit_growth_yoy);
    let tpv = normalize_growth(data.tpv_growth_yoy);

    match gp {
        Some(g) => details.push(format!("GP growth: {:.0}%", g)),
        None => missing.push("Gross profit growth".to_string()),
    }
    match tpv {
        Some(v) => details.push(format!("TPV growth: {:.0}%", v)),
        None => missing.push("TPV growth".to_string()),
    }
    if let Some(g) = growth {
        details.push(format!("Revenue growth: {:.0}%", g));
    }

    if let (Some(gp), Some(tpv)) = (gp, tpv) {
        // Monetization lagging volume by more than the delta
        if gp < tpv - t.transaction_margin_compression_delta {
            return outcome(
                Tier4Branch::Transaction,
                Verdict::Sell,
                format!(
                    "Tier 4 Transaction: Margin compression (GP growth {:.0}% << TPV growth {:.0}%). {}",
                    gp,
                    tpv,
                    details.join("; ")
                ),
                missing,
                0.0,
                1.0,
            );
        }

        if gp > tpv {
            return outcome(
                Tier4Branch::Transaction,
                Verdict::Watch,
                format!(
                    "Tier 4 Transaction: GP outpacing TPV (improving margins). {}. Verify sustainability.",
                    details.join("; ")
                ),
                missing,
                1.0,
                0.0,
            );
        }
    }

    let detail = if details.is_empty() {
        "No details".to_string()
    } else {
        details.join("; ")
    };
    outcome(
        Tier4Branch::Transaction,
        Verdict::Watch,
        format!("Tier 4 Transaction: Insufficient transaction metrics. {}", detail),
        missing,
        0.0,
        0.0,
    )
}

/// B2B SaaS with no retention data at all. Growth and competitive
/// signals only; the ceiling is WATCH.
fn assess_insufficient(
    data: &CompanyInput,
    growth: Option<f64>,
    t: &VerdictThresholds,
) -> TierAssessment {
    let mut details = Vec::new();
    let mut missing = Vec::new();
    let mut entry = 0.0;
    let mut exit = 0.0;
    let mut exit_reasons: Vec<String> = Vec::new();

    if let Some(g) = growth {
        details.push(format!("Revenue growth: {:.0}%", g));
    }

    missing.push("NDR/NRR (no retention data available)".to_string());

    // Exit signals still apply without retention data
    if data.revenue_decel_3q == Some(true) {
        exit += 1.0;
        exit_reasons.push("Revenue decelerating 3+ quarters".to_string());
    }
    if data.big_tech_announced {
        exit += 1.0;
        exit_reasons.push("Big Tech bundled competitor announced".to_string());
    }
    if data.category_stage == CategoryStage::Commoditizing {
        exit += 1.0;
        exit_reasons.push("Category commoditizing".to_string());
    }
    if matches!(
        data.big_tech_threat,
        BigTechThreat::High | BigTechThreat::VeryHigh
    ) {
        exit += 0.5;
        exit_reasons.push(format!("Big Tech threat: {}", data.big_tech_threat.as_str()));
    }

    if exit >= t.exit_sell {
        return outcome(
            Tier4Branch::Insufficient,
            Verdict::Sell,
            format!(
                "Tier 4 (no retention data): Exit signals ({:.1}): {}",
                exit,
                exit_reasons.join("; ")
            ),
            missing,
            0.0,
            exit,
        );
    }

    if matches!(growth, Some(g) if g >= t.growth_entry) {
        entry += 1.0;
    }
    if matches!(
        data.category_stage,
        CategoryStage::Emerging | CategoryStage::EarlyGrowth
    ) {
        entry += 1.0;
    }
    if matches!(data.big_tech_threat, BigTechThreat::Low | BigTechThreat::Medium) {
        entry += 0.5;
    }
    if data.switching_cost == SwitchingCost::High {
        entry += 0.5;
    }

    let growth_str = growth
        .map(|g| format!(", growth {:.0}%", g))
        .unwrap_or_default();

    let rationale = if entry >= 2.0 {
        format!(
            "Tier 4 (no retention data): Some positive signals{}. {}. Research NDR for upgrade.",
            growth_str,
            details.join("; ")
        )
    } else if exit > 0.0 {
        format!(
            "Tier 4 (no retention data): Mixed signals{}. Exit warning: {}. Research NDR.",
            growth_str,
            exit_reasons.join("; ")
        )
    } else {
        format!(
            "Tier 4 (no retention data): Insufficient data for conviction{}. Research NDR before acting.",
            growth_str
        )
    };

    outcome(
        Tier4Branch::Insufficient,
        Verdict::Watch,
        rationale,
        missing,
        entry,
        exit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_company(model: BusinessModel) -> CompanyInput {
        CompanyInput {
            business_model: model,
            ..CompanyInput::new("TEST", "Test Co")
        }
    }

    #[test]
    fn test_consumer_declining_arpu_is_sell() {
        let mut data = make_company(BusinessModel::Consumer);
        data.arpu_growth_yoy = Some(-5.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Sell);
        assert!(a.rationale.contains("Monetization pressure"));
    }

    #[test]
    fn test_consumer_strong_arpu_and_users_is_buy() {
        let mut data = make_company(BusinessModel::Consumer);
        data.arpu_growth_yoy = Some(0.22);
        data.active_user_growth_yoy = Some(18.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Buy);
        assert_eq!(a.entry, 2.0);
    }

    #[test]
    fn test_consumer_high_revenue_growth_is_watch() {
        let mut data = make_company(BusinessModel::Consumer);
        data.revenue_growth_yoy = Some(0.35);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert!(a.rationale.contains("verify unit economics"));
        assert!(a.missing.contains(&"ARPU growth".to_string()));
    }

    #[test]
    fn test_marketplace_decreasing_take_rate_is_watch_with_exit() {
        let mut data = make_company(BusinessModel::Marketplace);
        data.gmv_growth_yoy = Some(40.0);
        data.take_rate_trend = Some(TakeRateTrend::Decreasing);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert_eq!(a.exit, 1.0);
        assert!(a.rationale.contains("commoditization risk"));
    }

    #[test]
    fn test_marketplace_strong_gmv_is_buy() {
        let mut data = make_company(BusinessModel::Marketplace);
        data.gmv_growth_yoy = Some(30.0);
        data.take_rate_trend = Some(TakeRateTrend::Stable);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Buy);
    }

    #[test]
    fn test_transaction_margin_compression_is_sell() {
        let mut data = make_company(BusinessModel::TransactionBased);
        data.gross_profit_growth_yoy = Some(10.0);
        data.tpv_growth_yoy = Some(25.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Sell);
        assert!(a.rationale.contains("Margin compression"));
    }

    #[test]
    fn test_transaction_improving_margins_is_watch() {
        let mut data = make_company(BusinessModel::TransactionBased);
        data.gross_profit_growth_yoy = Some(30.0);
        data.tpv_growth_yoy = Some(25.0);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert!(a.rationale.contains("Verify sustainability"));
        assert_eq!(a.entry, 1.0);
    }

    #[test]
    fn test_transaction_missing_metrics_is_watch() {
        let data = make_company(BusinessModel::TransactionBased);
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert!(a.missing.contains(&"Gross profit growth".to_string()));
        assert!(a.missing.contains(&"TPV growth".to_string()));
    }

    #[test]
    fn test_insufficient_never_exceeds_watch() {
        let mut data = make_company(BusinessModel::B2bSaas);
        data.revenue_growth_yoy = Some(0.40);
        data.category_stage = CategoryStage::Emerging;
        data.big_tech_threat = BigTechThreat::Low;
        data.switching_cost = SwitchingCost::High;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert!(a.rationale.contains("Research NDR for upgrade"));
        assert_eq!(a.entry, 3.0);
    }

    #[test]
    fn test_insufficient_exit_signals_force_sell() {
        let mut data = make_company(BusinessModel::B2bSaas);
        data.revenue_decel_3q = Some(true);
        data.big_tech_announced = true;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Sell);
    }

    #[test]
    fn test_insufficient_mature_category_not_counted() {
        // Tier 4 insufficient has no mature partial credit on exit
        let mut data = make_company(BusinessModel::B2bSaas);
        data.category_stage = CategoryStage::Mature;
        data.big_tech_announced = true;
        let a = assess(&data, &VerdictThresholds::default());
        assert_eq!(a.verdict, Verdict::Watch);
        assert_eq!(a.exit, 1.0);
    }
}
