//! Tier 3 scorer: derived signals (implied expansion, RPO growth).
//!
//! Derived data alone cannot justify BUY; the ceiling is WATCH and
//! negative expansion is the only SELL path.

use crate::company::CompanyInput;
use crate::normalize::normalize_growth;
use crate::thresholds::VerdictThresholds;
use crate::verdict::{ExpansionBucket, RpoSignal, TierAssessment, TierSignals, Verdict};

pub(crate) fn assess(data: &CompanyInput, t: &VerdictThresholds) -> TierAssessment {
    let mut missing = Vec::new();
    let growth = normalize_growth(data.revenue_growth_yoy);
    let mut details: Vec<String> = Vec::new();

    // Implied expansion: ARR growth minus customer growth
    let mut expansion = ExpansionBucket::Unknown;
    if let Some(ie) = normalize_growth(data.implied_expansion) {
        details.push(format!("Implied expansion: {:.0}%", ie));
        expansion = if ie > t.implied_exp_strong {
            ExpansionBucket::Strong
        } else if ie > t.implied_exp_healthy {
            ExpansionBucket::Healthy
        } else if ie > 0.0 {
            ExpansionBucket::Modest
        } else {
            ExpansionBucket::Negative
        };
    }

    // RPO forward indicator, only meaningful next to current growth
    let mut rpo_signal = RpoSignal::Unknown;
    if let (Some(rpo), Some(g)) = (normalize_growth(data.rpo_growth_yoy), growth) {
        details.push(format!("RPO growth: {:.0}%", rpo));
        rpo_signal = if rpo > g + t.rpo_accelerating_delta {
            RpoSignal::Accelerating
        } else if rpo > g {
            RpoSignal::Healthy
        } else {
            RpoSignal::Decelerating
        };
    }

    if expansion == ExpansionBucket::Negative {
        return TierAssessment {
            verdict: Verdict::Sell,
            rationale: format!(
                "Tier 3: Negative implied expansion ({}). Customers contracting.",
                details.join("; ")
            ),
            missing,
            entry: 0.0,
            exit: 1.0,
            signals: TierSignals::Tier3 {
                expansion,
                rpo: rpo_signal,
            },
        };
    }

    let growth_str = growth
        .map(|g| format!(", growth {:.0}%", g))
        .unwrap_or_default();

    let rationale = if expansion == ExpansionBucket::Strong
        && matches!(growth, Some(g) if g >= t.growth_entry)
    {
        missing.push("Direct NDR or variant metric for BUY upgrade".to_string());
        format!(
            "Tier 3: Strong implied expansion{}. {}. Promising but needs Tier 1/2 NDR data to upgrade to BUY.",
            growth_str,
            details.join("; ")
        )
    } else if rpo_signal == RpoSignal::Accelerating {
        missing.push("NDR or retention data".to_string());
        format!(
            "Tier 3: RPO accelerating{}. {}. Forward demand strong but retention data needed.",
            growth_str,
            details.join("; ")
        )
    } else {
        missing.push("NDR, GR, or DBNE for meaningful verdict".to_string());
        format!(
            "Tier 3: {} expansion{}. {}. Insufficient retention data, manual research required.",
            expansion.title(),
            growth_str,
            details.join("; ")
        )
    };

    if growth.is_none() {
        missing.push("Revenue growth".to_string());
    }

    TierAssessment {
        verdict: Verdict::Watch,
        rationale,
        missing,
        entry: 0.0,
        exit: 0.0,
        signals: TierSignals::Tier3 {
            expansion,
            rpo: rpo_signal,
        },
    }
}
