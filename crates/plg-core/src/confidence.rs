//! Data-availability confidence scoring.

use crate::company::{BigTechThreat, CategoryStage, CompanyInput, NdrTier};
use crate::thresholds::{ConfidenceWeights, VerdictThresholds};
use crate::verdict::ConfidenceLevel;

/// Weighted sum over which signals are present, rounded to 4 decimals.
///
/// Scores availability, not values: a disclosed-but-flat trend earns
/// the same trend credit as a decelerating one. Default `unknown`
/// assessments earn nothing.
pub(crate) fn availability_score(data: &CompanyInput, w: &ConfidenceWeights) -> f64 {
    let mut score = 0.0;

    // Retention signals (40%)
    if data.ndr.is_some() {
        score += match data.ndr_tier {
            NdrTier::Direct => w.ndr_tier_1,
            NdrTier::Variant => w.ndr_tier_2,
            NdrTier::Derived => w.ndr_tier_3,
            NdrTier::Unavailable => 0.0,
        };
    } else if data.has_variant_retention() {
        score += w.ndr_tier_2;
    } else if data.implied_expansion.is_some() {
        score += w.ndr_tier_3;
    }

    // Growth signals (30%)
    if data.revenue_growth_yoy.is_some() {
        score += w.revenue_growth_current;
    }
    if data.revenue_decel_3q.is_some() {
        score += w.revenue_growth_trend;
    }
    if data.arr_millions.is_some() {
        score += w.arr_disclosed;
    }

    // Competitive signals (20%)
    if data.big_tech_threat != BigTechThreat::Unknown {
        score += w.big_tech_threat_assessed;
    }
    if data.category_stage != CategoryStage::Unknown {
        score += w.category_stage_assessed;
    }

    // Customer signals (10%)
    if data.customers_100k_plus.is_some() {
        score += w.large_customer_count;
    }
    if data.customer_growth_yoy.is_some() {
        score += w.customer_growth_rate;
    }

    (score * 10_000.0).round() / 10_000.0
}

pub(crate) fn level_for(score: f64, t: &VerdictThresholds) -> ConfidenceLevel {
    if score >= t.confidence_high {
        ConfidenceLevel::High
    } else if score >= t.confidence_medium {
        ConfidenceLevel::Medium
    } else if score >= t.confidence_low {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::Insufficient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::SwitchingCost;

    fn full_tier1_company() -> CompanyInput {
        CompanyInput {
            ndr: Some(120.0),
            ndr_tier: NdrTier::Direct,
            revenue_growth_yoy: Some(0.30),
            revenue_decel_3q: Some(false),
            arr_millions: Some(1500.0),
            big_tech_threat: BigTechThreat::Medium,
            category_stage: CategoryStage::EarlyGrowth,
            switching_cost: SwitchingCost::High,
            customers_100k_plus: Some(2000),
            customer_growth_yoy: Some(0.25),
            ..CompanyInput::new("TEST", "Test Co")
        }
    }

    #[test]
    fn test_full_tier1_data_scores_one() {
        let score = availability_score(&full_tier1_company(), &ConfidenceWeights::default());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let score = availability_score(
            &CompanyInput::new("TEST", "Test Co"),
            &ConfidenceWeights::default(),
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_ndr_tier_weights_ordered() {
        let w = ConfidenceWeights::default();
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.ndr = Some(115.0);

        data.ndr_tier = NdrTier::Direct;
        let s1 = availability_score(&data, &w);
        data.ndr_tier = NdrTier::Variant;
        let s2 = availability_score(&data, &w);
        data.ndr_tier = NdrTier::Derived;
        let s3 = availability_score(&data, &w);
        data.ndr_tier = NdrTier::Unavailable;
        let s4 = availability_score(&data, &w);

        assert!(s1 > s2 && s2 > s3 && s3 > s4);
        assert_eq!(s4, 0.0);
    }

    #[test]
    fn test_variant_metric_without_ndr_gets_tier2_credit() {
        let w = ConfidenceWeights::default();
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.dbne = Some(115.0);
        assert_eq!(availability_score(&data, &w), w.ndr_tier_2);
    }

    #[test]
    fn test_implied_expansion_without_ndr_gets_tier3_credit() {
        let w = ConfidenceWeights::default();
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.implied_expansion = Some(10.0);
        assert_eq!(availability_score(&data, &w), w.ndr_tier_3);
    }

    #[test]
    fn test_trend_credit_is_presence_not_value() {
        let w = ConfidenceWeights::default();
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.revenue_decel_3q = Some(false);
        let flat = availability_score(&data, &w);
        data.revenue_decel_3q = Some(true);
        let decel = availability_score(&data, &w);
        assert_eq!(flat, decel);
        assert_eq!(flat, w.revenue_growth_trend);
    }

    #[test]
    fn test_level_band_edges() {
        let t = VerdictThresholds::default();
        assert_eq!(level_for(0.70, &t), ConfidenceLevel::High);
        assert_eq!(level_for(0.69, &t), ConfidenceLevel::Medium);
        assert_eq!(level_for(0.45, &t), ConfidenceLevel::Medium);
        assert_eq!(level_for(0.25, &t), ConfidenceLevel::Low);
        assert_eq!(level_for(0.24, &t), ConfidenceLevel::Insufficient);
    }
}
