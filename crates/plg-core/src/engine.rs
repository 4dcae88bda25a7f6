//! Verdict orchestration: routing, scoring, and outcome assembly.

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::company::{CompanyInput, NdrTier};
use crate::thresholds::{ConfidenceWeights, VerdictThresholds};
use crate::verdict::{DataTier, VerdictOutcome};
use crate::{confidence, research, staleness, tier1, tier2, tier3, tier4};

/// The verdict engine. Holds the injected threshold configuration and
/// confidence weights; all verdicts flow through [`Self::compute_verdict`].
#[derive(Debug, Clone, Default)]
pub struct VerdictEngine {
    thresholds: VerdictThresholds,
    weights: ConfidenceWeights,
}

impl VerdictEngine {
    pub fn new(thresholds: VerdictThresholds, weights: ConfidenceWeights) -> Self {
        Self { thresholds, weights }
    }

    pub fn thresholds(&self) -> &VerdictThresholds {
        &self.thresholds
    }

    /// Route to the verdict tier based on available data.
    ///
    /// Priority: direct NDR, then variant metrics, then derived
    /// signals, then the Tier 4 fallback.
    pub fn route_tier(&self, data: &CompanyInput) -> DataTier {
        if data.ndr.is_some() && data.ndr_tier == NdrTier::Direct {
            return DataTier::Direct;
        }

        if data.ndr.is_some() && data.ndr_tier == NdrTier::Variant {
            return DataTier::Variant;
        }
        if data.has_variant_retention() {
            return DataTier::Variant;
        }

        if data.implied_expansion.is_some() || data.rpo_growth_yoy.is_some() {
            return DataTier::Derived;
        }

        // Non-SaaS models and retention-blind SaaS both land here;
        // the Tier 4 scorer dispatches on business model itself.
        DataTier::Fallback
    }

    /// Compute the verdict for one company.
    ///
    /// Routes to the tier scorer, then attaches confidence, staleness,
    /// research recommendations, and a timestamp. Total over any input.
    pub fn compute_verdict(&self, data: &CompanyInput) -> VerdictOutcome {
        let tier = self.route_tier(data);
        debug!(ticker = %data.ticker, tier = tier.as_u8(), "routing verdict");

        let assessment = match tier {
            DataTier::Direct => tier1::assess(data, &self.thresholds),
            DataTier::Variant => tier2::assess(data, &self.thresholds),
            DataTier::Derived => tier3::assess(data, &self.thresholds),
            DataTier::Fallback => tier4::assess(data, &self.thresholds),
        };

        let confidence_score = confidence::availability_score(data, &self.weights);
        let confidence = confidence::level_for(confidence_score, &self.thresholds);
        let (staleness_warning, stale_fields) =
            staleness::check_staleness(data, &self.thresholds);
        let research_recommendations = research::recommend_research(data);

        VerdictOutcome {
            ticker: data.ticker.clone(),
            verdict: assessment.verdict,
            confidence,
            confidence_score,
            rationale: assessment.rationale,
            data_tier: tier,
            signals: assessment.signals,
            missing_signals: assessment.missing,
            // Fractional half-credits truncate toward zero in the counts
            entry_signals_met: assessment.entry as u32,
            exit_signals_triggered: assessment.exit as u32,
            staleness_warning,
            stale_fields,
            research_recommendations,
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Verdict;

    fn engine() -> VerdictEngine {
        VerdictEngine::default()
    }

    #[test]
    fn test_route_direct_ndr_wins() {
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.ndr = Some(120.0);
        data.ndr_tier = NdrTier::Direct;
        data.dbne = Some(115.0);
        data.implied_expansion = Some(10.0);
        assert_eq!(engine().route_tier(&data), DataTier::Direct);
    }

    #[test]
    fn test_route_variant_metrics_before_derived() {
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.gross_retention = Some(0.95);
        data.implied_expansion = Some(10.0);
        assert_eq!(engine().route_tier(&data), DataTier::Variant);
    }

    #[test]
    fn test_route_variant_ndr_without_variant_metrics() {
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.ndr = Some(112.0);
        data.ndr_tier = NdrTier::Variant;
        assert_eq!(engine().route_tier(&data), DataTier::Variant);
    }

    #[test]
    fn test_route_derived_then_fallback() {
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.rpo_growth_yoy = Some(40.0);
        assert_eq!(engine().route_tier(&data), DataTier::Derived);

        let bare = CompanyInput::new("TEST", "Test Co");
        assert_eq!(engine().route_tier(&bare), DataTier::Fallback);
    }

    #[test]
    fn test_ndr_with_unavailable_tier_does_not_route_tier1() {
        // NDR value present but tier metadata says unavailable
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.ndr = Some(120.0);
        data.ndr_tier = NdrTier::Unavailable;
        assert_eq!(engine().route_tier(&data), DataTier::Fallback);
    }

    #[test]
    fn test_outcome_truncates_fractional_counts() {
        // 3.5 entry signals: NDR + growth + partial switching + category
        let data = CompanyInput {
            ndr: Some(115.0),
            ndr_tier: NdrTier::Direct,
            revenue_growth_yoy: Some(0.28),
            category_stage: crate::company::CategoryStage::EarlyGrowth,
            switching_cost: crate::company::SwitchingCost::Medium,
            ..CompanyInput::new("TEST", "Test Co")
        };
        let outcome = engine().compute_verdict(&data);
        assert_eq!(outcome.entry_signals_met, 3);
        assert_eq!(outcome.verdict, Verdict::Watch);
    }

    #[test]
    fn test_outcome_carries_confidence_and_staleness() {
        let mut data = CompanyInput::new("TEST", "Test Co");
        data.data_updated = Some("2000-01-01".to_string());
        let outcome = engine().compute_verdict(&data);
        assert!(outcome.staleness_warning);
        assert_eq!(outcome.confidence, crate::verdict::ConfidenceLevel::Insufficient);
        assert!(!outcome.research_recommendations.is_empty());
        assert!(!outcome.last_updated.is_empty());
    }
}
