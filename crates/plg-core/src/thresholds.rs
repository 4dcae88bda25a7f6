//! Threshold configuration for the verdict engine.
//!
//! All cutoffs live here and are injected into [`crate::VerdictEngine`]
//! at construction. `Default` carries the canonical PLG thesis values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictThresholds {
    // Entry signals
    pub ndr_entry: f64,
    pub ndr_elite: f64,
    pub growth_entry: f64,
    pub growth_elite: f64,
    pub growth_partial: f64,

    // Tier 2: gross retention
    pub gr_strong: f64,
    pub gr_healthy: f64,
    pub gr_acceptable: f64,

    // Tier 2: dollar-based net expansion
    pub dbne_strong: f64,
    pub dbne_healthy: f64,
    pub dbne_acceptable: f64,

    // Tier 2: large-customer NDR (stricter)
    pub large_cust_ndr_strong: f64,
    pub large_cust_ndr_healthy: f64,
    pub large_cust_ndr_acceptable: f64,

    // Tier 2: approximate NDR floor for "acceptable"
    pub tier2_ndr_acceptable: f64,

    // Tier 3: implied expansion
    pub implied_exp_strong: f64,
    pub implied_exp_healthy: f64,

    // Tier 3: RPO forward indicator
    pub rpo_accelerating_delta: f64,

    // Tier 4: consumer model
    pub consumer_arpu_growth_buy: f64,
    pub consumer_user_growth_buy: f64,
    pub consumer_revenue_growth_watch: f64,

    // Tier 4: marketplace model
    pub marketplace_gmv_growth_buy: f64,

    // Tier 4: transaction model
    pub transaction_margin_compression_delta: f64,

    // Confidence bands
    pub confidence_high: f64,
    pub confidence_medium: f64,
    pub confidence_low: f64,

    // Staleness (days)
    pub staleness_financial_days: i64,
    pub staleness_competitive_days: i64,

    // Entry/exit signal counts
    pub entry_strong_buy: f64,
    pub entry_buy: f64,
    pub entry_watch: f64,
    pub exit_sell: f64,
    pub exit_watch: f64,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            ndr_entry: 110.0,
            ndr_elite: 120.0,
            growth_entry: 25.0,
            growth_elite: 30.0,
            growth_partial: 20.0,

            gr_strong: 97.0,
            gr_healthy: 93.0,
            gr_acceptable: 90.0,

            dbne_strong: 120.0,
            dbne_healthy: 110.0,
            dbne_acceptable: 100.0,

            large_cust_ndr_strong: 125.0,
            large_cust_ndr_healthy: 115.0,
            large_cust_ndr_acceptable: 105.0,

            tier2_ndr_acceptable: 100.0,

            implied_exp_strong: 15.0,
            implied_exp_healthy: 5.0,

            rpo_accelerating_delta: 10.0,

            consumer_arpu_growth_buy: 20.0,
            consumer_user_growth_buy: 15.0,
            consumer_revenue_growth_watch: 30.0,

            marketplace_gmv_growth_buy: 25.0,

            transaction_margin_compression_delta: 10.0,

            confidence_high: 0.70,
            confidence_medium: 0.45,
            confidence_low: 0.25,

            staleness_financial_days: 100,
            staleness_competitive_days: 180,

            entry_strong_buy: 5.0,
            entry_buy: 4.0,
            entry_watch: 3.0,
            exit_sell: 2.0,
            exit_watch: 1.0,
        }
    }
}

/// Weights for the data-availability confidence score.
///
/// Retention 40%, growth 30%, competitive 20%, customer 10%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub ndr_tier_1: f64,
    pub ndr_tier_2: f64,
    pub ndr_tier_3: f64,
    pub revenue_growth_current: f64,
    pub revenue_growth_trend: f64,
    pub arr_disclosed: f64,
    pub big_tech_threat_assessed: f64,
    pub category_stage_assessed: f64,
    pub large_customer_count: f64,
    pub customer_growth_rate: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            ndr_tier_1: 0.25,
            ndr_tier_2: 0.15,
            ndr_tier_3: 0.08,
            revenue_growth_current: 0.15,
            revenue_growth_trend: 0.10,
            arr_disclosed: 0.05,
            big_tech_threat_assessed: 0.10,
            category_stage_assessed: 0.10,
            large_customer_count: 0.05,
            customer_growth_rate: 0.05,
        }
    }
}
