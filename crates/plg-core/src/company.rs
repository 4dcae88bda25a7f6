//! Company input types for verdict computation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessModel {
    #[default]
    B2bSaas,
    Consumer,
    Marketplace,
    TransactionBased,
    Hybrid,
}

impl BusinessModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessModel::B2bSaas => "b2b_saas",
            BusinessModel::Consumer => "consumer",
            BusinessModel::Marketplace => "marketplace",
            BusinessModel::TransactionBased => "transaction_based",
            BusinessModel::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BigTechThreat {
    Low,
    Medium,
    High,
    VeryHigh,
    #[default]
    Unknown,
}

impl BigTechThreat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BigTechThreat::Low => "low",
            BigTechThreat::Medium => "medium",
            BigTechThreat::High => "high",
            BigTechThreat::VeryHigh => "very_high",
            BigTechThreat::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStage {
    Emerging,
    EarlyGrowth,
    MidGrowth,
    Mature,
    Commoditizing,
    #[default]
    Unknown,
}

impl CategoryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryStage::Emerging => "emerging",
            CategoryStage::EarlyGrowth => "early_growth",
            CategoryStage::MidGrowth => "mid_growth",
            CategoryStage::Mature => "mature",
            CategoryStage::Commoditizing => "commoditizing",
            CategoryStage::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchingCost {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeRateTrend {
    Increasing,
    Stable,
    Decreasing,
}

impl TakeRateTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            TakeRateTrend::Increasing => "increasing",
            TakeRateTrend::Stable => "stable",
            TakeRateTrend::Decreasing => "decreasing",
        }
    }
}

/// Quality tier of the NDR figure itself.
///
/// 1 = direct disclosure, 2 = variant metric, 3 = derived, 4 = unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum NdrTier {
    Direct,
    Variant,
    Derived,
    #[default]
    Unavailable,
}

impl From<u8> for NdrTier {
    fn from(v: u8) -> Self {
        match v {
            1 => NdrTier::Direct,
            2 => NdrTier::Variant,
            3 => NdrTier::Derived,
            _ => NdrTier::Unavailable,
        }
    }
}

impl From<NdrTier> for u8 {
    fn from(t: NdrTier) -> u8 {
        match t {
            NdrTier::Direct => 1,
            NdrTier::Variant => 2,
            NdrTier::Derived => 3,
            NdrTier::Unavailable => 4,
        }
    }
}

/// All data needed to compute a verdict for one company.
///
/// Growth and retention values may arrive as decimals (0.25) or
/// percentages (25); normalization happens inside the scorers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInput {
    pub ticker: String,
    pub name: String,
    pub category: String,
    pub business_model: BusinessModel,

    // Automated (live fetch)
    pub market_cap: Option<f64>,
    pub revenue_ttm: Option<f64>,
    pub revenue_growth_yoy: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub current_price: Option<f64>,

    // Tier 1: direct NDR
    pub ndr: Option<f64>,
    pub ndr_tier: NdrTier,

    // Tier 2: variant metrics
    pub gross_retention: Option<f64>,
    pub dbne: Option<f64>,
    pub large_customer_ndr: Option<f64>,

    // Tier 3: derived signals
    pub implied_expansion: Option<f64>,
    pub rpo_growth_yoy: Option<f64>,

    // Tier 4: non-SaaS metrics
    pub arpu_growth_yoy: Option<f64>,
    pub active_user_growth_yoy: Option<f64>,
    pub gmv_growth_yoy: Option<f64>,
    pub take_rate: Option<f64>,
    pub take_rate_trend: Option<TakeRateTrend>,
    pub tpv_growth_yoy: Option<f64>,
    pub gross_profit_growth_yoy: Option<f64>,

    // SaaS metrics
    pub arr_millions: Option<f64>,
    pub customers_100k_plus: Option<u32>,
    pub customer_growth_yoy: Option<f64>,

    // Assessments
    pub big_tech_threat: BigTechThreat,
    pub category_stage: CategoryStage,
    pub switching_cost: SwitchingCost,

    // Exit signal data. `None` means the trend was never assessed,
    // which matters for confidence scoring.
    pub big_tech_announced: bool,
    pub revenue_decel_3q: Option<bool>,

    // Metadata
    pub cik: String,
    pub data_as_of: String,
    pub data_updated: Option<String>,
    pub notes: String,
}

impl CompanyInput {
    /// Minimal input with everything else unset.
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// True if any Tier 2 variant metric is present.
    pub fn has_variant_retention(&self) -> bool {
        self.dbne.is_some() || self.gross_retention.is_some() || self.large_customer_ndr.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndr_tier_round_trips_through_u8() {
        for raw in [1u8, 2, 3, 4] {
            let tier = NdrTier::from(raw);
            assert_eq!(u8::from(tier), raw);
        }
        // Out-of-range collapses to unavailable
        assert_eq!(NdrTier::from(0), NdrTier::Unavailable);
        assert_eq!(NdrTier::from(9), NdrTier::Unavailable);
    }

    #[test]
    fn test_company_input_deserializes_sparse_json() {
        let json = r#"{"ticker": "MDB", "name": "MongoDB", "ndr": 119, "ndr_tier": 1}"#;
        let input: CompanyInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.ticker, "MDB");
        assert_eq!(input.ndr, Some(119.0));
        assert_eq!(input.ndr_tier, NdrTier::Direct);
        assert_eq!(input.big_tech_threat, BigTechThreat::Unknown);
        assert_eq!(input.revenue_decel_3q, None);
    }
}
