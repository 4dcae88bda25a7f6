//! Verdict outcome types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "STRONG_BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "WATCH")]
    Watch,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "AVOID")]
    Avoid,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "STRONG_BUY",
            Verdict::Buy => "BUY",
            Verdict::Watch => "WATCH",
            Verdict::Sell => "SELL",
            Verdict::Avoid => "AVOID",
        }
    }

    /// True for BUY or STRONG_BUY.
    pub fn is_buyish(&self) -> bool {
        matches!(self, Verdict::StrongBuy | Verdict::Buy)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "INSUFFICIENT")]
    Insufficient,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Insufficient => "INSUFFICIENT",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scorer produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum DataTier {
    Direct,
    Variant,
    Derived,
    Fallback,
}

impl DataTier {
    pub fn as_u8(&self) -> u8 {
        u8::from(*self)
    }
}

impl From<u8> for DataTier {
    fn from(v: u8) -> Self {
        match v {
            1 => DataTier::Direct,
            2 => DataTier::Variant,
            3 => DataTier::Derived,
            _ => DataTier::Fallback,
        }
    }
}

impl From<DataTier> for u8 {
    fn from(t: DataTier) -> u8 {
        match t {
            DataTier::Direct => 1,
            DataTier::Variant => 2,
            DataTier::Derived => 3,
            DataTier::Fallback => 4,
        }
    }
}

/// Tier 2 retention bucket. `Weak` from any variant metric dominates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionSignal {
    Strong,
    Healthy,
    Acceptable,
    Weak,
    Unknown,
}

impl RetentionSignal {
    pub fn title(&self) -> &'static str {
        match self {
            RetentionSignal::Strong => "Strong",
            RetentionSignal::Healthy => "Healthy",
            RetentionSignal::Acceptable => "Acceptable",
            RetentionSignal::Weak => "Weak",
            RetentionSignal::Unknown => "Unknown",
        }
    }
}

/// Tier 3 implied-expansion bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionBucket {
    Strong,
    Healthy,
    Modest,
    Negative,
    Unknown,
}

impl ExpansionBucket {
    pub fn title(&self) -> &'static str {
        match self {
            ExpansionBucket::Strong => "Strong",
            ExpansionBucket::Healthy => "Healthy",
            ExpansionBucket::Modest => "Modest",
            ExpansionBucket::Negative => "Negative",
            ExpansionBucket::Unknown => "Unknown",
        }
    }
}

/// Tier 3 RPO forward indicator relative to revenue growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpoSignal {
    Accelerating,
    Healthy,
    Decelerating,
    Unknown,
}

/// Which Tier 4 branch handled the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier4Branch {
    Consumer,
    Marketplace,
    Transaction,
    Insufficient,
}

/// Tier-specific intermediates, tagged by the tier that produced them.
///
/// Entry/exit totals stay fractional here; the outcome carries the
/// truncated integer counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum TierSignals {
    Tier1 {
        entry: f64,
        exit: f64,
    },
    Tier2 {
        retention: RetentionSignal,
        entry: f64,
        exit: f64,
    },
    Tier3 {
        expansion: ExpansionBucket,
        rpo: RpoSignal,
    },
    Tier4 {
        branch: Tier4Branch,
        entry: f64,
        exit: f64,
    },
}

/// Output of verdict computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictOutcome {
    pub ticker: String,
    pub verdict: Verdict,
    pub confidence: ConfidenceLevel,
    pub confidence_score: f64,
    pub rationale: String,
    pub data_tier: DataTier,
    pub signals: TierSignals,
    pub missing_signals: Vec<String>,
    pub entry_signals_met: u32,
    pub exit_signals_triggered: u32,
    pub staleness_warning: bool,
    pub stale_fields: Vec<String>,
    pub research_recommendations: Vec<String>,
    pub last_updated: String,
}

/// Intermediate result from a tier scorer, before confidence,
/// staleness, and recommendations are attached.
#[derive(Debug, Clone)]
pub(crate) struct TierAssessment {
    pub verdict: Verdict,
    pub rationale: String,
    pub missing: Vec<String>,
    pub entry: f64,
    pub exit: f64,
    pub signals: TierSignals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serializes_as_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Verdict::StrongBuy).unwrap(),
            "\"STRONG_BUY\""
        );
        assert_eq!(serde_json::to_string(&Verdict::Avoid).unwrap(), "\"AVOID\"");
    }

    #[test]
    fn test_data_tier_serializes_as_number() {
        assert_eq!(serde_json::to_string(&DataTier::Variant).unwrap(), "2");
        let t: DataTier = serde_json::from_str("3").unwrap();
        assert_eq!(t, DataTier::Derived);
    }

    #[test]
    fn test_tier_signals_tagging() {
        let s = TierSignals::Tier2 {
            retention: RetentionSignal::Healthy,
            entry: 1.5,
            exit: 0.0,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"tier\":\"tier2\""));
        assert!(json.contains("\"retention\":\"healthy\""));
    }
}
