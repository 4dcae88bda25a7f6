//! Core verdict engine for the PLG thesis analyzer.
//!
//! Single source of truth for:
//! - Threshold configuration
//! - Company input / verdict outcome types
//! - Tier routing and the four tier scorers
//! - Confidence scoring
//! - Staleness checking
//! - Research recommendations
//! - Formatting utilities

mod confidence;
mod engine;
mod normalize;
mod research;
mod staleness;
mod tier1;
mod tier2;
mod tier3;
mod tier4;

pub mod company;
pub mod format;
pub mod thresholds;
pub mod verdict;

pub use company::{
    BigTechThreat, BusinessModel, CategoryStage, CompanyInput, NdrTier, SwitchingCost,
    TakeRateTrend,
};
pub use engine::VerdictEngine;
pub use normalize::{normalize_growth, normalize_retention};
pub use staleness::check_staleness_at;
pub use thresholds::{ConfidenceWeights, VerdictThresholds};
pub use verdict::{
    ConfidenceLevel, DataTier, ExpansionBucket, RetentionSignal, RpoSignal, Tier4Branch,
    TierSignals, Verdict, VerdictOutcome,
};
