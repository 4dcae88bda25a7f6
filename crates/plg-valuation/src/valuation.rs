//! Valuation tiering and opportunity scoring.

use serde::{Deserialize, Serialize};

use plg_core::{normalize_growth, Verdict};

use crate::price::PriceSnapshot;

/// P/S multiple relative to what the fundamentals can justify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationTier {
    Cheap,
    Fair,
    Expensive,
    VeryExpensive,
    Unknown,
}

impl ValuationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationTier::Cheap => "cheap",
            ValuationTier::Fair => "fair",
            ValuationTier::Expensive => "expensive",
            ValuationTier::VeryExpensive => "very_expensive",
            ValuationTier::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSignal {
    BuyNow,
    Accumulate,
    WaitForPullback,
    MonitorClosely,
    Monitor,
    SellRally,
    Avoid,
    ValueTrap,
}

impl TimingSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingSignal::BuyNow => "buy_now",
            TimingSignal::Accumulate => "accumulate",
            TimingSignal::WaitForPullback => "wait_for_pullback",
            TimingSignal::MonitorClosely => "monitor_closely",
            TimingSignal::Monitor => "monitor",
            TimingSignal::SellRally => "sell_rally",
            TimingSignal::Avoid => "avoid",
            TimingSignal::ValueTrap => "value_trap",
        }
    }
}

/// Valuation assessment relative to fundamentals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSignal {
    pub tier: ValuationTier,
    /// 0-100, higher = better opportunity.
    pub opportunity_score: f64,
    pub rationale: String,
    pub timing: TimingSignal,
}

/// Grade the current P/S against what the fundamental verdict, NDR,
/// and growth justify, then score the opportunity 0-100.
pub fn analyze_valuation(
    fundamental: Verdict,
    ndr: Option<f64>,
    revenue_growth: Option<f64>,
    snapshot: &PriceSnapshot,
) -> ValuationSignal {
    let (Some(ps_ratio), Some(_)) = (snapshot.price_to_sales, revenue_growth) else {
        return ValuationSignal {
            tier: ValuationTier::Unknown,
            opportunity_score: 50.0,
            rationale: "Insufficient valuation data".to_string(),
            timing: TimingSignal::Monitor,
        };
    };
    let growth_pct = normalize_growth(revenue_growth).unwrap_or(0.0);
    let buyish = fundamental.is_buyish();

    // --- Valuation tier ---
    let tier = if buyish {
        if matches!(ndr, Some(n) if n >= 120.0) && growth_pct >= 30.0 {
            // Elite tier can justify 15-25x
            grade(ps_ratio, Some(25.0), 15.0, 10.0)
        } else if matches!(ndr, Some(n) if n >= 110.0) && growth_pct >= 20.0 {
            // Good tier can justify 10-15x
            grade(ps_ratio, Some(20.0), 15.0, 10.0)
        } else {
            grade(ps_ratio, None, 15.0, 10.0)
        }
    } else {
        // Weak fundamentals demand a discount
        grade(ps_ratio, Some(12.0), 8.0, 5.0)
    };

    // --- Opportunity score ---
    let mut score: f64 = 50.0;

    score += match fundamental {
        Verdict::StrongBuy => 20.0,
        Verdict::Buy => 15.0,
        Verdict::Watch => 5.0,
        Verdict::Sell => -15.0,
        Verdict::Avoid => -20.0,
    };

    score += match tier {
        ValuationTier::Cheap => 15.0,
        ValuationTier::Fair => 5.0,
        ValuationTier::Expensive => -10.0,
        ValuationTier::VeryExpensive => -20.0,
        ValuationTier::Unknown => 0.0,
    };

    if let Some(off_high) = snapshot.pct_off_high {
        if off_high < -30.0 {
            // Deep drawdown: mispricing if fundamentals hold, knife if not
            score += if buyish { 15.0 } else { -5.0 };
        } else if off_high < -15.0 {
            score += if buyish { 10.0 } else { -3.0 };
        } else if off_high > -5.0 {
            score -= 10.0;
        }
    }

    if let Some(rsi) = snapshot.rsi_14 {
        if rsi < 30.0 {
            if buyish {
                score += 10.0;
            }
        } else if rsi > 70.0 {
            score -= 10.0;
        }
    }

    let score = score.clamp(0.0, 100.0);

    // --- Timing ---
    let deep_pullback = matches!(snapshot.pct_off_high, Some(p) if p < -20.0);
    let oversold = matches!(snapshot.rsi_14, Some(r) if r < 40.0);

    let timing = if buyish {
        if matches!(tier, ValuationTier::Cheap | ValuationTier::Fair) {
            if deep_pullback || oversold {
                TimingSignal::BuyNow
            } else {
                TimingSignal::Accumulate
            }
        } else {
            TimingSignal::WaitForPullback
        }
    } else if fundamental == Verdict::Watch {
        if tier == ValuationTier::Cheap
            && matches!(snapshot.pct_off_high, Some(p) if p < -25.0)
        {
            TimingSignal::MonitorClosely
        } else {
            TimingSignal::Monitor
        }
    } else if matches!(snapshot.return_3m, Some(r) if r > 10.0) {
        TimingSignal::SellRally
    } else {
        TimingSignal::Avoid
    };

    let growth_str = if growth_pct != 0.0 {
        format!("{:.0}%", growth_pct)
    } else {
        "N/A".to_string()
    };
    let off_high_str = match snapshot.pct_off_high {
        Some(p) if p != 0.0 => format!("{:.0}%", p),
        _ => "N/A".to_string(),
    };
    let rationale = format!(
        "P/S {:.1}x vs {} growth ({}). Stock {} from 52w high.",
        ps_ratio,
        growth_str,
        tier.as_str(),
        off_high_str
    );

    ValuationSignal {
        tier,
        opportunity_score: score,
        rationale,
        timing,
    }
}

/// Break a P/S ratio into a tier. `very_expensive_above: None` means
/// the band tops out at expensive.
fn grade(ps: f64, very_expensive_above: Option<f64>, expensive_above: f64, fair_above: f64) -> ValuationTier {
    if let Some(ve) = very_expensive_above {
        if ps > ve {
            return ValuationTier::VeryExpensive;
        }
    }
    if ps > expensive_above {
        ValuationTier::Expensive
    } else if ps > fair_above {
        ValuationTier::Fair
    } else {
        ValuationTier::Cheap
    }
}
