//! Valuation and price-signal overlay for the PLG analyzer.
//!
//! Fundamentals are lagging indicators; price action is used to spot
//! mispricings (strong fundamentals on a beaten-down stock), stretched
//! valuations, and value traps. The overlay reads the fundamental
//! verdict but never alters it.

mod enhanced;
mod price;
mod valuation;

pub use enhanced::{combine_with_valuation, EnhancedVerdict};
pub use price::{compute_price_snapshot, PriceSnapshot};
pub use valuation::{analyze_valuation, TimingSignal, ValuationSignal, ValuationTier};
