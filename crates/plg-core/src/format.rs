//! Display formatting helpers shared by the CLI surfaces.

use crate::normalize::normalize_growth;
use crate::verdict::{ConfidenceLevel, Verdict};

/// Verdict label with the underscore spelled out.
pub fn format_verdict(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::StrongBuy => "STRONG BUY",
        Verdict::Buy => "BUY",
        Verdict::Watch => "WATCH",
        Verdict::Sell => "SELL",
        Verdict::Avoid => "AVOID",
    }
}

/// Growth as a whole percentage, normalized first.
pub fn format_growth(value: Option<f64>) -> String {
    match normalize_growth(value) {
        Some(pct) => format!("{:.0}%", pct),
        None => "N/A".to_string(),
    }
}

/// Currency in billions ("$12.3B") or millions ("$450M").
pub fn format_currency(value: Option<f64>, billions: bool) -> String {
    match value {
        Some(v) if billions => format!("${:.1}B", v / 1e9),
        Some(v) => format!("${:.0}M", v / 1e6),
        None => "N/A".to_string(),
    }
}

/// Confidence label with the score as a percentage, e.g. "HIGH (73%)".
pub fn format_confidence(level: ConfidenceLevel, score: f64) -> String {
    format!("{} ({:.0}%)", level.as_str(), score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_growth_normalizes_decimals() {
        assert_eq!(format_growth(Some(0.25)), "25%");
        assert_eq!(format_growth(Some(25.0)), "25%");
        assert_eq!(format_growth(None), "N/A");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Some(12.3e9), true), "$12.3B");
        assert_eq!(format_currency(Some(450.0e6), false), "$450M");
        assert_eq!(format_currency(None, true), "N/A");
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(ConfidenceLevel::High, 0.73), "HIGH (73%)");
        assert_eq!(
            format_confidence(ConfidenceLevel::Insufficient, 0.1),
            "INSUFFICIENT (10%)"
        );
    }

    #[test]
    fn test_format_verdict() {
        assert_eq!(format_verdict(Verdict::StrongBuy), "STRONG BUY");
        assert_eq!(format_verdict(Verdict::Avoid), "AVOID");
    }
}
