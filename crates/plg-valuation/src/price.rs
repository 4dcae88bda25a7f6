//! Price snapshot: technicals derived from one year of daily bars.

use chrono::{DateTime, Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Stock price and technical indicators. Everything optional; short
/// histories simply leave the longer-window fields unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub current_price: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
    pub pct_off_high: Option<f64>,
    pub ytd_return: Option<f64>,
    pub return_3m: Option<f64>,
    pub return_6m: Option<f64>,

    pub price_to_sales: Option<f64>,
    pub forward_pe: Option<f64>,

    pub rsi_14: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub above_sma_50: Option<bool>,
    pub above_sma_200: Option<bool>,
}

/// Build a snapshot from daily bars (oldest first, unix timestamps).
/// `today` anchors the YTD/3m/6m lookbacks.
pub fn compute_price_snapshot(
    timestamps: &[i64],
    closes: &[f64],
    highs: &[f64],
    lows: &[f64],
    price_to_sales: Option<f64>,
    forward_pe: Option<f64>,
    today: NaiveDate,
) -> PriceSnapshot {
    let mut snap = PriceSnapshot {
        price_to_sales,
        forward_pe,
        ..Default::default()
    };

    let Some(&current) = closes.last() else {
        return snap;
    };
    snap.current_price = Some(current);

    let high = highs.iter().copied().fold(f64::MIN, f64::max);
    let low = lows.iter().copied().fold(f64::MAX, f64::min);
    if high > f64::MIN {
        snap.week_52_high = Some(high);
        snap.pct_off_high = Some((current - high) / high * 100.0);
    }
    if low < f64::MAX {
        snap.week_52_low = Some(low);
    }

    let dates: Vec<NaiveDate> = timestamps
        .iter()
        .map(|ts| {
            DateTime::from_timestamp(*ts, 0)
                .map(|dt| dt.date_naive())
                .unwrap_or(today)
        })
        .collect();

    let ytd_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    snap.ytd_return = return_since(&dates, closes, current, ytd_start);
    snap.return_3m = return_since(&dates, closes, current, today - Duration::days(90));
    snap.return_6m = return_since(&dates, closes, current, today - Duration::days(180));

    snap.sma_50 = trailing_mean(closes, 50);
    snap.sma_200 = trailing_mean(closes, 200);
    snap.above_sma_50 = snap.sma_50.map(|sma| current > sma);
    snap.above_sma_200 = snap.sma_200.map(|sma| current > sma);

    snap.rsi_14 = rsi(closes, 14);

    snap
}

/// Return since the first bar on or after `start`, as a percentage.
fn return_since(dates: &[NaiveDate], closes: &[f64], current: f64, start: NaiveDate) -> Option<f64> {
    let idx = dates.iter().position(|d| *d >= start)?;
    let base = *closes.get(idx)?;
    if base == 0.0 {
        return None;
    }
    Some((current - base) / base * 100.0)
}

fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Relative Strength Index over simple rolling means of the final
/// `period` deltas. Needs `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let tail = &deltas[deltas.len() - period..];
    let avg_gain: f64 = tail.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
    let avg_loss: f64 = tail.iter().filter(|d| **d < 0.0).map(|d| -d).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        // All gains pegs at 100; a flat tape reads neutral
        return Some(if avg_gain > 0.0 { 100.0 } else { 50.0 });
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> i64 {
        // Daily bars starting 2025-01-02
        1735776000 + n * 86_400
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_history_yields_defaults() {
        let snap = compute_price_snapshot(&[], &[], &[], &[], Some(10.0), None, today());
        assert!(snap.current_price.is_none());
        assert_eq!(snap.price_to_sales, Some(10.0));
    }

    #[test]
    fn test_pct_off_high() {
        let timestamps: Vec<i64> = (0..3).map(day).collect();
        let closes = [100.0, 90.0, 80.0];
        let highs = [100.0, 95.0, 85.0];
        let lows = [98.0, 88.0, 78.0];
        let snap =
            compute_price_snapshot(&timestamps, &closes, &highs, &lows, None, None, today());
        assert_eq!(snap.current_price, Some(80.0));
        assert_eq!(snap.week_52_high, Some(100.0));
        assert_eq!(snap.week_52_low, Some(78.0));
        assert_eq!(snap.pct_off_high, Some(-20.0));
    }

    #[test]
    fn test_sma_requires_full_window() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert!(trailing_mean(&closes, 50).is_some());
        assert!(trailing_mean(&closes, 200).is_none());
    }

    #[test]
    fn test_rsi_extremes() {
        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&rising, 14), Some(100.0));

        let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let v = rsi(&falling, 14).unwrap();
        assert!(v < 1.0);

        let flat = vec![100.0; 20];
        assert_eq!(rsi(&flat, 14), Some(50.0));

        assert_eq!(rsi(&[100.0, 101.0], 14), None);
    }

    #[test]
    fn test_rsi_balanced_is_midscale() {
        // Alternating +1/-1 deltas: equal gains and losses
        let mut closes = vec![100.0];
        for i in 0..19 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let v = rsi(&closes, 14).unwrap();
        assert!((v - 50.0).abs() < 5.0);
    }

    #[test]
    fn test_returns_anchor_on_lookback_dates() {
        // 200 daily bars ending near today
        let n = 200usize;
        let timestamps: Vec<i64> = (0..n as i64).map(day).collect();
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.1).collect();
        let highs = closes.clone();
        let lows = closes.clone();
        let snap =
            compute_price_snapshot(&timestamps, &closes, &highs, &lows, None, None, today());
        // Monotonic rise: all returns positive
        assert!(snap.ytd_return.unwrap() > 0.0);
        assert!(snap.return_3m.unwrap() > 0.0);
        assert!(snap.return_6m.unwrap() > 0.0);
        assert!(snap.return_6m.unwrap() >= snap.return_3m.unwrap());
        assert_eq!(snap.above_sma_50, Some(true));
        assert_eq!(snap.above_sma_200, Some(true));
    }
}
