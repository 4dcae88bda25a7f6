//! Whale activity signal detection: balance-change classification,
//! pool liquidity moves, CEX transfers, and coordinated activity.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::state::WalletState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    WhaleBuy,
    WhaleSell,
    WhaleToCex,
    LiquidityAdd,
    LiquidityDrop,
    Accumulation,
    Distribution,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::WhaleBuy => "WHALE_BUY",
            SignalType::WhaleSell => "WHALE_SELL",
            SignalType::WhaleToCex => "WHALE_TO_CEX",
            SignalType::LiquidityAdd => "LIQUIDITY_ADD",
            SignalType::LiquidityDrop => "LIQUIDITY_DROP",
            SignalType::Accumulation => "ACCUMULATION",
            SignalType::Distribution => "DISTRIBUTION",
        }
    }
}

/// One detected event.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub signal_type: SignalType,
    pub wallet_label: String,
    pub wallet_address: String,
    /// Raw token units moved.
    pub amount: u64,
    pub pct_change: f64,
    pub new_balance: u64,
    pub new_pct_supply: f64,
    pub tx_signature: String,
    /// CEX label for WHALE_TO_CEX.
    pub target_label: String,
    pub timestamp: String,
    pub severity: Severity,
}

/// Classifies wallet activity against per-wallet thresholds and keeps
/// the day's buy/sell signals for coordination checks.
pub struct SignalDetector {
    decimals: u32,
    total_supply: u64,
    cex_labels: HashMap<String, String>,
    daily_signals: Vec<Signal>,
}

impl SignalDetector {
    pub fn new(decimals: u32, total_supply: u64, cex_labels: HashMap<String, String>) -> Self {
        Self {
            decimals,
            total_supply,
            cex_labels,
            daily_signals: Vec::new(),
        }
    }

    fn pct_supply(&self, raw_balance: u64) -> f64 {
        if self.total_supply == 0 {
            return 0.0;
        }
        (raw_balance as f64 / 10f64.powi(self.decimals as i32)) / self.total_supply as f64 * 100.0
    }

    /// Classify a non-pool balance change. Below-threshold moves are
    /// ignored; a previous balance of zero counts as a 100% buy.
    pub fn detect_balance_change(
        &mut self,
        state: &WalletState,
        new_balance: u64,
        latest_sig: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        let prev = state.balance as i128;
        let diff = new_balance as i128 - prev;
        if diff == 0 {
            return None;
        }

        let pct_change = if prev > 0 {
            diff as f64 / prev as f64 * 100.0
        } else if diff > 0 {
            100.0
        } else {
            0.0
        };

        if pct_change.abs() < state.alert_threshold_pct {
            return None;
        }

        let (signal_type, severity) = if diff > 0 {
            (SignalType::WhaleBuy, Severity::Info)
        } else {
            (SignalType::WhaleSell, Severity::Warning)
        };

        let signal = Signal {
            signal_type,
            wallet_label: state.label.clone(),
            wallet_address: state.wallet.clone(),
            amount: diff.unsigned_abs() as u64,
            pct_change,
            new_balance,
            new_pct_supply: self.pct_supply(new_balance),
            tx_signature: latest_sig.unwrap_or_default().to_string(),
            target_label: String::new(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            severity,
        };
        self.daily_signals.push(signal.clone());
        Some(signal)
    }

    /// Pool-wallet depth change. The first observation (prev == 0)
    /// never signals.
    pub fn detect_liquidity_change(
        &self,
        state: &WalletState,
        new_balance: u64,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        let prev = state.balance;
        if prev == 0 {
            return None;
        }

        let diff = new_balance as i128 - prev as i128;
        let pct_change = diff as f64 / prev as f64 * 100.0;
        if pct_change.abs() < state.alert_threshold_pct {
            return None;
        }

        let (signal_type, severity) = if diff < 0 {
            (SignalType::LiquidityDrop, Severity::Warning)
        } else {
            (SignalType::LiquidityAdd, Severity::Info)
        };

        Some(Signal {
            signal_type,
            wallet_label: state.label.clone(),
            wallet_address: state.wallet.clone(),
            amount: diff.unsigned_abs() as u64,
            pct_change,
            new_balance,
            new_pct_supply: 0.0,
            tx_signature: String::new(),
            target_label: String::new(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            severity,
        })
    }

    /// Scan a parsed transaction's post token balances for a tracked
    /// CEX owner.
    pub fn detect_cex_transfer(
        &self,
        state: &WalletState,
        tx: &Value,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        let post_balances = tx["meta"]["postTokenBalances"].as_array()?;
        for post in post_balances {
            let Some(owner) = post["owner"].as_str() else {
                continue;
            };
            if let Some(cex_label) = self.cex_labels.get(owner) {
                let signature = tx["transaction"]["signatures"]
                    .get(0)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                return Some(Signal {
                    signal_type: SignalType::WhaleToCex,
                    wallet_label: state.label.clone(),
                    wallet_address: state.wallet.clone(),
                    amount: 0,
                    pct_change: 0.0,
                    new_balance: 0,
                    new_pct_supply: 0.0,
                    tx_signature: signature.to_string(),
                    target_label: cex_label.clone(),
                    timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                    severity: Severity::Critical,
                });
            }
        }
        None
    }

    /// Two or more distinct whales buying (or selling) today is a
    /// coordination signal.
    pub fn detect_coordinated_activity(&self, today: NaiveDate, now: DateTime<Utc>) -> Vec<Signal> {
        let mut buyers = BTreeSet::new();
        let mut sellers = BTreeSet::new();

        for signal in &self.daily_signals {
            let same_day = DateTime::parse_from_rfc3339(&signal.timestamp)
                .map(|ts| ts.date_naive() == today)
                .unwrap_or(false);
            if !same_day {
                continue;
            }
            match signal.signal_type {
                SignalType::WhaleBuy => {
                    buyers.insert(signal.wallet_label.clone());
                }
                SignalType::WhaleSell => {
                    sellers.insert(signal.wallet_label.clone());
                }
                _ => {}
            }
        }

        let mut coordinated = Vec::new();
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        if buyers.len() >= 2 {
            coordinated.push(Signal {
                signal_type: SignalType::Accumulation,
                wallet_label: buyers.into_iter().collect::<Vec<_>>().join(", "),
                wallet_address: String::new(),
                amount: 0,
                pct_change: 0.0,
                new_balance: 0,
                new_pct_supply: 0.0,
                tx_signature: String::new(),
                target_label: String::new(),
                timestamp: timestamp.clone(),
                severity: Severity::Info,
            });
        }
        if sellers.len() >= 2 {
            coordinated.push(Signal {
                signal_type: SignalType::Distribution,
                wallet_label: sellers.into_iter().collect::<Vec<_>>().join(", "),
                wallet_address: String::new(),
                amount: 0,
                pct_change: 0.0,
                new_balance: 0,
                new_pct_supply: 0.0,
                tx_signature: String::new(),
                target_label: String::new(),
                timestamp,
                severity: Severity::Warning,
            });
        }
        coordinated
    }

    pub fn reset_daily_signals(&mut self) {
        self.daily_signals.clear();
    }
}
