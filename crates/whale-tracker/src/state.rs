//! Wallet state persisted as whole-file JSON between polls.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::WalletConfig;
use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletState {
    pub wallet: String,
    pub label: String,
    /// Raw token units.
    pub balance: u64,
    pub balance_prev: u64,
    pub pct_supply: f64,
    /// BUY | SELL | empty.
    pub last_tx_type: String,
    pub last_tx_amount: u64,
    pub last_tx_time: String,
    pub last_tx_sig: String,
    pub is_pool: bool,
    pub alert_threshold_pct: f64,
    pub notes: String,
}

impl WalletState {
    pub fn from_config(cfg: &WalletConfig) -> Self {
        Self {
            wallet: cfg.address.clone(),
            label: cfg.label.clone(),
            is_pool: cfg.is_pool,
            alert_threshold_pct: cfg.alert_threshold_pct,
            notes: cfg.notes.clone(),
            ..Default::default()
        }
    }
}

pub type WalletStates = BTreeMap<String, WalletState>;

/// Load states from the state file; missing or unreadable files start
/// fresh.
pub fn load_state(path: impl AsRef<Path>) -> WalletStates {
    let path = path.as_ref();
    if !path.exists() {
        return WalletStates::new();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(states) => states,
            Err(e) => {
                warn!("Could not parse state file {}: {}", path.display(), e);
                WalletStates::new()
            }
        },
        Err(e) => {
            warn!("Could not read state file {}: {}", path.display(), e);
            WalletStates::new()
        }
    }
}

pub fn save_state(path: impl AsRef<Path>, states: &WalletStates) -> Result<()> {
    let content = serde_json::to_string_pretty(states)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Ensure every configured wallet has a state entry; existing entries
/// keep their balances.
pub fn seed_from_config(states: &mut WalletStates, wallets: &[WalletConfig]) {
    for cfg in wallets {
        if cfg.address.is_empty() {
            continue;
        }
        states
            .entry(cfg.address.clone())
            .or_insert_with(|| WalletState::from_config(cfg));
    }
}
