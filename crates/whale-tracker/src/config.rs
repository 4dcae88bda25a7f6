//! Tracker configuration: TOML file with serde defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::{Result, TrackerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// SPL token mint address.
    pub address: String,
    pub symbol: String,
    pub decimals: u32,
    /// Display-unit supply, not raw units.
    pub total_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            symbol: "TOKEN".to_string(),
            decimals: 6,
            total_supply: 1_000_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub address: String,
    pub label: String,
    #[serde(default)]
    pub is_pool: bool,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold_pct: f64,
    #[serde(default)]
    pub notes: String,
}

fn default_alert_threshold() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CexWallet {
    pub address: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_seconds: u64,
    pub state_file: String,
    pub db_file: String,
    pub rpc_url: String,
    pub rpc_backup_urls: Vec<String>,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            state_file: "tracker_state.json".to_string(),
            db_file: "tracker_trends.db".to_string(),
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            rpc_backup_urls: Vec::new(),
            max_retries: 3,
            retry_delay_seconds: 2,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub token: TokenConfig,
    pub wallets: Vec<WalletConfig>,
    pub cex_wallets: Vec<CexWallet>,
    pub settings: Settings,
}

impl TrackerConfig {
    /// Load from a TOML file. A missing file falls back to defaults so
    /// the tracker can still run read-only subcommands.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file not found: {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| TrackerError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Raw token units for one display unit.
    pub fn unit_scale(&self) -> f64 {
        10f64.powi(self.token.decimals as i32)
    }

    /// Percentage of total supply represented by a raw balance.
    pub fn pct_supply(&self, raw_balance: u64) -> f64 {
        if self.token.total_supply == 0 {
            return 0.0;
        }
        (raw_balance as f64 / self.unit_scale()) / self.token.total_supply as f64 * 100.0
    }
}
