//! Trend persistence and scoring. Balance, market, liquidity, and
//! holder snapshots accumulate in SQLite; the analyzer turns a 7-day
//! window into per-wallet phases and a composite trend score.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::debug;

use crate::dex::MarketMetrics;
use crate::error::Result;
use crate::state::WalletState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendPhase {
    Accumulation,
    Distribution,
    Consolidation,
    Unknown,
}

impl TrendPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPhase::Accumulation => "ACCUMULATION",
            TrendPhase::Distribution => "DISTRIBUTION",
            TrendPhase::Consolidation => "CONSOLIDATION",
            TrendPhase::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendSignalLevel {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

impl TrendSignalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendSignalLevel::StrongBullish => "STRONG_BULLISH",
            TrendSignalLevel::Bullish => "BULLISH",
            TrendSignalLevel::Neutral => "NEUTRAL",
            TrendSignalLevel::Bearish => "BEARISH",
            TrendSignalLevel::StrongBearish => "STRONG_BEARISH",
        }
    }

    pub fn from_score(score: i32) -> Self {
        if score >= 40 {
            TrendSignalLevel::StrongBullish
        } else if score >= 15 {
            TrendSignalLevel::Bullish
        } else if score <= -40 {
            TrendSignalLevel::StrongBearish
        } else if score <= -15 {
            TrendSignalLevel::Bearish
        } else {
            TrendSignalLevel::Neutral
        }
    }
}

/// One wallet's behavior over the trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct WhaleTrendMetrics {
    pub wallet: String,
    pub label: String,
    pub current_balance: u64,
    pub balance_7d_ago: u64,
    pub balance_change_7d: i64,
    pub balance_change_7d_pct: f64,
    pub buy_count_7d: u32,
    pub sell_count_7d: u32,
    /// Signed raw units, buys positive.
    pub net_flow_7d: i64,
    /// Percent balance change per day.
    pub velocity: f64,
    pub phase: TrendPhase,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendScore {
    pub signal: TrendSignalLevel,
    pub score: i32,
    pub confidence: f64,
    pub whale_phase: TrendPhase,
    pub key_factors: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiquidityTrend {
    pub current_usd: f64,
    pub change_pct: f64,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HolderTrend {
    pub current_count: i64,
    pub change: i64,
    pub direction: String,
}

/// One historical row for a wallet, oldest first when queried.
#[derive(Debug, Clone)]
pub struct WalletHistoryRow {
    pub balance: u64,
    pub tx_type: String,
    pub tx_amount: u64,
    pub timestamp: String,
}

pub struct TrendDb {
    conn: Connection,
}

impl TrendDb {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS wallet_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                wallet TEXT NOT NULL,
                label TEXT NOT NULL,
                balance INTEGER NOT NULL,
                pct_supply REAL NOT NULL,
                tx_type TEXT,
                tx_amount INTEGER,
                timestamp TEXT NOT NULL,
                UNIQUE(wallet, timestamp)
            );
            CREATE TABLE IF NOT EXISTS market_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                price_usd REAL NOT NULL,
                price_change_24h REAL NOT NULL,
                volume_24h REAL NOT NULL,
                liquidity_usd REAL NOT NULL,
                holder_count INTEGER NOT NULL,
                market_cap REAL NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS liquidity_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pool_address TEXT NOT NULL,
                token_balance INTEGER NOT NULL,
                sol_balance REAL NOT NULL,
                depth_usd REAL NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS holder_snapshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                holder_count INTEGER NOT NULL,
                top_10_pct REAL NOT NULL,
                top_50_pct REAL NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trend_scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                signal TEXT NOT NULL,
                score INTEGER NOT NULL,
                confidence REAL NOT NULL,
                whale_phase TEXT NOT NULL,
                key_factors TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_wallet_history_wallet
                ON wallet_history(wallet);
            CREATE INDEX IF NOT EXISTS idx_wallet_history_timestamp
                ON wallet_history(timestamp);
            CREATE INDEX IF NOT EXISTS idx_market_history_timestamp
                ON market_history(timestamp);",
        )?;
        Ok(())
    }

    pub fn record_wallet_snapshot(
        &self,
        state: &WalletState,
        timestamp: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO wallet_history
                (wallet, label, balance, pct_supply, tx_type, tx_amount, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                state.wallet,
                state.label,
                state.balance as i64,
                state.pct_supply,
                if state.last_tx_type.is_empty() {
                    None
                } else {
                    Some(state.last_tx_type.as_str())
                },
                state.last_tx_amount as i64,
                timestamp,
            ],
        )?;
        Ok(())
    }

    pub fn record_market_snapshot(&self, metrics: &MarketMetrics) -> Result<()> {
        self.conn.execute(
            "INSERT INTO market_history
                (price_usd, price_change_24h, volume_24h, liquidity_usd,
                 holder_count, market_cap, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                metrics.price_usd,
                metrics.price_change_24h,
                metrics.volume_24h,
                metrics.liquidity_usd,
                metrics.holder_count,
                metrics.market_cap,
                metrics.timestamp,
            ],
        )?;
        Ok(())
    }

    pub fn record_liquidity_snapshot(
        &self,
        pool_address: &str,
        token_balance: u64,
        sol_balance: f64,
        depth_usd: f64,
        timestamp: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO liquidity_history
                (pool_address, token_balance, sol_balance, depth_usd, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![pool_address, token_balance as i64, sol_balance, depth_usd, timestamp],
        )?;
        Ok(())
    }

    pub fn record_holder_snapshot(
        &self,
        holder_count: i64,
        top_10_pct: f64,
        top_50_pct: f64,
        timestamp: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO holder_snapshots (holder_count, top_10_pct, top_50_pct, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![holder_count, top_10_pct, top_50_pct, timestamp],
        )?;
        Ok(())
    }

    pub fn record_trend_score(&self, score: &TrendScore) -> Result<()> {
        self.conn.execute(
            "INSERT INTO trend_scores
                (signal, score, confidence, whale_phase, key_factors, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                score.signal.as_str(),
                score.score,
                score.confidence,
                score.whale_phase.as_str(),
                serde_json::to_string(&score.key_factors)?,
                score.timestamp,
            ],
        )?;
        Ok(())
    }

    /// Rows for one wallet since the cutoff, oldest first.
    pub fn wallet_history(
        &self,
        wallet: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<WalletHistoryRow>> {
        let cutoff = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut stmt = self.conn.prepare(
            "SELECT balance, tx_type, tx_amount, timestamp
             FROM wallet_history
             WHERE wallet = ?1 AND timestamp >= ?2
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt
            .query_map(params![wallet, cutoff], |row| {
                Ok(WalletHistoryRow {
                    balance: row.get::<_, i64>(0)? as u64,
                    tx_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    tx_amount: row.get::<_, Option<i64>>(2)?.unwrap_or(0) as u64,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Recorded BUY/SELL rows across all wallets since the cutoff,
    /// newest first.
    pub fn signal_history(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(String, String, String, i64, String)>> {
        let cutoff = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut stmt = self.conn.prepare(
            "SELECT wallet, label, tx_type, tx_amount, timestamp
             FROM wallet_history
             WHERE tx_type IS NOT NULL AND timestamp >= ?1
             ORDER BY timestamp DESC",
        )?;
        let rows = stmt
            .query_map(params![cutoff], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                    row.get(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// (liquidity_usd, volume_24h, price_change_24h, holder_count)
    /// points since the cutoff, oldest first.
    pub fn market_history(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(f64, f64, f64, i64)>> {
        let cutoff = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut stmt = self.conn.prepare(
            "SELECT liquidity_usd, volume_24h, price_change_24h, holder_count
             FROM market_history
             WHERE timestamp >= ?1
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt
            .query_map(params![cutoff], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn holder_history(&self, since: DateTime<Utc>) -> Result<Vec<i64>> {
        let cutoff = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut stmt = self.conn.prepare(
            "SELECT holder_count FROM holder_snapshots
             WHERE timestamp >= ?1 ORDER BY timestamp ASC",
        )?;
        let rows = stmt
            .query_map(params![cutoff], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Most recent scores, newest first.
    pub fn recent_trend_scores(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<TrendScore>> {
        let cutoff = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut stmt = self.conn.prepare(
            "SELECT signal, score, confidence, whale_phase, key_factors, timestamp
             FROM trend_scores
             WHERE timestamp >= ?1
             ORDER BY timestamp DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![cutoff, limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(signal, score, confidence, phase, factors, timestamp)| TrendScore {
                signal: parse_signal_level(&signal),
                score,
                confidence,
                whale_phase: parse_phase(&phase),
                key_factors: serde_json::from_str(&factors).unwrap_or_default(),
                timestamp,
            })
            .collect())
    }
}

fn parse_signal_level(s: &str) -> TrendSignalLevel {
    match s {
        "STRONG_BULLISH" => TrendSignalLevel::StrongBullish,
        "BULLISH" => TrendSignalLevel::Bullish,
        "BEARISH" => TrendSignalLevel::Bearish,
        "STRONG_BEARISH" => TrendSignalLevel::StrongBearish,
        _ => TrendSignalLevel::Neutral,
    }
}

fn parse_phase(s: &str) -> TrendPhase {
    match s {
        "ACCUMULATION" => TrendPhase::Accumulation,
        "DISTRIBUTION" => TrendPhase::Distribution,
        "CONSOLIDATION" => TrendPhase::Consolidation,
        _ => TrendPhase::Unknown,
    }
}

pub struct TrendAnalyzer {
    decimals: u32,
}

impl TrendAnalyzer {
    const ACCUMULATION_THRESHOLD: i32 = 2;
    const DISTRIBUTION_THRESHOLD: i32 = -2;
    const VELOCITY_HIGH: f64 = 2.0;
    const WINDOW_DAYS: f64 = 7.0;

    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    fn to_display(&self, raw: i64) -> f64 {
        raw as f64 / 10f64.powi(self.decimals as i32)
    }

    /// Per-wallet behavior over the trailing window. An empty history
    /// yields an Unknown phase with no movement.
    pub fn analyze_wallet_trend(
        &self,
        state: &WalletState,
        history: &[WalletHistoryRow],
    ) -> WhaleTrendMetrics {
        let current = state.balance;

        if history.is_empty() {
            return WhaleTrendMetrics {
                wallet: state.wallet.clone(),
                label: state.label.clone(),
                current_balance: current,
                balance_7d_ago: current,
                balance_change_7d: 0,
                balance_change_7d_pct: 0.0,
                buy_count_7d: 0,
                sell_count_7d: 0,
                net_flow_7d: 0,
                velocity: 0.0,
                phase: TrendPhase::Unknown,
            };
        }

        let oldest = history[0].balance;
        let change = current as i64 - oldest as i64;
        let change_pct = if oldest > 0 {
            change as f64 / oldest as f64 * 100.0
        } else if change > 0 {
            100.0
        } else {
            0.0
        };

        let mut buys = 0u32;
        let mut sells = 0u32;
        let mut net_flow = 0i64;
        for row in history {
            match row.tx_type.as_str() {
                "BUY" => {
                    buys += 1;
                    net_flow += row.tx_amount as i64;
                }
                "SELL" => {
                    sells += 1;
                    net_flow -= row.tx_amount as i64;
                }
                _ => {}
            }
        }

        let velocity = change_pct / Self::WINDOW_DAYS;
        let phase = determine_phase(buys as i32 - sells as i32, net_flow, velocity);

        WhaleTrendMetrics {
            wallet: state.wallet.clone(),
            label: state.label.clone(),
            current_balance: current,
            balance_7d_ago: oldest,
            balance_change_7d: change,
            balance_change_7d_pct: change_pct,
            buy_count_7d: buys,
            sell_count_7d: sells,
            net_flow_7d: net_flow,
            velocity,
            phase,
        }
    }

    /// Liquidity depth direction from the oldest and newest points.
    pub fn analyze_liquidity_trend(&self, points: &[f64]) -> LiquidityTrend {
        if points.len() < 2 {
            return LiquidityTrend {
                current_usd: points.last().copied().unwrap_or(0.0),
                change_pct: 0.0,
                direction: "UNKNOWN".to_string(),
            };
        }
        let first = points[0];
        let last = points[points.len() - 1];
        let change_pct = if first > 0.0 {
            (last - first) / first * 100.0
        } else {
            0.0
        };
        let direction = if change_pct < -5.0 {
            "SHRINKING"
        } else if change_pct > 5.0 {
            "GROWING"
        } else {
            "STABLE"
        };
        LiquidityTrend {
            current_usd: last,
            change_pct,
            direction: direction.to_string(),
        }
    }

    pub fn analyze_holder_trend(&self, counts: &[i64]) -> HolderTrend {
        if counts.len() < 2 {
            return HolderTrend {
                current_count: counts.last().copied().unwrap_or(0),
                change: 0,
                direction: "UNKNOWN".to_string(),
            };
        }
        let change = counts[counts.len() - 1] - counts[0];
        let direction = if change < 0 {
            "DECLINING"
        } else if change > 0 {
            "GROWING"
        } else {
            "STABLE"
        };
        HolderTrend {
            current_count: counts[counts.len() - 1],
            change,
            direction: direction.to_string(),
        }
    }

    /// Composite score from whale phases, net flow, liquidity, holder,
    /// and market context. Clamped to [-100, 100].
    pub fn calculate_trend_score(
        &self,
        whales: &[WhaleTrendMetrics],
        liquidity: Option<&LiquidityTrend>,
        holders: Option<&HolderTrend>,
        market: Option<&MarketMetrics>,
        now: DateTime<Utc>,
    ) -> TrendScore {
        let mut score = 0i32;
        let mut factors = Vec::new();

        let accumulating = whales
            .iter()
            .filter(|w| w.phase == TrendPhase::Accumulation)
            .count();
        let distributing = whales
            .iter()
            .filter(|w| w.phase == TrendPhase::Distribution)
            .count();

        if accumulating >= 3 {
            score += 30;
            factors.push(format!("{} whales accumulating", accumulating));
        } else if accumulating >= 2 {
            score += 20;
            factors.push(format!("{} whales accumulating", accumulating));
        } else if accumulating == 1 {
            score += 10;
            factors.push("1 whale accumulating".to_string());
        }

        if distributing >= 3 {
            score -= 30;
            factors.push(format!("CRITICAL: {} whales distributing", distributing));
        } else if distributing >= 2 {
            score -= 20;
            factors.push(format!("WARNING: {} whales distributing", distributing));
        } else if distributing == 1 {
            score -= 10;
            factors.push("1 whale distributing".to_string());
        }

        let net_flow: i64 = whales.iter().map(|w| w.net_flow_7d).sum();
        let net_flow_m = self.to_display(net_flow) / 1_000_000.0;
        if net_flow > 0 {
            score += (net_flow_m as i32).min(20);
            factors.push(format!("Net inflow: {:.1}M tokens", net_flow_m));
        } else if net_flow < 0 {
            score -= (net_flow_m.abs() as i32).min(20);
            factors.push(format!("Net outflow: {:.1}M tokens", net_flow_m.abs()));
        }

        if !whales.is_empty() {
            let avg_velocity =
                whales.iter().map(|w| w.velocity).sum::<f64>() / whales.len() as f64;
            if avg_velocity > Self::VELOCITY_HIGH {
                score += 10;
                factors.push("High accumulation velocity".to_string());
            } else if avg_velocity < -Self::VELOCITY_HIGH {
                score -= 10;
                factors.push("High distribution velocity".to_string());
            }
        }

        if let Some(liq) = liquidity {
            if liq.change_pct < -5.0 {
                score -= 15;
                factors.push(format!("Liquidity shrinking: {:.1}%", liq.change_pct));
            } else if liq.change_pct > 5.0 {
                score += 10;
                factors.push(format!("Liquidity growing: {:.1}%", liq.change_pct));
            }
        }

        if let Some(h) = holders {
            if h.direction == "DECLINING" {
                score -= 15;
                factors.push("Holder count declining".to_string());
            } else if h.direction == "GROWING" {
                score += 15;
                factors.push("Holder count growing".to_string());
            }
        }

        if let Some(m) = market {
            if m.volume_24h > 1_000_000.0 {
                score += 5;
                factors.push("Healthy volume".to_string());
            } else if m.volume_24h > 0.0 && m.volume_24h < 100_000.0 {
                score -= 5;
                factors.push("Low volume".to_string());
            }

            if m.price_change_24h > 10.0 && accumulating > distributing {
                score += 5;
                factors.push("Whales buying strength".to_string());
            } else if m.price_change_24h < -10.0 && distributing > accumulating {
                score -= 10;
                factors.push("WARNING: Whales selling into weakness".to_string());
            }
        }

        score = score.clamp(-100, 100);

        let mut confidence = 0.3 + (whales.len() as f64 * 0.03).min(0.3);
        if liquidity.is_some() {
            confidence += 0.15;
        }
        if holders.is_some() {
            confidence += 0.15;
        }
        if market.map(|m| m.price_usd > 0.0).unwrap_or(false) {
            confidence += 0.1;
        }
        confidence = confidence.min(1.0);

        let whale_phase = if accumulating > distributing {
            TrendPhase::Accumulation
        } else if distributing > accumulating {
            TrendPhase::Distribution
        } else {
            TrendPhase::Consolidation
        };

        debug!(
            "Trend score {} ({} factors, confidence {:.2})",
            score,
            factors.len(),
            confidence
        );

        TrendScore {
            signal: TrendSignalLevel::from_score(score),
            score,
            confidence,
            whale_phase,
            key_factors: factors,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Phase from net transaction count, net flow, and velocity.
fn determine_phase(net_tx: i32, net_flow: i64, velocity: f64) -> TrendPhase {
    if net_tx >= TrendAnalyzer::ACCUMULATION_THRESHOLD && net_flow > 0 {
        TrendPhase::Accumulation
    } else if net_tx <= TrendAnalyzer::DISTRIBUTION_THRESHOLD && net_flow < 0 {
        TrendPhase::Distribution
    } else if velocity.abs() < 0.5 {
        TrendPhase::Consolidation
    } else {
        TrendPhase::Unknown
    }
}

pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}
