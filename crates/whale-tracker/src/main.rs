//! On-chain whale tracker: polls tracked wallet balances over Solana
//! JSON-RPC, raises activity signals, and scores multi-day trends.

mod config;
mod dex;
mod error;
mod rpc;
mod signals;
mod state;
mod trend;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::TrackerConfig;
use dex::DexDataClient;
use rpc::SolanaRpcClient;
use signals::{Severity, Signal, SignalDetector, SignalType};
use state::{load_state, save_state, seed_from_config, WalletState, WalletStates};
use trend::{window_start, TrendAnalyzer, TrendDb};

/// Trend snapshots are recorded every this many polls.
const TREND_RECORD_INTERVAL: u64 = 5;

#[derive(Parser)]
#[command(name = "whale-tracker", about = "Track whale wallets for an SPL token")]
struct Cli {
    /// Path to the tracker config file
    #[arg(long, default_value = "tracker_config.toml")]
    config: String,

    /// Override the poll interval in seconds
    #[arg(long)]
    interval: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Continuously poll wallet balances and emit signals
    Poll,
    /// Fetch balances once and print the current wallet table
    Snapshot,
    /// Show recorded buy/sell activity
    History {
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Run the trend analysis and print a scored report
    Trends,
    /// Show recent trend scores
    TrendHistory {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Add a wallet to the tracked state
    AddWallet {
        label: String,
        address: String,
        #[arg(long, default_value_t = 1.0)]
        threshold: f64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "whale_tracker=info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Tracker failed: {:#}", e);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = TrackerConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config))?;
    if let Some(interval) = cli.interval {
        config.settings.poll_interval_seconds = interval;
    }

    match cli.command.unwrap_or(Command::Poll) {
        Command::Poll => poll_loop(&config).await,
        Command::Snapshot => snapshot(&config).await,
        Command::History { hours } => history(&config, hours),
        Command::Trends => trends(&config).await,
        Command::TrendHistory { days } => trend_history(&config, days),
        Command::AddWallet {
            label,
            address,
            threshold,
        } => add_wallet(&config, &label, &address, threshold).await,
    }
}

async fn poll_loop(config: &TrackerConfig) -> Result<()> {
    if config.token.address.is_empty() {
        anyhow::bail!("no token address configured");
    }

    let rpc = SolanaRpcClient::new(&config.settings);
    let db = TrendDb::open(&config.settings.db_file)?;
    let mut states = load_state(&config.settings.state_file);
    seed_from_config(&mut states, &config.wallets);

    let cex_labels = config
        .cex_wallets
        .iter()
        .map(|c| (c.address.clone(), c.label.clone()))
        .collect();
    let mut detector = SignalDetector::new(
        config.token.decimals,
        config.token.total_supply,
        cex_labels,
    );

    info!(
        "Tracking {} wallets for {} every {}s",
        states.len(),
        config.token.symbol,
        config.settings.poll_interval_seconds
    );

    let mut poll_count = 0u64;
    let mut last_day = Utc::now().date_naive();

    loop {
        poll_count += 1;
        let today = Utc::now().date_naive();
        if today != last_day {
            detector.reset_daily_signals();
            last_day = today;
        }

        poll_once(config, &rpc, &mut states, &mut detector, &db).await;

        for signal in detector.detect_coordinated_activity(today, Utc::now()) {
            print_signal(&signal, config);
        }

        if poll_count % TREND_RECORD_INTERVAL == 0 {
            record_trend_snapshots(&db, &states);
        }

        if let Err(e) = save_state(&config.settings.state_file, &states) {
            warn!("Could not save state: {}", e);
        }

        let sleep = tokio::time::sleep(std::time::Duration::from_secs(
            config.settings.poll_interval_seconds,
        ));
        tokio::select! {
            _ = sleep => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                save_state(&config.settings.state_file, &states)?;
                return Ok(());
            }
        }
    }
}

async fn poll_once(
    config: &TrackerConfig,
    rpc: &SolanaRpcClient,
    states: &mut WalletStates,
    detector: &mut SignalDetector,
    db: &TrendDb,
) {
    let now = Utc::now();
    let addresses: Vec<String> = states.keys().cloned().collect();

    for address in addresses {
        let Some(new_balance) = rpc.get_token_balance(&address, &config.token.address).await
        else {
            continue;
        };

        let Some(current) = states.get(&address).cloned() else {
            continue;
        };

        if current.is_pool {
            if let Some(signal) = detector.detect_liquidity_change(&current, new_balance, now) {
                print_signal(&signal, config);
            }
        } else {
            let latest_sig = rpc
                .get_signatures_for_address(&address, 1)
                .await
                .and_then(|sigs| {
                    sigs.first()
                        .and_then(|s| s["signature"].as_str().map(String::from))
                });

            if let Some(signal) =
                detector.detect_balance_change(&current, new_balance, latest_sig.as_deref(), now)
            {
                print_signal(&signal, config);

                if signal.signal_type == SignalType::WhaleSell && !signal.tx_signature.is_empty() {
                    if let Some(tx) = rpc.get_transaction(&signal.tx_signature).await {
                        if let Some(cex) = detector.detect_cex_transfer(&current, &tx, now) {
                            print_signal(&cex, config);
                        }
                    }
                }

                if let Some(state) = states.get_mut(&address) {
                    apply_signal(state, &signal);
                }
            }
        }

        if let Some(state) = states.get_mut(&address) {
            state.balance_prev = state.balance;
            state.balance = new_balance;
            state.pct_supply = config.pct_supply(new_balance);
        }
    }

    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    for state in states.values() {
        if !state.last_tx_type.is_empty() && state.last_tx_time == timestamp {
            if let Err(e) = db.record_wallet_snapshot(state, &timestamp) {
                warn!("Could not record wallet snapshot: {}", e);
            }
        }
    }
}

fn apply_signal(state: &mut WalletState, signal: &Signal) {
    state.last_tx_type = match signal.signal_type {
        SignalType::WhaleBuy => "BUY".to_string(),
        SignalType::WhaleSell => "SELL".to_string(),
        _ => state.last_tx_type.clone(),
    };
    state.last_tx_amount = signal.amount;
    state.last_tx_time = signal.timestamp.clone();
    state.last_tx_sig = signal.tx_signature.clone();
}

fn record_trend_snapshots(db: &TrendDb, states: &WalletStates) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    for state in states.values() {
        let snapshot = WalletState {
            last_tx_type: String::new(),
            ..state.clone()
        };
        if let Err(e) = db.record_wallet_snapshot(&snapshot, &timestamp) {
            warn!("Could not record trend snapshot for {}: {}", state.label, e);
        }
        if state.is_pool {
            if let Err(e) =
                db.record_liquidity_snapshot(&state.wallet, state.balance, 0.0, 0.0, &timestamp)
            {
                warn!("Could not record liquidity snapshot: {}", e);
            }
        }
    }
}

fn print_signal(signal: &Signal, config: &TrackerConfig) {
    let scale = config.unit_scale();
    let amount = signal.amount as f64 / scale;
    let line = match signal.signal_type {
        SignalType::WhaleBuy | SignalType::WhaleSell => format!(
            "{} {} {} {:.0} {} ({:+.1}%), balance {:.0} ({:.2}% supply)",
            signal.severity.as_str(),
            signal.signal_type.as_str(),
            signal.wallet_label,
            amount,
            config.token.symbol,
            signal.pct_change,
            signal.new_balance as f64 / scale,
            signal.new_pct_supply,
        ),
        SignalType::WhaleToCex => format!(
            "{} {} {} -> {} (tx {})",
            signal.severity.as_str(),
            signal.signal_type.as_str(),
            signal.wallet_label,
            signal.target_label,
            signal.tx_signature,
        ),
        SignalType::LiquidityAdd | SignalType::LiquidityDrop => format!(
            "{} {} {} {:.0} {} ({:+.1}%)",
            signal.severity.as_str(),
            signal.signal_type.as_str(),
            signal.wallet_label,
            amount,
            config.token.symbol,
            signal.pct_change,
        ),
        SignalType::Accumulation | SignalType::Distribution => format!(
            "{} {} coordinated: {}",
            signal.severity.as_str(),
            signal.signal_type.as_str(),
            signal.wallet_label,
        ),
    };

    match signal.severity {
        Severity::Info => info!("{}", line),
        Severity::Warning => warn!("{}", line),
        Severity::Critical => error!("{}", line),
    }
    println!("  [{}] {}", signal.timestamp, line);
}

async fn snapshot(config: &TrackerConfig) -> Result<()> {
    if config.token.address.is_empty() {
        anyhow::bail!("no token address configured");
    }

    let rpc = SolanaRpcClient::new(&config.settings);
    let mut states = load_state(&config.settings.state_file);
    seed_from_config(&mut states, &config.wallets);

    for (address, state) in states.iter_mut() {
        if let Some(balance) = rpc.get_token_balance(address, &config.token.address).await {
            state.balance_prev = state.balance;
            state.balance = balance;
            state.pct_supply = config.pct_supply(balance);
        }
    }

    let scale = config.unit_scale();
    println!("\n{} WALLET SNAPSHOT", config.token.symbol);
    println!("{}", "=".repeat(72));
    println!(
        "{:<20} {:>16} {:>10} {:>6} {}",
        "LABEL", "BALANCE", "% SUPPLY", "POOL", "LAST TX"
    );
    for state in states.values() {
        println!(
            "{:<20} {:>16.0} {:>9.2}% {:>6} {}",
            state.label,
            state.balance as f64 / scale,
            state.pct_supply,
            if state.is_pool { "yes" } else { "" },
            if state.last_tx_type.is_empty() {
                "-".to_string()
            } else {
                format!(
                    "{} {:.0} @ {}",
                    state.last_tx_type,
                    state.last_tx_amount as f64 / scale,
                    state.last_tx_time
                )
            },
        );
    }

    save_state(&config.settings.state_file, &states)?;
    Ok(())
}

fn history(config: &TrackerConfig, hours: i64) -> Result<()> {
    let db = TrendDb::open(&config.settings.db_file)?;
    let since = Utc::now() - chrono::Duration::hours(hours);
    let rows = db.signal_history(since)?;

    println!("\nACTIVITY (last {}h)", hours);
    println!("{}", "=".repeat(72));
    if rows.is_empty() {
        println!("No recorded activity.");
        return Ok(());
    }
    let scale = config.unit_scale();
    for (_wallet, label, tx_type, amount, timestamp) in rows {
        println!(
            "{} {:<5} {:<20} {:.0} {}",
            timestamp,
            tx_type,
            label,
            amount as f64 / scale,
            config.token.symbol
        );
    }
    Ok(())
}

async fn trends(config: &TrackerConfig) -> Result<()> {
    let db = TrendDb::open(&config.settings.db_file)?;
    let analyzer = TrendAnalyzer::new(config.token.decimals);
    let now = Utc::now();
    let since = window_start(now, 7);

    let mut states = load_state(&config.settings.state_file);
    seed_from_config(&mut states, &config.wallets);
    record_trend_snapshots(&db, &states);

    // Market context
    let market = if config.token.address.is_empty() {
        None
    } else {
        let dex = DexDataClient::new(&config.token.address);
        let metrics = dex.get_market_metrics().await;
        if metrics.price_usd > 0.0 {
            if let Err(e) = db.record_market_snapshot(&metrics) {
                warn!("Could not record market snapshot: {}", e);
            }
            Some(metrics)
        } else {
            None
        }
    };

    // Holder concentration
    if !config.token.address.is_empty() {
        let rpc = SolanaRpcClient::new(&config.settings);
        if let Some(accounts) = rpc.get_token_largest_accounts(&config.token.address).await {
            let raw_supply =
                (config.token.total_supply as f64 * config.unit_scale()) as u64;
            let (top_10, top_50) = rpc::calculate_concentration(&accounts, raw_supply);
            let holder_count = market.as_ref().map(|m| m.holder_count).unwrap_or(0);
            let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
            if let Err(e) = db.record_holder_snapshot(holder_count, top_10, top_50, &timestamp) {
                warn!("Could not record holder snapshot: {}", e);
            }
        }
    }

    let whales: Vec<_> = states
        .values()
        .filter(|s| !s.is_pool)
        .map(|s| {
            let history = db.wallet_history(&s.wallet, since).unwrap_or_default();
            analyzer.analyze_wallet_trend(s, &history)
        })
        .collect();

    let liquidity_points: Vec<f64> = db
        .market_history(since)?
        .iter()
        .map(|(liq, _, _, _)| *liq)
        .collect();
    let liquidity = (liquidity_points.len() >= 2)
        .then(|| analyzer.analyze_liquidity_trend(&liquidity_points));

    let holder_counts = db.holder_history(since)?;
    let holders = (holder_counts.len() >= 2).then(|| analyzer.analyze_holder_trend(&holder_counts));

    let score = analyzer.calculate_trend_score(
        &whales,
        liquidity.as_ref(),
        holders.as_ref(),
        market.as_ref(),
        now,
    );
    db.record_trend_score(&score)?;

    let scale = config.unit_scale();
    println!("\n{} TREND REPORT", config.token.symbol);
    println!("{}", "=".repeat(72));
    println!(
        "Signal: {}  score {:+}  confidence {:.0}%  phase {}",
        score.signal.as_str(),
        score.score,
        score.confidence * 100.0,
        score.whale_phase.as_str()
    );
    println!("\nKey factors:");
    if score.key_factors.is_empty() {
        println!("  (none)");
    }
    for factor in &score.key_factors {
        println!("  - {}", factor);
    }

    println!("\nWHALE ACTIVITY (7d)");
    for whale in &whales {
        println!(
            "  {:<20} {:<13} {:+.1}% balance, {} buys / {} sells, net {:+.0} {}",
            whale.label,
            whale.phase.as_str(),
            whale.balance_change_7d_pct,
            whale.buy_count_7d,
            whale.sell_count_7d,
            whale.net_flow_7d as f64 / scale,
            config.token.symbol
        );
    }

    if let Some(liq) = &liquidity {
        println!(
            "\nLiquidity: {} ({:+.1}%, ${:.0})",
            liq.direction, liq.change_pct, liq.current_usd
        );
    }
    if let Some(h) = &holders {
        println!("Holders: {} ({:+}, now {})", h.direction, h.change, h.current_count);
    }
    if let Some(m) = &market {
        println!(
            "Market: ${:.6} ({:+.1}% 24h), volume ${:.0}, mcap ${:.0}",
            m.price_usd, m.price_change_24h, m.volume_24h, m.market_cap
        );
    }

    Ok(())
}

fn trend_history(config: &TrackerConfig, days: i64) -> Result<()> {
    let db = TrendDb::open(&config.settings.db_file)?;
    let scores = db.recent_trend_scores(window_start(Utc::now(), days), 20)?;

    println!("\nTREND SCORES (last {}d)", days);
    println!("{}", "=".repeat(72));
    if scores.is_empty() {
        println!("No recorded scores.");
        return Ok(());
    }
    for score in scores {
        println!(
            "{} {:<15} {:+4} conf {:.0}% {}",
            score.timestamp,
            score.signal.as_str(),
            score.score,
            score.confidence * 100.0,
            score.whale_phase.as_str()
        );
    }
    Ok(())
}

async fn add_wallet(
    config: &TrackerConfig,
    label: &str,
    address: &str,
    threshold: f64,
) -> Result<()> {
    let mut states = load_state(&config.settings.state_file);
    if states.contains_key(address) {
        anyhow::bail!("wallet {} is already tracked", address);
    }

    let mut state = WalletState {
        wallet: address.to_string(),
        label: label.to_string(),
        alert_threshold_pct: threshold,
        ..Default::default()
    };

    if !config.token.address.is_empty() {
        let rpc = SolanaRpcClient::new(&config.settings);
        if let Some(balance) = rpc.get_token_balance(address, &config.token.address).await {
            state.balance = balance;
            state.pct_supply = config.pct_supply(balance);
        }
    }

    info!(
        "Tracking {} ({}) with balance {}",
        label, address, state.balance
    );
    states.insert(address.to_string(), state);
    save_state(&config.settings.state_file, &states)?;
    Ok(())
}
