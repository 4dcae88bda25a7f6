//! PLG batch analyzer entry point.
//!
//! Loads the company database, runs every requested ticker through the
//! verdict engine (with optional live Yahoo/EDGAR enrichment), prints
//! the console summary, and writes the JSON/CSV result files.

mod batch;
mod enhanced;
mod summary;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use tracing::{error, info};

use plg_core::VerdictEngine;
use plg_data::{
    write_results_json, write_summary_csv, AnalyzedCompany, BatchReport, BatchSummary,
    CompanyStore, EdgarClient, YahooFinanceClient,
};

const RESULTS_PATH: &str = "plg_batch_results.json";
const SUMMARY_CSV_PATH: &str = "plg_batch_summary.csv";

#[derive(Parser)]
#[command(name = "plg-analyzer", about = "PLG investment thesis batch analyzer")]
struct Cli {
    /// Tickers to analyze; empty means every ticker in the database
    tickers: Vec<String>,

    /// Report database freshness instead of running the analysis
    #[arg(long)]
    check_freshness: bool,

    /// Add the valuation/price overlay and rank by opportunity
    #[arg(long)]
    enhanced: bool,

    /// Skip all live fetches and analyze from the database alone
    #[arg(long)]
    offline: bool,

    /// Path to the company database JSON
    #[arg(long, default_value = "company_database.json")]
    database: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "plg_analyzer=info,plg_core=info,plg_data=info,plg_valuation=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    // Batch runs always exit 0; failures are logged, not propagated.
    if let Err(e) = run(cli).await {
        error!("Analyzer run failed: {:#}", e);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = CompanyStore::load(&cli.database)
        .with_context(|| format!("could not load company database {}", cli.database))?;
    info!("Loaded {} companies from {}", store.len(), cli.database);

    if cli.check_freshness {
        summary::print_freshness_report(&store, Utc::now().date_naive());
        return Ok(());
    }

    let tickers: Vec<String> = if cli.tickers.is_empty() {
        store.tickers()
    } else {
        cli.tickers.iter().map(|t| t.to_uppercase()).collect()
    };

    let yahoo = (!cli.offline).then(YahooFinanceClient::new);
    let edgar = (!cli.offline).then(EdgarClient::new);
    if cli.offline {
        info!("Offline mode: analyzing from the database alone");
    }

    let engine = VerdictEngine::default();
    let items = batch::run_batch(&store, &tickers, yahoo.as_ref(), edgar.as_ref(), &engine).await;

    summary::print_summary(&items);

    let rows: Vec<AnalyzedCompany> = items
        .iter()
        .map(|item| AnalyzedCompany::from_parts(&item.company, &item.outcome))
        .collect();
    let report = BatchReport {
        analyzed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        summary: BatchSummary::from_rows(&rows),
        results: rows.clone(),
    };
    write_results_json(RESULTS_PATH, &report)
        .with_context(|| format!("could not write {}", RESULTS_PATH))?;
    write_summary_csv(SUMMARY_CSV_PATH, &rows)
        .with_context(|| format!("could not write {}", SUMMARY_CSV_PATH))?;
    info!("Results saved to {} and {}", RESULTS_PATH, SUMMARY_CSV_PATH);

    if cli.enhanced {
        enhanced::run_enhanced(&items, yahoo.as_ref()).await?;
    }

    Ok(())
}
