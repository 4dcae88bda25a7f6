//! Sequential batch loop with per-company failure isolation.

use tracing::{info, warn};

use plg_core::{CompanyInput, VerdictEngine, VerdictOutcome};
use plg_data::{
    build_company_input, CompanyStore, EdgarClient, LiveFinancials, YahooFinanceClient,
};

/// One analyzed company, with the live fetch kept for the overlay.
pub struct BatchItem {
    pub company: CompanyInput,
    pub outcome: VerdictOutcome,
    pub live: LiveFinancials,
}

/// Run every ticker through the engine. Tickers missing from the store
/// are skipped with a warning; a failed live fetch degrades to empty
/// data and the analysis proceeds.
pub async fn run_batch(
    store: &CompanyStore,
    tickers: &[String],
    yahoo: Option<&YahooFinanceClient>,
    edgar: Option<&EdgarClient>,
    engine: &VerdictEngine,
) -> Vec<BatchItem> {
    let mut items = Vec::with_capacity(tickers.len());

    for ticker in tickers {
        let Some(record) = store.get(ticker) else {
            warn!("{} not in the company database; skipping", ticker);
            continue;
        };

        let mut live = match yahoo {
            Some(client) => client.fetch_financials(ticker).await,
            None => LiveFinancials::default(),
        };

        if live.revenue_ttm.is_none() {
            if let Some(client) = edgar {
                let facts = client.fetch_company_facts(ticker, &record.cik).await;
                if let Some(quarterly) = facts.latest_revenue {
                    // Annualized from the latest reported quarter
                    live.revenue_ttm = Some(quarterly * 4.0);
                }
            }
        }

        let company = build_company_input(ticker, record, &live);
        let outcome = engine.compute_verdict(&company);
        info!(
            "{}: {} ({}, tier {})",
            ticker,
            outcome.verdict.as_str(),
            outcome.confidence.as_str(),
            outcome.data_tier.as_u8()
        );
        items.push(BatchItem {
            company,
            outcome,
            live,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use plg_core::{NdrTier, Verdict};
    use plg_data::CompanyRecord;

    fn store_with(ticker: &str, record: CompanyRecord) -> CompanyStore {
        let mut store = CompanyStore::empty("unused.json");
        store.insert(ticker, record);
        store
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_skipped() {
        let store = store_with("MDB", CompanyRecord::default());
        let engine = VerdictEngine::default();
        let items = run_batch(
            &store,
            &["ZZZZ".to_string(), "MDB".to_string()],
            None,
            None,
            &engine,
        )
        .await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].company.ticker, "MDB");
    }

    #[tokio::test]
    async fn test_offline_batch_computes_verdicts() {
        let record = CompanyRecord {
            name: "MongoDB".to_string(),
            ndr: Some(87.0),
            ndr_tier: NdrTier::Direct,
            revenue_growth_yoy: Some(-0.02),
            revenue_decel_3q: Some(true),
            ..Default::default()
        };
        let store = store_with("MDB", record);
        let engine = VerdictEngine::default();
        let items = run_batch(&store, &["MDB".to_string()], None, None, &engine).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].outcome.verdict, Verdict::Sell);
    }
}
