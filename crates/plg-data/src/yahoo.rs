//! Yahoo Finance client: quote summary fundamentals and daily price
//! history. Best-effort; failures degrade to empty data.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DataError, Result};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "plg-analyzer/0.1 (research@example.com)";

/// Live fundamentals for one ticker. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct LiveFinancials {
    pub market_cap: Option<f64>,
    pub revenue_ttm: Option<f64>,
    pub revenue_growth_yoy: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub current_price: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub forward_pe: Option<f64>,
}

/// One year of daily bars, oldest first. Rows with missing closes are
/// dropped at parse time.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub timestamps: Vec<i64>,
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    /// Fetch fundamentals, returning empty data on any failure.
    pub async fn fetch_financials(&self, ticker: &str) -> LiveFinancials {
        match self.fetch_financials_inner(ticker).await {
            Ok(live) => live,
            Err(e) => {
                warn!("Could not fetch Yahoo Finance data for {}: {}", ticker, e);
                LiveFinancials::default()
            }
        }
    }

    async fn fetch_financials_inner(&self, ticker: &str) -> Result<LiveFinancials> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=financialData,summaryDetail",
            self.base_url, ticker
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(DataError::Api {
                status,
                message: body,
            });
        }

        let body: QuoteSummaryResponse = resp
            .json()
            .await
            .map_err(|e| DataError::Http(e.to_string()))?;

        let live = parse_quote_summary(body);
        debug!(
            "Fetched fundamentals for {}: cap={:?} growth={:?}",
            ticker, live.market_cap, live.revenue_growth_yoy
        );
        Ok(live)
    }

    /// One year of daily price history. Errors surface to the caller;
    /// the valuation overlay is skipped without history.
    pub async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1y&interval=1d",
            self.base_url, ticker
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(DataError::Api {
                status,
                message: body,
            });
        }

        let body: ChartResponse = resp
            .json()
            .await
            .map_err(|e| DataError::Http(e.to_string()))?;

        Ok(parse_chart(body))
    }
}

// ── Response shapes ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Vec<QuoteSummaryResult>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
}

#[derive(Debug, Deserialize)]
struct FinancialData {
    #[serde(rename = "totalRevenue")]
    total_revenue: Option<RawValue>,
    #[serde(rename = "revenueGrowth")]
    revenue_growth: Option<RawValue>,
    #[serde(rename = "grossMargins")]
    gross_margins: Option<RawValue>,
    #[serde(rename = "operatingMargins")]
    operating_margins: Option<RawValue>,
    #[serde(rename = "currentPrice")]
    current_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "marketCap")]
    market_cap: Option<RawValue>,
    #[serde(rename = "priceToSalesTrailing12Months")]
    price_to_sales: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.as_ref().and_then(|r| r.raw)
}

fn parse_quote_summary(body: QuoteSummaryResponse) -> LiveFinancials {
    let mut live = LiveFinancials::default();
    let Some(result) = body.quote_summary.result.into_iter().next() else {
        return live;
    };

    if let Some(fd) = &result.financial_data {
        live.revenue_ttm = raw(&fd.total_revenue);
        live.revenue_growth_yoy = raw(&fd.revenue_growth);
        live.gross_margin = raw(&fd.gross_margins);
        live.operating_margin = raw(&fd.operating_margins);
        live.current_price = raw(&fd.current_price);
    }
    if let Some(sd) = &result.summary_detail {
        live.market_cap = raw(&sd.market_cap);
        live.price_to_sales = raw(&sd.price_to_sales);
        live.forward_pe = raw(&sd.forward_pe);
    }
    live
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Vec<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
}

fn parse_chart(body: ChartResponse) -> PriceHistory {
    let mut history = PriceHistory::default();
    let Some(result) = body.chart.result.into_iter().next() else {
        return history;
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return history;
    };

    for (i, ts) in result.timestamp.iter().enumerate() {
        let close = quote.close.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        // Keep only complete bars
        if let (Some(c), Some(h), Some(l)) = (close, high, low) {
            history.timestamps.push(*ts);
            history.closes.push(c);
            history.highs.push(h);
            history.lows.push(l);
        }
    }
    history
}
