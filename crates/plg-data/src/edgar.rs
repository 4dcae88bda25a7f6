//! SEC EDGAR companyfacts client.
//!
//! Pulls the latest reported quarterly revenue by CIK. The SEC
//! requires a descriptive User-Agent on every request.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DataError, Result};

const DEFAULT_BASE_URL: &str = "https://data.sec.gov";
const USER_AGENT: &str = "plg-analyzer/0.1 (research@example.com)";

/// Extract of a companyfacts filing. Empty when nothing usable was found.
#[derive(Debug, Clone, Default)]
pub struct EdgarFacts {
    pub latest_revenue: Option<f64>,
    pub latest_period: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for EdgarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgarClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
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

    /// Fetch companyfacts for a CIK, returning empty facts on any
    /// failure or when the CIK is blank.
    pub async fn fetch_company_facts(&self, ticker: &str, cik: &str) -> EdgarFacts {
        if cik.is_empty() {
            return EdgarFacts::default();
        }
        match self.fetch_company_facts_inner(cik).await {
            Ok(facts) => {
                debug!(
                    "EDGAR facts for {}: revenue={:?} period={:?}",
                    ticker, facts.latest_revenue, facts.latest_period
                );
                facts
            }
            Err(e) => {
                warn!("Could not fetch SEC EDGAR data for {}: {}", ticker, e);
                EdgarFacts::default()
            }
        }
    }

    async fn fetch_company_facts_inner(&self, cik: &str) -> Result<EdgarFacts> {
        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{:0>10}.json",
            self.base_url, cik
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

        let body: Value = resp
            .json()
            .await
            .map_err(|e| DataError::Http(e.to_string()))?;

        Ok(extract_latest_revenue(&body))
    }
}

/// Walk the us-gaap revenue facts and keep the quarterly filing with
/// the latest period end.
fn extract_latest_revenue(facts: &Value) -> EdgarFacts {
    let gaap = &facts["facts"]["us-gaap"];
    let revenue_fact = ["Revenues", "RevenueFromContractWithCustomerExcludingAssessedTax"]
        .iter()
        .map(|k| &gaap[k])
        .find(|v| !v.is_null());

    let Some(fact) = revenue_fact else {
        return EdgarFacts::default();
    };
    let Some(units) = fact["units"]["USD"].as_array() else {
        return EdgarFacts::default();
    };

    let mut latest: Option<(&str, f64)> = None;
    for unit in units {
        let form = unit["form"].as_str().unwrap_or_default();
        let fp = unit["fp"].as_str().unwrap_or_default();
        if !matches!(form, "10-Q" | "10-K") || fp == "FY" {
            continue;
        }
        let (Some(end), Some(val)) = (unit["end"].as_str(), unit["val"].as_f64()) else {
            continue;
        };
        if latest.map_or(true, |(e, _)| end > e) {
            latest = Some((end, val));
        }
    }

    match latest {
        Some((end, val)) => EdgarFacts {
            latest_revenue: Some(val),
            latest_period: Some(end.to_string()),
        },
        None => EdgarFacts::default(),
    }
}
