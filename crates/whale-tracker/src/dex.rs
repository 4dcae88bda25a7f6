//! Market data from DEX aggregators. Jupiter supplies price; Birdeye
//! (when an API key is present) supplies volume, liquidity, holder
//! count, and market cap.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const JUPITER_PRICE_URL: &str = "https://price.jup.ag/v6/price";
const BIRDEYE_OVERVIEW_URL: &str = "https://public-api.birdeye.so/defi/token_overview";

#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketMetrics {
    pub timestamp: String,
    pub price_usd: f64,
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub holder_count: i64,
    pub market_cap: f64,
}

pub struct DexDataClient {
    client: reqwest::Client,
    token_address: String,
    birdeye_api_key: Option<String>,
}

impl DexDataClient {
    pub fn new(token_address: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            token_address: token_address.to_string(),
            birdeye_api_key: std::env::var("BIRDEYE_API_KEY").ok(),
        }
    }

    pub async fn get_jupiter_price(&self) -> Option<f64> {
        let url = format!("{}?ids={}", JUPITER_PRICE_URL, self.token_address);
        let body = match self.client.get(&url).send().await {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Jupiter price decode failed: {}", e);
                    return None;
                }
            },
            Err(e) => {
                warn!("Jupiter price request failed: {}", e);
                return None;
            }
        };
        parse_jupiter_price(&body, &self.token_address)
    }

    /// Token overview from Birdeye. Returns `None` without an API key.
    pub async fn get_birdeye_overview(&self) -> Option<MarketMetrics> {
        let api_key = self.birdeye_api_key.as_deref()?;
        let url = format!("{}?address={}", BIRDEYE_OVERVIEW_URL, self.token_address);
        let body = match self
            .client
            .get(&url)
            .header("X-API-KEY", api_key)
            .send()
            .await
        {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Birdeye overview decode failed: {}", e);
                    return None;
                }
            },
            Err(e) => {
                warn!("Birdeye overview request failed: {}", e);
                return None;
            }
        };
        parse_birdeye_overview(&body)
    }

    /// Combined snapshot: Birdeye when available, Jupiter as the price
    /// fallback.
    pub async fn get_market_metrics(&self) -> MarketMetrics {
        let mut metrics = self.get_birdeye_overview().await.unwrap_or_default();
        if metrics.price_usd == 0.0 {
            if let Some(price) = self.get_jupiter_price().await {
                metrics.price_usd = price;
            }
        }
        metrics.timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        debug!(
            "Market metrics: price={} liquidity={} holders={}",
            metrics.price_usd, metrics.liquidity_usd, metrics.holder_count
        );
        metrics
    }
}

fn parse_jupiter_price(body: &Value, token_address: &str) -> Option<f64> {
    body["data"][token_address]["price"].as_f64()
}

fn parse_birdeye_overview(body: &Value) -> Option<MarketMetrics> {
    if !body["success"].as_bool().unwrap_or(false) {
        warn!("Birdeye overview returned success=false");
        return None;
    }
    let data = body.get("data")?;
    Some(MarketMetrics {
        timestamp: String::new(),
        price_usd: data["price"].as_f64().unwrap_or(0.0),
        price_change_24h: data["priceChange24hPercent"].as_f64().unwrap_or(0.0),
        volume_24h: data["v24hUSD"].as_f64().unwrap_or(0.0),
        liquidity_usd: data["liquidity"].as_f64().unwrap_or(0.0),
        holder_count: data["holder"].as_i64().unwrap_or(0),
        market_cap: data["mc"].as_f64().unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_jupiter_price() {
        let body = json!({
            "data": {
                "MintAddr111": {"id": "MintAddr111", "price": 0.004217}
            }
        });
        assert_eq!(parse_jupiter_price(&body, "MintAddr111"), Some(0.004217));
        assert_eq!(parse_jupiter_price(&body, "OtherMint"), None);
        assert_eq!(parse_jupiter_price(&json!({}), "MintAddr111"), None);
    }

    #[test]
    fn test_parse_birdeye_overview() {
        let body = json!({
            "success": true,
            "data": {
                "price": 0.0042,
                "priceChange24hPercent": -3.5,
                "v24hUSD": 1_250_000.0,
                "liquidity": 480_000.0,
                "holder": 15_230,
                "mc": 4_200_000.0
            }
        });
        let metrics = parse_birdeye_overview(&body).unwrap();
        assert_eq!(metrics.price_usd, 0.0042);
        assert_eq!(metrics.price_change_24h, -3.5);
        assert_eq!(metrics.holder_count, 15_230);
        assert_eq!(metrics.market_cap, 4_200_000.0);
    }

    #[test]
    fn test_parse_birdeye_failure_flag() {
        assert!(parse_birdeye_overview(&json!({"success": false})).is_none());
        assert!(parse_birdeye_overview(&json!({"success": true})).is_none());
    }

    #[test]
    fn test_parse_birdeye_missing_fields_default_zero() {
        let body = json!({"success": true, "data": {"price": 0.001}});
        let metrics = parse_birdeye_overview(&body).unwrap();
        assert_eq!(metrics.price_usd, 0.001);
        assert_eq!(metrics.volume_24h, 0.0);
        assert_eq!(metrics.holder_count, 0);
    }
}
