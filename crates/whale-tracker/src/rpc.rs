//! Solana JSON-RPC client with retry, exponential backoff, and
//! backup-URL rotation. Failures log and return `None`; the poll loop
//! keeps the previous balance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Settings;

pub struct SolanaRpcClient {
    client: reqwest::Client,
    urls: Vec<String>,
    current: AtomicUsize,
    max_retries: u32,
    retry_delay: Duration,
}

impl SolanaRpcClient {
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()
            .expect("failed to build reqwest client");

        let mut urls = vec![settings.rpc_url.clone()];
        urls.extend(settings.rpc_backup_urls.iter().cloned());

        Self {
            client,
            urls,
            current: AtomicUsize::new(0),
            max_retries: settings.max_retries.max(1),
            retry_delay: Duration::from_secs(settings.retry_delay_seconds),
        }
    }

    fn current_url(&self) -> &str {
        &self.urls[self.current.load(Ordering::Relaxed) % self.urls.len()]
    }

    fn rotate(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
        warn!("Rotating to RPC: {}", self.current_url());
    }

    async fn call(&self, method: &str, params: Value) -> Option<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        for attempt in 0..self.max_retries {
            let sent = self
                .client
                .post(self.current_url())
                .json(&payload)
                .send()
                .await;

            match sent {
                Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                    Ok(body) => {
                        if let Some(err) = body.get("error") {
                            warn!("RPC error for {}: {}", method, err);
                            return None;
                        }
                        return body.get("result").cloned();
                    }
                    Err(e) => warn!("RPC response decode failed for {}: {}", method, e),
                },
                Ok(resp) => warn!("RPC {} returned status {}", method, resp.status()),
                Err(e) => warn!(
                    "RPC request failed (attempt {}/{}): {}",
                    attempt + 1,
                    self.max_retries,
                    e
                ),
            }

            if attempt + 1 < self.max_retries {
                self.rotate();
                tokio::time::sleep(self.retry_delay * 2u32.pow(attempt)).await;
            }
        }

        warn!("All RPC attempts failed for {}", method);
        None
    }

    /// Total raw token balance across the owner's accounts for a mint.
    pub async fn get_token_balance(&self, owner: &str, mint: &str) -> Option<u64> {
        let result = self
            .call(
                "getTokenAccountsByOwner",
                json!([owner, {"mint": mint}, {"encoding": "jsonParsed"}]),
            )
            .await?;
        let total = sum_token_accounts(&result);
        debug!("Balance for {}: {}", owner, total);
        Some(total)
    }

    pub async fn get_signatures_for_address(&self, address: &str, limit: u32) -> Option<Vec<Value>> {
        let result = self
            .call("getSignaturesForAddress", json!([address, {"limit": limit}]))
            .await?;
        result.as_array().cloned()
    }

    pub async fn get_transaction(&self, signature: &str) -> Option<Value> {
        self.call(
            "getTransaction",
            json!([signature, {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}]),
        )
        .await
    }

    pub async fn get_token_largest_accounts(&self, mint: &str) -> Option<Vec<Value>> {
        let result = self.call("getTokenLargestAccounts", json!([mint])).await?;
        result.get("value")?.as_array().cloned()
    }
}

/// Sum raw amounts from a jsonParsed getTokenAccountsByOwner result.
/// Amounts come back as decimal strings.
pub fn sum_token_accounts(result: &Value) -> u64 {
    let Some(accounts) = result.get("value").and_then(Value::as_array) else {
        return 0;
    };
    accounts
        .iter()
        .filter_map(|acc| {
            acc["account"]["data"]["parsed"]["info"]["tokenAmount"]["amount"]
                .as_str()
                .and_then(|s| s.parse::<u64>().ok())
        })
        .sum()
}

/// Top-10 / top-50 concentration from largest-account raw amounts,
/// as percentages of the raw total supply.
pub fn calculate_concentration(accounts: &[Value], total_supply_raw: u64) -> (f64, f64) {
    if total_supply_raw == 0 {
        return (0.0, 0.0);
    }
    let amounts: Vec<u64> = accounts
        .iter()
        .filter_map(|acc| acc["amount"].as_str().and_then(|s| s.parse::<u64>().ok()))
        .collect();

    let top_n = |n: usize| amounts.iter().take(n).sum::<u64>() as f64;
    (
        top_n(10) / total_supply_raw as f64 * 100.0,
        top_n(50) / total_supply_raw as f64 * 100.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_token_accounts() {
        let result = json!({
            "value": [
                {"account": {"data": {"parsed": {"info": {"tokenAmount": {"amount": "1000000"}}}}}},
                {"account": {"data": {"parsed": {"info": {"tokenAmount": {"amount": "2500000"}}}}}},
                {"account": {"data": {"parsed": {"info": {"tokenAmount": {"amount": "bogus"}}}}}}
            ]
        });
        assert_eq!(sum_token_accounts(&result), 3_500_000);
    }

    #[test]
    fn test_sum_token_accounts_empty() {
        assert_eq!(sum_token_accounts(&json!({"value": []})), 0);
        assert_eq!(sum_token_accounts(&json!({})), 0);
    }

    #[test]
    fn test_calculate_concentration() {
        let accounts: Vec<Value> = (0..12)
            .map(|_| json!({"amount": "10"}))
            .collect();
        let (top_10, top_50) = calculate_concentration(&accounts, 1_000);
        assert!((top_10 - 10.0).abs() < 1e-9);
        assert!((top_50 - 12.0).abs() < 1e-9);

        assert_eq!(calculate_concentration(&accounts, 0), (0.0, 0.0));
    }
}
