//! Company record store: one JSON file keyed by ticker, holding the
//! manually-researched fields that live APIs cannot provide.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use plg_core::{
    BigTechThreat, BusinessModel, CategoryStage, CompanyInput, NdrTier, SwitchingCost,
    TakeRateTrend,
};

use crate::error::Result;
use crate::yahoo::LiveFinancials;

/// One company's manual research record. Every field is optional or
/// defaulted so sparse records stay loadable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyRecord {
    pub name: String,
    pub cik: String,
    pub category: String,
    pub business_model: BusinessModel,

    /// Manual growth figure; wins over the live fetch when present.
    pub revenue_growth_yoy: Option<f64>,

    pub ndr: Option<f64>,
    pub ndr_tier: NdrTier,

    pub gross_retention: Option<f64>,
    pub dbne: Option<f64>,
    pub large_customer_ndr: Option<f64>,

    pub implied_expansion: Option<f64>,
    pub rpo_growth_yoy: Option<f64>,

    pub arpu_growth_yoy: Option<f64>,
    pub active_user_growth_yoy: Option<f64>,
    pub gmv_growth_yoy: Option<f64>,
    pub take_rate: Option<f64>,
    pub take_rate_trend: Option<TakeRateTrend>,
    pub tpv_growth_yoy: Option<f64>,
    pub gross_profit_growth_yoy: Option<f64>,

    pub arr_millions: Option<f64>,
    pub customers_100k_plus: Option<u32>,
    pub customer_growth_yoy: Option<f64>,

    pub big_tech_threat: BigTechThreat,
    pub category_stage: CategoryStage,
    pub switching_cost: SwitchingCost,

    pub big_tech_announced: bool,
    pub revenue_decel_3q: Option<bool>,

    pub data_as_of: String,
    pub data_updated: Option<String>,
    pub notes: String,
}

/// Whole-file JSON store, ticker -> record. Saves overwrite the file.
#[derive(Debug, Clone)]
pub struct CompanyStore {
    path: PathBuf,
    records: BTreeMap<String, CompanyRecord>,
}

impl CompanyStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)?;
        let records: BTreeMap<String, CompanyRecord> = serde_json::from_str(&content)?;
        debug!("Loaded {} company records from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    /// Empty store bound to a path that does not exist yet.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: BTreeMap::new(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, ticker: &str) -> Option<&CompanyRecord> {
        self.records.get(ticker)
    }

    pub fn insert(&mut self, ticker: impl Into<String>, record: CompanyRecord) {
        self.records.insert(ticker.into(), record);
    }

    pub fn tickers(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn records(&self) -> &BTreeMap<String, CompanyRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Merge a manual record with live fetch data into engine input.
///
/// Manual `revenue_growth_yoy` wins over the live figure; market cap,
/// TTM revenue, margins, and price come only from the live side.
pub fn build_company_input(
    ticker: &str,
    record: &CompanyRecord,
    live: &LiveFinancials,
) -> CompanyInput {
    let name = if record.name.is_empty() {
        ticker.to_string()
    } else {
        record.name.clone()
    };
    let data_as_of = if record.data_as_of.is_empty() {
        Utc::now().format("%Y-%m-%d").to_string()
    } else {
        record.data_as_of.clone()
    };

    CompanyInput {
        ticker: ticker.to_string(),
        name,
        category: record.category.clone(),
        business_model: record.business_model,

        market_cap: live.market_cap,
        revenue_ttm: live.revenue_ttm,
        revenue_growth_yoy: record.revenue_growth_yoy.or(live.revenue_growth_yoy),
        gross_margin: live.gross_margin,
        operating_margin: live.operating_margin,
        current_price: live.current_price,

        ndr: record.ndr,
        ndr_tier: record.ndr_tier,

        gross_retention: record.gross_retention,
        dbne: record.dbne,
        large_customer_ndr: record.large_customer_ndr,

        implied_expansion: record.implied_expansion,
        rpo_growth_yoy: record.rpo_growth_yoy,

        arpu_growth_yoy: record.arpu_growth_yoy,
        active_user_growth_yoy: record.active_user_growth_yoy,
        gmv_growth_yoy: record.gmv_growth_yoy,
        take_rate: record.take_rate,
        take_rate_trend: record.take_rate_trend,
        tpv_growth_yoy: record.tpv_growth_yoy,
        gross_profit_growth_yoy: record.gross_profit_growth_yoy,

        arr_millions: record.arr_millions,
        customers_100k_plus: record.customers_100k_plus,
        customer_growth_yoy: record.customer_growth_yoy,

        big_tech_threat: record.big_tech_threat,
        category_stage: record.category_stage,
        switching_cost: record.switching_cost,

        big_tech_announced: record.big_tech_announced,
        revenue_decel_3q: record.revenue_decel_3q,

        cik: record.cik.clone(),
        data_as_of,
        data_updated: record.data_updated.clone(),
        notes: record.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_record_deserializes() {
        let json = r#"{
            "name": "MongoDB",
            "cik": "1441816",
            "ndr": 119,
            "ndr_tier": 1,
            "big_tech_threat": "medium",
            "data_updated": "2025-03-01"
        }"#;
        let record: CompanyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "MongoDB");
        assert_eq!(record.ndr, Some(119.0));
        assert_eq!(record.ndr_tier, NdrTier::Direct);
        assert_eq!(record.big_tech_threat, BigTechThreat::Medium);
        assert_eq!(record.revenue_decel_3q, None);
        assert_eq!(record.business_model, BusinessModel::B2bSaas);
    }

    #[test]
    fn test_manual_growth_wins_over_live() {
        let record = CompanyRecord {
            name: "Test Co".to_string(),
            revenue_growth_yoy: Some(0.31),
            ..Default::default()
        };
        let live = LiveFinancials {
            revenue_growth_yoy: Some(0.22),
            market_cap: Some(15e9),
            ..Default::default()
        };
        let input = build_company_input("TEST", &record, &live);
        assert_eq!(input.revenue_growth_yoy, Some(0.31));
        assert_eq!(input.market_cap, Some(15e9));
    }

    #[test]
    fn test_live_growth_fills_gap() {
        let record = CompanyRecord::default();
        let live = LiveFinancials {
            revenue_growth_yoy: Some(0.22),
            ..Default::default()
        };
        let input = build_company_input("TEST", &record, &live);
        assert_eq!(input.revenue_growth_yoy, Some(0.22));
        // Name falls back to ticker, data_as_of gets stamped
        assert_eq!(input.name, "TEST");
        assert!(!input.data_as_of.is_empty());
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("company_database.json");

        let mut store = CompanyStore::empty(&path);
        store.insert(
            "MDB",
            CompanyRecord {
                name: "MongoDB".to_string(),
                ndr: Some(119.0),
                ndr_tier: NdrTier::Direct,
                ..Default::default()
            },
        );
        store.save().unwrap();

        let reloaded = CompanyStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("MDB").unwrap().ndr, Some(119.0));
        assert_eq!(reloaded.tickers(), vec!["MDB".to_string()]);
    }
}
