//! Data layer for the PLG analyzer: the company record store, live
//! market-data fetchers, and batch result writers.
//!
//! Fetchers are best-effort: a network or schema failure logs a
//! warning and yields empty data so the verdict engine can still run
//! on manual records.

pub mod edgar;
pub mod error;
pub mod output;
pub mod store;
pub mod yahoo;

pub use edgar::{EdgarClient, EdgarFacts};
pub use error::{DataError, Result};
pub use output::{
    write_results_json, write_summary_csv, AnalyzedCompany, BatchReport, BatchSummary,
};
pub use store::{build_company_input, CompanyRecord, CompanyStore};
pub use yahoo::{LiveFinancials, PriceHistory, YahooFinanceClient};
