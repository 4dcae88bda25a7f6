//! Console summary: verdict buckets, staleness warnings, research
//! priorities, and the database freshness report.

use chrono::NaiveDate;

use plg_core::format::{format_confidence, format_growth};
use plg_core::Verdict;
use plg_data::CompanyStore;

use crate::batch::BatchItem;

const RULE: &str = "================================================================";

pub fn print_summary(items: &[BatchItem]) {
    println!();
    println!("{}", RULE);
    println!("PLG ANALYSIS SUMMARY ({} companies)", items.len());
    println!("{}", RULE);

    for verdict in [
        Verdict::StrongBuy,
        Verdict::Buy,
        Verdict::Watch,
        Verdict::Sell,
        Verdict::Avoid,
    ] {
        let count = items.iter().filter(|i| i.outcome.verdict == verdict).count();
        if count > 0 {
            println!("  {:<11} {}", verdict.as_str(), count);
        }
    }

    print_bucket(items, Verdict::StrongBuy, "STRONG BUY", usize::MAX);
    print_bucket(items, Verdict::Buy, "BUY", 10);
    print_bucket(items, Verdict::Watch, "WATCH", 8);

    let sells: Vec<&BatchItem> = items
        .iter()
        .filter(|i| matches!(i.outcome.verdict, Verdict::Sell | Verdict::Avoid))
        .collect();
    if !sells.is_empty() {
        println!();
        println!("SELL / AVOID:");
        for item in &sells {
            println!(
                "  {:<6} {:<28} {}",
                item.company.ticker,
                truncate(&item.company.name, 28),
                truncate(&item.outcome.rationale, 70)
            );
        }
    }

    let stale: Vec<&BatchItem> = items
        .iter()
        .filter(|i| i.outcome.staleness_warning)
        .collect();
    if !stale.is_empty() {
        println!();
        println!("STALE DATA ({} companies):", stale.len());
        for item in stale.iter().take(5) {
            println!(
                "  {:<6} {}",
                item.company.ticker,
                item.outcome.stale_fields.join(", ")
            );
        }
        if stale.len() > 5 {
            println!("  ... and {} more", stale.len() - 5);
        }
    }

    println!();
    println!("TOP RESEARCH PRIORITIES:");
    let mut printed = 0;
    for item in items {
        if let Some(rec) = item.outcome.research_recommendations.first() {
            println!("  {:<6} {}", item.company.ticker, truncate(rec, 80));
            printed += 1;
            if printed == 3 {
                break;
            }
        }
    }
    if printed == 0 {
        println!("  (none)");
    }
    println!("{}", RULE);
}

fn print_bucket(items: &[BatchItem], verdict: Verdict, label: &str, limit: usize) {
    let bucket: Vec<&BatchItem> = items
        .iter()
        .filter(|i| i.outcome.verdict == verdict)
        .collect();
    if bucket.is_empty() {
        return;
    }

    println!();
    println!("{}:", label);
    for item in bucket.iter().take(limit) {
        let ndr = item
            .company
            .ndr
            .map(|n| format!("NDR {:.0}%", n))
            .unwrap_or_else(|| "NDR N/A".to_string());
        println!(
            "  {:<6} {:<28} {} | growth {} | {}",
            item.company.ticker,
            truncate(&item.company.name, 28),
            ndr,
            format_growth(item.company.revenue_growth_yoy),
            format_confidence(item.outcome.confidence, item.outcome.confidence_score)
        );
    }
    if bucket.len() > limit {
        println!("  ... and {} more", bucket.len() - limit);
    }
}

/// Freshness classification for one ticker.
#[derive(Debug, PartialEq)]
pub enum Freshness {
    MissingDate,
    Stale(i64),
    Fresh(i64),
}

/// Classify every record by the age of its `data_updated` date.
/// Unparseable dates count as missing.
pub fn freshness_buckets(store: &CompanyStore, today: NaiveDate) -> Vec<(String, Freshness)> {
    let mut rows = Vec::with_capacity(store.len());
    for (ticker, record) in store.records() {
        let freshness = match record.data_updated.as_deref() {
            None | Some("") => Freshness::MissingDate,
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => {
                    let days = (today - date).num_days();
                    if days > 100 {
                        Freshness::Stale(days)
                    } else {
                        Freshness::Fresh(days)
                    }
                }
                Err(_) => Freshness::MissingDate,
            },
        };
        rows.push((ticker.clone(), freshness));
    }
    rows
}

pub fn print_freshness_report(store: &CompanyStore, today: NaiveDate) {
    let rows = freshness_buckets(store, today);
    let missing: Vec<&(String, Freshness)> = rows
        .iter()
        .filter(|(_, f)| *f == Freshness::MissingDate)
        .collect();
    let stale: Vec<&(String, Freshness)> = rows
        .iter()
        .filter(|(_, f)| matches!(f, Freshness::Stale(_)))
        .collect();
    let fresh: Vec<&(String, Freshness)> = rows
        .iter()
        .filter(|(_, f)| matches!(f, Freshness::Fresh(_)))
        .collect();

    println!();
    println!("{}", RULE);
    println!("DATABASE FRESHNESS ({} companies)", rows.len());
    println!("{}", RULE);
    println!(
        "  fresh: {}   stale: {}   no date: {}",
        fresh.len(),
        stale.len(),
        missing.len()
    );

    if !stale.is_empty() {
        println!();
        println!("STALE (>100 days):");
        for (ticker, f) in &stale {
            if let Freshness::Stale(days) = f {
                println!("  {:<6} {} days old", ticker, days);
            }
        }
    }

    if !missing.is_empty() {
        println!();
        println!("NO UPDATE DATE RECORDED:");
        for (ticker, _) in &missing {
            println!("  {}", ticker);
        }
    }
    println!("{}", RULE);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plg_data::CompanyRecord;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_freshness_buckets() {
        let mut store = CompanyStore::empty("unused.json");
        store.insert(
            "OLD",
            CompanyRecord {
                data_updated: Some("2024-11-13".to_string()),
                ..Default::default()
            },
        );
        store.insert(
            "NEW",
            CompanyRecord {
                data_updated: Some("2025-05-01".to_string()),
                ..Default::default()
            },
        );
        store.insert("NONE", CompanyRecord::default());
        store.insert(
            "BAD",
            CompanyRecord {
                data_updated: Some("last week".to_string()),
                ..Default::default()
            },
        );

        let rows = freshness_buckets(&store, today());
        let get = |t: &str| &rows.iter().find(|(ticker, _)| ticker == t).unwrap().1;
        assert_eq!(*get("OLD"), Freshness::Stale(200));
        assert_eq!(*get("NEW"), Freshness::Fresh(31));
        assert_eq!(*get("NONE"), Freshness::MissingDate);
        assert_eq!(*get("BAD"), Freshness::MissingDate);
    }

    #[test]
    fn test_truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 28), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }
}
