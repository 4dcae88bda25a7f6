//! Staleness checks for verdict inputs.

use chrono::{NaiveDate, Utc};

use crate::company::CompanyInput;
use crate::thresholds::VerdictThresholds;

/// Check against today's date. Missing or unparseable dates degrade
/// to stale rather than erroring.
pub(crate) fn check_staleness(
    data: &CompanyInput,
    t: &VerdictThresholds,
) -> (bool, Vec<String>) {
    check_staleness_at(data, t, Utc::now().date_naive())
}

/// Staleness check with an explicit reference date.
pub fn check_staleness_at(
    data: &CompanyInput,
    t: &VerdictThresholds,
    today: NaiveDate,
) -> (bool, Vec<String>) {
    let updated = match data.data_updated.as_deref() {
        None | Some("") => {
            return (true, vec!["data_updated (no date recorded)".to_string()]);
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                return (true, vec!["data_updated (invalid date format)".to_string()]);
            }
        },
    };

    let days_old = (today - updated).num_days();
    let mut stale_fields = Vec::new();

    if days_old > t.staleness_financial_days {
        stale_fields.push(format!("financials ({} days old)", days_old));
    }
    if data.ndr.is_some() && days_old > t.staleness_financial_days {
        stale_fields.push(format!("NDR ({} days old)", days_old));
    }
    if days_old > t.staleness_competitive_days {
        stale_fields.push(format!("competitive assessment ({} days old)", days_old));
    }

    (!stale_fields.is_empty(), stale_fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company_updated(date: &str) -> CompanyInput {
        CompanyInput {
            data_updated: Some(date.to_string()),
            ..CompanyInput::new("TEST", "Test Co")
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_missing_date_is_stale() {
        let data = CompanyInput::new("TEST", "Test Co");
        let (stale, fields) = check_staleness_at(&data, &VerdictThresholds::default(), today());
        assert!(stale);
        assert_eq!(fields, vec!["data_updated (no date recorded)"]);
    }

    #[test]
    fn test_invalid_date_is_stale() {
        let data = company_updated("06/01/2025");
        let (stale, fields) = check_staleness_at(&data, &VerdictThresholds::default(), today());
        assert!(stale);
        assert_eq!(fields, vec!["data_updated (invalid date format)"]);
    }

    #[test]
    fn test_fresh_data_is_not_stale() {
        let data = company_updated("2025-05-01");
        let (stale, fields) = check_staleness_at(&data, &VerdictThresholds::default(), today());
        assert!(!stale);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_financial_staleness_at_120_days() {
        let data = company_updated("2025-02-01"); // 120 days before today()
        let (stale, fields) = check_staleness_at(&data, &VerdictThresholds::default(), today());
        assert!(stale);
        assert_eq!(fields, vec!["financials (120 days old)"]);
    }

    #[test]
    fn test_ndr_flagged_when_present_and_stale() {
        let mut data = company_updated("2025-02-01");
        data.ndr = Some(115.0);
        let (_, fields) = check_staleness_at(&data, &VerdictThresholds::default(), today());
        assert!(fields.contains(&"NDR (120 days old)".to_string()));
    }

    #[test]
    fn test_competitive_staleness_at_200_days() {
        let data = company_updated("2024-11-13"); // 200 days before today()
        let (stale, fields) = check_staleness_at(&data, &VerdictThresholds::default(), today());
        assert!(stale);
        assert!(fields.contains(&"financials (200 days old)".to_string()));
        assert!(fields.contains(&"competitive assessment (200 days old)".to_string()));
    }

    #[test]
    fn test_boundary_exactly_100_days_is_fresh() {
        let data = company_updated("2025-02-21"); // exactly 100 days
        let (stale, _) = check_staleness_at(&data, &VerdictThresholds::default(), today());
        assert!(!stale);
    }
}
