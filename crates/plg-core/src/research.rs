//! Research recommendations for missing data.

use crate::company::{
    BigTechThreat, BusinessModel, CategoryStage, CompanyInput, NdrTier, SwitchingCost,
};

/// What to look for to improve verdict confidence, in priority order:
/// retention first, then growth, then competitive assessments, then
/// model-specific metrics.
pub(crate) fn recommend_research(data: &CompanyInput) -> Vec<String> {
    let mut recs = Vec::new();

    if data.ndr.is_none() {
        match data.ndr_tier {
            NdrTier::Unavailable => recs.push(format!(
                "Search {} earnings call for NDR/NRR/DBNE disclosure. \
                 Try: 'net dollar retention', 'net revenue retention', 'dollar-based net expansion'.",
                data.name
            )),
            NdrTier::Derived => recs.push(format!(
                "Calculate implied expansion for {}: ARR growth - customer growth.",
                data.name
            )),
            _ => {}
        }
    }

    if data.gross_retention.is_none() && u8::from(data.ndr_tier) >= 2 {
        recs.push(format!(
            "Look for {} gross retention rate in earnings call or 10-K. \
             Often disclosed near NDR or churn discussion.",
            data.name
        ));
    }

    if data.revenue_growth_yoy.is_none() {
        recs.push(format!(
            "Fetch latest quarterly revenue for {} from SEC EDGAR or earnings release.",
            data.name
        ));
    }

    if data.big_tech_threat == BigTechThreat::Unknown {
        recs.push(format!(
            "Assess Big Tech threat for {}: Does AWS/Azure/GCP/Microsoft bundle a competitor?",
            data.name
        ));
    }

    if data.category_stage == CategoryStage::Unknown {
        recs.push(format!(
            "Assess category stage for {}: emerging, early_growth, mid_growth, mature, or commoditizing?",
            data.name
        ));
    }

    if data.switching_cost == SwitchingCost::Unknown {
        recs.push(format!(
            "Assess switching costs for {}: How hard is it to rip and replace?",
            data.name
        ));
    }

    if data.customers_100k_plus.is_none() {
        recs.push(format!(
            "Look for $100K+ customer count in {} earnings materials.",
            data.name
        ));
    }

    match data.business_model {
        BusinessModel::Consumer if data.arpu_growth_yoy.is_none() => recs.push(format!(
            "Find ARPU and active user metrics for {} (consumer model).",
            data.name
        )),
        BusinessModel::Marketplace if data.gmv_growth_yoy.is_none() => recs.push(format!(
            "Find GMV and take rate for {} (marketplace model).",
            data.name
        )),
        BusinessModel::TransactionBased if data.tpv_growth_yoy.is_none() => recs.push(format!(
            "Find TPV and gross profit margin for {} (transaction model).",
            data.name
        )),
        _ => {}
    }

    recs
}
