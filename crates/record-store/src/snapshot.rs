//! Raw per-company snapshot as delivered by the ingestion pipeline.
//!
//! The shape mirrors the upstream fetcher's JSON:
//! `financial_statements[periodicity][statement][period_date][field_name]`
//! holding `{value, formatted}` pairs, plus precomputed valuation and health
//! ratios and a dividend history. Everything is optional; records arrive
//! sparsely populated and must still deserialize.

use std::collections::BTreeMap;

use analysis_core::Metric;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySnapshot {
    #[serde(default)]
    pub company_info: CompanyInfo,
    #[serde(default)]
    pub current_price_info: CurrentPriceInfo,
    #[serde(default)]
    pub financial_statements: FinancialStatements,
    #[serde(default)]
    pub valuation_metrics: Option<ValuationSnapshot>,
    #[serde(default)]
    pub financial_health: Option<HealthSnapshot>,
    #[serde(default)]
    pub corporate_actions: CorporateActions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default)]
    pub employees: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentPriceInfo {
    #[serde(default)]
    pub current_price: f64,
}

/// One reported figure: the numeric value (possibly null upstream) and its
/// display form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(default)]
    pub value: Metric,
    #[serde(default)]
    pub formatted: Option<String>,
}

/// `period date string -> field name -> figure`.
pub type PeriodMap = BTreeMap<String, BTreeMap<String, FieldValue>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
    #[serde(default)]
    pub annual: StatementSet,
    #[serde(default)]
    pub quarterly: StatementSet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementSet {
    #[serde(default)]
    pub income_statement: PeriodMap,
    #[serde(default)]
    pub balance_sheet: PeriodMap,
    #[serde(default)]
    pub cash_flow: PeriodMap,
}

/// Precomputed point-in-time valuation ratios. When a field is defined it is
/// authoritative and overrides any locally derived ratio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    #[serde(default)]
    pub pe_ratio: Metric,
    #[serde(default)]
    pub forward_pe: Metric,
    #[serde(default)]
    pub price_to_book: Metric,
    #[serde(default)]
    pub price_to_sales: Metric,
    #[serde(default)]
    pub peg_ratio: Metric,
    #[serde(default)]
    pub enterprise_value: Metric,
    #[serde(default)]
    pub ev_to_revenue: Metric,
    #[serde(default)]
    pub ev_to_ebitda: Metric,
}

/// Precomputed financial-health ratios, same override-when-defined policy.
/// Return and margin fields are fractions (0.18 = 18%), not percentages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    #[serde(default)]
    pub return_on_equity: Metric,
    #[serde(default)]
    pub return_on_assets: Metric,
    #[serde(default)]
    pub gross_margin: Metric,
    #[serde(default)]
    pub operating_margin: Metric,
    #[serde(default)]
    pub profit_margin: Metric,
    #[serde(default)]
    pub current_ratio: Metric,
    #[serde(default)]
    pub quick_ratio: Metric,
    #[serde(default)]
    pub debt_to_equity: Metric,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorporateActions {
    /// `payment date string -> payment`.
    #[serde(default)]
    pub dividends: BTreeMap<String, DividendPayment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DividendPayment {
    #[serde(default)]
    pub amount: f64,
}
