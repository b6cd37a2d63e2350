//! In-memory record store: the Record Access Layer over company snapshots.
//!
//! Lookups never fail for missing data: an unknown symbol or absent field
//! yields an empty series or `None`/`Undefined`. The store does no
//! computation beyond extraction, date parsing, and sorting.

use std::collections::BTreeMap;

use analysis_core::Metric;
use anyhow::Context;
use chrono::NaiveDate;

use crate::snapshot::{
    CompanySnapshot, HealthSnapshot, PeriodMap, StatementSet, ValuationSnapshot,
};

/// Canonical line-item names. Lookups are exact string matches against the
/// source statements; no fuzzy matching.
pub mod fields {
    pub const TOTAL_REVENUE: &str = "Total Revenue";
    pub const NET_INCOME: &str = "Net Income";
    pub const GROSS_PROFIT: &str = "Gross Profit";
    pub const OPERATING_INCOME: &str = "Operating Income";
    pub const EBITDA: &str = "EBITDA";
    pub const COST_OF_REVENUE: &str = "Cost Of Revenue";
    pub const INTEREST_EXPENSE: &str = "Interest Expense";
    pub const BASIC_AVERAGE_SHARES: &str = "Basic Average Shares";
    pub const CURRENT_ASSETS: &str = "Current Assets";
    pub const CURRENT_LIABILITIES: &str = "Current Liabilities";
    pub const CASH_AND_EQUIVALENTS: &str = "Cash And Cash Equivalents";
    pub const INVENTORY: &str = "Inventory";
    pub const ACCOUNTS_RECEIVABLE: &str = "Accounts Receivable";
    pub const ACCOUNTS_PAYABLE: &str = "Accounts Payable";
    pub const TOTAL_ASSETS: &str = "Total Assets";
    pub const STOCKHOLDERS_EQUITY: &str = "Stockholders Equity";
    pub const TOTAL_DEBT: &str = "Total Debt";
    pub const LONG_TERM_DEBT: &str = "Long Term Debt";
    pub const CURRENT_DEBT: &str = "Current Debt";
    pub const FREE_CASH_FLOW: &str = "Free Cash Flow";
    pub const OPERATING_CASH_FLOW: &str = "Operating Cash Flow";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Income,
    Balance,
    CashFlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Periodicity {
    Annual,
    Quarterly,
}

/// Company metadata for one symbol.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CompanyRecord {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: f64,
    pub current_price: f64,
    pub employees: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct LineItemPoint {
    pub period: NaiveDate,
    pub value: Metric,
}

/// A line item over time, sorted ascending by period with strictly increasing
/// dates. Values may be `Undefined` where the source reported the field
/// without a number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemSeries {
    points: Vec<LineItemPoint>,
}

impl LineItemSeries {
    fn from_points(mut points: Vec<LineItemPoint>) -> Self {
        points.sort_by_key(|p| p.period);
        points.dedup_by_key(|p| p.period);
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[LineItemPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&LineItemPoint> {
        self.points.first()
    }

    pub fn latest(&self) -> Option<&LineItemPoint> {
        self.points.last()
    }

    /// Value of the most recent period; `Undefined` for an empty series.
    pub fn latest_value(&self) -> Metric {
        self.latest().map_or(Metric::Undefined, |p| p.value)
    }

    /// Value at an exact period date; `Undefined` when the period is absent.
    pub fn value_at(&self, period: NaiveDate) -> Metric {
        self.points
            .binary_search_by_key(&period, |p| p.period)
            .map_or(Metric::Undefined, |i| self.points[i].value)
    }

    pub fn values(&self) -> Vec<Metric> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Points carrying a defined value, in period order.
    pub fn defined_points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.value().map(|v| (p.period, v)))
    }
}

/// Immutable store of company snapshots for one batch run, with a sector
/// index built at construction.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    companies: BTreeMap<String, CompanySnapshot>,
    sector_index: BTreeMap<String, Vec<String>>,
}

impl RecordStore {
    pub fn new(companies: BTreeMap<String, CompanySnapshot>) -> Self {
        let mut sector_index: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (symbol, snapshot) in &companies {
            sector_index
                .entry(snapshot.company_info.sector.clone())
                .or_default()
                .push(symbol.clone());
        }
        Self {
            companies,
            sector_index,
        }
    }

    /// Build a store from a JSON object mapping symbols to snapshots.
    pub fn from_json_value(value: serde_json::Value) -> anyhow::Result<Self> {
        let companies: BTreeMap<String, CompanySnapshot> =
            serde_json::from_value(value).context("parsing company snapshot map")?;
        Ok(Self::new(companies))
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Self::from_json_value(serde_json::from_str(json).context("parsing snapshot JSON")?)
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.companies.contains_key(symbol)
    }

    /// All symbols in deterministic (sorted) order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.companies.keys().map(String::as_str)
    }

    pub fn company(&self, symbol: &str) -> Option<CompanyRecord> {
        let snapshot = self.companies.get(symbol)?;
        let info = &snapshot.company_info;
        Some(CompanyRecord {
            symbol: symbol.to_string(),
            name: info.name.clone(),
            sector: info.sector.clone(),
            industry: info.industry.clone(),
            market_cap: info.market_cap,
            current_price: snapshot.current_price_info.current_price,
            employees: info.employees,
        })
    }

    /// The series for one (periodicity, statement, field) triple, sorted
    /// ascending. Empty when the symbol, statement, or field is absent.
    pub fn series(
        &self,
        symbol: &str,
        periodicity: Periodicity,
        kind: StatementKind,
        field: &str,
    ) -> LineItemSeries {
        let Some(snapshot) = self.companies.get(symbol) else {
            return LineItemSeries::empty();
        };
        let set: &StatementSet = match periodicity {
            Periodicity::Annual => &snapshot.financial_statements.annual,
            Periodicity::Quarterly => &snapshot.financial_statements.quarterly,
        };
        let period_map: &PeriodMap = match kind {
            StatementKind::Income => &set.income_statement,
            StatementKind::Balance => &set.balance_sheet,
            StatementKind::CashFlow => &set.cash_flow,
        };

        let points = period_map
            .iter()
            .filter_map(|(period, fields)| {
                let value = fields.get(field)?.value;
                let period = parse_period(period)?;
                Some(LineItemPoint { period, value })
            })
            .collect();
        LineItemSeries::from_points(points)
    }

    /// Annual series shorthand; the calculators work on annual statements.
    pub fn annual_series(&self, symbol: &str, kind: StatementKind, field: &str) -> LineItemSeries {
        self.series(symbol, Periodicity::Annual, kind, field)
    }

    pub fn valuation_snapshot(&self, symbol: &str) -> Option<&ValuationSnapshot> {
        self.companies.get(symbol)?.valuation_metrics.as_ref()
    }

    pub fn health_snapshot(&self, symbol: &str) -> Option<&HealthSnapshot> {
        self.companies.get(symbol)?.financial_health.as_ref()
    }

    /// Dividend history as date -> amount; empty for unknown symbols.
    /// Payments with unparseable dates are dropped.
    pub fn dividends(&self, symbol: &str) -> BTreeMap<NaiveDate, f64> {
        let mut result = BTreeMap::new();
        if let Some(snapshot) = self.companies.get(symbol) {
            for (date, payment) in &snapshot.corporate_actions.dividends {
                if let Some(date) = parse_period(date) {
                    *result.entry(date).or_insert(0.0) += payment.amount;
                }
            }
        }
        result
    }

    /// Symbols in a sector, sorted; empty slice for unknown sectors.
    pub fn companies_in_sector(&self, sector: &str) -> &[String] {
        self.sector_index.get(sector).map_or(&[], Vec::as_slice)
    }

    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.sector_index.keys().map(String::as_str)
    }
}

/// Parse a period key. Accepts `YYYY-MM-DD`, optionally with a trailing time
/// component.
fn parse_period(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
