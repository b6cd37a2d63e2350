//! Leverage indicators: debt ratios, coverage ratios, debt maturity
//! structure, and the leverage trend over reported periods.
//!
//! A company with no debt line items is treated as carrying zero debt, not as
//! having unknown debt; interest coverage with no interest expense is the
//! distinct `Unbounded` state rather than a numeric infinity.

use analysis_core::{math, AnalysisError, Coverage, Metric};
use record_store::{fields, LineItemSeries, RecordStore, StatementKind};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LeverageIndicators {
    pub symbol: String,
    pub total_debt: Metric,
    pub long_term_debt: Metric,
    pub short_term_debt: Metric,
    pub total_assets: Metric,
    pub shareholders_equity: Metric,
    pub debt_to_equity: Metric,
    pub debt_to_assets: Metric,
    pub equity_ratio: Metric,
    pub debt_to_ebitda: Metric,
    pub interest_coverage: Coverage,
    pub ebitda_coverage: Coverage,
    pub debt_rating: String,
    pub interest_coverage_rating: String,
}

/// Split of total debt between long- and short-term maturities.
#[derive(Debug, Clone, Serialize)]
pub struct DebtStructure {
    pub total_debt: Metric,
    pub long_term_debt: Metric,
    pub short_term_debt: Metric,
    pub long_term_percent: Metric,
    pub short_term_percent: Metric,
    pub profile: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeverageTrend {
    pub periods_analyzed: usize,
    /// Mean period-over-period percentage change in debt-to-equity.
    pub debt_to_equity_trend_percent: Metric,
    pub debt_to_assets_trend_percent: Metric,
    /// First period vs latest period percentage change.
    pub debt_to_equity_change_percent: Metric,
    pub latest_debt_to_equity: Metric,
    pub direction: String,
}

pub struct LeverageAnalyzer<'a> {
    store: &'a RecordStore,
}

impl<'a> LeverageAnalyzer<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    fn balance(&self, symbol: &str, field: &str) -> LineItemSeries {
        self.store
            .annual_series(symbol, StatementKind::Balance, field)
    }

    fn income(&self, symbol: &str, field: &str) -> LineItemSeries {
        self.store.annual_series(symbol, StatementKind::Income, field)
    }

    /// Latest value of a debt line, zero when the line is never reported.
    fn latest_debt(&self, symbol: &str, field: &str) -> Metric {
        let series = self.balance(symbol, field);
        if series.is_empty() {
            Metric::Defined(0.0)
        } else {
            series.latest_value()
        }
    }

    pub fn analyze(&self, symbol: &str) -> Result<LeverageIndicators, AnalysisError> {
        let assets = self.balance(symbol, fields::TOTAL_ASSETS);
        let equity = self.balance(symbol, fields::STOCKHOLDERS_EQUITY);
        if assets.is_empty() || equity.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: total assets or shareholders equity missing"
            )));
        }

        let total_debt = self.latest_debt(symbol, fields::TOTAL_DEBT);
        let long_term_debt = self.latest_debt(symbol, fields::LONG_TERM_DEBT);
        let short_term_debt = self.latest_debt(symbol, fields::CURRENT_DEBT);
        let latest_assets = assets.latest_value();
        let latest_equity = equity.latest_value();
        let latest_ebitda = self.income(symbol, fields::EBITDA).latest_value();
        let latest_operating = self
            .income(symbol, fields::OPERATING_INCOME)
            .latest_value();

        let interest_series = self.income(symbol, fields::INTEREST_EXPENSE);
        let interest = if interest_series.is_empty() {
            Metric::Defined(0.0)
        } else {
            interest_series.latest_value().map(f64::abs)
        };

        let mut debt_to_equity = math::safe_divide(total_debt, latest_equity);
        if let Some(health) = self.store.health_snapshot(symbol) {
            if health.debt_to_equity.is_defined() {
                debt_to_equity = health.debt_to_equity;
            }
        }
        let debt_to_equity = debt_to_equity.rounded(2);

        let interest_coverage = Coverage::from_ratio(latest_operating, interest);

        Ok(LeverageIndicators {
            symbol: symbol.to_string(),
            total_debt,
            long_term_debt,
            short_term_debt,
            total_assets: latest_assets,
            shareholders_equity: latest_equity,
            debt_to_equity,
            debt_to_assets: math::safe_divide(total_debt, latest_assets).rounded(2),
            equity_ratio: math::safe_divide(latest_equity, latest_assets).rounded(2),
            debt_to_ebitda: math::safe_divide(total_debt, latest_ebitda).rounded(2),
            interest_coverage,
            ebitda_coverage: Coverage::from_ratio(latest_ebitda, interest),
            debt_rating: rate_debt_to_equity(debt_to_equity).to_string(),
            interest_coverage_rating: rate_interest_coverage(interest_coverage).to_string(),
        })
    }

    /// Maturity breakdown of the latest total debt.
    pub fn debt_structure(&self, symbol: &str) -> Result<DebtStructure, AnalysisError> {
        let total_series = self.balance(symbol, fields::TOTAL_DEBT);
        if total_series.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: no total debt reported"
            )));
        }

        let total = total_series.latest_value();
        let long_term = self.latest_debt(symbol, fields::LONG_TERM_DEBT);
        let short_term = self.latest_debt(symbol, fields::CURRENT_DEBT);

        if total == Metric::Defined(0.0) {
            return Ok(DebtStructure {
                total_debt: total,
                long_term_debt: Metric::Defined(0.0),
                short_term_debt: Metric::Defined(0.0),
                long_term_percent: Metric::Defined(0.0),
                short_term_percent: Metric::Defined(0.0),
                profile: "No debt".to_string(),
            });
        }

        let long_term_percent = math::safe_divide(long_term, total).map(|v| v * 100.0);
        let short_term_percent = math::safe_divide(short_term, total).map(|v| v * 100.0);

        let lt = long_term_percent.unwrap_or(0.0);
        let st = short_term_percent.unwrap_or(0.0);
        let profile = if lt > 75.0 {
            "Long-term focused - Good"
        } else if lt > 50.0 {
            "Balanced structure"
        } else if st > 60.0 {
            "Short-term heavy - Risky"
        } else {
            "Mixed structure"
        };

        Ok(DebtStructure {
            total_debt: total,
            long_term_debt: long_term,
            short_term_debt: short_term,
            long_term_percent: long_term_percent.rounded(1),
            short_term_percent: short_term_percent.rounded(1),
            profile: profile.to_string(),
        })
    }

    /// Debt-to-equity and debt-to-assets trends across the periods where
    /// debt, equity, and assets were all reported.
    pub fn leverage_trend(&self, symbol: &str) -> Result<LeverageTrend, AnalysisError> {
        let debt = self.balance(symbol, fields::TOTAL_DEBT);
        let equity = self.balance(symbol, fields::STOCKHOLDERS_EQUITY);
        let assets = self.balance(symbol, fields::TOTAL_ASSETS);

        if debt.len() < 2 || equity.is_empty() || assets.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: need at least two debt periods with equity and assets"
            )));
        }

        let mut debt_to_equity = Vec::new();
        let mut debt_to_assets = Vec::new();
        for point in debt.points() {
            let eq = equity.value_at(point.period);
            let at = assets.value_at(point.period);
            if eq == Metric::Undefined && at == Metric::Undefined {
                continue;
            }
            debt_to_equity.push(math::safe_divide(point.value, eq));
            debt_to_assets.push(math::safe_divide(point.value, at));
        }

        let de_trend = math::mean(&math::period_changes(&debt_to_equity)).rounded(2);
        let da_trend = math::mean(&math::period_changes(&debt_to_assets)).rounded(2);
        let first_de = debt_to_equity.first().copied().unwrap_or(Metric::Undefined);
        let latest_de = debt_to_equity.last().copied().unwrap_or(Metric::Undefined);
        let de_change = math::percentage_change(first_de, latest_de).rounded(2);

        let direction = match de_trend.unwrap_or(0.0) {
            t if t > 5.0 => "Increasing leverage",
            t if t < -5.0 => "Decreasing leverage",
            _ => "Stable leverage",
        };

        Ok(LeverageTrend {
            periods_analyzed: debt_to_equity.len(),
            debt_to_equity_trend_percent: de_trend,
            debt_to_assets_trend_percent: da_trend,
            debt_to_equity_change_percent: de_change,
            latest_debt_to_equity: latest_de.rounded(2),
            direction: direction.to_string(),
        })
    }
}

fn rate_debt_to_equity(ratio: Metric) -> &'static str {
    match ratio.value() {
        None => "N/A",
        Some(r) if r < 0.3 => "Conservative - Low debt",
        Some(r) if r < 0.6 => "Moderate debt levels",
        Some(r) if r < 1.0 => "Higher debt levels",
        Some(r) if r < 2.0 => "High leverage",
        Some(_) => "Very high leverage - Risky",
    }
}

fn rate_interest_coverage(coverage: Coverage) -> &'static str {
    match coverage {
        Coverage::Unbounded => "No interest expense",
        Coverage::Undefined => "N/A",
        Coverage::Finite(r) if r > 10.0 => "Excellent",
        Coverage::Finite(r) if r > 5.0 => "Good",
        Coverage::Finite(r) if r > 2.5 => "Adequate",
        Coverage::Finite(r) if r > 1.5 => "Weak",
        Coverage::Finite(_) => "Poor - High risk",
    }
}
