//! Profitability indicators: returns and margins for the latest reported
//! period, plus a DuPont decomposition of ROE over recent periods.
//!
//! All inputs are matched to the period date of the latest revenue figure,
//! not each series' own most recent period, so a balance sheet lagging the
//! income statement cannot pair mismatched years.

use analysis_core::{math, AnalysisError, Metric};
use chrono::NaiveDate;
use record_store::{fields, LineItemSeries, RecordStore, StatementKind};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProfitabilityIndicators {
    pub symbol: String,
    /// Period date all figures are matched on.
    pub period: NaiveDate,
    pub roe_percent: Metric,
    pub roa_percent: Metric,
    pub gross_margin_percent: Metric,
    pub operating_margin_percent: Metric,
    pub net_margin_percent: Metric,
    pub ebitda_margin_percent: Metric,
    pub revenue: Metric,
    pub net_income: Metric,
    pub total_assets: Metric,
    pub shareholders_equity: Metric,
}

/// One period of the DuPont identity:
/// ROE = net margin × asset turnover × equity multiplier.
#[derive(Debug, Clone, Serialize)]
pub struct DupontPeriod {
    pub period: NaiveDate,
    pub net_margin_percent: Metric,
    pub asset_turnover: Metric,
    pub equity_multiplier: Metric,
    pub roe_percent: Metric,
}

pub struct ProfitabilityAnalyzer<'a> {
    store: &'a RecordStore,
}

impl<'a> ProfitabilityAnalyzer<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    fn income(&self, symbol: &str, field: &str) -> LineItemSeries {
        self.store.annual_series(symbol, StatementKind::Income, field)
    }

    fn balance(&self, symbol: &str, field: &str) -> LineItemSeries {
        self.store
            .annual_series(symbol, StatementKind::Balance, field)
    }

    pub fn analyze(&self, symbol: &str) -> Result<ProfitabilityIndicators, AnalysisError> {
        let revenue = self.income(symbol, fields::TOTAL_REVENUE);
        let net_income = self.income(symbol, fields::NET_INCOME);
        if revenue.is_empty() || net_income.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: revenue or net income series is empty"
            )));
        }

        let period = revenue
            .latest()
            .expect("non-empty revenue series has a latest period")
            .period;
        let latest_revenue = revenue.value_at(period);
        let latest_net_income = net_income.value_at(period);
        let latest_gross = self.income(symbol, fields::GROSS_PROFIT).value_at(period);
        let latest_operating = self
            .income(symbol, fields::OPERATING_INCOME)
            .value_at(period);
        let latest_ebitda = self.income(symbol, fields::EBITDA).value_at(period);
        let latest_assets = self.balance(symbol, fields::TOTAL_ASSETS).value_at(period);
        let latest_equity = self
            .balance(symbol, fields::STOCKHOLDERS_EQUITY)
            .value_at(period);

        let as_percent = |n, d| math::safe_divide(n, d).map(|v| v * 100.0);
        let mut roe = as_percent(latest_net_income, latest_equity);
        let mut roa = as_percent(latest_net_income, latest_assets);
        let mut gross_margin = as_percent(latest_gross, latest_revenue);
        let mut operating_margin = as_percent(latest_operating, latest_revenue);
        let mut net_margin = as_percent(latest_net_income, latest_revenue);
        let ebitda_margin = as_percent(latest_ebitda, latest_revenue);

        // The health snapshot stores fractions; scale to percent on override.
        if let Some(health) = self.store.health_snapshot(symbol) {
            for (target, snapshot_value) in [
                (&mut roe, health.return_on_equity),
                (&mut roa, health.return_on_assets),
                (&mut gross_margin, health.gross_margin),
                (&mut operating_margin, health.operating_margin),
                (&mut net_margin, health.profit_margin),
            ] {
                if let Metric::Defined(v) = snapshot_value {
                    *target = Metric::new(v * 100.0);
                }
            }
        }

        Ok(ProfitabilityIndicators {
            symbol: symbol.to_string(),
            period,
            roe_percent: roe.rounded(2),
            roa_percent: roa.rounded(2),
            gross_margin_percent: gross_margin.rounded(2),
            operating_margin_percent: operating_margin.rounded(2),
            net_margin_percent: net_margin.rounded(2),
            ebitda_margin_percent: ebitda_margin.rounded(2),
            revenue: latest_revenue,
            net_income: latest_net_income,
            total_assets: latest_assets,
            shareholders_equity: latest_equity,
        })
    }

    /// DuPont decomposition for up to the three most recent periods where
    /// revenue, net income, assets, and equity are all defined.
    pub fn dupont(&self, symbol: &str) -> Result<Vec<DupontPeriod>, AnalysisError> {
        let revenue = self.income(symbol, fields::TOTAL_REVENUE);
        let net_income = self.income(symbol, fields::NET_INCOME);
        let assets = self.balance(symbol, fields::TOTAL_ASSETS);
        let equity = self.balance(symbol, fields::STOCKHOLDERS_EQUITY);

        if revenue.is_empty() || net_income.is_empty() || assets.is_empty() || equity.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: DuPont needs revenue, net income, assets, and equity"
            )));
        }

        let periods: Vec<DupontPeriod> = revenue
            .points()
            .iter()
            .rev()
            .filter_map(|point| {
                let rev = point.value.value()?;
                let ni = net_income.value_at(point.period).value()?;
                let at = assets.value_at(point.period).value()?;
                let eq = equity.value_at(point.period).value()?;

                let net_margin = math::safe_divide(Metric::new(ni), Metric::new(rev))
                    .map(|v| v * 100.0);
                let asset_turnover = math::safe_divide(Metric::new(rev), Metric::new(at));
                let equity_multiplier = math::safe_divide(Metric::new(at), Metric::new(eq));
                let roe = net_margin
                    .map(|v| v / 100.0)
                    .mul(asset_turnover)
                    .mul(equity_multiplier)
                    .map(|v| v * 100.0);

                Some(DupontPeriod {
                    period: point.period,
                    net_margin_percent: net_margin.rounded(2),
                    asset_turnover: asset_turnover.rounded(2),
                    equity_multiplier: equity_multiplier.rounded(2),
                    roe_percent: roe.rounded(2),
                })
            })
            .take(3)
            .collect();
        Ok(periods)
    }
}
