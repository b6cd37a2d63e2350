//! Discounted-cash-flow sub-model: one explicit projection year plus a
//! perpetuity terminal value, compared against market capitalization.

use analysis_core::{math, AnalysisError, Metric};
use record_store::{fields, RecordStore, StatementKind};
use serde::{Deserialize, Serialize};

/// Growth-rate clip bounds for the projection.
const MIN_GROWTH: f64 = -0.05;
const MAX_GROWTH: f64 = 0.25;

/// Fallback growth when no consecutive positive-base pair exists.
const DEFAULT_GROWTH: f64 = 0.05;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DcfConfig {
    pub discount_rate: f64,
    pub terminal_growth: f64,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            discount_rate: 0.12,
            terminal_growth: 0.03,
        }
    }
}

impl DcfConfig {
    /// A discount rate at or below terminal growth makes the perpetuity
    /// diverge (or flip sign); refuse to run the model on such a
    /// configuration.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.discount_rate <= self.terminal_growth {
            return Err(AnalysisError::InvalidModelConfiguration(format!(
                "discount rate ({:.1}%) must exceed terminal growth ({:.1}%)",
                self.discount_rate * 100.0,
                self.terminal_growth * 100.0
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashFlowSource {
    FreeCashFlow,
    OperatingCashFlow,
}

impl CashFlowSource {
    pub fn label(&self) -> &'static str {
        match self {
            CashFlowSource::FreeCashFlow => "Free Cash Flow",
            CashFlowSource::OperatingCashFlow => "Operating Cash Flow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationSignal {
    SignificantlyUndervalued,
    Undervalued,
    FairValue,
    Overvalued,
    SignificantlyOvervalued,
}

impl ValuationSignal {
    pub fn from_fair_value_ratio(ratio: f64) -> Self {
        match ratio {
            r if r > 1.3 => ValuationSignal::SignificantlyUndervalued,
            r if r > 1.1 => ValuationSignal::Undervalued,
            r if r > 0.9 => ValuationSignal::FairValue,
            r if r > 0.7 => ValuationSignal::Overvalued,
            _ => ValuationSignal::SignificantlyOvervalued,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValuationSignal::SignificantlyUndervalued => "Significantly Undervalued",
            ValuationSignal::Undervalued => "Undervalued",
            ValuationSignal::FairValue => "Fair Value",
            ValuationSignal::Overvalued => "Overvalued",
            ValuationSignal::SignificantlyOvervalued => "Significantly Overvalued",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DcfValuation {
    pub symbol: String,
    pub source: CashFlowSource,
    pub latest_cash_flow: f64,
    pub growth_rate_percent: f64,
    pub discount_rate_percent: f64,
    pub terminal_growth_percent: f64,
    pub projected_next_year_cf: f64,
    pub terminal_value: f64,
    pub enterprise_value: f64,
    pub market_cap: f64,
    /// Enterprise value over market cap; above 1 reads as undervalued.
    pub fair_value_ratio: Metric,
    pub signal: Option<ValuationSignal>,
}

pub(crate) fn dcf_valuation(
    store: &RecordStore,
    symbol: &str,
    config: DcfConfig,
) -> Result<DcfValuation, AnalysisError> {
    config.validate()?;

    let free_cf = store.annual_series(symbol, StatementKind::CashFlow, fields::FREE_CASH_FLOW);
    let (series, source) = if free_cf.is_empty() {
        let operating =
            store.annual_series(symbol, StatementKind::CashFlow, fields::OPERATING_CASH_FLOW);
        if operating.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: no cash flow series available"
            )));
        }
        (operating, CashFlowSource::OperatingCashFlow)
    } else {
        (free_cf, CashFlowSource::FreeCashFlow)
    };

    if series.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "{symbol}: fewer than two cash flow periods"
        )));
    }

    let values = series.values();
    let growth_rates: Vec<f64> = values
        .windows(2)
        .filter_map(|w| match (w[0].value(), w[1].value()) {
            (Some(prev), Some(cur)) if prev > 0.0 => Some((cur - prev) / prev),
            _ => None,
        })
        .collect();
    let avg_growth = if growth_rates.is_empty() {
        DEFAULT_GROWTH
    } else {
        growth_rates.iter().sum::<f64>() / growth_rates.len() as f64
    };
    let growth = avg_growth.clamp(MIN_GROWTH, MAX_GROWTH);

    let latest = match series.latest_value() {
        Metric::Defined(v) if v > 0.0 => v,
        _ => {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: latest cash flow is not positive"
            )))
        }
    };

    let next_year_cf = latest * (1.0 + growth);
    let terminal_cf = next_year_cf * (1.0 + config.terminal_growth);
    let terminal_value = terminal_cf / (config.discount_rate - config.terminal_growth);
    let enterprise_value =
        (next_year_cf + terminal_value) / (1.0 + config.discount_rate);

    let market_cap = store.company(symbol).map_or(0.0, |c| c.market_cap);
    let fair_value_ratio =
        math::safe_divide(Metric::new(enterprise_value), Metric::new(market_cap)).rounded(2);

    Ok(DcfValuation {
        symbol: symbol.to_string(),
        source,
        latest_cash_flow: latest,
        growth_rate_percent: math::round_to(growth * 100.0, 2),
        discount_rate_percent: math::round_to(config.discount_rate * 100.0, 2),
        terminal_growth_percent: math::round_to(config.terminal_growth * 100.0, 2),
        projected_next_year_cf: next_year_cf.round(),
        terminal_value: terminal_value.round(),
        enterprise_value: enterprise_value.round(),
        market_cap,
        fair_value_ratio,
        signal: fair_value_ratio
            .value()
            .map(ValuationSignal::from_fair_value_ratio),
    })
}
