//! Growth indicators: trend statistics over revenue and earnings series, the
//! sustainable growth rate, and a banded growth-quality score.

use analysis_core::{math, AnalysisError, Metric};
use chrono::Datelike;
use record_store::{fields, LineItemSeries, RecordStore, StatementKind};
use serde::Serialize;

const DAYS_PER_YEAR: f64 = 365.25;

/// How many trailing year-over-year changes feed the "recent" average.
const RECENT_WINDOW: usize = 3;

/// Trend statistics for one line item.
#[derive(Debug, Clone, Serialize)]
pub struct GrowthStats {
    pub periods_analyzed: usize,
    /// Endpoints of the CAGR window: first and last strictly positive
    /// defined values.
    pub first_value: Metric,
    pub latest_value: Metric,
    pub cagr_percent: Metric,
    pub recent_avg_growth_percent: Metric,
    pub latest_yoy_growth_percent: Metric,
    /// Sample standard deviation of year-over-year changes; undefined with
    /// fewer than three periods.
    pub volatility: Metric,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarningsGrowth {
    pub net_income: GrowthStats,
    pub operating_income: Option<GrowthStats>,
    pub ebitda: Option<GrowthStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SustainableGrowth {
    pub roe_percent: Metric,
    pub payout_ratio_percent: Metric,
    pub retention_ratio_percent: Metric,
    pub sustainable_growth_rate_percent: Metric,
    pub total_dividends: f64,
    pub rating: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthQuality {
    pub score: f64,
    pub rating: String,
    /// The four bucket contributions, e.g. "Revenue Growth: 20/25".
    pub breakdown: Vec<String>,
}

pub struct GrowthAnalyzer<'a> {
    store: &'a RecordStore,
}

impl<'a> GrowthAnalyzer<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    fn income(&self, symbol: &str, field: &str) -> LineItemSeries {
        self.store.annual_series(symbol, StatementKind::Income, field)
    }

    pub fn revenue_growth(&self, symbol: &str) -> Result<GrowthStats, AnalysisError> {
        let revenue = self.income(symbol, fields::TOTAL_REVENUE);
        if revenue.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: fewer than two revenue periods"
            )));
        }
        Ok(growth_stats(&revenue))
    }

    pub fn earnings_growth(&self, symbol: &str) -> Result<EarningsGrowth, AnalysisError> {
        let net_income = self.income(symbol, fields::NET_INCOME);
        if net_income.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: fewer than two net income periods"
            )));
        }

        let optional_stats = |field| {
            let series = self.income(symbol, field);
            (series.len() >= 2).then(|| growth_stats(&series))
        };

        Ok(EarningsGrowth {
            net_income: growth_stats(&net_income),
            operating_income: optional_stats(fields::OPERATING_INCOME),
            ebitda: optional_stats(fields::EBITDA),
        })
    }

    /// SGR = ROE × (1 − payout ratio). ROE comes from the health snapshot
    /// (as a fraction); the payout ratio matches dividends to the calendar
    /// year of the latest net-income period.
    ///
    /// Fiscal years that straddle calendar years can over- or under-count
    /// dividends here; the snapshot carries no fiscal calendar to align on.
    pub fn sustainable_growth_rate(
        &self,
        symbol: &str,
    ) -> Result<SustainableGrowth, AnalysisError> {
        let net_income = self.income(symbol, fields::NET_INCOME);
        let Some(health) = self.store.health_snapshot(symbol) else {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: no financial health snapshot"
            )));
        };
        let Some(latest) = net_income.latest() else {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: net income series is empty"
            )));
        };

        let latest_year = latest.period.year();
        let total_dividends: f64 = self
            .store
            .dividends(symbol)
            .iter()
            .filter(|(date, _)| date.year() == latest_year)
            .map(|(_, amount)| amount)
            .sum();

        let payout_ratio = match latest.value {
            Metric::Defined(ni) if ni > 0.0 => {
                math::safe_divide(Metric::new(total_dividends), latest.value)
            }
            _ => Metric::Defined(0.0),
        };

        let roe = health.return_on_equity;
        let retention = Metric::Defined(1.0).sub(payout_ratio);
        let sgr = roe.mul(retention).map(|v| v * 100.0);

        let rating = match sgr.unwrap_or(0.0) {
            s if s > 15.0 => "High growth potential",
            s if s > 8.0 => "Moderate growth potential",
            s if s > 0.0 => "Limited growth potential",
            _ => "Needs external financing",
        };

        Ok(SustainableGrowth {
            roe_percent: roe.map(|v| v * 100.0).rounded(2),
            payout_ratio_percent: payout_ratio.map(|v| v * 100.0).rounded(2),
            retention_ratio_percent: retention.map(|v| v * 100.0).rounded(2),
            sustainable_growth_rate_percent: sgr.rounded(2),
            total_dividends,
            rating: rating.to_string(),
        })
    }

    /// Growth quality on a 0-100 scale: four 25-point buckets for historical
    /// revenue growth, historical earnings growth, consistency, and recent
    /// performance.
    pub fn growth_quality(&self, symbol: &str) -> Result<GrowthQuality, AnalysisError> {
        let revenue = self.revenue_growth(symbol)?;
        let earnings = self.earnings_growth(symbol)?;

        let mut score = 0.0;
        let mut breakdown = Vec::with_capacity(4);

        let revenue_points = match revenue.cagr_percent.unwrap_or(0.0) {
            c if c > 15.0 => 25.0,
            c if c > 10.0 => 20.0,
            c if c > 5.0 => 15.0,
            c if c > 0.0 => 10.0,
            _ => 0.0,
        };
        score += revenue_points;
        breakdown.push(format!("Revenue Growth: {revenue_points}/25"));

        let earnings_points = match earnings.net_income.cagr_percent.value() {
            Some(c) if c > 20.0 => 25.0,
            Some(c) if c > 15.0 => 20.0,
            Some(c) if c > 10.0 => 15.0,
            Some(c) if c > 0.0 => 10.0,
            _ => 0.0,
        };
        score += earnings_points;
        breakdown.push(format!("Earnings Growth: {earnings_points}/25"));

        // Lower volatility is better; without enough history for either
        // series the bucket falls back to a moderate default.
        let consistency_points = match (
            revenue.volatility.value(),
            earnings.net_income.volatility.value(),
        ) {
            (Some(rv), Some(ev)) => match (rv + ev) / 2.0 {
                v if v < 10.0 => 25.0,
                v if v < 20.0 => 20.0,
                v if v < 30.0 => 15.0,
                v if v < 50.0 => 10.0,
                _ => 0.0,
            },
            _ => 10.0,
        };
        score += consistency_points;
        breakdown.push(format!("Consistency: {consistency_points}/25"));

        let recent_points = match (
            revenue.recent_avg_growth_percent.value(),
            earnings.net_income.recent_avg_growth_percent.value(),
        ) {
            (Some(rr), Some(er)) => match (rr + er) / 2.0 {
                r if r > 15.0 => 25.0,
                r if r > 10.0 => 20.0,
                r if r > 5.0 => 15.0,
                r if r > 0.0 => 10.0,
                _ => 0.0,
            },
            _ => 0.0,
        };
        score += recent_points;
        breakdown.push(format!("Recent Performance: {recent_points}/25"));

        let rating = match score {
            s if s >= 80.0 => "Excellent Growth Quality",
            s if s >= 65.0 => "Good Growth Quality",
            s if s >= 50.0 => "Average Growth Quality",
            s if s >= 35.0 => "Below Average Growth Quality",
            _ => "Poor Growth Quality",
        };

        Ok(GrowthQuality {
            score,
            rating: rating.to_string(),
            breakdown,
        })
    }
}

fn growth_stats(series: &LineItemSeries) -> GrowthStats {
    let changes = math::period_changes(&series.values());

    let mut positive = series.defined_points().filter(|(_, v)| *v > 0.0);
    let first = positive.next();
    let last = positive.last();

    let (first_value, latest_value, cagr) = match (first, last) {
        (Some((first_date, first_value)), Some((last_date, last_value))) => {
            let years = (last_date - first_date).num_days() as f64 / DAYS_PER_YEAR;
            let cagr = if years > 0.0 {
                Metric::new(((last_value / first_value).powf(1.0 / years) - 1.0) * 100.0)
            } else {
                Metric::Undefined
            };
            (Metric::new(first_value), Metric::new(last_value), cagr)
        }
        _ => (Metric::Undefined, Metric::Undefined, Metric::Undefined),
    };

    let volatility = if series.len() > 2 {
        math::std_dev(&changes)
    } else {
        Metric::Undefined
    };

    GrowthStats {
        periods_analyzed: series.len(),
        first_value,
        latest_value,
        cagr_percent: cagr.rounded(2),
        recent_avg_growth_percent: math::tail_mean(&changes, RECENT_WINDOW).rounded(2),
        latest_yoy_growth_percent: changes
            .last()
            .copied()
            .unwrap_or(Metric::Undefined)
            .rounded(2),
        volatility: volatility.rounded(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn store_with_income(income: serde_json::Value) -> RecordStore {
        RecordStore::from_json_value(json!({
            "ACME": {
                "financial_statements": { "annual": { "income_statement": income } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn cagr_two_point_series() {
        // 100 -> 121 over exactly two years: 10.00% CAGR.
        let store = store_with_income(json!({
            "2021-03-31": { "Total Revenue": { "value": 100.0 } },
            "2023-03-31": { "Total Revenue": { "value": 121.0 } }
        }));
        let stats = GrowthAnalyzer::new(&store).revenue_growth("ACME").unwrap();
        assert_relative_eq!(stats.cagr_percent.value().unwrap(), 10.0, epsilon = 0.02);
        assert_relative_eq!(stats.latest_yoy_growth_percent.value().unwrap(), 21.0);
    }

    #[test]
    fn cagr_skips_non_positive_endpoints() {
        let store = store_with_income(json!({
            "2020-03-31": { "Total Revenue": { "value": -50.0 } },
            "2021-03-31": { "Total Revenue": { "value": 100.0 } },
            "2023-03-31": { "Total Revenue": { "value": 121.0 } }
        }));
        let stats = GrowthAnalyzer::new(&store).revenue_growth("ACME").unwrap();
        assert_relative_eq!(stats.cagr_percent.value().unwrap(), 10.0, epsilon = 0.02);
        assert_relative_eq!(stats.first_value.value().unwrap(), 100.0);
    }

    #[test]
    fn volatility_undefined_below_three_periods() {
        let store = store_with_income(json!({
            "2022-03-31": { "Total Revenue": { "value": 100.0 } },
            "2023-03-31": { "Total Revenue": { "value": 110.0 } }
        }));
        let stats = GrowthAnalyzer::new(&store).revenue_growth("ACME").unwrap();
        assert_eq!(stats.volatility, Metric::Undefined);
    }

    #[test]
    fn recent_average_uses_last_three_changes() {
        let store = store_with_income(json!({
            "2019-03-31": { "Total Revenue": { "value": 100.0 } },
            "2020-03-31": { "Total Revenue": { "value": 200.0 } },
            "2021-03-31": { "Total Revenue": { "value": 220.0 } },
            "2022-03-31": { "Total Revenue": { "value": 242.0 } },
            "2023-03-31": { "Total Revenue": { "value": 266.2 } }
        }));
        let stats = GrowthAnalyzer::new(&store).revenue_growth("ACME").unwrap();
        // The 100% jump falls outside the 3-change window.
        assert_relative_eq!(stats.recent_avg_growth_percent.value().unwrap(), 10.0);
    }

    #[test]
    fn unavailable_with_single_period() {
        let store = store_with_income(json!({
            "2023-03-31": { "Total Revenue": { "value": 100.0 } }
        }));
        assert!(matches!(
            GrowthAnalyzer::new(&store).revenue_growth("ACME"),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn earnings_growth_includes_optional_series() {
        let store = store_with_income(json!({
            "2022-03-31": {
                "Net Income": { "value": 100.0 },
                "Operating Income": { "value": 150.0 }
            },
            "2023-03-31": {
                "Net Income": { "value": 120.0 },
                "Operating Income": { "value": 180.0 },
                "EBITDA": { "value": 200.0 }
            }
        }));
        let growth = GrowthAnalyzer::new(&store).earnings_growth("ACME").unwrap();
        assert_relative_eq!(
            growth.net_income.latest_yoy_growth_percent.value().unwrap(),
            20.0
        );
        assert!(growth.operating_income.is_some());
        // Single EBITDA period: not enough for growth stats.
        assert!(growth.ebitda.is_none());
    }

    #[test]
    fn sustainable_growth_rate_matches_dividend_year() {
        let store = RecordStore::from_json_value(json!({
            "ACME": {
                "financial_statements": {
                    "annual": {
                        "income_statement": {
                            "2023-03-31": { "Net Income": { "value": 200.0 } }
                        }
                    }
                },
                "financial_health": { "return_on_equity": 0.20 },
                "corporate_actions": {
                    "dividends": {
                        "2023-01-15": { "amount": 30.0 },
                        "2023-07-15": { "amount": 30.0 },
                        "2022-07-15": { "amount": 25.0 }
                    }
                }
            }
        }))
        .unwrap();
        let sgr = GrowthAnalyzer::new(&store)
            .sustainable_growth_rate("ACME")
            .unwrap();
        // Payout 60/200 = 30%; SGR = 20% x 0.7 = 14%.
        assert_relative_eq!(sgr.total_dividends, 60.0);
        assert_relative_eq!(sgr.payout_ratio_percent.value().unwrap(), 30.0);
        assert_relative_eq!(
            sgr.sustainable_growth_rate_percent.value().unwrap(),
            14.0
        );
        assert_eq!(sgr.rating, "Moderate growth potential");
    }

    #[test]
    fn payout_zero_when_net_income_not_positive() {
        let store = RecordStore::from_json_value(json!({
            "ACME": {
                "financial_statements": {
                    "annual": {
                        "income_statement": {
                            "2023-03-31": { "Net Income": { "value": -50.0 } }
                        }
                    }
                },
                "financial_health": { "return_on_equity": 0.10 },
                "corporate_actions": {
                    "dividends": { "2023-01-15": { "amount": 10.0 } }
                }
            }
        }))
        .unwrap();
        let sgr = GrowthAnalyzer::new(&store)
            .sustainable_growth_rate("ACME")
            .unwrap();
        assert_relative_eq!(sgr.payout_ratio_percent.value().unwrap(), 0.0);
        assert_relative_eq!(
            sgr.sustainable_growth_rate_percent.value().unwrap(),
            10.0
        );
    }

    #[test]
    fn growth_quality_buckets() {
        let store = store_with_income(json!({
            "2019-03-31": { "Total Revenue": { "value": 100.0 }, "Net Income": { "value": 10.0 } },
            "2020-03-31": { "Total Revenue": { "value": 112.0 }, "Net Income": { "value": 11.2 } },
            "2021-03-31": { "Total Revenue": { "value": 125.4 }, "Net Income": { "value": 12.5 } },
            "2022-03-31": { "Total Revenue": { "value": 140.5 }, "Net Income": { "value": 14.0 } },
            "2023-03-31": { "Total Revenue": { "value": 157.4 }, "Net Income": { "value": 15.7 } }
        }));
        let quality = GrowthAnalyzer::new(&store).growth_quality("ACME").unwrap();
        // ~12% CAGR both series, tight volatility, ~12% recent growth:
        // 20 + 15 + 25 + 20 = 80.
        assert_relative_eq!(quality.score, 80.0);
        assert_eq!(quality.rating, "Excellent Growth Quality");
        assert_eq!(quality.breakdown.len(), 4);
    }

    #[test]
    fn growth_quality_unavailable_without_history() {
        let store = store_with_income(json!({
            "2023-03-31": { "Total Revenue": { "value": 100.0 }, "Net Income": { "value": 10.0 } }
        }));
        assert!(matches!(
            GrowthAnalyzer::new(&store).growth_quality("ACME"),
            Err(AnalysisError::InsufficientData(_))
        ));
    }
}
