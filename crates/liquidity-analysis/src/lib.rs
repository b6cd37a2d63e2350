//! Liquidity indicators: short-term solvency ratios and the cash conversion
//! cycle, from the most recent balance-sheet period.

use analysis_core::{math, AnalysisError, Metric};
use record_store::{fields, RecordStore, StatementKind};
use serde::Serialize;

const DAYS_IN_YEAR: f64 = 365.0;

/// Share of revenue assumed to be cost of goods sold when the statements do
/// not report it.
const COGS_REVENUE_ESTIMATE: f64 = 0.7;

#[derive(Debug, Clone, Serialize)]
pub struct LiquidityIndicators {
    pub symbol: String,
    pub current_assets: Metric,
    pub current_liabilities: Metric,
    pub cash_and_equivalents: Metric,
    pub inventory: Metric,
    pub accounts_receivable: Metric,
    pub current_ratio: Metric,
    pub quick_ratio: Metric,
    pub cash_ratio: Metric,
    pub working_capital: Metric,
    pub current_ratio_rating: String,
    pub quick_ratio_rating: String,
    /// Present only when a revenue figure exists to anchor the cycle.
    pub cash_conversion: Option<CashConversionCycle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashConversionCycle {
    pub days_sales_outstanding: Metric,
    pub days_inventory_outstanding: Metric,
    pub days_payable_outstanding: Metric,
    pub cash_conversion_cycle: Metric,
    pub rating: String,
}

pub struct LiquidityAnalyzer<'a> {
    store: &'a RecordStore,
}

impl<'a> LiquidityAnalyzer<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    pub fn analyze(&self, symbol: &str) -> Result<LiquidityIndicators, AnalysisError> {
        let current_assets =
            self.store
                .annual_series(symbol, StatementKind::Balance, fields::CURRENT_ASSETS);
        let current_liabilities = self.store.annual_series(
            symbol,
            StatementKind::Balance,
            fields::CURRENT_LIABILITIES,
        );

        if current_assets.is_empty() && current_liabilities.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: no current assets or current liabilities reported"
            )));
        }

        let cash = self
            .store
            .annual_series(symbol, StatementKind::Balance, fields::CASH_AND_EQUIVALENTS)
            .latest_value();
        let inventory = self
            .store
            .annual_series(symbol, StatementKind::Balance, fields::INVENTORY)
            .latest_value();
        let receivables = self
            .store
            .annual_series(symbol, StatementKind::Balance, fields::ACCOUNTS_RECEIVABLE)
            .latest_value();
        let latest_ca = current_assets.latest_value();
        let latest_cl = current_liabilities.latest_value();

        let mut current_ratio = math::safe_divide(latest_ca, latest_cl);
        // Inventory is excluded from quick assets; a company reporting no
        // inventory line simply has none to exclude.
        let quick_assets = latest_ca.sub(Metric::new(inventory.unwrap_or(0.0)));
        let mut quick_ratio = math::safe_divide(quick_assets, latest_cl);
        let cash_ratio = math::safe_divide(cash, latest_cl);
        let working_capital = latest_ca.sub(latest_cl);

        if let Some(health) = self.store.health_snapshot(symbol) {
            if health.current_ratio.is_defined() {
                current_ratio = health.current_ratio;
            }
            if health.quick_ratio.is_defined() {
                quick_ratio = health.quick_ratio;
            }
        }

        let current_ratio = current_ratio.rounded(2);
        let quick_ratio = quick_ratio.rounded(2);

        Ok(LiquidityIndicators {
            symbol: symbol.to_string(),
            current_assets: latest_ca,
            current_liabilities: latest_cl,
            cash_and_equivalents: cash,
            inventory,
            accounts_receivable: receivables,
            current_ratio,
            quick_ratio,
            cash_ratio: cash_ratio.rounded(2),
            working_capital,
            current_ratio_rating: rate_current_ratio(current_ratio).to_string(),
            quick_ratio_rating: rate_quick_ratio(quick_ratio).to_string(),
            cash_conversion: self.cash_conversion_cycle(symbol),
        })
    }

    /// DSO + DIO - DPO over the latest period. COGS falls back to an
    /// estimated share of revenue; missing working-capital components count
    /// as zero days rather than voiding the cycle.
    fn cash_conversion_cycle(&self, symbol: &str) -> Option<CashConversionCycle> {
        let revenue = self
            .store
            .annual_series(symbol, StatementKind::Income, fields::TOTAL_REVENUE);
        if revenue.is_empty() {
            return None;
        }
        let latest_revenue = revenue.latest_value();

        let cogs_series =
            self.store
                .annual_series(symbol, StatementKind::Income, fields::COST_OF_REVENUE);
        let cogs = if cogs_series.is_empty() {
            latest_revenue.map(|v| v * COGS_REVENUE_ESTIMATE)
        } else {
            cogs_series.latest_value()
        };

        let latest_or_zero = |kind, field| {
            let series = self.store.annual_series(symbol, kind, field);
            if series.is_empty() {
                Metric::Defined(0.0)
            } else {
                series.latest_value()
            }
        };
        let inventory = latest_or_zero(StatementKind::Balance, fields::INVENTORY);
        let receivables = latest_or_zero(StatementKind::Balance, fields::ACCOUNTS_RECEIVABLE);
        let payables = latest_or_zero(StatementKind::Balance, fields::ACCOUNTS_PAYABLE);

        let dso = math::safe_divide(receivables.map(|v| v * DAYS_IN_YEAR), latest_revenue);
        let dio = math::safe_divide(inventory.map(|v| v * DAYS_IN_YEAR), cogs);
        let dpo = math::safe_divide(payables.map(|v| v * DAYS_IN_YEAR), cogs);

        let ccc = Metric::new(dso.unwrap_or(0.0) + dio.unwrap_or(0.0) - dpo.unwrap_or(0.0));

        Some(CashConversionCycle {
            days_sales_outstanding: dso.rounded(1),
            days_inventory_outstanding: dio.rounded(1),
            days_payable_outstanding: dpo.rounded(1),
            cash_conversion_cycle: ccc.rounded(1),
            rating: rate_cash_conversion(ccc).to_string(),
        })
    }
}

fn rate_current_ratio(ratio: Metric) -> &'static str {
    match ratio.value() {
        None => "N/A",
        Some(r) if r >= 2.0 => "Excellent",
        Some(r) if r >= 1.5 => "Good",
        Some(r) if r >= 1.0 => "Adequate",
        Some(_) => "Poor",
    }
}

fn rate_quick_ratio(ratio: Metric) -> &'static str {
    match ratio.value() {
        None => "N/A",
        Some(r) if r >= 1.5 => "Excellent",
        Some(r) if r >= 1.0 => "Good",
        Some(r) if r >= 0.8 => "Adequate",
        Some(_) => "Poor",
    }
}

fn rate_cash_conversion(cycle: Metric) -> &'static str {
    match cycle.value() {
        None => "N/A",
        Some(c) if c < 30.0 => "Excellent - Very efficient",
        Some(c) if c < 60.0 => "Good - Efficient",
        Some(c) if c < 90.0 => "Average",
        Some(c) if c < 120.0 => "Below Average",
        Some(_) => "Poor - Inefficient",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn store(balance: serde_json::Value, income: serde_json::Value) -> RecordStore {
        RecordStore::from_json_value(json!({
            "ACME": {
                "financial_statements": {
                    "annual": {
                        "income_statement": income,
                        "balance_sheet": balance
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn basic_ratios_from_latest_period() {
        let store = store(
            json!({
                "2023-03-31": {
                    "Current Assets": { "value": 2200.0 },
                    "Current Liabilities": { "value": 1000.0 },
                    "Cash And Cash Equivalents": { "value": 500.0 },
                    "Inventory": { "value": 600.0 }
                }
            }),
            json!({}),
        );
        let result = LiquidityAnalyzer::new(&store).analyze("ACME").unwrap();
        assert_relative_eq!(result.current_ratio.value().unwrap(), 2.2);
        assert_relative_eq!(result.quick_ratio.value().unwrap(), 1.6);
        assert_relative_eq!(result.cash_ratio.value().unwrap(), 0.5);
        assert_relative_eq!(result.working_capital.value().unwrap(), 1200.0);
        assert_eq!(result.current_ratio_rating, "Excellent");
        assert_eq!(result.quick_ratio_rating, "Excellent");
    }

    #[test]
    fn quick_ratio_without_inventory_line() {
        let store = store(
            json!({
                "2023-03-31": {
                    "Current Assets": { "value": 1500.0 },
                    "Current Liabilities": { "value": 1000.0 }
                }
            }),
            json!({}),
        );
        let result = LiquidityAnalyzer::new(&store).analyze("ACME").unwrap();
        assert_relative_eq!(result.quick_ratio.value().unwrap(), 1.5);
        assert_eq!(result.cash_ratio, Metric::Undefined);
    }

    #[test]
    fn health_snapshot_overrides_derived_ratios() {
        let store = RecordStore::from_json_value(json!({
            "ACME": {
                "financial_statements": {
                    "annual": {
                        "balance_sheet": {
                            "2023-03-31": {
                                "Current Assets": { "value": 1000.0 },
                                "Current Liabilities": { "value": 1000.0 }
                            }
                        }
                    }
                },
                "financial_health": { "current_ratio": 1.8, "quick_ratio": null }
            }
        }))
        .unwrap();
        let result = LiquidityAnalyzer::new(&store).analyze("ACME").unwrap();
        assert_relative_eq!(result.current_ratio.value().unwrap(), 1.8);
        // Null in the snapshot does not override the derived value.
        assert_relative_eq!(result.quick_ratio.value().unwrap(), 1.0);
    }

    #[test]
    fn unavailable_only_when_both_sides_missing() {
        let empty_store = store(json!({}), json!({}));
        assert!(matches!(
            LiquidityAnalyzer::new(&empty_store).analyze("ACME"),
            Err(AnalysisError::InsufficientData(_))
        ));

        let store = store(
            json!({ "2023-03-31": { "Current Liabilities": { "value": 800.0 } } }),
            json!({}),
        );
        let result = LiquidityAnalyzer::new(&store).analyze("ACME").unwrap();
        assert_eq!(result.current_ratio, Metric::Undefined);
        assert_eq!(result.current_ratio_rating, "N/A");
    }

    #[test]
    fn cash_conversion_cycle_with_cogs_estimate() {
        let store = store(
            json!({
                "2023-03-31": {
                    "Current Assets": { "value": 2000.0 },
                    "Current Liabilities": { "value": 1000.0 },
                    "Inventory": { "value": 140.0 },
                    "Accounts Receivable": { "value": 200.0 },
                    "Accounts Payable": { "value": 70.0 }
                }
            }),
            json!({
                "2023-03-31": { "Total Revenue": { "value": 1000.0 } }
            }),
        );
        let result = LiquidityAnalyzer::new(&store).analyze("ACME").unwrap();
        let ccc = result.cash_conversion.unwrap();
        // COGS estimated at 700: DSO 73, DIO 73, DPO 36.5
        assert_relative_eq!(ccc.days_sales_outstanding.value().unwrap(), 73.0);
        assert_relative_eq!(ccc.days_inventory_outstanding.value().unwrap(), 73.0);
        assert_relative_eq!(ccc.days_payable_outstanding.value().unwrap(), 36.5);
        assert_relative_eq!(ccc.cash_conversion_cycle.value().unwrap(), 109.5);
        assert_eq!(ccc.rating, "Below Average");
    }

    #[test]
    fn no_cycle_without_revenue() {
        let store = store(
            json!({
                "2023-03-31": {
                    "Current Assets": { "value": 2000.0 },
                    "Current Liabilities": { "value": 1000.0 }
                }
            }),
            json!({}),
        );
        let result = LiquidityAnalyzer::new(&store).analyze("ACME").unwrap();
        assert!(result.cash_conversion.is_none());
    }
}
