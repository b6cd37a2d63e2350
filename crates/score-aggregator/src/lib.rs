//! Score aggregation: combines the five indicator families into three
//! component scores, an overall investment grade, and a risk level.
//!
//! Failure policy: an indicator that is unavailable (or faults internally)
//! degrades its bucket to zero points and is recorded as a factor string;
//! it never aborts the assessment. [`ScoreAggregator::overall_assessment`]
//! always returns a complete record for every symbol.

use analysis_core::{
    math, AnalysisError, AssessmentSummary, Coverage, OverallAssessment, OverallGrade, RiskLevel,
    ScoreResult, MAX_FACTORS,
};
use chrono::{DateTime, Utc};
use growth_analysis::GrowthAnalyzer;
use leverage_analysis::LeverageAnalyzer;
use liquidity_analysis::LiquidityAnalyzer;
use profitability_analysis::ProfitabilityAnalyzer;
use record_store::RecordStore;
use valuation_analysis::{BasicValuation, DcfConfig, RelativeValuation, ValuationAnalyzer};

pub struct ScoreAggregator<'a> {
    store: &'a RecordStore,
    liquidity: LiquidityAnalyzer<'a>,
    profitability: ProfitabilityAnalyzer<'a>,
    leverage: LeverageAnalyzer<'a>,
    growth: GrowthAnalyzer<'a>,
    valuation: ValuationAnalyzer<'a>,
    computed_at: DateTime<Utc>,
}

impl<'a> ScoreAggregator<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self::with_config(store, DcfConfig::default())
    }

    pub fn with_config(store: &'a RecordStore, dcf: DcfConfig) -> Self {
        Self {
            store,
            liquidity: LiquidityAnalyzer::new(store),
            profitability: ProfitabilityAnalyzer::new(store),
            leverage: LeverageAnalyzer::new(store),
            growth: GrowthAnalyzer::new(store),
            valuation: ValuationAnalyzer::new(store).with_dcf_config(dcf),
            computed_at: Utc::now(),
        }
    }

    /// Pin the computation timestamp, e.g. to the batch run time. Every
    /// record produced by this aggregator carries the same timestamp, so
    /// re-assessing an unchanged snapshot is byte-identical.
    pub fn with_timestamp(mut self, computed_at: DateTime<Utc>) -> Self {
        self.computed_at = computed_at;
        self
    }

    /// Reliability (0-100): profitability 35, liquidity 25, leverage 25,
    /// growth consistency 15.
    pub fn reliability_score(&self, symbol: &str) -> ScoreResult {
        let mut score = 0.0;
        let mut factors = Vec::new();

        if let Some(p) = degraded(
            "Profitability",
            self.profitability.analyze(symbol),
            &mut factors,
        ) {
            if let Some(roe) = p.roe_percent.value() {
                if roe >= 15.0 {
                    score += 15.0;
                    factors.push("Excellent ROE (15%+)".into());
                } else if roe >= 10.0 {
                    score += 12.0;
                    factors.push("Good ROE (10-15%)".into());
                } else if roe >= 5.0 {
                    score += 8.0;
                    factors.push("Average ROE (5-10%)".into());
                } else if roe > 0.0 {
                    score += 4.0;
                    factors.push("Low ROE (0-5%)".into());
                } else {
                    factors.push("Negative ROE".into());
                }
            }
            if let Some(margin) = p.net_margin_percent.value() {
                if margin >= 15.0 {
                    score += 10.0;
                    factors.push("High profit margins".into());
                } else if margin >= 8.0 {
                    score += 7.0;
                    factors.push("Good profit margins".into());
                } else if margin >= 3.0 {
                    score += 4.0;
                    factors.push("Average profit margins".into());
                } else if margin > 0.0 {
                    score += 2.0;
                    factors.push("Low profit margins".into());
                } else {
                    factors.push("Negative margins".into());
                }
            }
            if let Some(margin) = p.operating_margin_percent.value() {
                if margin >= 20.0 {
                    score += 10.0;
                } else if margin >= 12.0 {
                    score += 7.0;
                } else if margin >= 5.0 {
                    score += 4.0;
                } else if margin > 0.0 {
                    score += 2.0;
                }
            }
        }

        if let Some(l) = degraded("Liquidity", self.liquidity.analyze(symbol), &mut factors) {
            if let Some(ratio) = l.current_ratio.value() {
                if ratio >= 2.0 {
                    score += 15.0;
                    factors.push("Excellent liquidity".into());
                } else if ratio >= 1.5 {
                    score += 12.0;
                    factors.push("Good liquidity".into());
                } else if ratio >= 1.0 {
                    score += 8.0;
                    factors.push("Adequate liquidity".into());
                } else if ratio >= 0.8 {
                    score += 4.0;
                    factors.push("Weak liquidity".into());
                } else {
                    factors.push("Poor liquidity".into());
                }
            }
            if let Some(ratio) = l.quick_ratio.value() {
                if ratio >= 1.5 {
                    score += 10.0;
                } else if ratio >= 1.0 {
                    score += 8.0;
                } else if ratio >= 0.8 {
                    score += 5.0;
                } else if ratio >= 0.5 {
                    score += 2.0;
                }
            }
        }

        if let Some(lev) = degraded("Leverage", self.leverage.analyze(symbol), &mut factors) {
            if let Some(ratio) = lev.debt_to_equity.value() {
                if ratio <= 0.3 {
                    score += 15.0;
                    factors.push("Conservative debt levels".into());
                } else if ratio <= 0.6 {
                    score += 12.0;
                    factors.push("Moderate debt levels".into());
                } else if ratio <= 1.0 {
                    score += 8.0;
                    factors.push("Higher debt levels".into());
                } else if ratio <= 2.0 {
                    score += 4.0;
                    factors.push("High leverage".into());
                } else {
                    factors.push("Very high leverage".into());
                }
            }
            match lev.interest_coverage {
                Coverage::Unbounded => {
                    score += 10.0;
                    factors.push("No interest burden".into());
                }
                Coverage::Finite(c) if c > 20.0 => {
                    score += 10.0;
                    factors.push("No interest burden".into());
                }
                Coverage::Finite(c) if c >= 10.0 => {
                    score += 8.0;
                    factors.push("Excellent interest coverage".into());
                }
                Coverage::Finite(c) if c >= 5.0 => {
                    score += 6.0;
                    factors.push("Good interest coverage".into());
                }
                Coverage::Finite(c) if c >= 2.0 => {
                    score += 3.0;
                    factors.push("Adequate interest coverage".into());
                }
                Coverage::Finite(c) if c >= 1.0 => {
                    score += 1.0;
                    factors.push("Weak interest coverage".into());
                }
                Coverage::Finite(_) => {
                    factors.push("Poor interest coverage".into());
                }
                Coverage::Undefined => {}
            }
        }

        if let Some(g) = degraded("Growth", self.growth.revenue_growth(symbol), &mut factors) {
            if let Some(recent) = g.recent_avg_growth_percent.value() {
                let volatility = g.volatility.value();
                if volatility.is_some_and(|v| v <= 10.0) && recent > 0.0 {
                    score += 10.0;
                    factors.push("Consistent revenue growth".into());
                } else if volatility.is_some_and(|v| v <= 20.0) && recent > 0.0 {
                    score += 7.0;
                    factors.push("Stable revenue growth".into());
                } else if recent > 0.0 {
                    score += 4.0;
                    factors.push("Positive revenue growth".into());
                } else if recent >= -5.0 {
                    score += 2.0;
                    factors.push("Stable revenue".into());
                } else {
                    factors.push("Declining revenue".into());
                }
            }
            if let Some(cagr) = g.cagr_percent.value() {
                if cagr >= 15.0 {
                    score += 5.0;
                } else if cagr >= 8.0 {
                    score += 4.0;
                } else if cagr >= 3.0 {
                    score += 2.0;
                } else if cagr > 0.0 {
                    score += 1.0;
                }
            }
        }

        ScoreResult::new(
            "Reliability",
            score,
            reliability_grade(score),
            factors,
            self.computed_at,
        )
    }

    /// Growth Scope (0-100): revenue growth 30, earnings growth 25,
    /// profitability efficiency 20, debt capacity 10, cash position 5,
    /// sustainable growth rate 10.
    pub fn growth_scope(&self, symbol: &str) -> ScoreResult {
        let mut score = 0.0;
        let mut factors = Vec::new();

        if let Some(g) = degraded(
            "Revenue growth",
            self.growth.revenue_growth(symbol),
            &mut factors,
        ) {
            if let Some(cagr) = g.cagr_percent.value() {
                if cagr >= 20.0 {
                    score += 15.0;
                    factors.push("Exceptional revenue growth".into());
                } else if cagr >= 15.0 {
                    score += 12.0;
                    factors.push("High revenue growth".into());
                } else if cagr >= 10.0 {
                    score += 9.0;
                    factors.push("Good revenue growth".into());
                } else if cagr >= 5.0 {
                    score += 6.0;
                    factors.push("Moderate revenue growth".into());
                } else if cagr > 0.0 {
                    score += 3.0;
                    factors.push("Slow revenue growth".into());
                } else {
                    factors.push("Declining revenue".into());
                }
            }
            if let Some(recent) = g.recent_avg_growth_percent.value() {
                if recent >= 25.0 {
                    score += 15.0;
                } else if recent >= 15.0 {
                    score += 12.0;
                } else if recent >= 8.0 {
                    score += 9.0;
                } else if recent >= 3.0 {
                    score += 6.0;
                } else if recent > 0.0 {
                    score += 3.0;
                }
            }
        }

        if let Some(e) = degraded(
            "Earnings growth",
            self.growth.earnings_growth(symbol),
            &mut factors,
        ) {
            if let Some(cagr) = e.net_income.cagr_percent.value() {
                if cagr >= 25.0 {
                    score += 15.0;
                    factors.push("Excellent earnings growth".into());
                } else if cagr >= 18.0 {
                    score += 12.0;
                    factors.push("Strong earnings growth".into());
                } else if cagr >= 12.0 {
                    score += 9.0;
                    factors.push("Good earnings growth".into());
                } else if cagr >= 6.0 {
                    score += 6.0;
                    factors.push("Moderate earnings growth".into());
                } else if cagr > 0.0 {
                    score += 3.0;
                    factors.push("Slow earnings growth".into());
                }
            }
            if let Some(recent) = e.net_income.recent_avg_growth_percent.value() {
                if recent >= 20.0 {
                    score += 10.0;
                } else if recent >= 12.0 {
                    score += 8.0;
                } else if recent >= 5.0 {
                    score += 5.0;
                } else if recent > 0.0 {
                    score += 3.0;
                }
            }
        }

        if let Some(p) = degraded(
            "Profitability",
            self.profitability.analyze(symbol),
            &mut factors,
        ) {
            if let Some(roe) = p.roe_percent.value() {
                if roe >= 20.0 {
                    score += 12.0;
                    factors.push("High ROE indicates strong growth capacity".into());
                } else if roe >= 15.0 {
                    score += 9.0;
                } else if roe >= 10.0 {
                    score += 6.0;
                } else if roe >= 5.0 {
                    score += 3.0;
                }
            }
            if let Some(roa) = p.roa_percent.value() {
                if roa >= 15.0 {
                    score += 8.0;
                    factors.push("Excellent asset utilization".into());
                } else if roa >= 10.0 {
                    score += 6.0;
                } else if roa >= 5.0 {
                    score += 4.0;
                } else if roa > 0.0 {
                    score += 2.0;
                }
            }
        }

        if let Some(lev) = degraded("Leverage", self.leverage.analyze(symbol), &mut factors) {
            if let Some(ratio) = lev.debt_to_equity.value() {
                if ratio <= 0.3 {
                    score += 10.0;
                    factors.push("Low debt allows growth financing".into());
                } else if ratio <= 0.6 {
                    score += 8.0;
                    factors.push("Moderate debt with growth capacity".into());
                } else if ratio <= 1.0 {
                    score += 5.0;
                    factors.push("Higher debt limits growth".into());
                } else if ratio <= 1.5 {
                    score += 2.0;
                } else {
                    factors.push("High debt constrains growth".into());
                }
            }
        }

        if let Some(l) = degraded("Liquidity", self.liquidity.analyze(symbol), &mut factors) {
            if let Some(ratio) = l.cash_ratio.value() {
                if ratio >= 0.5 {
                    score += 5.0;
                    factors.push("Strong cash position".into());
                } else if ratio >= 0.3 {
                    score += 3.0;
                } else if ratio >= 0.15 {
                    score += 2.0;
                }
            }
        }

        if let Some(s) = degraded(
            "Sustainable growth",
            self.growth.sustainable_growth_rate(symbol),
            &mut factors,
        ) {
            if let Some(sgr) = s.sustainable_growth_rate_percent.value() {
                if sgr >= 15.0 {
                    score += 10.0;
                    factors.push("High sustainable growth rate".into());
                } else if sgr >= 10.0 {
                    score += 8.0;
                } else if sgr >= 6.0 {
                    score += 5.0;
                } else if sgr > 0.0 {
                    score += 3.0;
                }
            }
        }

        ScoreResult::new(
            "Growth Scope",
            score,
            growth_grade(score),
            factors,
            self.computed_at,
        )
    }

    /// Valuation Attractiveness (0-100): P/E 30, P/B 25, P/S 20, DCF 25.
    /// Higher means cheaper relative to fundamentals.
    pub fn valuation_attractiveness(&self, symbol: &str) -> ScoreResult {
        let mut score = 0.0;
        let mut factors = Vec::new();

        if let Some(v) = degraded(
            "Valuation",
            self.valuation.basic_ratios(symbol),
            &mut factors,
        ) {
            if let Some(pe) = v.pe_ratio.value().filter(|pe| *pe > 0.0) {
                if pe <= 15.0 {
                    score += 30.0;
                    factors.push("Very attractive P/E ratio".into());
                } else if pe <= 20.0 {
                    score += 25.0;
                    factors.push("Good P/E ratio".into());
                } else if pe <= 25.0 {
                    score += 20.0;
                    factors.push("Fair P/E ratio".into());
                } else if pe <= 35.0 {
                    score += 10.0;
                    factors.push("High P/E ratio".into());
                } else {
                    score += 5.0;
                    factors.push("Very high P/E ratio".into());
                }
            }
            if let Some(pb) = v.pb_ratio.value().filter(|pb| *pb > 0.0) {
                if pb <= 1.0 {
                    score += 25.0;
                    factors.push("Trading below book value".into());
                } else if pb <= 2.0 {
                    score += 20.0;
                    factors.push("Reasonable P/B ratio".into());
                } else if pb <= 3.0 {
                    score += 15.0;
                    factors.push("Moderate P/B ratio".into());
                } else if pb <= 5.0 {
                    score += 8.0;
                    factors.push("High P/B ratio".into());
                } else {
                    score += 3.0;
                    factors.push("Very high P/B ratio".into());
                }
            }
            if let Some(ps) = v.ps_ratio.value().filter(|ps| *ps > 0.0) {
                if ps <= 1.0 {
                    score += 20.0;
                    factors.push("Excellent P/S ratio".into());
                } else if ps <= 2.0 {
                    score += 15.0;
                    factors.push("Good P/S ratio".into());
                } else if ps <= 4.0 {
                    score += 10.0;
                    factors.push("Fair P/S ratio".into());
                } else if ps <= 8.0 {
                    score += 5.0;
                    factors.push("High P/S ratio".into());
                } else {
                    factors.push("Very high P/S ratio".into());
                }
            }
        }

        match self.valuation.dcf_valuation(symbol) {
            Ok(dcf) => {
                if let Some(ratio) = dcf.fair_value_ratio.value() {
                    if ratio >= 1.3 {
                        score += 25.0;
                        factors.push("Significantly undervalued (DCF)".into());
                    } else if ratio >= 1.1 {
                        score += 20.0;
                        factors.push("Undervalued (DCF)".into());
                    } else if ratio >= 0.9 {
                        score += 15.0;
                        factors.push("Fair value (DCF)".into());
                    } else if ratio >= 0.7 {
                        score += 8.0;
                        factors.push("Overvalued (DCF)".into());
                    } else {
                        score += 3.0;
                        factors.push("Significantly overvalued (DCF)".into());
                    }
                }
            }
            Err(AnalysisError::InsufficientData(reason)) => {
                tracing::debug!(symbol, %reason, "DCF model unavailable");
            }
            Err(error) => {
                tracing::warn!(symbol, %error, "DCF model failed");
            }
        }

        factors.truncate(4);
        ScoreResult::new(
            "Valuation",
            score,
            valuation_grade(score),
            factors,
            self.computed_at,
        )
    }

    /// The complete assessment. Never fails: every missing indicator
    /// degrades its component instead.
    pub fn overall_assessment(&self, symbol: &str) -> OverallAssessment {
        let reliability = self.reliability_score(symbol);
        let growth = self.growth_scope(symbol);
        let valuation = self.valuation_attractiveness(symbol);

        let weighted =
            reliability.score * 0.40 + growth.score * 0.35 + valuation.score * 0.25;
        let overall_score = math::round_to(weighted.clamp(0.0, 100.0), 1);
        let overall_grade = OverallGrade::from_score(overall_score);

        let (risk_level, risk_factors) = self.risk_assessment(symbol);

        OverallAssessment {
            symbol: symbol.to_string(),
            reliability,
            growth,
            valuation,
            overall_score,
            overall_grade,
            recommendation: overall_grade.recommendation().to_string(),
            risk_level,
            risk_factors,
            computed_at: self.computed_at,
        }
    }

    /// Risk points: leverage (D/E over 2.0 / 1.0 / 0.6 adds 30 / 15 / 8) and
    /// liquidity (current ratio under 1.0 / 1.5 adds 20 / 10). With neither
    /// indicator available, a flat 15 marks the data gap itself as risk.
    fn risk_assessment(&self, symbol: &str) -> (RiskLevel, Vec<String>) {
        let mut points = 0u32;
        let mut factors = Vec::new();
        let mut have_data = false;

        if let Ok(lev) = self.leverage.analyze(symbol) {
            have_data = true;
            if let Some(ratio) = lev.debt_to_equity.value() {
                if ratio > 2.0 {
                    points += 30;
                    factors.push("Very high debt levels".to_string());
                } else if ratio > 1.0 {
                    points += 15;
                    factors.push("High debt levels".to_string());
                } else if ratio > 0.6 {
                    points += 8;
                    factors.push("Moderate debt levels".to_string());
                }
            }
        }

        if let Ok(liq) = self.liquidity.analyze(symbol) {
            have_data = true;
            if let Some(ratio) = liq.current_ratio.value() {
                if ratio < 1.0 {
                    points += 20;
                    factors.push("Poor liquidity".to_string());
                } else if ratio < 1.5 {
                    points += 10;
                    factors.push("Weak liquidity".to_string());
                }
            }
        }

        if !have_data {
            points += 15;
            factors.push("Limited financial data available".to_string());
        }

        factors.truncate(MAX_FACTORS);
        (RiskLevel::from_points(points), factors)
    }

    /// Slim projection for frontend display.
    pub fn summary(&self, symbol: &str) -> AssessmentSummary {
        let assessment = self.overall_assessment(symbol);
        AssessmentSummary {
            key_highlights: vec![
                format!("Reliability: {:.0}/100", assessment.reliability.score),
                format!("Growth Potential: {:.0}/100", assessment.growth.score),
                format!("Valuation: {:.0}/100", assessment.valuation.score),
                format!("Risk: {}", assessment.risk_level.label()),
            ],
            symbol: assessment.symbol,
            reliability_score: assessment.reliability.score,
            growth_score: assessment.growth.score,
            valuation_score: assessment.valuation.score,
            overall_score: assessment.overall_score,
            overall_grade: assessment.overall_grade,
            recommendation: assessment.recommendation,
            risk_level: assessment.risk_level,
        }
    }

    /// Assess every symbol in the store, in sorted symbol order. Symbols are
    /// independent; one symbol's missing data never affects another's
    /// result.
    pub fn assess_batch(&self) -> Vec<OverallAssessment> {
        self.store
            .symbols()
            .map(|symbol| self.overall_assessment(symbol))
            .collect()
    }

    /// Two-phase cross-symbol pass: first every company's basic valuation,
    /// then each company against its sector peers' medians.
    pub fn relative_valuations(&self) -> Vec<RelativeValuation> {
        let peers: Vec<BasicValuation> = self
            .store
            .symbols()
            .filter_map(|symbol| self.valuation.basic_ratios(symbol).ok())
            .collect();
        peers
            .iter()
            .filter_map(|p| self.valuation.relative_valuation(&p.symbol, &peers).ok())
            .collect()
    }
}

/// Unwrap an indicator result, downgrading unavailability and faults to a
/// recorded factor. Faults are logged; unavailability is the expected path
/// for sparse records.
fn degraded<T>(
    indicator: &str,
    result: Result<T, AnalysisError>,
    factors: &mut Vec<String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(AnalysisError::InsufficientData(reason)) => {
            tracing::debug!(indicator, %reason, "indicator unavailable");
            factors.push(format!("{indicator} data unavailable"));
            None
        }
        Err(error) => {
            tracing::warn!(indicator, %error, "indicator failed, degrading to unavailable");
            factors.push(format!("{indicator} data unavailable"));
            None
        }
    }
}

fn reliability_grade(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "A+",
        s if s >= 80.0 => "A",
        s if s >= 70.0 => "B+",
        s if s >= 60.0 => "B",
        s if s >= 50.0 => "C+",
        s if s >= 40.0 => "C",
        s if s >= 30.0 => "D",
        _ => "F",
    }
}

fn growth_grade(score: f64) -> &'static str {
    match score {
        s if s >= 85.0 => "Excellent",
        s if s >= 70.0 => "High",
        s if s >= 55.0 => "Good",
        s if s >= 40.0 => "Moderate",
        s if s >= 25.0 => "Low",
        _ => "Poor",
    }
}

fn valuation_grade(score: f64) -> &'static str {
    match score {
        s if s >= 85.0 => "Excellent",
        s if s >= 70.0 => "Good",
        s if s >= 55.0 => "Fair",
        s if s >= 40.0 => "Expensive",
        _ => "Overvalued",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    /// A top-band company: current ratio 2.2, quick 1.6, D/E 0.25, no
    /// interest expense, ROE 18%, net margin 16%, operating margin 22%,
    /// revenue and earnings compounding at 20% with no volatility.
    fn acme_store() -> RecordStore {
        RecordStore::from_json_value(json!({
            "ACME": {
                "company_info": { "sector": "Industrials", "market_cap": 10_000.0 },
                "current_price_info": { "current_price": 42.0 },
                "financial_statements": {
                    "annual": {
                        "income_statement": {
                            "2020-03-31": {
                                "Total Revenue": { "value": 781.25 },
                                "Net Income": { "value": 125.0 }
                            },
                            "2021-03-31": {
                                "Total Revenue": { "value": 937.5 },
                                "Net Income": { "value": 150.0 }
                            },
                            "2022-03-31": {
                                "Total Revenue": { "value": 1125.0 },
                                "Net Income": { "value": 180.0 }
                            },
                            "2023-03-31": {
                                "Total Revenue": { "value": 1350.0 },
                                "Net Income": { "value": 216.0 },
                                "Operating Income": { "value": 297.0 }
                            }
                        },
                        "balance_sheet": {
                            "2023-03-31": {
                                "Current Assets": { "value": 2200.0 },
                                "Current Liabilities": { "value": 1000.0 },
                                "Inventory": { "value": 600.0 },
                                "Cash And Cash Equivalents": { "value": 500.0 },
                                "Total Assets": { "value": 2400.0 },
                                "Stockholders Equity": { "value": 1200.0 },
                                "Total Debt": { "value": 300.0 }
                            }
                        }
                    }
                },
                "financial_health": { "return_on_equity": 0.18 }
            }
        }))
        .unwrap()
    }

    #[test]
    fn top_band_company_scores_full_reliability() {
        let store = acme_store();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let reliability = aggregator.reliability_score("ACME");

        // 15 (ROE) + 10 (net margin) + 10 (op margin) + 15 (current) +
        // 10 (quick) + 15 (D/E) + 10 (unbounded coverage) + 10 + 5 (growth)
        assert_relative_eq!(reliability.score, 100.0);
        assert_eq!(reliability.grade, "A+");
        assert!(reliability
            .factors
            .contains(&"Excellent ROE (15%+)".to_string()));
    }

    #[test]
    fn top_band_company_growth_scope_excellent() {
        let store = acme_store();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let growth = aggregator.growth_scope("ACME");

        // 15 + 12 (revenue) + 12 + 10 (earnings) + 9 + 4 (ROE/ROA) +
        // 10 (debt capacity) + 5 (cash) + 10 (SGR) = 87
        assert_relative_eq!(growth.score, 87.0);
        assert_eq!(growth.grade, "Excellent");
    }

    #[test]
    fn weighted_overall_score_and_grade() {
        let store = acme_store();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let assessment = aggregator.overall_assessment("ACME");

        let expected = math::round_to(
            assessment.reliability.score * 0.40
                + assessment.growth.score * 0.35
                + assessment.valuation.score * 0.25,
            1,
        );
        assert_relative_eq!(assessment.overall_score, expected);
        // No valuation snapshot: valuation degrades to 0 with a factor.
        assert_relative_eq!(assessment.valuation.score, 0.0);
        assert!(assessment
            .valuation
            .factors
            .contains(&"Valuation data unavailable".to_string()));
        // 0.4*100 + 0.35*87 ~= 70.5 => B+ / Buy.
        assert_relative_eq!(assessment.overall_score, 70.5, epsilon = 0.11);
        assert_eq!(assessment.overall_grade, OverallGrade::BPlus);
        assert_eq!(assessment.recommendation, "Buy");
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }

    #[test]
    fn grade_ladder_weighted_example() {
        // The canonical 80/60/50 weighted example: 65.5 => B+ / Buy.
        let overall = 0.40 * 80.0 + 0.35 * 60.0 + 0.25 * 50.0;
        assert_relative_eq!(overall, 65.5);
        let grade = OverallGrade::from_score(overall);
        assert_eq!(grade, OverallGrade::BPlus);
        assert_eq!(grade.recommendation(), "Buy");
    }

    #[test]
    fn high_risk_from_leverage_and_liquidity() {
        let store = RecordStore::from_json_value(json!({
            "RISKY": {
                "financial_statements": {
                    "annual": {
                        "balance_sheet": {
                            "2023-03-31": {
                                "Current Assets": { "value": 800.0 },
                                "Current Liabilities": { "value": 1000.0 },
                                "Total Assets": { "value": 5000.0 },
                                "Stockholders Equity": { "value": 1200.0 },
                                "Total Debt": { "value": 3000.0 }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let assessment = aggregator.overall_assessment("RISKY");

        // D/E 2.5 adds 30, current ratio 0.8 adds 20: 50 points => High.
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(assessment
            .risk_factors
            .contains(&"Very high debt levels".to_string()));
        assert!(assessment
            .risk_factors
            .contains(&"Poor liquidity".to_string()));
    }

    #[test]
    fn partial_degradation_keeps_other_buckets() {
        // No income statement at all: profitability and growth degrade, but
        // liquidity and leverage still score.
        let store = RecordStore::from_json_value(json!({
            "PART": {
                "financial_statements": {
                    "annual": {
                        "balance_sheet": {
                            "2023-03-31": {
                                "Current Assets": { "value": 2000.0 },
                                "Current Liabilities": { "value": 1000.0 },
                                "Total Assets": { "value": 4000.0 },
                                "Stockholders Equity": { "value": 2000.0 },
                                "Total Debt": { "value": 400.0 }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let reliability = aggregator.reliability_score("PART");

        // 15 (current) + 10 (quick) + 15 (D/E 0.2) + 10 (unbounded coverage)
        assert_relative_eq!(reliability.score, 50.0);
        assert!(reliability
            .factors
            .contains(&"Profitability data unavailable".to_string()));
    }

    #[test]
    fn unknown_symbol_still_yields_complete_assessment() {
        let store = acme_store();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let assessment = aggregator.overall_assessment("NOPE");

        assert_relative_eq!(assessment.overall_score, 0.0);
        assert_eq!(assessment.overall_grade, OverallGrade::NotRated);
        assert_eq!(assessment.recommendation, "Data Unavailable");
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(assessment
            .risk_factors
            .contains(&"Limited financial data available".to_string()));
    }

    #[test]
    fn assessments_are_deterministic() {
        let store = acme_store();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());

        let first = serde_json::to_string(&aggregator.overall_assessment("ACME")).unwrap();
        let second = serde_json::to_string(&aggregator.overall_assessment("ACME")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn summary_projection_shape() {
        let store = acme_store();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let summary = aggregator.summary("ACME");

        assert_eq!(summary.symbol, "ACME");
        assert_eq!(summary.key_highlights.len(), 4);
        assert_eq!(summary.key_highlights[0], "Reliability: 100/100");
        assert_eq!(summary.key_highlights[3], "Risk: Low");
        assert_relative_eq!(
            summary.overall_score,
            aggregator.overall_assessment("ACME").overall_score
        );
    }

    #[test]
    fn batch_covers_all_symbols_in_order() {
        let store = RecordStore::from_json_value(json!({
            "BBB": {},
            "AAA": {}
        }))
        .unwrap();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let batch = aggregator.assess_batch();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].symbol, "AAA");
        assert_eq!(batch[1].symbol, "BBB");
    }

    #[test]
    fn relative_valuations_two_phase() {
        let company = |pe: f64| {
            json!({
                "company_info": { "sector": "Tech", "market_cap": 1000.0 },
                "current_price_info": { "current_price": 10.0 },
                "valuation_metrics": { "pe_ratio": pe }
            })
        };
        let store = RecordStore::from_json_value(json!({
            "AAA": company(10.0),
            "BBB": company(20.0),
            "CCC": company(40.0)
        }))
        .unwrap();
        let aggregator = ScoreAggregator::new(&store).with_timestamp(fixed_time());
        let relatives = aggregator.relative_valuations();

        assert_eq!(relatives.len(), 3);
        let aaa = relatives.iter().find(|r| r.symbol == "AAA").unwrap();
        assert_relative_eq!(aaa.sector_median_pe.value().unwrap(), 20.0);
        assert_relative_eq!(aaa.pe_relative_to_sector.value().unwrap(), 0.5);
    }
}
