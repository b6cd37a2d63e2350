//! Valuation indicators: per-share metrics and price multiples (snapshot
//! values take precedence over derived fallbacks), a DCF fair-value model,
//! and relative valuation against same-sector peers.
//!
//! Relative valuation runs as a second batch phase: callers first compute
//! [`BasicValuation`] for every symbol, then hand the batch back in as the
//! peer set. Nothing here recurses into other companies' valuations.

use analysis_core::{math, AnalysisError, Metric};
use record_store::{fields, RecordStore, StatementKind};
use serde::Serialize;

mod dcf;

pub use dcf::{CashFlowSource, DcfConfig, DcfValuation, ValuationSignal};

#[derive(Debug, Clone, Serialize)]
pub struct BasicValuation {
    pub symbol: String,
    pub sector: String,
    pub market_cap: f64,
    pub current_price: f64,
    pub pe_ratio: Metric,
    pub forward_pe: Metric,
    pub pb_ratio: Metric,
    pub ps_ratio: Metric,
    pub peg_ratio: Metric,
    pub enterprise_value: Metric,
    pub ev_to_revenue: Metric,
    pub ev_to_ebitda: Metric,
    pub eps: Metric,
    pub book_value_per_share: Metric,
    pub revenue_per_share: Metric,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelativeValuation {
    pub symbol: String,
    pub sector: String,
    /// Same-sector peers with valuation data, including the company itself.
    pub peer_count: usize,
    pub company_pe: Metric,
    pub sector_median_pe: Metric,
    pub pe_relative_to_sector: Metric,
    pub company_pb: Metric,
    pub sector_median_pb: Metric,
    pub pb_relative_to_sector: Metric,
    pub company_ps: Metric,
    pub sector_median_ps: Metric,
    pub ps_relative_to_sector: Metric,
}

pub struct ValuationAnalyzer<'a> {
    store: &'a RecordStore,
    dcf_config: DcfConfig,
}

impl<'a> ValuationAnalyzer<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            dcf_config: DcfConfig::default(),
        }
    }

    pub fn with_dcf_config(mut self, config: DcfConfig) -> Self {
        self.dcf_config = config;
        self
    }

    pub fn basic_ratios(&self, symbol: &str) -> Result<BasicValuation, AnalysisError> {
        let Some(company) = self.store.company(symbol) else {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: unknown symbol"
            )));
        };
        let Some(snapshot) = self.store.valuation_snapshot(symbol) else {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: no valuation metrics snapshot"
            )));
        };

        let latest_revenue = self
            .store
            .annual_series(symbol, StatementKind::Income, fields::TOTAL_REVENUE)
            .latest_value();
        let latest_net_income = self
            .store
            .annual_series(symbol, StatementKind::Income, fields::NET_INCOME)
            .latest_value();
        let latest_book_value = self
            .store
            .annual_series(symbol, StatementKind::Balance, fields::STOCKHOLDERS_EQUITY)
            .latest_value();
        let latest_shares = self
            .store
            .annual_series(symbol, StatementKind::Income, fields::BASIC_AVERAGE_SHARES)
            .latest_value();

        let eps = math::safe_divide(latest_net_income, latest_shares);
        let book_value_per_share = math::safe_divide(latest_book_value, latest_shares);
        let revenue_per_share = math::safe_divide(latest_revenue, latest_shares);

        let price = Metric::new(company.current_price);
        let market_cap = Metric::new(company.market_cap);

        // Snapshot ratios are authoritative; derive only when absent.
        let prefer = |snapshot_value: Metric, derived: Metric| {
            if snapshot_value.is_defined() {
                snapshot_value
            } else {
                derived
            }
        };
        let pe_ratio = prefer(snapshot.pe_ratio, math::safe_divide(price, eps));
        let pb_ratio = prefer(
            snapshot.price_to_book,
            math::safe_divide(price, book_value_per_share),
        );
        let ps_ratio = prefer(
            snapshot.price_to_sales,
            math::safe_divide(market_cap, latest_revenue),
        );

        Ok(BasicValuation {
            symbol: symbol.to_string(),
            sector: company.sector,
            market_cap: company.market_cap,
            current_price: company.current_price,
            pe_ratio: pe_ratio.rounded(2),
            forward_pe: snapshot.forward_pe,
            pb_ratio: pb_ratio.rounded(2),
            ps_ratio: ps_ratio.rounded(2),
            peg_ratio: snapshot.peg_ratio,
            enterprise_value: snapshot.enterprise_value,
            ev_to_revenue: snapshot.ev_to_revenue,
            ev_to_ebitda: snapshot.ev_to_ebitda,
            eps: eps.rounded(2),
            book_value_per_share: book_value_per_share.rounded(2),
            revenue_per_share: revenue_per_share.rounded(2),
        })
    }

    /// DCF fair value from the free-cash-flow series, falling back to
    /// operating cash flow. See [`DcfConfig::validate`] for the
    /// configuration guard.
    pub fn dcf_valuation(&self, symbol: &str) -> Result<DcfValuation, AnalysisError> {
        dcf::dcf_valuation(self.store, symbol, self.dcf_config)
    }

    /// Phase-two relative valuation: company multiples against the median of
    /// same-sector peers drawn from a precomputed batch.
    pub fn relative_valuation(
        &self,
        symbol: &str,
        peers: &[BasicValuation],
    ) -> Result<RelativeValuation, AnalysisError> {
        let Some(company) = peers.iter().find(|p| p.symbol == symbol) else {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: no valuation in peer batch"
            )));
        };

        let sector_peers: Vec<&BasicValuation> = peers
            .iter()
            .filter(|p| p.sector == company.sector)
            .collect();
        if sector_peers.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "{symbol}: fewer than two {} peers with valuation data",
                company.sector
            )));
        }

        let median_of = |extract: fn(&BasicValuation) -> Metric| {
            let values: Vec<Metric> = sector_peers.iter().map(|p| extract(p)).collect();
            math::median(&values).rounded(2)
        };
        let sector_median_pe = median_of(|p| p.pe_ratio);
        let sector_median_pb = median_of(|p| p.pb_ratio);
        let sector_median_ps = median_of(|p| p.ps_ratio);

        Ok(RelativeValuation {
            symbol: symbol.to_string(),
            sector: company.sector.clone(),
            peer_count: sector_peers.len(),
            company_pe: company.pe_ratio,
            sector_median_pe,
            pe_relative_to_sector: math::safe_divide(company.pe_ratio, sector_median_pe)
                .rounded(2),
            company_pb: company.pb_ratio,
            sector_median_pb,
            pb_relative_to_sector: math::safe_divide(company.pb_ratio, sector_median_pb)
                .rounded(2),
            company_ps: company.ps_ratio,
            sector_median_ps,
            ps_relative_to_sector: math::safe_divide(company.ps_ratio, sector_median_ps)
                .rounded(2),
        })
    }
}
