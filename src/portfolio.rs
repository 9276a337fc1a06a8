//! Portfolio scanning and aggregation.
//!
//! A scan enumerates every (index token, collateral token, side) slot an
//! account could hold on a chain, values each one independently and keeps the
//! open ones. Longs are collateralised by the index token itself; shorts by
//! each configured stable. Candidates are independent, so the reads fan out
//! under a caller-supplied bound while results keep enumeration order.
//!
//! One broken candidate never sinks the scan: data errors downgrade to
//! "skipped" and the rest of the portfolio is still reported.

use futures_util::stream::{self, StreamExt};
use std::future::Future;

use crate::config::ChainConfig;
use crate::error::PositionError;
use crate::types::{AccountAddress, Chain, Q30, Side, SignedQ30};
use crate::valuation::PositionReport;

/// One slot to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub index_symbol: String,
    pub collateral_symbol: String,
    pub side: Side,
}

#[derive(Debug, Clone)]
pub struct SkippedCandidate {
    pub candidate: Candidate,
    pub error: PositionError,
}

#[derive(Debug, Clone)]
pub struct PortfolioSummary {
    pub account: AccountAddress,
    pub chain: Chain,
    /// Open positions only, in enumeration order.
    pub positions: Vec<PositionReport>,
    pub total_size: Q30,
    pub total_unrealized_pnl: SignedQ30,
    pub total_collateral_value: Q30,
    pub skipped: Vec<SkippedCandidate>,
}

/// Longs first (index order), then shorts (index order x stable order). No re-sort.
pub fn enumerate_candidates(chain: &ChainConfig) -> Vec<Candidate> {
    let longs = chain.index_tokens.iter().map(|index| Candidate {
        index_symbol: index.clone(),
        collateral_symbol: index.clone(),
        side: Side::Long,
    });

    let shorts = chain.index_tokens.iter().flat_map(|index| {
        chain.stable_tokens.iter().map(move |stable| Candidate {
            index_symbol: index.clone(),
            collateral_symbol: stable.clone(),
            side: Side::Short,
        })
    });

    longs.chain(shorts).collect()
}

/// Runs `f` over `items` with at most `limit` futures in flight.
/// Output order matches input order.
pub async fn fan_out<I, F, Fut, T>(items: I, limit: usize, f: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(items).map(f).buffered(limit.max(1)).collect().await
}

impl PortfolioSummary {
    pub fn empty(account: AccountAddress, chain: Chain) -> Self {
        Self {
            account,
            chain,
            positions: Vec::new(),
            total_size: Q30::zero(),
            total_unrealized_pnl: SignedQ30::zero(),
            total_collateral_value: Q30::zero(),
            skipped: Vec::new(),
        }
    }

    // 5.1: flat slots drop silently, data errors become skips, anything else aborts.
    pub fn collect(
        account: AccountAddress,
        chain: Chain,
        outcomes: Vec<(Candidate, Result<PositionReport, PositionError>)>,
    ) -> Result<Self, PositionError> {
        let mut summary = Self::empty(account, chain);

        for (candidate, outcome) in outcomes {
            match outcome {
                Ok(report) if report.position.is_open() => summary.positions.push(report),
                Ok(_) => {
                    tracing::trace!(
                        index = %candidate.index_symbol,
                        collateral = %candidate.collateral_symbol,
                        side = %candidate.side,
                        "slot is flat"
                    );
                }
                Err(error) if error.is_skippable() => {
                    tracing::warn!(
                        index = %candidate.index_symbol,
                        collateral = %candidate.collateral_symbol,
                        side = %candidate.side,
                        error = %error,
                        "skipping portfolio candidate"
                    );
                    summary.skipped.push(SkippedCandidate { candidate, error });
                }
                Err(error) => return Err(error),
            }
        }

        summary.total();
        Ok(summary)
    }

    // 5.2: totals are exact integer sums, computed once the open set is known
    fn total(&mut self) {
        self.total_size = self.positions.iter().map(|r| &r.position.size).sum();
        self.total_unrealized_pnl = self.positions.iter().map(|r| &r.position.unrealized_pnl_usd).sum();
        self.total_collateral_value = self.positions.iter().map(|r| &r.position.collateral_usd).sum();
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
