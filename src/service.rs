// 9.0: position service. the I/O-facing entry points.
// direct queries fail loud: every error reaches the caller unmodified.
// portfolio scans are best-effort: see portfolio.rs for the skip rules.
//
// each valuation reads its raw tuple and both prices fresh. nothing is cached,
// so the two quotes inside one valuation always come from the same call.

use futures_util::future::try_join;

use crate::config::ValuationConfig;
use crate::error::PositionError;
use crate::portfolio::{enumerate_candidates, fan_out, Candidate, PortfolioSummary};
use crate::presenter::Presenter;
use crate::raw_position::RawPosition;
use crate::types::{AccountAddress, Chain, PositionKey, PriceQuote, Side, TokenInfo};
use crate::valuation::{value_position, Position, PositionReport};
use crate::venue::{PositionReader, PriceOracle, TokenRegistry};

#[derive(Debug, Clone)]
pub struct PositionService<V, R> {
    venue: V,
    registry: R,
    config: ValuationConfig,
}

impl<V, R> PositionService<V, R>
where
    V: PositionReader + PriceOracle + Sync,
    R: TokenRegistry + Sync,
{
    pub fn new(venue: V, registry: R, config: ValuationConfig) -> Self {
        Self {
            venue,
            registry,
            config,
        }
    }

    pub fn venue(&self) -> &V {
        &self.venue
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    pub fn presenter(&self) -> Presenter {
        Presenter::from_config(&self.config)
    }

    /// Values one position by token symbols. Unknown chain or token is a
    /// `Validation` error; a closed slot is a flat `Position`, not an error.
    pub async fn get_position(
        &self,
        account: &AccountAddress,
        chain: Chain,
        index_symbol: &str,
        collateral_symbol: &str,
        side: Side,
    ) -> Result<PositionReport, PositionError> {
        self.config.chain(chain)?;
        let index = self.registry.resolve(chain, index_symbol)?;
        let collateral = self.registry.resolve(chain, collateral_symbol)?;
        self.read_position(chain, account, &index, &collateral, side).await
    }

    /// Scans every configured slot for `account` with the configured fan-out width.
    pub async fn scan_portfolio(
        &self,
        account: &AccountAddress,
        chain: Chain,
    ) -> Result<PortfolioSummary, PositionError> {
        self.scan_portfolio_with(account, chain, self.config.scan_concurrency)
            .await
    }

    /// Same as [`Self::scan_portfolio`] with a caller-chosen concurrency bound.
    pub async fn scan_portfolio_with(
        &self,
        account: &AccountAddress,
        chain: Chain,
        concurrency: usize,
    ) -> Result<PortfolioSummary, PositionError> {
        let chain_config = self.config.chain(chain)?;
        let candidates = enumerate_candidates(chain_config);

        tracing::info!(
            account = %account,
            chain = %chain,
            candidates = candidates.len(),
            concurrency,
            "scanning portfolio"
        );

        let outcomes = fan_out(candidates, concurrency, move |candidate: Candidate| async move {
            let outcome = self.evaluate_candidate(chain, account, &candidate).await;
            (candidate, outcome)
        })
        .await;

        let summary = PortfolioSummary::collect(account.clone(), chain, outcomes)?;

        tracing::info!(
            account = %account,
            chain = %chain,
            open = summary.positions.len(),
            skipped = summary.skipped.len(),
            total_size = %summary.total_size,
            "portfolio scan complete"
        );

        Ok(summary)
    }

    async fn evaluate_candidate(
        &self,
        chain: Chain,
        account: &AccountAddress,
        candidate: &Candidate,
    ) -> Result<PositionReport, PositionError> {
        let index = self.registry.resolve(chain, &candidate.index_symbol)?;
        let collateral = self.registry.resolve(chain, &candidate.collateral_symbol)?;
        self.read_position(chain, account, &index, &collateral, candidate.side)
            .await
    }

    async fn read_position(
        &self,
        chain: Chain,
        account: &AccountAddress,
        index: &TokenInfo,
        collateral: &TokenInfo,
        side: Side,
    ) -> Result<PositionReport, PositionError> {
        let key = PositionKey::new(
            account.clone(),
            index.address.clone(),
            collateral.address.clone(),
            side,
        );

        let fields = self
            .venue
            .fetch_raw_position(chain, &key)
            .await?
            .ok_or_else(|| PositionError::NotFound(key.clone()))?;
        let raw = RawPosition::decode(&fields)?;

        let position = if raw.is_flat() {
            tracing::debug!(key = %key, "position slot is flat");
            Position::flat(&raw, side, collateral.decimals)
        } else {
            let (index_price, collateral_price) = try_join(
                self.venue.fetch_price(chain, &index.address, side.index_price_bound()),
                self.venue.fetch_price(chain, &collateral.address, side.collateral_price_bound()),
            )
            .await?;

            value_position(
                &raw,
                &PriceQuote::new(index.address.clone(), index_price),
                &PriceQuote::new(collateral.address.clone(), collateral_price),
                collateral.decimals,
                side,
            )?
        };

        Ok(PositionReport {
            key,
            index_symbol: index.symbol.clone(),
            collateral_symbol: collateral.symbol.clone(),
            position,
        })
    }
}
