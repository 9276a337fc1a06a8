//! Single-position valuation.
//!
//! Turns a raw position record plus two price quotes taken at the same instant
//! (index token and collateral token) into a fully derived [`Position`]:
//! collateral in token units, unrealized PnL, leverage and an approximate
//! liquidation price. Pure: identical inputs always give identical output.
//!
//! The liquidation price is an approximation. It is the price at which the
//! unrealized loss equals posted collateral, ignoring funding fees, borrow
//! fees and the venue's maintenance-margin buffer. It is not a settlement value.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::fixed_point::{mul_div, ratio, usd_to_token};
use crate::raw_position::RawPosition;
use crate::types::{PositionKey, PriceQuote, Q30, Side, SignedQ30, TokenAmount};

/// Data-quality notes attached to an otherwise successful valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationWarning {
    /// Open position with a zero average price. Leverage and PnL are reported as 0.
    ZeroAveragePrice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub side: Side,
    pub size: Q30,
    pub collateral_amount: TokenAmount,
    pub collateral_usd: Q30,
    pub average_price: Q30,
    pub current_price: Q30,
    pub entry_funding_rate: BigUint,
    pub has_profit: bool,
    pub realized_pnl: Q30,
    pub unrealized_pnl_usd: SignedQ30,
    /// PnL relative to posted collateral, Q30-scaled percent. Can exceed 100.
    pub unrealized_pnl_percentage: SignedQ30,
    /// Notional leverage: size / collateral, Q30-scaled. Not adjusted for PnL.
    pub leverage: Q30,
    pub liquidation_price: Q30,
    pub last_updated: Option<DateTime<Utc>>,
    pub warnings: Vec<ValuationWarning>,
}

impl Position {
    /// Terminal state of a closed or never-opened slot. Every derived field is zero.
    pub fn flat(raw: &RawPosition, side: Side, collateral_decimals: u8) -> Self {
        Self {
            side,
            size: Q30::zero(),
            collateral_amount: TokenAmount::zero(collateral_decimals),
            collateral_usd: raw.collateral_usd.clone(),
            average_price: raw.avg_price.clone(),
            current_price: Q30::zero(),
            entry_funding_rate: raw.entry_funding_rate.clone(),
            has_profit: raw.has_profit,
            realized_pnl: raw.realized_pnl.clone(),
            unrealized_pnl_usd: SignedQ30::zero(),
            unrealized_pnl_percentage: SignedQ30::zero(),
            leverage: Q30::zero(),
            liquidation_price: Q30::zero(),
            last_updated: raw.last_updated.to_datetime(),
            warnings: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.size.is_zero()
    }

    /// Leverage as a plain multiple, e.g. `5.00`.
    pub fn leverage_multiple(&self, dp: u32) -> Option<rust_decimal::Decimal> {
        self.leverage.to_decimal(dp)
    }

    /// Distance between average price and liquidation price.
    pub fn liquidation_distance(&self) -> Q30 {
        self.average_price.abs_diff(&self.liquidation_price).0
    }
}

/// A valued position together with the key and symbols it was read under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionReport {
    pub key: PositionKey,
    pub index_symbol: String,
    pub collateral_symbol: String,
    pub position: Position,
}

/// Values one position.
///
/// Both quotes must come from the same instant. `index` prices the traded
/// token, `collateral` converts the posted USD collateral back to token units.
pub fn value_position(
    raw: &RawPosition,
    index: &PriceQuote,
    collateral: &PriceQuote,
    collateral_decimals: u8,
    side: Side,
) -> Result<Position, PositionError> {
    if raw.is_flat() {
        return Ok(Position::flat(raw, side, collateral_decimals));
    }

    if collateral.price.is_zero() {
        return Err(PositionError::oracle(&collateral.token, "zero collateral price on open position"));
    }
    if index.price.is_zero() {
        return Err(PositionError::oracle(&index.token, "zero index price on open position"));
    }

    let collateral_amount = usd_to_token(&raw.collateral_usd, collateral, collateral_decimals)?;
    let mut position = Position {
        side,
        size: raw.size_usd.clone(),
        collateral_amount,
        collateral_usd: raw.collateral_usd.clone(),
        average_price: raw.avg_price.clone(),
        current_price: index.price.clone(),
        entry_funding_rate: raw.entry_funding_rate.clone(),
        has_profit: raw.has_profit,
        realized_pnl: raw.realized_pnl.clone(),
        unrealized_pnl_usd: SignedQ30::zero(),
        unrealized_pnl_percentage: SignedQ30::zero(),
        leverage: Q30::zero(),
        liquidation_price: Q30::zero(),
        last_updated: raw.last_updated.to_datetime(),
        warnings: Vec::new(),
    };

    if raw.avg_price.is_zero() {
        tracing::warn!(
            size = %raw.size_usd,
            side = %side,
            "open position has zero average price, reporting flat-equivalent risk"
        );
        position.warnings.push(ValuationWarning::ZeroAveragePrice);
        return Ok(position);
    }

    position.unrealized_pnl_usd = unrealized_pnl(raw, &index.price, side)?;
    position.unrealized_pnl_percentage = pnl_percentage(&position.unrealized_pnl_usd, &raw.collateral_usd)?;
    position.leverage = leverage(&raw.size_usd, &raw.collateral_usd)?;
    position.liquidation_price = approximate_liquidation_price(raw, side)?;

    Ok(position)
}

// 4.1: size * delta / avg. delta is oriented so positive always means profitable.
fn unrealized_pnl(raw: &RawPosition, current: &Q30, side: Side) -> Result<SignedQ30, PositionError> {
    let (delta, price_rose) = current.abs_diff(&raw.avg_price);
    let profitable = match side {
        Side::Long => price_rose,
        Side::Short => !price_rose,
    };
    let magnitude = mul_div(&raw.size_usd, &delta, &raw.avg_price, "unrealized_pnl")?;
    Ok(SignedQ30::new(magnitude, !profitable))
}

// 4.2: relative to margin, not notional
fn pnl_percentage(pnl: &SignedQ30, collateral_usd: &Q30) -> Result<SignedQ30, PositionError> {
    if collateral_usd.is_zero() {
        return Ok(SignedQ30::zero());
    }
    let scaled = Q30::from_raw(pnl.magnitude().raw() * 100u32);
    let pct = ratio(&scaled, collateral_usd)?;
    Ok(SignedQ30::new(pct, pnl.is_negative()))
}

fn leverage(size_usd: &Q30, collateral_usd: &Q30) -> Result<Q30, PositionError> {
    if collateral_usd.is_zero() {
        return Ok(Q30::zero());
    }
    Ok(ratio(size_usd, collateral_usd)?)
}

// 4.3: price at which the loss eats all collateral. no fees, no maintenance buffer.
fn approximate_liquidation_price(raw: &RawPosition, side: Side) -> Result<Q30, PositionError> {
    let price_move = mul_div(&raw.collateral_usd, &raw.avg_price, &raw.size_usd, "liquidation_price")?;
    Ok(match side {
        Side::Long => {
            let (distance, avg_above) = raw.avg_price.abs_diff(&price_move);
            if avg_above {
                distance
            } else {
                Q30::zero()
            }
        }
        Side::Short => raw.avg_price.add(&price_move),
    })
}
