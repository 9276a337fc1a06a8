//! Integer fixed-point primitives.
//!
//! Two precision domains exist: USD values and prices at 10^30, and token
//! amounts at 10^decimals of the token. Every operation multiplies first and
//! divides once on arbitrary precision integers, so nothing is truncated
//! between the two steps, and every division floors.
//!
//! Dividing by a zero price is an oracle failure, never a zero result: a
//! zero here would read as "worthless", which is a different claim.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{MathError, PositionError};
use crate::types::{PriceQuote, Q30, TokenAmount};

/// Fractional digits of every USD value and price.
pub const USD_DECIMALS: u32 = 30;

/// 10^30.
pub fn usd_precision() -> BigUint {
    pow10(USD_DECIMALS)
}

/// 10^decimals for a token.
pub fn token_precision(decimals: u8) -> BigUint {
    pow10(u32::from(decimals))
}

pub fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u8).pow(exp)
}

/// floor(a * b / d)
pub fn mul_div_floor(
    a: &BigUint,
    b: &BigUint,
    d: &BigUint,
    op: &'static str,
) -> Result<BigUint, MathError> {
    if d.is_zero() {
        return Err(MathError::DivisionByZero(op));
    }
    Ok(a * b / d)
}

/// amount * price / 10^decimals, in Q30.
pub fn token_to_usd(amount: &TokenAmount, quote: &PriceQuote) -> Q30 {
    let precision = token_precision(amount.decimals());
    Q30::from_raw(amount.raw() * quote.price.raw() / precision)
}

/// amount * 10^decimals / price, in token units. Fails on a zero price.
pub fn usd_to_token(
    amount: &Q30,
    quote: &PriceQuote,
    decimals: u8,
) -> Result<TokenAmount, PositionError> {
    if quote.price.is_zero() {
        return Err(PositionError::oracle(&quote.token, "zero price"));
    }
    let raw = mul_div_floor(amount.raw(), &token_precision(decimals), quote.price.raw(), "usd_to_token")?;
    Ok(TokenAmount::new(raw, decimals))
}

/// a * 10^30 / b. the result is itself Q30-scaled, so 5x leverage is 5 * 10^30.
pub fn ratio(a: &Q30, b: &Q30) -> Result<Q30, MathError> {
    mul_div_floor(a.raw(), &usd_precision(), b.raw(), "ratio").map(Q30::from_raw)
}

/// a * b / d on Q30 operands, with the full product kept before dividing.
pub fn mul_div(a: &Q30, b: &Q30, d: &Q30, op: &'static str) -> Result<Q30, MathError> {
    mul_div_floor(a.raw(), b.raw(), d.raw(), op).map(Q30::from_raw)
}
