// 1.0: all the primitives live here. nothing in the valuation core works without these types.
// Q30 amounts, token amounts, sides, price bounds, chains, addresses, position keys.
// each is a newtype so the compiler catches a price passed where a size was expected.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::fixed_point::USD_DECIMALS;

/// Unsigned fixed-point value scaled by 10^30.
///
/// Used for USD amounts, USD prices and Q30-scaled ratios (leverage, percentages).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Q30(BigUint);

impl Q30 {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_raw(raw: BigUint) -> Self {
        Self(raw)
    }

    /// Whole units, e.g. `Q30::from_units(2000)` is $2000.
    pub fn from_units(units: u64) -> Self {
        Self(BigUint::from(units) * crate::fixed_point::usd_precision())
    }

    /// Parses a human decimal such as `"2100.25"`. Digits past 30 decimals are floored away.
    pub fn from_decimal_str(text: &str) -> Result<Self, ValidationError> {
        crate::presenter::parse_decimal(text, USD_DECIMALS).map(Self)
    }

    pub fn raw(&self) -> &BigUint {
        &self.0
    }

    pub fn into_raw(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, other: &Q30) -> Self {
        Self(&self.0 + &other.0)
    }

    /// |self - other| together with whether self was the larger side.
    pub fn abs_diff(&self, other: &Q30) -> (Self, bool) {
        if self.0 >= other.0 {
            (Self(&self.0 - &other.0), true)
        } else {
            (Self(&other.0 - &self.0), false)
        }
    }

    /// Floor-truncated decimal view with `dp` fractional digits.
    /// `None` when the value does not fit a `Decimal`.
    pub fn to_decimal(&self, dp: u32) -> Option<rust_decimal::Decimal> {
        crate::presenter::to_decimal(&self.0, USD_DECIMALS, dp)
    }
}

impl fmt::Display for Q30 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::presenter::format_fixed(&self.0, USD_DECIMALS, USD_DECIMALS))
    }
}

impl<'a> Sum<&'a Q30> for Q30 {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, q| acc.add(q))
    }
}

// 1.1: signed Q30. sign is carried as a flag next to the magnitude, never two's complement.
// zero is always non-negative so there is exactly one representation of "no pnl".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignedQ30 {
    magnitude: Q30,
    negative: bool,
}

impl SignedQ30 {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(magnitude: Q30, negative: bool) -> Self {
        let negative = negative && !magnitude.is_zero();
        Self { magnitude, negative }
    }

    pub fn profit(magnitude: Q30) -> Self {
        Self::new(magnitude, false)
    }

    pub fn loss(magnitude: Q30) -> Self {
        Self::new(magnitude, true)
    }

    pub fn magnitude(&self) -> &Q30 {
        &self.magnitude
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn add(&self, other: &SignedQ30) -> Self {
        if self.negative == other.negative {
            return Self::new(self.magnitude.add(&other.magnitude), self.negative);
        }
        let (diff, self_larger) = self.magnitude.abs_diff(&other.magnitude);
        let negative = if self_larger { self.negative } else { other.negative };
        Self::new(diff, negative)
    }
}

impl fmt::Display for SignedQ30 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

impl PartialOrd for SignedQ30 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SignedQ30 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
        }
    }
}

impl<'a> Sum<&'a SignedQ30> for SignedQ30 {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, q| acc.add(q))
    }
}

// 1.2: amount in a token's native precision (10^decimals).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: BigUint,
    decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: BigUint, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(BigUint::zero(), decimals)
    }

    pub fn raw(&self) -> &BigUint {
        &self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = u32::from(self.decimals);
        write!(f, "{}", crate::presenter::format_fixed(&self.raw, dp, dp))
    }
}

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn from_is_long(is_long: bool) -> Self {
        if is_long {
            Side::Long
        } else {
            Side::Short
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Side::Long)
    }

    // 1.3: the bound that values this side's pnl conservatively.
    // a long exits at the low quote, a short buys back at the high quote.
    pub fn index_price_bound(&self) -> PriceBound {
        match self {
            Side::Long => PriceBound::Min,
            Side::Short => PriceBound::Max,
        }
    }

    // converting collateral USD to tokens at the high quote yields the fewest tokens
    pub fn collateral_price_bound(&self) -> PriceBound {
        PriceBound::Max
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// Which end of the oracle spread to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBound {
    Min,
    Max,
}

impl PriceBound {
    pub fn maximise(&self) -> bool {
        matches!(self, PriceBound::Max)
    }
}

// 1.4: chains the venue is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Arbitrum,
    Avalanche,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Arbitrum => write!(f, "arbitrum"),
            Chain::Avalanche => write!(f, "avalanche"),
        }
    }
}

impl FromStr for Chain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arbitrum" | "42161" => Ok(Chain::Arbitrum),
            "avalanche" | "avax" | "43114" => Ok(Chain::Avalanche),
            other => Err(ValidationError::UnknownChain(other.to_string())),
        }
    }
}

// 1.5: hex addresses, stored lowercased so lookups ignore checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<AccountAddress> for String {
    fn from(a: AccountAddress) -> Self {
        a.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TokenAddress(String);

impl TokenAddress {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TokenAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<TokenAddress> for String {
    fn from(a: TokenAddress) -> Self {
        a.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub address: TokenAddress,
    pub decimals: u8,
}

// 1.6: identifies one position slot on the venue. size 0 means flat, not absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub account: AccountAddress,
    pub index_token: TokenAddress,
    pub collateral_token: TokenAddress,
    pub side: Side,
}

impl PositionKey {
    pub fn new(
        account: AccountAddress,
        index_token: TokenAddress,
        collateral_token: TokenAddress,
        side: Side,
    ) -> Self {
        Self {
            account,
            index_token,
            collateral_token,
            side,
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}:{}",
            self.account, self.index_token, self.collateral_token, self.side
        )
    }
}

/// One oracle reading for one token, valid for the instant it was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub token: TokenAddress,
    pub price: Q30,
}

impl PriceQuote {
    pub fn new(token: TokenAddress, price: Q30) -> Self {
        Self { token, price }
    }
}

// 1.7: venue timestamp. 0 on the wire = never updated.
// a non-zero value always holds a real instant, so "never" cannot be faked by a bad timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnixTime(Option<DateTime<Utc>>);

impl UnixTime {
    pub const NEVER: UnixTime = UnixTime(None);

    /// `None` when `secs` is past what a UTC datetime can represent.
    pub fn from_secs(secs: u64) -> Option<Self> {
        if secs == 0 {
            return Some(Self::NEVER);
        }
        let secs = i64::try_from(secs).ok()?;
        DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| Self(Some(dt)))
    }

    pub fn secs(&self) -> u64 {
        self.0.map_or(0, |dt| dt.timestamp().unsigned_abs())
    }

    pub fn is_never(&self) -> bool {
        self.0.is_none()
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}
