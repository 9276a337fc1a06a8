// 3.0: raw on-chain position tuple and its validating decode.
// the venue returns eight positional fields. they are checked once here and
// turned into a typed record before any arithmetic sees them.
//
// field order: size, collateral, average price, entry funding rate,
// reserve amount, realized pnl, has profit, last increased time.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::types::{Q30, UnixTime};

pub const RAW_POSITION_FIELDS: usize = 8;

const FIELD_NAMES: [&str; RAW_POSITION_FIELDS] = [
    "size",
    "collateral",
    "averagePrice",
    "entryFundingRate",
    "reserveAmount",
    "realisedPnl",
    "hasRealisedProfit",
    "lastIncreasedTime",
];

/// One positional field of the raw tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireField", into = "WireField")]
pub enum RawValue {
    Uint(BigUint),
    Bool(bool),
}

impl RawValue {
    pub fn uint(value: impl Into<BigUint>) -> Self {
        RawValue::Uint(value.into())
    }
}

// 3.1: JSON shape of a field. integers above u64 travel as decimal or 0x-hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireField {
    Flag(bool),
    Number(u64),
    Text(String),
}

impl TryFrom<WireField> for RawValue {
    type Error = String;

    fn try_from(field: WireField) -> Result<Self, Self::Error> {
        match field {
            WireField::Flag(b) => Ok(RawValue::Bool(b)),
            WireField::Number(n) => Ok(RawValue::Uint(BigUint::from(n))),
            WireField::Text(text) => parse_uint_text(&text)
                .map(RawValue::Uint)
                .ok_or_else(|| format!("not an unsigned integer: {text:?}")),
        }
    }
}

impl From<RawValue> for WireField {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Uint(n) => WireField::Text(n.to_string()),
            RawValue::Bool(b) => WireField::Flag(b),
        }
    }
}

fn parse_uint_text(text: &str) -> Option<BigUint> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return BigUint::parse_bytes(hex.as_bytes(), 16);
    }
    BigUint::parse_bytes(text.as_bytes(), 10)
}

/// Typed position record. Read fresh per call, never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPosition {
    pub size_usd: Q30,
    pub collateral_usd: Q30,
    pub avg_price: Q30,
    pub entry_funding_rate: BigUint,
    /// Token units of the collateral token reserved by the pool.
    pub reserve_amount: BigUint,
    pub realized_pnl: Q30,
    pub has_profit: bool,
    pub last_updated: UnixTime,
}

impl RawPosition {
    /// The all-zero tuple the venue returns for a slot that was never opened or is closed.
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.size_usd.is_zero()
    }

    // 3.2: rejects short, long, or mistyped tuples before any math runs
    pub fn decode(fields: &[RawValue]) -> Result<Self, PositionError> {
        if fields.len() != RAW_POSITION_FIELDS {
            return Err(PositionError::malformed(format!(
                "expected {} fields, got {}",
                RAW_POSITION_FIELDS,
                fields.len()
            )));
        }

        let last_updated = uint_at(fields, 7)?
            .to_u64()
            .and_then(UnixTime::from_secs)
            .ok_or_else(|| PositionError::malformed("lastIncreasedTime is not a representable timestamp"))?;

        Ok(Self {
            size_usd: Q30::from_raw(uint_at(fields, 0)?.clone()),
            collateral_usd: Q30::from_raw(uint_at(fields, 1)?.clone()),
            avg_price: Q30::from_raw(uint_at(fields, 2)?.clone()),
            entry_funding_rate: uint_at(fields, 3)?.clone(),
            reserve_amount: uint_at(fields, 4)?.clone(),
            realized_pnl: Q30::from_raw(uint_at(fields, 5)?.clone()),
            has_profit: bool_at(fields, 6)?,
            last_updated,
        })
    }

    /// Inverse of [`RawPosition::decode`].
    pub fn encode(&self) -> Vec<RawValue> {
        vec![
            RawValue::Uint(self.size_usd.raw().clone()),
            RawValue::Uint(self.collateral_usd.raw().clone()),
            RawValue::Uint(self.avg_price.raw().clone()),
            RawValue::Uint(self.entry_funding_rate.clone()),
            RawValue::Uint(self.reserve_amount.clone()),
            RawValue::Uint(self.realized_pnl.raw().clone()),
            RawValue::Bool(self.has_profit),
            RawValue::Uint(BigUint::from(self.last_updated.secs())),
        ]
    }
}

fn uint_at(fields: &[RawValue], idx: usize) -> Result<&BigUint, PositionError> {
    match &fields[idx] {
        RawValue::Uint(n) => Ok(n),
        RawValue::Bool(_) => Err(PositionError::malformed(format!(
            "{} must be an unsigned integer, got bool",
            FIELD_NAMES[idx]
        ))),
    }
}

fn bool_at(fields: &[RawValue], idx: usize) -> Result<bool, PositionError> {
    match &fields[idx] {
        RawValue::Bool(b) => Ok(*b),
        RawValue::Uint(_) => Err(PositionError::malformed(format!(
            "{} must be a bool, got integer",
            FIELD_NAMES[idx]
        ))),
    }
}
