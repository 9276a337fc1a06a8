// 6.0: rendering. Q30 integers become decimal strings here and nowhere earlier.
// no floats: digits are cut from the integer's decimal expansion, floor-truncated.

use chrono::SecondsFormat;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::ValuationConfig;
use crate::error::ValidationError;
use crate::fixed_point::{pow10, USD_DECIMALS};
use crate::portfolio::PortfolioSummary;
use crate::types::{Q30, SignedQ30, TokenAmount};
use crate::valuation::{PositionReport, ValuationWarning};

/// Renders `raw / 10^scale` with at most `max_dp` fractional digits.
/// Trailing zeros are dropped, so zero renders as `"0"` and $50 as `"50"`.
pub fn format_fixed(raw: &BigUint, scale: u32, max_dp: u32) -> String {
    let dp = max_dp.min(scale);
    let truncated = raw / pow10(scale - dp);
    let digits = truncated.to_string();
    let dp = dp as usize;

    let (int_part, frac_part) = if digits.len() > dp {
        let split = digits.len() - dp;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>dp$}"))
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Parses an unsigned decimal into an integer scaled by 10^scale.
/// Extra fractional digits are floored away.
pub fn parse_decimal(text: &str, scale: u32) -> Result<BigUint, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(text.to_string());
    let trimmed = text.trim();
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    let scale = scale as usize;
    let frac: String = frac_part.chars().take(scale).collect();
    let digits = format!("{int_part}{frac:0<scale$}");
    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)
}

/// Floor-truncated `Decimal` view of `raw / 10^scale`. `None` if it does not fit.
pub fn to_decimal(raw: &BigUint, scale: u32, dp: u32) -> Option<Decimal> {
    if dp > 28 {
        return None;
    }
    let scaled = if dp <= scale {
        raw / pow10(scale - dp)
    } else {
        raw * pow10(dp - scale)
    };
    let mantissa = scaled.to_i128()?;
    Decimal::try_from_i128_with_scale(mantissa, dp).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub account: String,
    pub index_token: String,
    pub collateral_token: String,
    pub index_symbol: String,
    pub collateral_symbol: String,
    pub is_long: bool,
    pub size: String,
    pub collateral_amount: String,
    pub collateral_usd: String,
    pub average_price: String,
    pub current_price: String,
    pub entry_funding_rate: String,
    pub has_profit: bool,
    pub realized_pnl: String,
    pub unrealized_pnl_usd: String,
    pub unrealized_pnl_percentage: String,
    pub leverage: String,
    pub liquidation_price: String,
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValuationWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub account: String,
    pub chain: String,
    pub positions: Vec<PositionView>,
    pub total_size: String,
    pub total_unrealized_pnl: String,
    pub total_collateral_value: String,
    pub skipped_candidates: usize,
}

/// Display precision for each value family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presenter {
    pub usd_decimals: u32,
    pub ratio_decimals: u32,
    /// `None` renders token amounts at the token's full precision.
    pub token_decimals: Option<u32>,
}

impl Default for Presenter {
    fn default() -> Self {
        Self {
            usd_decimals: USD_DECIMALS,
            ratio_decimals: 2,
            token_decimals: None,
        }
    }
}

impl Presenter {
    pub fn from_config(config: &ValuationConfig) -> Self {
        Self {
            usd_decimals: config.usd_display_decimals,
            ratio_decimals: config.ratio_display_decimals,
            token_decimals: config.token_display_decimals,
        }
    }

    pub fn usd(&self, value: &Q30) -> String {
        format_fixed(value.raw(), USD_DECIMALS, self.usd_decimals)
    }

    pub fn signed_usd(&self, value: &SignedQ30) -> String {
        signed(value, self.usd_decimals)
    }

    pub fn ratio(&self, value: &Q30) -> String {
        format_fixed(value.raw(), USD_DECIMALS, self.ratio_decimals)
    }

    pub fn signed_ratio(&self, value: &SignedQ30) -> String {
        signed(value, self.ratio_decimals)
    }

    pub fn token(&self, amount: &TokenAmount) -> String {
        let scale = u32::from(amount.decimals());
        format_fixed(amount.raw(), scale, self.token_decimals.unwrap_or(scale))
    }

    pub fn position(&self, report: &PositionReport) -> PositionView {
        let p = &report.position;
        PositionView {
            account: report.key.account.to_string(),
            index_token: report.key.index_token.to_string(),
            collateral_token: report.key.collateral_token.to_string(),
            index_symbol: report.index_symbol.clone(),
            collateral_symbol: report.collateral_symbol.clone(),
            is_long: p.side.is_long(),
            size: self.usd(&p.size),
            collateral_amount: self.token(&p.collateral_amount),
            collateral_usd: self.usd(&p.collateral_usd),
            average_price: self.usd(&p.average_price),
            current_price: self.usd(&p.current_price),
            entry_funding_rate: p.entry_funding_rate.to_string(),
            has_profit: p.has_profit,
            realized_pnl: self.usd(&p.realized_pnl),
            unrealized_pnl_usd: self.signed_usd(&p.unrealized_pnl_usd),
            unrealized_pnl_percentage: self.signed_ratio(&p.unrealized_pnl_percentage),
            leverage: self.ratio(&p.leverage),
            liquidation_price: self.usd(&p.liquidation_price),
            last_updated: p
                .last_updated
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            warnings: p.warnings.clone(),
        }
    }

    pub fn portfolio(&self, summary: &PortfolioSummary) -> PortfolioView {
        PortfolioView {
            account: summary.account.to_string(),
            chain: summary.chain.to_string(),
            positions: summary.positions.iter().map(|r| self.position(r)).collect(),
            total_size: self.usd(&summary.total_size),
            total_unrealized_pnl: self.signed_usd(&summary.total_unrealized_pnl),
            total_collateral_value: self.usd(&summary.total_collateral_value),
            skipped_candidates: summary.skipped.len(),
        }
    }
}

fn signed(value: &SignedQ30, dp: u32) -> String {
    let body = format_fixed(value.magnitude().raw(), USD_DECIMALS, dp);
    // a loss that truncates to "0" renders unsigned
    if value.is_negative() && body != "0" {
        format!("-{body}")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn format_trims_trailing_zeros() {
        let fifty = Q30::from_units(50);
        assert_eq!(format_fixed(fifty.raw(), 30, 30), "50");
        assert_eq!(format_fixed(&BigUint::from(0u8), 30, 30), "0");
    }

    #[test]
    fn format_small_fraction() {
        // 0.000123 at 6 decimals
        assert_eq!(format_fixed(&BigUint::from(123u32), 6, 6), "0.000123");
        assert_eq!(format_fixed(&BigUint::from(123u32), 6, 4), "0.0001");
        assert_eq!(format_fixed(&BigUint::from(123u32), 6, 3), "0");
    }

    #[test]
    fn format_truncates_not_rounds() {
        let v = Q30::from_decimal_str("3.339").unwrap();
        assert_eq!(format_fixed(v.raw(), 30, 2), "3.33");
    }

    #[test]
    fn parse_roundtrip() {
        let v = Q30::from_decimal_str("2100.25").unwrap();
        assert_eq!(v.to_string(), "2100.25");
        assert_eq!(Q30::from_decimal_str(".5").unwrap().to_string(), "0.5");
        assert_eq!(Q30::from_decimal_str("7").unwrap(), Q30::from_units(7));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Q30::from_decimal_str("").is_err());
        assert!(Q30::from_decimal_str(".").is_err());
        assert!(Q30::from_decimal_str("-1").is_err());
        assert!(Q30::from_decimal_str("1.2.3").is_err());
        assert!(Q30::from_decimal_str("1e5").is_err());
    }

    #[test]
    fn decimal_view() {
        let lev = Q30::from_units(5);
        assert_eq!(lev.to_decimal(2), Some(dec!(5.00)));
        assert_eq!(to_decimal(&BigUint::from(1u8), 30, 29), None);
    }

    #[test]
    fn signed_rendering() {
        let p = Presenter::default();
        assert_eq!(p.signed_usd(&SignedQ30::loss(Q30::from_units(50))), "-50");
        assert_eq!(p.signed_usd(&SignedQ30::profit(Q30::from_units(50))), "50");

        let tiny_loss = SignedQ30::loss(Q30::from_decimal_str("0.001").unwrap());
        assert_eq!(p.signed_ratio(&tiny_loss), "0");
    }

    #[test]
    fn token_rendering_uses_token_scale() {
        let p = Presenter::default();
        let usdc = TokenAmount::new(BigUint::from(200_500_000u32), 6);
        assert_eq!(p.token(&usdc), "200.5");

        let coarse = Presenter {
            token_decimals: Some(0),
            ..Presenter::default()
        };
        assert_eq!(coarse.token(&usdc), "200");
    }
}
