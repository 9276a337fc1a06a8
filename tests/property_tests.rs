//! Property-based tests for the valuation math.
//!
//! These tests verify invariants hold under random inputs.

use num_bigint::BigUint;
use perps_valuation::*;
use proptest::prelude::*;

// Strategies for generating test data
fn price_strategy() -> impl Strategy<Value = u64> {
    1u64..1_000_000u64 // $1 to $1M
}

fn size_strategy() -> impl Strategy<Value = u64> {
    1u64..1_000_000_000u64 // $1 to $1B notional
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Long), Just(Side::Short)]
}

fn raw(size: u64, collateral: u64, avg: u64) -> RawPosition {
    RawPosition {
        size_usd: Q30::from_units(size),
        collateral_usd: Q30::from_units(collateral),
        avg_price: Q30::from_units(avg),
        last_updated: UnixTime::from_secs(1_700_000_000).unwrap(),
        ..RawPosition::default()
    }
}

fn quote(token: &str, units: u64) -> PriceQuote {
    PriceQuote::new(TokenAddress::new(token), Q30::from_units(units))
}

fn value(raw: &RawPosition, mark: u64, side: Side) -> Position {
    let usdc = quote("0xusdc", 1);
    value_position(raw, &quote("0xindex", mark), &usdc, 6, side).unwrap()
}

proptest! {
    /// Flat positions report zero risk, whatever else the tuple holds
    #[test]
    fn flat_is_all_zero(
        side in side_strategy(),
        mark in 0u64..100_000u64,
        ts in prop_oneof![Just(0u64), 1u64..2_000_000_000u64],
    ) {
        let raw = RawPosition { last_updated: UnixTime::from_secs(ts).unwrap(), ..RawPosition::flat() };
        let pos = value_position(&raw, &quote("0xindex", mark), &quote("0xusdc", mark), 6, side).unwrap();

        prop_assert!(pos.leverage.is_zero());
        prop_assert!(pos.unrealized_pnl_usd.is_zero());
        prop_assert!(pos.liquidation_price.is_zero());
        prop_assert_eq!(pos.last_updated.is_none(), ts == 0);
    }

    /// Leverage equals size / collateral within one unit of Q30 rounding
    #[test]
    fn leverage_is_floor_ratio(
        size in size_strategy(),
        collateral in 1u64..1_000_000_000u64,
        avg in price_strategy(),
        mark in price_strategy(),
        side in side_strategy(),
    ) {
        let pos = value(&raw(size, collateral, avg), mark, side);

        let numerator = Q30::from_units(size).raw() * usd_precision();
        let denominator = Q30::from_units(collateral).into_raw();
        let lev = pos.leverage.raw();
        prop_assert!(lev * &denominator <= numerator);
        prop_assert!((lev + BigUint::from(1u8)) * &denominator > numerator);
    }

    /// A long gaining on a rise and a short gaining on an equal fall earn the same
    #[test]
    fn long_short_symmetry(
        size in size_strategy(),
        collateral in size_strategy(),
        avg in 2u64..1_000_000u64,
        move_pct in 1u64..100u64,
    ) {
        let delta = (avg * move_pct / 100).max(1).min(avg - 1);
        let raw = raw(size, collateral, avg);

        let long = value(&raw, avg + delta, Side::Long);
        let short = value(&raw, avg - delta, Side::Short);

        prop_assert!(!long.unrealized_pnl_usd.is_negative());
        prop_assert!(!short.unrealized_pnl_usd.is_negative());
        prop_assert_eq!(long.unrealized_pnl_usd.magnitude(), short.unrealized_pnl_usd.magnitude());
        prop_assert_eq!(&long.unrealized_pnl_percentage, &short.unrealized_pnl_percentage);
    }

    /// PnL sign follows the side: long profits above entry, short below
    #[test]
    fn pnl_sign_follows_side(
        size in size_strategy(),
        avg in price_strategy(),
        mark in price_strategy(),
        side in side_strategy(),
    ) {
        let pos = value(&raw(size, size / 5 + 1, avg), mark, side);
        let price_rose = mark > avg;
        let expect_loss = match side {
            Side::Long => mark < avg,
            Side::Short => price_rose,
        };
        prop_assert_eq!(pos.unrealized_pnl_usd.is_negative(), expect_loss);
        if mark == avg {
            prop_assert!(pos.unrealized_pnl_usd.is_zero());
        }
    }

    /// More collateral pushes the liquidation price further from entry
    #[test]
    fn liquidation_distance_grows_with_collateral(
        size in size_strategy(),
        avg in price_strategy(),
        c1 in 1u64..1_000_000u64,
        extra in 1u64..1_000_000u64,
        side in side_strategy(),
    ) {
        let c2 = c1 + extra;
        // a long whose liquidation price already clamped to 0 cannot move further
        prop_assume!(side == Side::Short || c2 < size);

        let low = value(&raw(size, c1, avg), avg, side);
        let high = value(&raw(size, c2, avg), avg, side);
        prop_assert!(high.liquidation_distance() > low.liquidation_distance());

        match side {
            Side::Long => prop_assert!(high.liquidation_price < low.liquidation_price),
            Side::Short => prop_assert!(high.liquidation_price > low.liquidation_price),
        }
    }

    /// Long liquidation price never goes below zero
    #[test]
    fn long_liquidation_price_floors_at_zero(
        size in size_strategy(),
        collateral in size_strategy(),
        avg in price_strategy(),
    ) {
        let pos = value(&raw(size, collateral, avg), avg, Side::Long);
        if collateral >= size {
            prop_assert!(pos.liquidation_price.is_zero());
        } else {
            prop_assert!(pos.liquidation_price < pos.average_price);
        }
    }

    /// Same inputs, same output, down to the rendered bytes
    #[test]
    fn valuation_is_idempotent(
        size in size_strategy(),
        collateral in size_strategy(),
        avg in price_strategy(),
        mark in price_strategy(),
        side in side_strategy(),
    ) {
        let raw = raw(size, collateral, avg);
        let first = value(&raw, mark, side);
        let second = value(&raw, mark, side);
        prop_assert_eq!(&first, &second);

        let presenter = Presenter::default();
        let report = |position: Position| PositionReport {
            key: PositionKey::new(
                AccountAddress::new("0xabc"),
                TokenAddress::new("0xindex"),
                TokenAddress::new("0xusdc"),
                side,
            ),
            index_symbol: "IDX".into(),
            collateral_symbol: "USDC".into(),
            position,
        };
        let a = serde_json::to_string(&presenter.position(&report(first))).unwrap();
        let b = serde_json::to_string(&presenter.position(&report(second))).unwrap();
        prop_assert_eq!(a, b);
    }

    /// An open position never values with a zero collateral price
    #[test]
    fn zero_collateral_price_never_silent(
        size in size_strategy(),
        collateral in size_strategy(),
        avg in price_strategy(),
        side in side_strategy(),
    ) {
        let result = value_position(&raw(size, collateral, avg), &quote("0xindex", avg), &quote("0xusdc", 0), 6, side);
        let is_oracle_error = matches!(result, Err(PositionError::Oracle { .. }));
        prop_assert!(is_oracle_error);
    }

    /// Rendering then parsing a USD amount loses nothing at full precision
    #[test]
    fn render_parse_roundtrip(units in 0u64..u64::MAX, frac in 0u64..1_000_000_000_000u64) {
        let raw = Q30::from_units(units).raw() + BigUint::from(frac);
        let value = Q30::from_raw(raw);
        let parsed = Q30::from_decimal_str(&value.to_string()).unwrap();
        prop_assert_eq!(parsed, value);
    }
}
