use perps_valuation::*;

pub const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

/// Resolve a mainnet token or panic; fixtures only use listed symbols.
#[allow(dead_code)]
pub fn token(chain: Chain, symbol: &str) -> TokenInfo {
    StaticTokenRegistry::mainnet()
        .resolve(chain, symbol)
        .expect("fixture token must be listed")
}

#[allow(dead_code)]
pub fn account() -> AccountAddress {
    AccountAddress::new(ACCOUNT)
}

#[allow(dead_code)]
pub fn key(index: &TokenInfo, collateral: &TokenInfo, side: Side) -> PositionKey {
    PositionKey::new(account(), index.address.clone(), collateral.address.clone(), side)
}

/// Open position in whole dollars.
#[allow(dead_code)]
pub fn raw(size: u64, collateral: u64, avg_price: u64) -> RawPosition {
    RawPosition {
        size_usd: Q30::from_units(size),
        collateral_usd: Q30::from_units(collateral),
        avg_price: Q30::from_units(avg_price),
        last_updated: UnixTime::from_secs(1_700_000_000).expect("valid timestamp"),
        ..RawPosition::default()
    }
}

#[allow(dead_code)]
pub fn service(venue: SnapshotVenue) -> PositionService<SnapshotVenue, StaticTokenRegistry> {
    PositionService::new(venue, StaticTokenRegistry::mainnet(), ValuationConfig::default())
}

#[allow(dead_code)]
pub fn priced(venue: SnapshotVenue, chain: Chain, token: &TokenInfo, units: u64) -> SnapshotVenue {
    venue.with_price(chain, &token.address, Q30::from_units(units), Q30::from_units(units))
}
