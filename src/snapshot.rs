// 10.0: in-memory venue loaded from a JSON snapshot (mocked chain reads).
// serves raw tuples and min/max prices the way a live reader would:
// unknown slots of a known account come back all-zero (flat),
// accounts the snapshot has never seen come back as not found.

use std::collections::{HashMap, HashSet};
use std::future::{ready, Future};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{PositionError, ValidationError};
use crate::raw_position::{RawPosition, RawValue};
use crate::types::{AccountAddress, Chain, PositionKey, PriceBound, Q30, Side, TokenAddress};
use crate::venue::{PositionReader, PriceOracle};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSnapshot {
    /// Accounts that exist even without any stored position.
    #[serde(default)]
    pub accounts: Vec<AccountAddress>,
    #[serde(default)]
    pub positions: Vec<PositionEntry>,
    #[serde(default)]
    pub prices: Vec<PriceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEntry {
    pub chain: Chain,
    pub account: AccountAddress,
    pub index_token: TokenAddress,
    pub collateral_token: TokenAddress,
    pub is_long: bool,
    pub fields: Vec<RawValue>,
}

/// Prices as USD decimal strings, e.g. `"2100.5"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub chain: Chain,
    pub token: TokenAddress,
    pub min: String,
    pub max: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid snapshot value: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Default)]
pub struct SnapshotVenue {
    accounts: HashSet<(Chain, AccountAddress)>,
    positions: HashMap<(Chain, PositionKey), Vec<RawValue>>,
    prices: HashMap<(Chain, TokenAddress), (Q30, Q30)>,
    price_reads: AtomicUsize,
}

impl SnapshotVenue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: VenueSnapshot) -> Result<Self, SnapshotError> {
        let mut venue = Self::new();

        for account in snapshot.accounts {
            for chain in [Chain::Arbitrum, Chain::Avalanche] {
                venue.accounts.insert((chain, account.clone()));
            }
        }

        for entry in snapshot.positions {
            let key = PositionKey::new(
                entry.account,
                entry.index_token,
                entry.collateral_token,
                Side::from_is_long(entry.is_long),
            );
            venue.insert_fields(entry.chain, key, entry.fields);
        }

        for entry in snapshot.prices {
            let min = Q30::from_decimal_str(&entry.min)?;
            let max = Q30::from_decimal_str(&entry.max)?;
            venue.prices.insert((entry.chain, entry.token), (min, max));
        }

        Ok(venue)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_account(mut self, chain: Chain, account: &AccountAddress) -> Self {
        self.accounts.insert((chain, account.clone()));
        self
    }

    pub fn with_position(mut self, chain: Chain, key: PositionKey, raw: &RawPosition) -> Self {
        self.insert_fields(chain, key, raw.encode());
        self
    }

    /// Stores a tuple as-is, including malformed ones.
    pub fn with_raw_fields(mut self, chain: Chain, key: PositionKey, fields: Vec<RawValue>) -> Self {
        self.insert_fields(chain, key, fields);
        self
    }

    pub fn with_price(mut self, chain: Chain, token: &TokenAddress, min: Q30, max: Q30) -> Self {
        self.prices.insert((chain, token.clone()), (min, max));
        self
    }

    /// Number of price reads served so far.
    pub fn price_reads(&self) -> usize {
        self.price_reads.load(Ordering::Relaxed)
    }

    fn insert_fields(&mut self, chain: Chain, key: PositionKey, fields: Vec<RawValue>) {
        self.accounts.insert((chain, key.account.clone()));
        self.positions.insert((chain, key), fields);
    }

    fn lookup_position(&self, chain: Chain, key: &PositionKey) -> Option<Vec<RawValue>> {
        if let Some(fields) = self.positions.get(&(chain, key.clone())) {
            return Some(fields.clone());
        }
        if self.accounts.contains(&(chain, key.account.clone())) {
            return Some(RawPosition::flat().encode());
        }
        None
    }

    fn lookup_price(&self, chain: Chain, token: &TokenAddress, bound: PriceBound) -> Result<Q30, PositionError> {
        self.price_reads.fetch_add(1, Ordering::Relaxed);
        let (min, max) = self
            .prices
            .get(&(chain, token.clone()))
            .ok_or_else(|| PositionError::oracle(token, format!("no price on {chain}")))?;
        Ok(match bound {
            PriceBound::Min => min.clone(),
            PriceBound::Max => max.clone(),
        })
    }
}

impl PositionReader for SnapshotVenue {
    fn fetch_raw_position(
        &self,
        chain: Chain,
        key: &PositionKey,
    ) -> impl Future<Output = Result<Option<Vec<RawValue>>, PositionError>> + Send {
        ready(Ok(self.lookup_position(chain, key)))
    }
}

impl PriceOracle for SnapshotVenue {
    fn fetch_price(
        &self,
        chain: Chain,
        token: &TokenAddress,
        bound: PriceBound,
    ) -> impl Future<Output = Result<Q30, PositionError>> + Send {
        ready(self.lookup_price(chain, token, bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "positions": [{
            "chain": "arbitrum",
            "account": "0xAbC",
            "indexToken": "0xWETH",
            "collateralToken": "0xweth",
            "isLong": true,
            "fields": ["1000000000000000000000000000000000", "200000000000000000000000000000000",
                       "2000000000000000000000000000000000", "0", "0", "0", false, 1700000000]
        }],
        "prices": [{ "chain": "arbitrum", "token": "0xweth", "min": "2100", "max": "2101.5" }]
    }"#;

    fn key(side: Side) -> PositionKey {
        PositionKey::new(
            AccountAddress::new("0xabc"),
            TokenAddress::new("0xweth"),
            TokenAddress::new("0xweth"),
            side,
        )
    }

    #[tokio::test]
    async fn serves_stored_tuple() {
        let venue = SnapshotVenue::from_json(SNAPSHOT).unwrap();
        let fields = venue.fetch_raw_position(Chain::Arbitrum, &key(Side::Long)).await.unwrap().unwrap();
        let raw = RawPosition::decode(&fields).unwrap();
        assert_eq!(raw.size_usd, Q30::from_units(1000));
    }

    #[tokio::test]
    async fn known_account_missing_slot_is_flat() {
        let venue = SnapshotVenue::from_json(SNAPSHOT).unwrap();
        let fields = venue.fetch_raw_position(Chain::Arbitrum, &key(Side::Short)).await.unwrap().unwrap();
        assert!(RawPosition::decode(&fields).unwrap().is_flat());
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let venue = SnapshotVenue::from_json(SNAPSHOT).unwrap();
        let mut stranger = key(Side::Long);
        stranger.account = AccountAddress::new("0xdef");
        assert_eq!(venue.fetch_raw_position(Chain::Arbitrum, &stranger).await.unwrap(), None);
        // same account, other chain
        assert_eq!(venue.fetch_raw_position(Chain::Avalanche, &key(Side::Long)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn price_bounds_are_kept_apart() {
        let venue = SnapshotVenue::from_json(SNAPSHOT).unwrap();
        let weth = TokenAddress::new("0xweth");
        let min = venue.fetch_price(Chain::Arbitrum, &weth, PriceBound::Min).await.unwrap();
        let max = venue.fetch_price(Chain::Arbitrum, &weth, PriceBound::Max).await.unwrap();
        assert_eq!(min, Q30::from_units(2100));
        assert_eq!(max, Q30::from_decimal_str("2101.5").unwrap());
        assert_eq!(venue.price_reads(), 2);
    }

    #[tokio::test]
    async fn missing_price_is_oracle_error() {
        let venue = SnapshotVenue::from_json(SNAPSHOT).unwrap();
        let err = venue
            .fetch_price(Chain::Arbitrum, &TokenAddress::new("0xusdc"), PriceBound::Max)
            .await
            .unwrap_err();
        assert!(matches!(err, PositionError::Oracle { .. }));
    }

    #[test]
    fn bad_price_string_rejected() {
        let json = r#"{ "prices": [{ "chain": "arbitrum", "token": "0x1", "min": "abc", "max": "1" }] }"#;
        assert!(matches!(SnapshotVenue::from_json(json), Err(SnapshotError::Validation(_))));
    }
}
