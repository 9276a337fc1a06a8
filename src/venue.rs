// 7.0: external collaborators, specified only at their boundary.
// the core never talks to a chain itself. whatever reads positions and prices
// (rpc client, indexer, in-memory snapshot) implements these traits.
//
// every read is independent and side-effect free. no retries or timeouts here:
// those belong to the implementation behind the trait.

use std::collections::HashMap;
use std::future::Future;

use crate::error::{PositionError, ValidationError};
use crate::raw_position::RawValue;
use crate::types::{Chain, PositionKey, PriceBound, Q30, TokenAddress, TokenInfo};

/// Reads the raw position tuple for a key.
///
/// A slot that was never opened comes back as `Ok(Some(all zeros))`.
/// `Ok(None)` means the key itself is unknown to the venue.
pub trait PositionReader {
    fn fetch_raw_position(
        &self,
        chain: Chain,
        key: &PositionKey,
    ) -> impl Future<Output = Result<Option<Vec<RawValue>>, PositionError>> + Send;
}

/// Reads one bound of a token's oracle price, Q30.
///
/// Callers pick the bound for the side being valued (see `Side::index_price_bound`).
/// Reading the wrong bound biases the result silently.
pub trait PriceOracle {
    fn fetch_price(
        &self,
        chain: Chain,
        token: &TokenAddress,
        bound: PriceBound,
    ) -> impl Future<Output = Result<Q30, PositionError>> + Send;
}

/// Symbol to address/decimals resolution, per chain.
pub trait TokenRegistry {
    fn resolve(&self, chain: Chain, symbol: &str) -> Result<TokenInfo, ValidationError>;
}

// 7.1: table-backed registry. symbols match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenRegistry {
    tokens: HashMap<(Chain, String), TokenInfo>,
}

impl StaticTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chain: Chain, symbol: &str, address: &str, decimals: u8) {
        let info = TokenInfo {
            symbol: symbol.to_string(),
            address: TokenAddress::new(address),
            decimals,
        };
        self.tokens.insert((chain, symbol.to_ascii_uppercase()), info);
    }

    pub fn with_token(mut self, chain: Chain, symbol: &str, address: &str, decimals: u8) -> Self {
        self.insert(chain, symbol, address, decimals);
        self
    }

    /// Tokens the venue lists on Arbitrum and Avalanche.
    pub fn mainnet() -> Self {
        Self::new()
            .with_token(Chain::Arbitrum, "WETH", "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", 18)
            .with_token(Chain::Arbitrum, "WBTC", "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f", 8)
            .with_token(Chain::Arbitrum, "LINK", "0xf97f4df75117a78c1A5a0DBb814Af92458539FB4", 18)
            .with_token(Chain::Arbitrum, "UNI", "0xFa7F8980b0f1E64A2062791cc3b0871572f1F7f0", 18)
            .with_token(Chain::Arbitrum, "USDC", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831", 6)
            .with_token(Chain::Arbitrum, "USDC.E", "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8", 6)
            .with_token(Chain::Arbitrum, "USDT", "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", 6)
            .with_token(Chain::Arbitrum, "DAI", "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1", 18)
            .with_token(Chain::Avalanche, "WAVAX", "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7", 18)
            .with_token(Chain::Avalanche, "WETH.E", "0x49D5c2BdFfac6CE2BFdB6640F4F80f226bc10bAB", 18)
            .with_token(Chain::Avalanche, "BTC.B", "0x152b9d0FdC40C096757F570A51E494bd4b943E50", 8)
            .with_token(Chain::Avalanche, "USDC", "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E", 6)
    }
}

impl TokenRegistry for StaticTokenRegistry {
    fn resolve(&self, chain: Chain, symbol: &str) -> Result<TokenInfo, ValidationError> {
        self.tokens
            .get(&(chain, symbol.trim().to_ascii_uppercase()))
            .cloned()
            .ok_or_else(|| ValidationError::UnsupportedToken {
                chain,
                symbol: symbol.to_string(),
            })
    }
}
