// 8.0 config.rs: all settings in one place. scanned tokens per chain, fan-out width, display precision.
// 8.1 env overrides at the bottom. unparsable values keep the current setting.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;

use crate::error::ValidationError;
use crate::fixed_point::USD_DECIMALS;
use crate::types::Chain;

// Tokens a portfolio scan walks for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain: Chain,
    // Tradable index tokens, scanned in this order
    pub index_tokens: Vec<String>,
    // Stable collateral for shorts, scanned in this order
    pub stable_tokens: Vec<String>,
}

impl ChainConfig {
    pub fn arbitrum() -> Self {
        Self {
            chain: Chain::Arbitrum,
            index_tokens: vec!["WETH".into(), "WBTC".into(), "LINK".into(), "UNI".into()],
            stable_tokens: vec!["USDC".into(), "USDC.e".into(), "USDT".into(), "DAI".into()],
        }
    }

    pub fn avalanche() -> Self {
        Self {
            chain: Chain::Avalanche,
            index_tokens: vec!["WAVAX".into(), "WETH.e".into(), "BTC.b".into()],
            stable_tokens: vec!["USDC".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationConfig {
    pub chains: Vec<ChainConfig>,
    // Max candidate reads in flight during a portfolio scan
    pub scan_concurrency: usize,
    // Fractional digits when rendering USD amounts and prices
    pub usd_display_decimals: u32,
    // Fractional digits for leverage and percentages
    pub ratio_display_decimals: u32,
    // Fractional digits for token amounts, None = token's own precision
    pub token_display_decimals: Option<u32>,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            chains: vec![ChainConfig::arbitrum(), ChainConfig::avalanche()],
            scan_concurrency: 4,
            usd_display_decimals: USD_DECIMALS,
            ratio_display_decimals: 2,
            token_display_decimals: None,
        }
    }
}

impl ValuationConfig {
    pub fn chain(&self, chain: Chain) -> Result<&ChainConfig, ValidationError> {
        self.chains
            .iter()
            .find(|c| c.chain == chain)
            .ok_or(ValidationError::UnsupportedChain(chain))
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        if self.usd_display_decimals > USD_DECIMALS || self.ratio_display_decimals > USD_DECIMALS {
            return Err(ConfigError::InvalidDisplay {
                reason: format!("display decimals cannot exceed {USD_DECIMALS}"),
            });
        }

        let mut seen_chains = HashSet::new();
        for chain in &self.chains {
            if !seen_chains.insert(chain.chain) {
                return Err(ConfigError::DuplicateChain(chain.chain));
            }
            validate_chain(chain)?;
        }

        Ok(())
    }

    /// Applies `PERPS_SCAN_CONCURRENCY`, `PERPS_USD_DECIMALS` and `PERPS_RATIO_DECIMALS`.
    pub fn with_env_overrides(mut self) -> Self {
        self.scan_concurrency = env_or("PERPS_SCAN_CONCURRENCY", self.scan_concurrency);
        self.usd_display_decimals = env_or("PERPS_USD_DECIMALS", self.usd_display_decimals);
        self.ratio_display_decimals = env_or("PERPS_RATIO_DECIMALS", self.ratio_display_decimals);
        self
    }
}

fn validate_chain(chain: &ChainConfig) -> Result<(), ConfigError> {
    if chain.index_tokens.is_empty() {
        return Err(ConfigError::InvalidTokens {
            chain: chain.chain,
            reason: "no index tokens".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for symbol in chain.index_tokens.iter().chain(&chain.stable_tokens) {
        // a stable listed as an index token would be scanned twice
        if !seen.insert(symbol.to_ascii_uppercase()) {
            return Err(ConfigError::InvalidTokens {
                chain: chain.chain,
                reason: format!("{symbol} listed more than once"),
            });
        }
    }

    Ok(())
}

fn env_or<T: std::str::FromStr>(key: &str, current: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or(current),
        Err(_) => current,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("scan concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("invalid display settings: {reason}")]
    InvalidDisplay { reason: String },

    #[error("chain {0} configured twice")]
    DuplicateChain(Chain),

    #[error("invalid tokens for {chain}: {reason}")]
    InvalidTokens { chain: Chain, reason: String },
}
