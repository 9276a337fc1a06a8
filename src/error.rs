// 2.0: error taxonomy. a closed position is never an error; a broken open one always is.

use crate::types::{Chain, PositionKey, TokenAddress};

/// Integer math failures inside the fixed-point layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),
}

/// Caller asked for something this venue setup does not support.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown chain {0:?}")]
    UnknownChain(String),

    #[error("chain {0} is not configured")]
    UnsupportedChain(Chain),

    #[error("token {symbol:?} is not supported on {chain}")]
    UnsupportedToken { chain: Chain, symbol: String },

    #[error("invalid decimal amount {0:?}")]
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("price unavailable for {token}: {reason}")]
    Oracle { token: TokenAddress, reason: String },

    #[error("malformed raw position: {reason}")]
    MalformedRawPosition { reason: String },

    #[error("no position at {0}")]
    NotFound(PositionKey),

    #[error("math error: {0}")]
    Math(#[from] MathError),
}

impl PositionError {
    pub fn oracle(token: &TokenAddress, reason: impl Into<String>) -> Self {
        Self::Oracle {
            token: token.clone(),
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRawPosition {
            reason: reason.into(),
        }
    }

    /// Errors a portfolio scan downgrades to "skip this candidate".
    pub fn is_skippable(&self) -> bool {
        match self {
            PositionError::Validation(_)
            | PositionError::Oracle { .. }
            | PositionError::MalformedRawPosition { .. }
            | PositionError::NotFound(_) => true,
            PositionError::Math(_) => false,
        }
    }
}
