// perps-valuation: perpetual position valuation core.
// values leveraged positions on an on-chain margin venue from raw position state and oracle prices.
// all arithmetic is exact integer fixed point (Q30 for USD), floored, rendered to strings last.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Q30, SignedQ30, TokenAmount, Side, PriceBound, keys
//   2.x  error.rs: PositionError, ValidationError, MathError
//   2.1x fixed_point.rs: USD/token precision, mul-div floor, ratio
//   3.x  raw_position.rs: raw tuple decode into RawPosition
//   4.x  valuation.rs: single-position leverage, pnl, liquidation price
//   5.x  portfolio.rs: candidate enumeration, bounded fan-out, totals
//   6.x  presenter.rs: Q30 → decimal strings, PositionView, PortfolioView
//   7.x  venue.rs: reader/oracle/registry traits + static token tables
//   8.x  config.rs: scanned tokens, concurrency, display precision
//   9.x  service.rs: get_position (fail loud), scan_portfolio (skip per candidate)
//   10.x snapshot.rs: in-memory venue from JSON (mocked chain)

// valuation core
pub mod error;
pub mod fixed_point;
pub mod portfolio;
pub mod raw_position;
pub mod types;
pub mod valuation;

// integration modules
pub mod config;
pub mod presenter;
pub mod service;
pub mod snapshot;
pub mod venue;

// re exports for convenience
pub use error::*;
pub use fixed_point::*;
pub use portfolio::*;
pub use raw_position::*;
pub use types::*;
pub use valuation::*;
pub use config::{ChainConfig, ConfigError, ValuationConfig};
pub use presenter::{PortfolioView, PositionView, Presenter};
pub use service::PositionService;
pub use snapshot::{SnapshotError, SnapshotVenue, VenueSnapshot};
pub use venue::{PositionReader, PriceOracle, StaticTokenRegistry, TokenRegistry};
