//! # Pair Stats SDK
//!
//! Live market stats for a single DEX trading pair, fetched from the public
//! DexScreener API and formatted for display.
//!
//! ## Important: This is NOT an on-chain price source
//!
//! Nothing here reads or writes chain state. Prices come from DexScreener's
//! aggregated view of the pair, and the market cap is an approximation
//! (liquidity x 10) because no circulating supply data is available.
//!
//! ## Usage
//!
//! ```no_run
//! use pair_stats_sdk::{format, DexScreenerClient, FetchError};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DexScreenerClient::new()?;
//!
//! match client.get_pair_stats("solana", "8sLbNZoA1cfnvMJLPfp98ZLAnFSYCFApfJKMbiXNLwxj").await {
//!     Ok(stats) => {
//!         println!("Price: {}", format::format_price(&stats.price_usd));
//!         println!("24h: {}", format::format_percentage(stats.price_change_24h));
//!     }
//!     Err(FetchError::NoData) => println!("Pair not listed"),
//!     Err(e) => eprintln!("Error ({}): {}", e.kind(), e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! DexScreenerClient::get_pair_stats(chain, pair)
//!     ↓
//! PairCache (15s, successes only)
//!     ↓ miss
//! retry_with_backoff (1 + 3 attempts, 1s/2s/4s)
//!     ↓
//! PairDataSource (DexScreener over reqwest)
//!     ↓
//! validator::parse_body  → SCHEMA_INVALID / NO_DATA, never retried
//!     ↓
//! projector::project     → MarketStats
//! ```
//!
//! [`StatsTicker`] wraps the client in a polling loop and publishes a
//! [`TickerState`] for rendering.

pub mod cache;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod metrics;
pub mod projector;
pub mod retry;
pub mod source;
pub mod sources;
pub mod ticker;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use client::DexScreenerClient;
pub use config::TickerConfig;
pub use error::{ConfigError, ErrorKind, FetchError};
pub use format::{format_number, format_percentage, format_price};
pub use metrics::SourceMetrics;
pub use retry::RetryPolicy;
pub use source::PairDataSource;
pub use ticker::StatsTicker;
pub use types::{
    ComponentHealth, FormattedStats, HealthStatus, MarketStats, StatsEvent, TickerState,
    TradingPair,
};
