//! Constants for the pair stats SDK
//!
//! Everything that is not a per-deployment input (chain, pair, polling
//! interval) is a compile-time constant here. Per-deployment inputs live in
//! [`crate::config::TickerConfig`].

/// DexScreener API base URL for DEX pair lookups
pub const DEXSCREENER_API_URL: &str = "https://api.dexscreener.com/latest/dex";

/// Path segment for single pair lookups (`/pairs/{chainId}/{pairId}`)
pub const DEXSCREENER_PAIRS_ENDPOINT: &str = "/pairs";

/// HTTP request timeout for a single attempt (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum number of retries after the initial attempt
pub const MAX_RETRIES: u32 = 3;

/// Delay before the first retry (in milliseconds), doubled for each further retry
pub const BASE_DELAY_MS: u64 = 1000;

/// How long a successfully fetched pair may be served from cache (in seconds)
pub const CACHE_TTL_SECS: u64 = 15;

/// Default polling interval for the ticker (in milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 15_000;

/// Default chain identifier
pub const DEFAULT_CHAIN_ID: &str = "solana";

/// Age after which the ticker reports its snapshot as stale (in seconds)
pub const STALE_THRESHOLD_SECS: u64 = 60;

/// Multiplier applied to pool liquidity to approximate market cap.
/// There is no circulating supply data to do better.
pub const MARKET_CAP_LIQUIDITY_MULTIPLIER: f64 = 10.0;

/// Capacity of the ticker event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "YellowPup/1.0";

/// Environment variable holding the chain identifier
pub const ENV_CHAIN_ID: &str = "DEXSCREENER_CHAIN_ID";

/// Environment variable holding the pair identifier
pub const ENV_PAIR_ID: &str = "DEXSCREENER_PAIR_ID";

/// Environment variable holding the polling interval in milliseconds
pub const ENV_POLL_MS: &str = "DEXSCREENER_POLL_MS";
