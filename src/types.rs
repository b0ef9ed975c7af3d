//! Types for the pair stats SDK

use crate::error::ErrorKind;
use crate::format;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Treats an explicit JSON `null` like a missing value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token descriptor on one side of a pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// Buy and sell counts for one time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnCount {
    pub buys: u64,
    pub sells: u64,
}

/// Transaction counts per time window. Only the 24h window is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transactions {
    pub h24: TxnCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h6: Option<TxnCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h1: Option<TxnCount>,
}

/// Per-window numeric values (volume or price change)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeframeValues {
    pub h24: Option<f64>,
    pub h6: Option<f64>,
    pub h1: Option<f64>,
}

/// Pool liquidity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

/// A trading pair as returned by the DexScreener pairs endpoint
///
/// Optional numbers stay `None` when the upstream omits them. Defaults are
/// only applied when projecting into [`MarketStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPair {
    pub chain_id: String,
    pub dex_id: String,
    pub url: String,
    pub pair_address: String,
    pub base_token: TokenInfo,
    pub quote_token: TokenInfo,
    pub price_native: Option<String>,
    pub price_usd: Option<String>,
    pub txns: Transactions,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume: TimeframeValues,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_change: TimeframeValues,
    #[serde(default, deserialize_with = "null_as_default")]
    pub liquidity: Liquidity,
    pub fdv: Option<f64>,
    /// Pair creation time in unix milliseconds
    pub pair_created_at: Option<i64>,
}

impl TradingPair {
    /// Pair creation time, if the upstream reported a valid one
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.pair_created_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Human readable pair name, e.g. `BUNT/SOL`
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.base_token.symbol, self.quote_token.symbol)
    }
}

/// Display-ready market statistics for one pair
///
/// A fresh snapshot is produced on every successful fetch; it is never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    /// Price in USD, kept as the upstream string to preserve precision
    pub price_usd: String,

    /// Approximate market cap (liquidity x 10)
    pub market_cap: f64,

    /// Fully diluted valuation
    pub fdv: f64,

    /// Pool liquidity in USD
    pub liquidity_usd: f64,

    /// 24h trading volume in USD
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,

    /// 24h price change percentage
    #[serde(rename = "priceChange24h")]
    pub price_change_24h: f64,

    /// DexScreener page for the pair
    pub dex_url: String,

    /// When this snapshot was projected
    pub last_updated: DateTime<Utc>,
}

impl MarketStats {
    /// Formats every field for display
    pub fn formatted(&self) -> FormattedStats {
        FormattedStats {
            price: format::format_price(&self.price_usd),
            market_cap: format::format_number(self.market_cap),
            fdv: format::format_number(self.fdv),
            liquidity: format::format_number(self.liquidity_usd),
            volume_24h: format::format_number(self.volume_24h),
            price_change_24h: format::format_percentage(self.price_change_24h),
        }
    }

    /// Age of the snapshot
    pub fn age(&self) -> std::time::Duration {
        let duration = Utc::now().signed_duration_since(self.last_updated);
        std::time::Duration::from_millis(duration.num_milliseconds().max(0) as u64)
    }

    /// Check if the snapshot is older than threshold seconds
    pub fn is_stale(&self, threshold_seconds: u64) -> bool {
        self.age().as_secs() > threshold_seconds
    }
}

/// [`MarketStats`] rendered as display strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedStats {
    pub price: String,
    pub market_cap: String,
    pub fdv: String,
    pub liquidity: String,
    pub volume_24h: String,
    pub price_change_24h: String,
}

/// What a presentation layer needs to render the stats widget
///
/// `stats`, `is_loading` and `error` are independent: during a refresh
/// `is_loading` is set while the previous stats and error are still present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerState {
    /// Latest successful snapshot
    pub stats: Option<MarketStats>,
    /// A fetch is in flight
    pub is_loading: bool,
    /// Message of the latest failed fetch, cleared on success
    pub error: Option<String>,
    /// When the latest successful fetch completed
    pub last_success: Option<DateTime<Utc>>,
}

/// Ticker events for subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatsEvent {
    /// A new snapshot was fetched
    StatsUpdated {
        id: Uuid,
        chain_id: String,
        pair_id: String,
        stats: MarketStats,
        timestamp: DateTime<Utc>,
    },

    /// A fetch cycle failed after all retries
    FetchFailed {
        id: Uuid,
        chain_id: String,
        pair_id: String,
        kind: ErrorKind,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl StatsEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            StatsEvent::StatsUpdated { id, .. } => *id,
            StatsEvent::FetchFailed { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            StatsEvent::StatsUpdated { .. } => "STATS_UPDATED",
            StatsEvent::FetchFailed { .. } => "FETCH_FAILED",
        }
    }
}

impl std::fmt::Display for StatsEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsEvent::StatsUpdated {
                chain_id,
                pair_id,
                stats,
                ..
            } => {
                write!(
                    f,
                    "Stats updated: {}/{} = {}",
                    chain_id,
                    pair_id,
                    format::format_price(&stats.price_usd)
                )
            }
            StatsEvent::FetchFailed {
                chain_id,
                pair_id,
                kind,
                error_message,
                ..
            } => {
                write!(
                    f,
                    "Fetch failed for {}/{} ({}): {}",
                    chain_id, pair_id, kind, error_message
                )
            }
        }
    }
}

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Fresh data and the latest fetch succeeded
    Healthy,
    /// Data is available but stale or the latest fetch failed
    Degraded,
    /// No data available
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}
