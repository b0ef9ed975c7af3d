//! Projection of a validated pair into display-ready stats

use crate::{
    constants::MARKET_CAP_LIQUIDITY_MULTIPLIER,
    types::{MarketStats, TradingPair},
};
use chrono::Utc;

/// Maps a pair into a fresh [`MarketStats`] snapshot.
///
/// Unknown optional values become zero here and nowhere earlier. Market cap
/// is approximated as liquidity x 10 since the pair carries no supply data.
pub fn project(pair: &TradingPair) -> MarketStats {
    let liquidity_usd = pair.liquidity.usd.unwrap_or(0.0);

    MarketStats {
        price_usd: pair.price_usd.clone().unwrap_or_else(|| "0".to_string()),
        market_cap: liquidity_usd * MARKET_CAP_LIQUIDITY_MULTIPLIER,
        fdv: pair.fdv.unwrap_or(0.0),
        liquidity_usd,
        volume_24h: pair.volume.h24.unwrap_or(0.0),
        price_change_24h: pair.price_change.h24.unwrap_or(0.0),
        dex_url: pair.url.clone(),
        last_updated: Utc::now(),
    }
}
