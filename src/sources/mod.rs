//! Pair data source implementations

pub mod dexscreener;

pub use dexscreener::DexScreenerSource;
